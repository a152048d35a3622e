//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Run the fulfillment webhook until Ctrl-C
//! - turn: Run one turn from a request file and print the response
//! - actions: List every handled action
//! - doctor: Validate configuration and content

use anyhow::{Context, Result};
use serde_json::json;
use std::io::Read;
use std::path::Path;

use crate::config::{Config, ContentSource};
use crate::content::{ContentClient, PromptName};
use crate::conversation::wire::{TurnRequest, TurnResponse};
use crate::fulfillment::Action;
use crate::runner::TurnRunner;
use crate::server;
use crate::session::QuizSettings;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

fn build_runner(config: &Config, seed: Option<u64>) -> Result<TurnRunner> {
    let store = config
        .build_store()
        .context("Failed to open the content store")?;
    Ok(TurnRunner::new(store, config.quiz.turn_settings())
        .with_seed(seed.or(config.quiz.rng_seed))
        .with_debug_info(config.core.debug_info))
}

/// Run the fulfillment webhook until Ctrl-C
pub async fn handle_serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let runner = build_runner(config, None)?;

    let mut server_config = config.server.clone();
    if let Some(host) = host {
        server_config.host = host;
    }
    if let Some(port) = port {
        server_config.port = port;
    }
    let address = server_config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    server::serve(listener, runner, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await
    .context("Webhook server failed")?;
    Ok(())
}

/// Read a request from a file, or from stdin when the path is `-`
fn read_request(path: &Path) -> Result<TurnRequest> {
    let raw = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?
    };
    serde_json::from_str(&raw).context("Request is not a valid fulfillment request")
}

/// Run one turn offline
pub async fn handle_turn(
    config: &Config,
    request: &Path,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let request = read_request(request)?;
    let runner = build_runner(config, seed)?;
    let response = runner.handle_turn(request).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => print_turn(&response),
    }
    Ok(())
}

fn print_turn(response: &TurnResponse) {
    let prompt = &response.prompt;
    for simple in prompt.first_simple.iter().chain(prompt.last_simple.iter()) {
        println!("{}", simple.text.as_deref().unwrap_or(&simple.speech));
    }
    if let Some(content) = &prompt.content {
        if let Some(title) = &content.card.title {
            println!("[card] {}", title);
        }
    }
    if !prompt.suggestions.is_empty() {
        let chips: Vec<&str> = prompt.suggestions.iter().map(|s| s.title.as_str()).collect();
        println!("[chips] {}", chips.join(" | "));
    }
    if let Some(canvas) = &prompt.canvas {
        println!("[canvas] {} slide(s)", canvas.data.len());
    }
    if let Some(scene) = &response.scene {
        println!("[scene] {}", scene.next.name);
    }
}

/// List every handled action
pub fn handle_actions(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for action in Action::ALL {
                println!("{}", action);
            }
        }
        OutputFormat::Json => {
            let names: Vec<&str> = Action::ALL.iter().map(|a| a.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
    }
    Ok(())
}

/// Validate configuration and content
///
/// Opens the configured content store and reads every collection the
/// dialogue needs for the default locale, reporting what is missing.
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks: Vec<(String, String)> = Vec::new();

    // Config is already validated when loaded
    checks.push(("Configuration".into(), "Valid".into()));

    if config.core.data_dir.exists() {
        checks.push(("Data directory".into(), "Exists".into()));
    } else {
        checks.push(("Data directory".into(), "Missing".into()));
    }

    let source = match config.content.source {
        ContentSource::Static => format!("static ({})", config.content.bundle_path.display()),
        ContentSource::Http => format!("http ({})", config.content.base_url),
    };
    checks.push(("Content source".into(), source));

    if config.quiz.immersive_url.is_empty() {
        checks.push(("Canvas URL".into(), "Not set".into()));
        issues.push("quiz.immersive_url is empty; canvas devices will not load the quiz app".into());
    } else {
        checks.push(("Canvas URL".into(), config.quiz.immersive_url.clone()));
    }

    match config.build_store() {
        Ok(store) => {
            checks.push(("Content store".into(), "Opened".into()));
            let client = ContentClient::new(store, "en");
            check_content(&client, &mut checks, &mut issues).await;
        }
        Err(e) => {
            checks.push(("Content store".into(), "Failed".into()));
            issues.push(format!("Cannot open content store: {}", e));
        }
    }

    match format {
        OutputFormat::Text => {
            println!("Persona Diagnostics");
            println!("===================");
            println!();

            println!("Checks:");
            for (check, status) in &checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

async fn check_content(
    client: &ContentClient,
    checks: &mut Vec<(String, String)>,
    issues: &mut Vec<String>,
) {
    let mut count = |name: &str, result: Result<usize, sdk::EngineError>| match result {
        Ok(0) => {
            checks.push((name.to_string(), "Empty".into()));
            issues.push(format!("No {} for locale {}", name.to_lowercase(), client.locale()));
        }
        Ok(n) => checks.push((name.to_string(), format!("{} found", n))),
        Err(e) => {
            checks.push((name.to_string(), "Failed".into()));
            issues.push(format!("Cannot read {}: {}", name.to_lowercase(), e));
        }
    };
    count("Intros", client.get_all_intros().await.map(|v| v.len()));
    count("Questions", client.get_all_questions().await.map(|v| v.len()));
    count("Outcomes", client.get_all_outcomes().await.map(|v| v.len()));

    match client.get_quiz_settings().await {
        Ok(remote) => {
            let mut settings = QuizSettings::default();
            match settings.merge_remote(&remote) {
                Ok(()) => checks.push((
                    "Quiz settings".into(),
                    format!("{} question(s) per quiz", settings.questions_per_quiz),
                )),
                Err(e) => issues.push(format!("Quiz settings are unusable: {}", e)),
            }
        }
        Err(e) => issues.push(format!("Cannot read quiz settings: {}", e)),
    }

    let mut missing = Vec::new();
    for name in PromptName::ALL {
        match client.prompt_candidates(name).await {
            Ok(candidates) if candidates.is_empty() => missing.push(name.key()),
            Ok(_) => {}
            Err(e) => {
                issues.push(format!("Cannot read prompt {}: {}", name.key(), e));
                return;
            }
        }
    }
    if missing.is_empty() {
        checks.push(("Prompts".into(), "Complete".into()));
    } else {
        checks.push(("Prompts".into(), format!("{} missing", missing.len())));
        issues.push(format!("Prompts with no text: {}", missing.join(", ")));
    }
}
