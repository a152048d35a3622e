//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be loaded from disk,
//! validated, and turned into a working content store.

use persona_engine::config::{Config, ContentSource};
use sdk::errors::EngineError;
use sdk::ContentStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_bundle() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/quiz_bundle.json")
}

#[test]
fn test_config_toml_parsing() {
    let toml_content = r#"
[core]
log_level = "debug"
data_dir = "/var/lib/persona"
debug_info = true

[server]
host = "0.0.0.0"
port = 3000

[content]
source = "http"
base_url = "https://content.example.com/quiz"
timeout_secs = 3

[quiz]
immersive_url = "https://quiz.example.com/app"
ssml_break_ms = 500
rng_seed = 42
"#;

    let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

    assert_eq!(config.core.log_level, "debug");
    assert!(config.core.debug_info);
    assert_eq!(config.server.address(), "0.0.0.0:3000");
    assert_eq!(config.content.source, ContentSource::Http);
    assert_eq!(config.content.timeout_secs, 3);
    assert_eq!(config.quiz.rng_seed, Some(42));

    let settings = config.quiz.turn_settings();
    assert_eq!(settings.immersive_url, "https://quiz.example.com/app");
    assert_eq!(
        settings.ssml.merge(&["<speak>a</speak>", "<speak>b</speak>"]),
        "<speak>a<break time=\"500ms\"/>b</speak>"
    );
}

#[test]
fn test_load_resolves_bundle_next_to_config() {
    let dir = TempDir::new().unwrap();
    fs::copy(fixture_bundle(), dir.path().join("bundle.json")).unwrap();

    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[content]\nsource = \"static\"\nbundle_path = \"bundle.json\"\n",
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.content.bundle_path, dir.path().join("bundle.json"));

    let store = config.build_store().unwrap();
    assert_eq!(store.name(), "static");
}

#[test]
fn test_missing_bundle_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[content]\nbundle_path = \"absent.json\"\n").unwrap();

    // Loading only checks values; the bundle is read when the store opens
    let config = Config::load_from_path(&config_path).unwrap();
    assert!(matches!(config.build_store(), Err(EngineError::Io(_))));
}

#[test]
fn test_invalid_bundle_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bundle.json"), r#"{"locales": {}}"#).unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[content]\nbundle_path = \"bundle.json\"\n").unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert!(matches!(
        config.build_store(),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn test_invalid_values_are_config_errors() {
    let dir = TempDir::new().unwrap();
    let cases = [
        "[core]\nlog_level = \"verbose\"\n",
        "[server]\nport = 0\n",
        "[content]\nsource = \"http\"\nbase_url = \"ftp://content\"\n",
        "[content]\nsource = \"http\"\nbase_url = \"https://content\"\ntimeout_secs = 0\n",
        "[content]\nsource = \"sheets\"\n",
        "this is not toml",
    ];

    for (i, case) in cases.iter().enumerate() {
        let path = dir.path().join(format!("config-{}.toml", i));
        fs::write(&path, case).unwrap();
        let result = Config::load_from_path(&path);
        assert!(
            matches!(result, Err(EngineError::Config(_))),
            "case {} should be rejected: {:?}",
            i,
            result
        );
    }
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_from_path(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_empty_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 8080);
    assert!(!config.core.debug_info);
    assert_eq!(config.content.source, ContentSource::Static);
    assert!(config.content.bundle_path.is_absolute());
    assert!(config.content.bundle_path.ends_with(".persona/content.json"));
}
