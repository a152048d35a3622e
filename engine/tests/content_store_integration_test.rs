//! Integration tests for the HTTP content store
//!
//! Uses mock servers in place of the content document service.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use persona_engine::content::{ContentClient, HttpContentStore, PromptName};
use sdk::errors::EngineError;
use sdk::ContentStore;

fn store_for(server: &MockServer) -> HttpContentStore {
    HttpContentStore::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_collections_are_read_per_locale() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "trait": "Social",
                "questionText": "Do you enjoy parties?",
                "positiveAnswers": ["Yes"],
                "negativeAnswers": ["No"]
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/outcomes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"text": "You are a dolphin.", "positiveTraits": "social"}
        ])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert_eq!(store.name(), "http");

    let questions = store.questions("en").await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].trait_name, "Social");
    assert_eq!(questions[0].positive_answers, vec!["Yes"]);

    let outcomes = store.outcomes("en").await.unwrap();
    assert_eq!(outcomes[0].positive_traits.as_deref(), Some("social"));
}

#[tokio::test]
async fn test_missing_documents_are_empty() {
    // Nothing mounted: every path is a 404
    let server = MockServer::start().await;
    let store = store_for(&server);

    assert!(store.intros("fr").await.unwrap().is_empty());
    assert!(store.settings("fr").await.unwrap().is_empty());
    assert_eq!(store.prompt("fr", "generic_yes").await.unwrap(), None);
}

#[tokio::test]
async fn test_server_error_is_a_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/outcomes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = store_for(&server).outcomes("en").await;
    match result {
        Err(EngineError::ContentFetch { collection, reason }) => {
            assert_eq!(collection, "outcomes");
            assert!(reason.contains("500"));
        }
        other => panic!("Expected ContentFetch, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_body_is_a_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/intros"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = store_for(&server).intros("en").await;
    assert!(matches!(result, Err(EngineError::ContentFetch { .. })));
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    // Bind and drop a listener so the port is known to be closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpContentStore::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let result = store.questions("en").await;
    assert!(matches!(result, Err(EngineError::Network(_))));
}

#[tokio::test]
async fn test_client_gathers_prompt_variants() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/prompts/transitions_regular_variant_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Next one."})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/prompts/transitions_regular_variant_3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "Moving on.",
            "speech": "<speak>Moving <emphasis>on</emphasis>.</speak>"
        })))
        .mount(&server)
        .await;

    // A variant with no displayed text is not usable
    Mock::given(method("GET"))
        .and(path("/en/prompts/transitions_regular_variant_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": ""})))
        .mount(&server)
        .await;

    let client = ContentClient::new(Arc::new(store_for(&server)), "en");
    let candidates = client
        .prompt_candidates(PromptName::TransitionsRegular)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].text, "Next one.");
    assert_eq!(candidates[0].speech, "<speak>Next one.</speak>");
    assert_eq!(
        candidates[1].speech,
        "<speak>Moving <emphasis>on</emphasis>.</speak>"
    );
}

#[tokio::test]
async fn test_client_unwraps_sheet_settings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questionsPerQuiz": [{"value": 4}],
            "introTitle": {"value": "Which animal are you?"},
            "font": "Roboto",
            "unset": {"value": null}
        })))
        .mount(&server)
        .await;

    let client = ContentClient::new(Arc::new(store_for(&server)), "en");
    let settings = client.get_quiz_settings().await.unwrap();

    assert_eq!(settings["questionsPerQuiz"], 4);
    assert_eq!(settings["introTitle"], "Which animal are you?");
    assert_eq!(settings["font"], "Roboto");
    assert!(!settings.contains_key("unset"));
}
