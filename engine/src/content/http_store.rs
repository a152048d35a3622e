//! Remote content store
//!
//! Reads content documents from a JSON document service laid out as:
//!
//! ```text
//! GET {base}/{locale}/intros        -> [QuizIntro]
//! GET {base}/{locale}/questions     -> [Question]
//! GET {base}/{locale}/outcomes      -> [Outcome]
//! GET {base}/{locale}/settings      -> {key: value}
//! GET {base}/{locale}/prompts/{key} -> Prompt, or 404
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sdk::errors::EngineError;
use sdk::types::{Outcome, Prompt, Question, QuizIntro};
use sdk::{ContentStore, RawSettings};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Content store over HTTP
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: Client,
}

impl HttpContentStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Network(format!("cannot create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// GET a JSON document; `Ok(None)` on 404
    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        path: &str,
    ) -> Result<Option<T>, EngineError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Fetching content from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                EngineError::Network(e.to_string())
            } else {
                EngineError::content_fetch(collection, e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EngineError::content_fetch(
                collection,
                format!("status {}", status),
            ));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| EngineError::content_fetch(collection, e))
    }

    async fn collection<T: DeserializeOwned>(
        &self,
        locale: &str,
        collection: &str,
    ) -> Result<Vec<T>, EngineError> {
        Ok(self
            .fetch(collection, &format!("{}/{}", locale, collection))
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn intros(&self, locale: &str) -> Result<Vec<QuizIntro>, EngineError> {
        self.collection(locale, "intros").await
    }

    async fn questions(&self, locale: &str) -> Result<Vec<Question>, EngineError> {
        self.collection(locale, "questions").await
    }

    async fn outcomes(&self, locale: &str) -> Result<Vec<Outcome>, EngineError> {
        self.collection(locale, "outcomes").await
    }

    async fn settings(&self, locale: &str) -> Result<RawSettings, EngineError> {
        Ok(self
            .fetch("settings", &format!("{}/settings", locale))
            .await?
            .unwrap_or_default())
    }

    async fn prompt(&self, locale: &str, key: &str) -> Result<Option<Prompt>, EngineError> {
        self.fetch("prompts", &format!("{}/prompts/{}", locale, key))
            .await
    }
}
