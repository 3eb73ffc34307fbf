//! Google Cloud Translation (v2 REST) implementation of the translation client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::base::{config::Config, types::Res};

use super::{GenericTranslateClient, TranslateClient};

// Extra methods on `TranslateClient` applied by the google implementation.

impl TranslateClient {
    pub fn google(config: &Config) -> Res<Self> {
        let client = GoogleTranslateClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateResponseData,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
    detected_source_language: Option<String>,
}

// Specific implementations.

/// Google Cloud Translation client implementation.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTranslateClient {
    /// Create a new Google translation client.
    #[instrument(name = "GoogleTranslateClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().user_agent(concat!("poll-translate-bot/", env!("CARGO_PKG_VERSION"))).build()?;

        Ok(Self {
            http,
            endpoint: config.translate_endpoint.clone(),
            api_key: config.translate_api_key.clone(),
        })
    }
}

#[async_trait]
impl GenericTranslateClient for GoogleTranslateClient {
    #[instrument(skip(self, text))]
    async fn translate(&self, text: &str, target_language: &str) -> Res<String> {
        let request = TranslateRequest {
            q: text,
            target: target_language,
            format: "text",
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to call translation service: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Translation service returned {}: {}", status, body));
        }

        let response: TranslateResponse = response.json().await?;
        let translation = response
            .data
            .translations
            .into_iter()
            .next()
            .ok_or(anyhow::anyhow!("Translation service returned no translations"))?;

        debug!("Translated from {:?} to {}", translation.detected_source_language, target_language);

        Ok(translation.translated_text)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::base::config::ConfigInner;

    fn client_for(server: &MockServer) -> GoogleTranslateClient {
        let config = Config::from(ConfigInner {
            translate_api_key: "test-key".to_string(),
            translate_endpoint: server.url("/language/translate/v2"),
            ..Default::default()
        });

        GoogleTranslateClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn translates_text_into_the_target_language() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(POST)
                .path("/language/translate/v2")
                .query_param("key", "test-key")
                .json_body(json!({ "q": "Hello world", "target": "es", "format": "text" }));
            then.status(200).json_body(json!({
                "data": {
                    "translations": [
                        { "translatedText": "Hola mundo", "detectedSourceLanguage": "en" }
                    ]
                }
            }));
        })
        .await;

        let translated = client_for(&server).translate("Hello world", "es").await.unwrap();

        mock.assert_async().await;
        assert_eq!(translated, "Hola mundo");
    }

    #[tokio::test]
    async fn surfaces_service_errors() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/language/translate/v2");
            then.status(403).json_body(json!({ "error": { "code": 403, "message": "API key not valid." } }));
        })
        .await;

        let err = client_for(&server).translate("Hello world", "ja").await.unwrap_err();

        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn rejects_an_empty_translation_list() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/language/translate/v2");
            then.status(200).json_body(json!({ "data": { "translations": [] } }));
        })
        .await;

        let result = client_for(&server).translate("Hello world", "fr").await;

        assert!(result.is_err());
    }
}
