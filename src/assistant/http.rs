//! HTTP-backed assistant client.
//!
//! Posts JSON to `<endpoint>/summarize` and `<endpoint>/refine` and expects
//! `{"text": "..."}` back. Error bodies of the shape
//! `{"error": {"message": "..."}}` are unwrapped; anything else is reported
//! raw.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AssistantError, NotesAssistant};

/// Global HTTP client for reuse across requests (avoids TLS handshake
/// overhead).
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn get_http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client")
    })
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    transcript: &'a str,
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct RefineRequest<'a> {
    previous: &'a str,
    feedback: &'a str,
}

#[derive(Debug, Deserialize)]
struct AssistantResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Assistant backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    endpoint: String,
}

impl HttpAssistant {
    /// `endpoint` is the base URL, e.g. `http://localhost:8000/assistant`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), path);

        let response = get_http_client()
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AssistantError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let reply: AssistantResponse = response
                .json()
                .await
                .map_err(|e| AssistantError::ParseError(e.to_string()))?;

            log::info!("Assistant {} returned {} chars", path, reply.text.len());
            Ok(reply.text)
        } else {
            let error_text = response.text().await.unwrap_or_default();

            let message =
                if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            log::error!("Assistant error ({}): {}", status.as_u16(), message);

            Err(AssistantError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl NotesAssistant for HttpAssistant {
    async fn summarize(&self, transcript: &str, notes: &str) -> Result<String, AssistantError> {
        self.post_json("summarize", &SummarizeRequest { transcript, notes })
            .await
    }

    async fn refine(&self, previous: &str, feedback: &str) -> Result<String, AssistantError> {
        self.post_json("refine", &RefineRequest { previous, feedback })
            .await
    }
}
