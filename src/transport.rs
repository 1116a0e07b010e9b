use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::TransportError;
use crate::models::{ApiErrorPayload, GenerateContentRequest, GenerateContentResponse};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransportError>;
}

pub struct GeminiTransport {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, TransportError> {
        Self::with_base_url(api_key, GEMINI_API_URL.to_string(), timeout)
    }

    pub fn with_base_url(
        api_key: Option<String>,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    /// One attempt, no retry.
    async fn generate(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransportError> {
        let api_key = self.api_key.as_deref().ok_or(TransportError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiErrorPayload>(&body) {
                Ok(payload) => TransportError::Api {
                    status: status.as_u16(),
                    code: payload.error.status,
                    message: payload.error.message,
                },
                Err(_) => TransportError::Api {
                    status: status.as_u16(),
                    code: status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
                    message: body,
                },
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
