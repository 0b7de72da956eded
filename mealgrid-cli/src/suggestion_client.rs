//! HTTP client for the suggestion service.
//!
//! Posts a `SuggestionRequest` as JSON and reads back a
//! `SuggestionResponse`. The editing session is blocked while the request
//! is in flight.

use mealgrid_core::{SuggestionRequest, SuggestionResponse};

use crate::config::SuggestionConfig;

pub struct SuggestionClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl SuggestionClient {
    /// Creates a client from config. Fails if no endpoint is configured.
    pub fn from_config(config: &SuggestionConfig) -> Result<Self, SuggestionClientError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or(SuggestionClientError::NotConfigured)?;
        let runtime = tokio::runtime::Runtime::new().map_err(SuggestionClientError::Runtime)?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
            runtime,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `request` and waits for the service's answer.
    pub fn request(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, SuggestionClientError> {
        self.runtime.block_on(async {
            let mut builder = self.client.post(&self.endpoint).json(request);
            if let Some(key) = &self.api_key {
                builder = builder.header("Authorization", format!("Bearer {}", key));
            }

            let response = builder
                .send()
                .await
                .map_err(|e| SuggestionClientError::HttpError(e.to_string()))?;

            if !response.status().is_success() {
                return Err(SuggestionClientError::HttpError(format!(
                    "Server returned status {}",
                    response.status()
                )));
            }

            response
                .json::<SuggestionResponse>()
                .await
                .map_err(|e| SuggestionClientError::InvalidResponse(e.to_string()))
        })
    }
}

#[derive(Debug)]
pub enum SuggestionClientError {
    NotConfigured,
    Runtime(std::io::Error),
    HttpError(String),
    InvalidResponse(String),
}

impl std::fmt::Display for SuggestionClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionClientError::NotConfigured => write!(
                f,
                "Suggestion service not configured. Set suggestion.endpoint in the config file or MEALGRID_SUGGEST_URL."
            ),
            SuggestionClientError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            SuggestionClientError::HttpError(e) => write!(f, "Suggestion request failed: {}", e),
            SuggestionClientError::InvalidResponse(e) => {
                write!(f, "Invalid suggestion response: {}", e)
            }
        }
    }
}

impl std::error::Error for SuggestionClientError {}
