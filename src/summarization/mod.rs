//! Abstractive summarization through hosted language-model APIs.
//!
//! Each provider is a [`providers::ProviderStrategy`] that knows how to shape the request and
//! where the completion lives in the response. [`HttpSummaryClient`] owns the HTTP client and
//! runs the single request/response exchange; there is no retry and no streaming.

pub mod providers;
pub mod types;

use crate::config::Config;
use async_trait::async_trait;
use providers::{GeminiStrategy, OpenAiStrategy, ProviderStrategy, parse_error_message};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

pub use types::{LengthClass, ProviderId, SummaryRequest, SummaryResult};

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// No document is loaded or the API key is blank.
    #[error("Please upload a document and enter your API key.")]
    MissingInput,
    /// A summarize request is already outstanding.
    #[error("A summary is already being generated.")]
    Busy,
    /// The stored provider value names no known provider.
    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),
    /// The stored length value names no known length class.
    #[error("Unsupported summary length: {0}")]
    UnsupportedLength(String),
    /// The provider answered with a non-success status.
    #[error("{0}")]
    ProviderHttpError(String),
    /// The provider answered successfully but without completion text.
    #[error("Failed to generate summary")]
    EmptyCompletion,
    /// The provider could not be reached or its response could not be read.
    #[error("Failed to reach {provider} API: {detail}")]
    Transport {
        /// Provider display name.
        provider: &'static str,
        /// Transport diagnostic.
        detail: String,
    },
}

/// Interface implemented by summary backends.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    /// Produce a summary for `request` with the provider it names.
    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResult, SummarizeError>;
}

/// Summary client that talks to the provider APIs over HTTP.
pub struct HttpSummaryClient {
    http: Client,
    openai: OpenAiStrategy,
    gemini: GeminiStrategy,
}

impl HttpSummaryClient {
    /// Build a client using the endpoints and models from `config`.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("docsum/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, config))
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http(http: Client, config: &Config) -> Self {
        Self {
            http,
            openai: OpenAiStrategy::new(&config.openai_base_url, &config.openai_model),
            gemini: GeminiStrategy::new(&config.gemini_base_url, &config.gemini_model),
        }
    }

    fn strategy(&self, provider: ProviderId) -> &dyn ProviderStrategy {
        match provider {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Gemini => &self.gemini,
        }
    }
}

#[async_trait]
impl SummaryClient for HttpSummaryClient {
    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResult, SummarizeError> {
        let strategy = self.strategy(request.provider);
        let provider = strategy.id().display_name();
        tracing::info!(
            provider,
            length = %request.length,
            max_tokens = request.length.max_output_tokens(),
            source_chars = request.source_text.chars().count(),
            "Requesting summary"
        );

        let response = strategy
            .build_request(&self.http, &request)
            .send()
            .await
            .map_err(|error| SummarizeError::Transport {
                provider,
                detail: error.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body)
                .unwrap_or_else(|| format!("{provider} API error: {}", status.as_u16()));
            tracing::warn!(provider, status = status.as_u16(), %message, "Provider rejected request");
            return Err(SummarizeError::ProviderHttpError(message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|error| SummarizeError::Transport {
                provider,
                detail: format!("failed to decode response: {}", error.without_url()),
            })?;

        let text = strategy
            .parse_completion(&body)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(SummarizeError::EmptyCompletion)?;

        tracing::info!(provider, summary_chars = text.chars().count(), "Summary received");
        Ok(SummaryResult {
            text: text.to_string(),
        })
    }
}
