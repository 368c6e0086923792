//! Provider strategies: how each API expects its request and where it puts the completion.

use super::types::{ProviderId, SummaryRequest, TEMPERATURE};
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};

/// Request construction and response parsing for one provider API.
pub trait ProviderStrategy: Send + Sync {
    /// Provider implemented by this strategy.
    fn id(&self) -> ProviderId;

    /// Build the HTTP request for `request`, including authentication.
    fn build_request(&self, http: &Client, request: &SummaryRequest) -> RequestBuilder;

    /// Locate the completion text in a successful response body.
    fn parse_completion<'a>(&self, body: &'a Value) -> Option<&'a str>;
}

/// OpenAI chat completions.
pub struct OpenAiStrategy {
    base_url: String,
    model: String,
}

impl OpenAiStrategy {
    /// Create a strategy targeting `base_url` (scheme and host only).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl ProviderStrategy for OpenAiStrategy {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn build_request(&self, http: &Client, request: &SummaryRequest) -> RequestBuilder {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": request.prompt() }
            ],
            "max_tokens": request.length.max_output_tokens(),
            "temperature": TEMPERATURE,
        });
        http.post(self.endpoint())
            .bearer_auth(&request.api_key)
            .json(&payload)
    }

    fn parse_completion<'a>(&self, body: &'a Value) -> Option<&'a str> {
        body.pointer("/choices/0/message/content")?.as_str()
    }
}

/// Google Gemini `generateContent`.
pub struct GeminiStrategy {
    base_url: String,
    model: String,
}

impl GeminiStrategy {
    /// Create a strategy targeting `base_url` (scheme and host only).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl ProviderStrategy for GeminiStrategy {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn build_request(&self, http: &Client, request: &SummaryRequest) -> RequestBuilder {
        let payload = json!({
            "contents": [
                { "parts": [ { "text": request.prompt() } ] }
            ],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": request.length.max_output_tokens(),
            }
        });
        http.post(self.endpoint())
            .query(&[("key", request.api_key.as_str())])
            .json(&payload)
    }

    fn parse_completion<'a>(&self, body: &'a Value) -> Option<&'a str> {
        body.pointer("/candidates/0/content/parts/0/text")?.as_str()
    }
}

/// Extract `error.message` from a provider error envelope.
pub(super) fn parse_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")?
        .as_str()
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::types::LengthClass;

    fn request(length: LengthClass) -> SummaryRequest {
        SummaryRequest {
            source_text: "Document body".into(),
            provider: ProviderId::OpenAi,
            length,
            api_key: "sk-test".into(),
        }
    }

    #[test]
    fn openai_request_carries_bearer_token_and_ceiling() {
        let strategy = OpenAiStrategy::new("https://api.example.com/", "gpt-test");
        let built = strategy
            .build_request(&Client::new(), &request(LengthClass::Long))
            .build()
            .expect("request");

        assert_eq!(
            built.url().as_str(),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            built.headers()["authorization"].to_str().expect("header"),
            "Bearer sk-test"
        );
        let body: Value =
            serde_json::from_slice(built.body().and_then(|b| b.as_bytes()).expect("body"))
                .expect("json");
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["max_tokens"], 600);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn gemini_request_puts_key_in_query() {
        let strategy = GeminiStrategy::new("https://gemini.example.com", "gemini-2.0-flash");
        let built = strategy
            .build_request(&Client::new(), &request(LengthClass::Short))
            .build()
            .expect("request");

        assert_eq!(
            built.url().as_str(),
            "https://gemini.example.com/v1beta/models/gemini-2.0-flash:generateContent?key=sk-test"
        );
        assert!(built.headers().get("authorization").is_none());
        let body: Value =
            serde_json::from_slice(built.body().and_then(|b| b.as_bytes()).expect("body"))
                .expect("json");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 150);
    }

    #[test]
    fn completions_are_read_from_provider_paths() {
        let openai = OpenAiStrategy::new("http://x", "m");
        let gemini = GeminiStrategy::new("http://x", "m");

        let openai_body = json!({ "choices": [ { "message": { "content": "hi" } } ] });
        let gemini_body = json!({ "candidates": [ { "content": { "parts": [ { "text": "yo" } ] } } ] });

        assert_eq!(openai.parse_completion(&openai_body), Some("hi"));
        assert_eq!(gemini.parse_completion(&gemini_body), Some("yo"));
        assert_eq!(openai.parse_completion(&json!({ "choices": [] })), None);
        assert_eq!(gemini.parse_completion(&json!({})), None);
    }

    #[test]
    fn error_envelope_message_is_extracted() {
        assert_eq!(
            parse_error_message(r#"{"error":{"message":"bad key"}}"#).as_deref(),
            Some("bad key")
        );
        assert_eq!(parse_error_message("<html>oops</html>"), None);
        assert_eq!(parse_error_message(r#"{"error":"flat"}"#), None);
        assert_eq!(parse_error_message(r#"{"error":{"message":""}}"#), None);
        assert_eq!(parse_error_message(r#"{"error":{"message":"  "}}"#), None);
    }
}
