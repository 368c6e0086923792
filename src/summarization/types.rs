//! Request and result types shared by the summarization providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f64 = 0.3;

/// Language-model APIs that can produce summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// OpenAI chat completions.
    OpenAi,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl ProviderId {
    /// Identifier used in preferences and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Human-readable provider name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            _ => Err(()),
        }
    }
}

/// Requested verbosity of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthClass {
    /// Two or three sentences.
    Short,
    /// One paragraph.
    Medium,
    /// Several detailed paragraphs.
    Long,
}

impl LengthClass {
    /// Identifier used in preferences and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Phrase spliced into the prompt after "the following document".
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Short => "in 2-3 sentences",
            Self::Medium => "in one paragraph (4-6 sentences)",
            Self::Long => "in 2-3 detailed paragraphs",
        }
    }

    /// Output-token ceiling requested from the provider.
    pub fn max_output_tokens(self) -> u32 {
        match self {
            Self::Short => 150,
            Self::Medium => 300,
            Self::Long => 600,
        }
    }
}

impl fmt::Display for LengthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(()),
        }
    }
}

/// One summarization call. Never persisted.
#[derive(Clone)]
pub struct SummaryRequest {
    /// Text extracted from the document.
    pub source_text: String,
    /// Provider that should produce the summary.
    pub provider: ProviderId,
    /// Requested verbosity.
    pub length: LengthClass,
    /// Credential for the provider, already trimmed.
    pub api_key: String,
}

impl SummaryRequest {
    /// Full prompt sent to the provider.
    pub fn prompt(&self) -> String {
        format!(
            "Please summarize the following document {}. Focus on the main points, key findings, and important conclusions:\n\n{}",
            self.length.instruction(),
            self.source_text
        )
    }
}

impl fmt::Debug for SummaryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryRequest")
            .field("source_chars", &self.source_text.chars().count())
            .field("provider", &self.provider)
            .field("length", &self.length)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Summary text returned by a provider, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    /// Summary body.
    pub text: String,
}
