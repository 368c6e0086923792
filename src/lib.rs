#![deny(missing_docs)]

//! Core library for the DocSummarize document summarizer.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// File validation and PDF/DOCX text extraction.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline counters.
pub mod metrics;
/// Persisted user preferences.
pub mod preferences;
/// Session state and its controller.
pub mod session;
/// Provider clients for OpenAI and Gemini.
pub mod summarization;
