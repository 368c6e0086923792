//! HTTP surface for the summarizer.
//!
//! The router exposes one session shared by every client:
//!
//! - `GET /session` – Loaded document, last summary, status line, and whether summarize is
//!   currently available.
//! - `PUT /document?name=<file>` – Upload a PDF or DOCX as the raw request body; the
//!   `Content-Type` header carries the MIME type.
//! - `DELETE /document` – Drop the document, summary, and status.
//! - `POST /summarize` – Summarize the loaded document with the stored preferences.
//! - `GET /summary/download` – Last summary as a `text/plain` attachment.
//! - `GET /preferences`, `PUT /preferences` – Read or partially update provider, API key, and
//!   length. The key is never echoed back.
//! - `GET /metrics` – Pipeline counters.
//! - `GET /commands` – Machine-readable command catalog.

use crate::ingestion::{FileSelection, IngestError, MAX_DOCUMENT_BYTES, SourceFile};
use crate::metrics::MetricsSnapshot;
use crate::preferences::PreferencesView;
use crate::session::{
    DocumentInfo, PreferenceUpdate, PreferenceUpdateError, SessionController, SessionSnapshot,
};
use crate::summarization::SummarizeError;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router around a shared session controller.
pub fn create_router(controller: Arc<SessionController>) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/document", put(upload_document).delete(remove_document))
        .route("/summarize", post(summarize))
        .route("/summary/download", get(download_summary))
        .route("/preferences", get(get_preferences).put(update_preferences))
        .route("/metrics", get(get_metrics))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES as usize + 1))
        .with_state(controller)
}

async fn get_session(State(controller): State<Arc<SessionController>>) -> Json<SessionSnapshot> {
    Json(controller.snapshot().await)
}

/// Query parameters for `PUT /document`.
#[derive(Deserialize)]
struct UploadQuery {
    /// Original file name (defaults to `"document"`).
    #[serde(default)]
    name: Option<String>,
}

/// Ingest an uploaded document, replacing the current one on success.
///
/// Bodies over the router's limit never reach the extractor; they are reported to the session
/// as `TooLarge` like any other oversized selection.
async fn upload_document(
    State(controller): State<Arc<SessionController>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DocumentInfo>, AppError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let name = query
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "document".to_string());
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let size_bytes = headers
                .get(header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(0)
                .max(MAX_DOCUMENT_BYTES + 1);
            tracing::info!(%name, %mime_type, size_bytes, "Upload exceeds body limit");
            let error = controller
                .reject_oversized(FileSelection {
                    name,
                    mime_type,
                    size_bytes,
                })
                .await;
            return Err(error.into());
        }
        Err(rejection) => return Err(AppError::Body(rejection.body_text())),
    };
    tracing::info!(%name, %mime_type, size_bytes = body.len(), "Upload received");

    let info = controller
        .select_file(SourceFile {
            name,
            mime_type,
            bytes: body.to_vec(),
        })
        .await?;
    Ok(Json(info))
}

async fn remove_document(State(controller): State<Arc<SessionController>>) -> StatusCode {
    controller.remove_file().await;
    StatusCode::NO_CONTENT
}

/// Response body for `POST /summarize`.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

async fn summarize(
    State(controller): State<Arc<SessionController>>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let summary = controller.summarize().await?;
    Ok(Json(SummarizeResponse { summary }))
}

async fn download_summary(
    State(controller): State<Arc<SessionController>>,
) -> Result<Response, AppError> {
    let download = controller.download().await.ok_or(AppError::NoSummary)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_file_name(&download.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.contents,
    )
        .into_response())
}

/// Replace characters that cannot appear inside a quoted `Content-Disposition` file name.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect()
}

async fn get_preferences(
    State(controller): State<Arc<SessionController>>,
) -> Json<PreferencesView> {
    Json(controller.preferences().await)
}

async fn update_preferences(
    State(controller): State<Arc<SessionController>>,
    Json(update): Json<PreferenceUpdate>,
) -> Result<Json<PreferencesView>, AppError> {
    Ok(Json(controller.update_preferences(update).await?))
}

async fn get_metrics(State(controller): State<Arc<SessionController>>) -> Json<MetricsSnapshot> {
    Json(controller.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery by front ends and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "session",
                method: "GET",
                path: "/session",
                description: "Return the loaded document, last summary, status message, and whether summarize is available.",
                request_example: None,
            },
            CommandDescriptor {
                name: "upload_document",
                method: "PUT",
                path: "/document?name=<file name>",
                description: "Upload a PDF or DOCX (max 10MB) as the raw body with its Content-Type. Replaces the current document.",
                request_example: None,
            },
            CommandDescriptor {
                name: "remove_document",
                method: "DELETE",
                path: "/document",
                description: "Remove the current document and its summary.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize the loaded document with the stored provider, key, and length. Response returns { \"summary\": string }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "download_summary",
                method: "GET",
                path: "/summary/download",
                description: "Download the last summary as <document>_summary.txt.",
                request_example: None,
            },
            CommandDescriptor {
                name: "update_preferences",
                method: "PUT",
                path: "/preferences",
                description: "Update any of provider (openai|gemini), api_key, and length (short|medium|long).",
                request_example: Some(json!({
                    "provider": "gemini",
                    "api_key": "your-api-key",
                    "length": "short"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return ingestion and summarization counters.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Ingest(IngestError),
    Summarize(SummarizeError),
    Preferences(PreferenceUpdateError),
    Body(String),
    NoSummary,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Ingest(error) => match error {
                IngestError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                IngestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                IngestError::ExtractionFailed { .. } | IngestError::EmptyContent { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                IngestError::Unreadable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Summarize(error) => match error {
                SummarizeError::MissingInput
                | SummarizeError::UnsupportedProvider(_)
                | SummarizeError::UnsupportedLength(_) => StatusCode::BAD_REQUEST,
                SummarizeError::Busy => StatusCode::CONFLICT,
                SummarizeError::ProviderHttpError(_)
                | SummarizeError::EmptyCompletion
                | SummarizeError::Transport { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Preferences(error) => match error {
                PreferenceUpdateError::UnsupportedProvider(_)
                | PreferenceUpdateError::UnsupportedLength(_) => StatusCode::BAD_REQUEST,
                PreferenceUpdateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::NoSummary => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Ingest(error) => error.to_string(),
            Self::Summarize(error) => error.to_string(),
            Self::Preferences(error) => error.to_string(),
            Self::Body(message) => message.clone(),
            Self::NoSummary => "No summary has been generated yet.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self::Ingest(inner)
    }
}

impl From<SummarizeError> for AppError {
    fn from(inner: SummarizeError) -> Self {
        Self::Summarize(inner)
    }
}

impl From<PreferenceUpdateError> for AppError {
    fn from(inner: PreferenceUpdateError) -> Self {
        Self::Preferences(inner)
    }
}
