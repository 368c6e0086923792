//! Session state and the controller that owns it.
//!
//! A session holds at most one document, the last summary, and the current status line. The
//! [`SessionController`] is the only owner of that state and of the user preferences; every
//! surface (HTTP or CLI) goes through it. Locks are never held across a provider request, so a
//! slow provider does not block status reads. The in-flight flag keeps a second summarize from
//! starting while one is outstanding; it is owned by a guard, so a summarize future that is
//! dropped mid-request (client disconnect, caller timeout) still re-enables the trigger.

use crate::{
    ingestion::{
        self, Document, DocumentKind, FileSelection, IngestError, SourceFile, format_file_size,
    },
    metrics::{MetricsSnapshot, PipelineMetrics},
    preferences::{PreferenceError, PreferenceStore, Preferences, PreferencesView},
    summarization::{LengthClass, ProviderId, SummarizeError, SummaryClient, SummaryRequest},
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Download name used when no document is loaded.
pub const DEFAULT_SUMMARY_FILE_NAME: &str = "document_summary.txt";

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Work in progress.
    Info,
    /// Operation completed.
    Success,
    /// Operation failed; the user must act.
    Error,
}

/// The single user-visible status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    /// Message text.
    pub text: String,
    /// Message severity.
    pub kind: StatusKind,
}

impl StatusMessage {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Default)]
struct Session {
    document: Option<Document>,
    summary: Option<String>,
    status: Option<StatusMessage>,
}

impl Session {
    fn clear(&mut self) {
        self.document = None;
        self.summary = None;
        self.status = None;
    }
}

/// Document metadata reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Human-readable size.
    pub size_label: String,
    /// Detected format.
    pub kind: DocumentKind,
    /// Number of extracted characters.
    pub extracted_chars: usize,
}

impl From<&Document> for DocumentInfo {
    fn from(document: &Document) -> Self {
        Self {
            name: document.name.clone(),
            size_bytes: document.size_bytes,
            size_label: format_file_size(document.size_bytes),
            kind: document.kind,
            extracted_chars: document.extracted_text.chars().count(),
        }
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Loaded document, if any.
    pub document: Option<DocumentInfo>,
    /// Last summary, if any.
    pub summary: Option<String>,
    /// Current status line, if any.
    pub status: Option<StatusMessage>,
    /// Whether the summarize action is currently available.
    pub can_summarize: bool,
    /// Whether a summarize request is outstanding.
    pub in_flight: bool,
}

/// Partial preference update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PreferenceUpdate {
    /// New provider identifier.
    #[serde(default)]
    pub provider: Option<String>,
    /// New API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// New length identifier.
    #[serde(default)]
    pub length: Option<String>,
}

/// One-run overrides layered on top of stored preferences.
#[derive(Debug, Clone, Default)]
pub struct SummaryOverrides {
    /// Provider to use instead of the stored one.
    pub provider: Option<ProviderId>,
    /// Length to use instead of the stored one.
    pub length: Option<LengthClass>,
    /// API key to use instead of the stored one.
    pub api_key: Option<String>,
}

/// Errors raised while updating preferences.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceUpdateError {
    /// The provider value is not recognized.
    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),
    /// The length value is not recognized.
    #[error("Unsupported summary length: {0}")]
    UnsupportedLength(String),
    /// The store rejected the write.
    #[error(transparent)]
    Storage(#[from] PreferenceError),
}

/// A finished summary ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryDownload {
    /// Suggested file name.
    pub file_name: String,
    /// File contents.
    pub contents: String,
}

/// Owns the session, the preferences, and the collaborators that act on them.
pub struct SessionController {
    session: Mutex<Session>,
    preferences: Mutex<Preferences>,
    store: Box<dyn PreferenceStore>,
    summarizer: Arc<dyn SummaryClient>,
    metrics: PipelineMetrics,
    in_flight: AtomicBool,
}

const GENERATING_STATUS: &str = "Generating summary with AI...";

/// Marks a summarize request as outstanding until dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    session: &'a Mutex<Session>,
    finished: bool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, session: &'a Mutex<Session>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag,
                session,
                finished: false,
            })
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Summarize request dropped before completion");
            // The lock is free whenever the request future is suspended on the provider call.
            if let Ok(mut session) = self.session.try_lock() {
                let generating = session
                    .status
                    .as_ref()
                    .is_some_and(|status| status.text == GENERATING_STATUS);
                if generating {
                    session.status = None;
                }
            }
        }
        self.flag.store(false, Ordering::Release);
    }
}

impl SessionController {
    /// Build a controller, loading preferences from `store` once.
    pub fn new(
        store: Box<dyn PreferenceStore>,
        summarizer: Arc<dyn SummaryClient>,
    ) -> Result<Self, PreferenceError> {
        let preferences = Preferences::load(store.as_ref())?;
        Ok(Self {
            session: Mutex::new(Session::default()),
            preferences: Mutex::new(preferences),
            store,
            summarizer,
            metrics: PipelineMetrics::new(),
            in_flight: AtomicBool::new(false),
        })
    }

    /// Validate and extract an in-memory file, replacing the current document on success.
    ///
    /// Type and size failures leave the session untouched; extraction failures clear it.
    pub async fn select_file(&self, file: SourceFile) -> Result<DocumentInfo, IngestError> {
        let selection = file.selection();
        if let Err(error) = ingestion::validate(&selection) {
            return Err(self.reject_selection(error).await);
        }
        self.set_status(StatusKind::Info, "Extracting text from document...")
            .await;
        let result = ingestion::ingest(file);
        self.finish_selection(result).await
    }

    /// Validate, read, and extract a file on disk, replacing the current document on success.
    pub async fn select_path(&self, path: &Path) -> Result<DocumentInfo, IngestError> {
        self.set_status(StatusKind::Info, "Extracting text from document...")
            .await;
        match ingestion::ingest_path(path).await {
            Err(error) if error.is_validation() => Err(self.reject_selection(error).await),
            result => self.finish_selection(result).await,
        }
    }

    /// Record a selection whose contents were refused before they could be read.
    ///
    /// The selection still goes through type and size validation so the reported error matches
    /// what [`select_file`](Self::select_file) would have produced.
    pub async fn reject_oversized(&self, selection: FileSelection) -> IngestError {
        let error = match ingestion::validate(&selection) {
            Err(error) => error,
            Ok(_) => IngestError::TooLarge {
                size_bytes: selection.size_bytes,
            },
        };
        self.reject_selection(error).await
    }

    async fn reject_selection(&self, error: IngestError) -> IngestError {
        tracing::warn!(error = ?error, "Rejected file selection");
        self.metrics.record_ingest_failure();
        self.set_status(StatusKind::Error, error.to_string()).await;
        error
    }

    async fn finish_selection(
        &self,
        result: Result<Document, IngestError>,
    ) -> Result<DocumentInfo, IngestError> {
        let mut session = self.session.lock().await;
        match result {
            Ok(document) => {
                let info = DocumentInfo::from(&document);
                session.document = Some(document);
                session.summary = None;
                session.status = Some(StatusMessage::new(
                    StatusKind::Success,
                    "Document loaded successfully!",
                ));
                self.metrics.record_ingest();
                tracing::info!(name = %info.name, kind = ?info.kind, chars = info.extracted_chars, "Document loaded");
                Ok(info)
            }
            Err(error) => {
                tracing::warn!(error = ?error, "Document extraction failed");
                self.metrics.record_ingest_failure();
                session.clear();
                session.status = Some(StatusMessage::new(StatusKind::Error, error.to_string()));
                Err(error)
            }
        }
    }

    /// Drop the current document, summary, and status.
    pub async fn remove_file(&self) {
        self.session.lock().await.clear();
        tracing::info!("Session cleared");
    }

    /// Summarize the loaded document with the stored preferences.
    pub async fn summarize(&self) -> Result<String, SummarizeError> {
        self.summarize_with(SummaryOverrides::default()).await
    }

    /// Summarize the loaded document, applying one-run overrides to the stored preferences.
    pub async fn summarize_with(&self, overrides: SummaryOverrides) -> Result<String, SummarizeError> {
        let (guard, request) = {
            let preferences = self.preferences.lock().await;
            let mut session = self.session.lock().await;
            let Some(guard) = InFlightGuard::acquire(&self.in_flight, &self.session) else {
                return Err(SummarizeError::Busy);
            };
            match build_request(&session, &preferences, overrides) {
                Ok(request) => {
                    session.status =
                        Some(StatusMessage::new(StatusKind::Info, GENERATING_STATUS));
                    (guard, request)
                }
                Err(error) => {
                    session.status =
                        Some(StatusMessage::new(StatusKind::Error, status_text(&error)));
                    self.metrics.record_summary_failure();
                    guard.finish();
                    return Err(error);
                }
            }
        };

        let result = self.summarizer.summarize(request).await;

        let mut session = self.session.lock().await;
        guard.finish();
        match result {
            Ok(summary) => {
                session.summary = Some(summary.text.clone());
                session.status = Some(StatusMessage::new(
                    StatusKind::Success,
                    "Summary generated successfully!",
                ));
                self.metrics.record_summary();
                Ok(summary.text)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Summarization failed");
                session.status = Some(StatusMessage::new(StatusKind::Error, status_text(&error)));
                self.metrics.record_summary_failure();
                Err(error)
            }
        }
    }

    /// Current summary packaged as a download, if one exists.
    pub async fn download(&self) -> Option<SummaryDownload> {
        let mut session = self.session.lock().await;
        let contents = session.summary.clone()?;
        let file_name = summary_file_name(session.document.as_ref().map(|doc| doc.name.as_str()));
        session.status = Some(StatusMessage::new(
            StatusKind::Success,
            "Summary downloaded successfully!",
        ));
        Some(SummaryDownload {
            file_name,
            contents,
        })
    }

    /// Apply a partial preference update and persist all fields.
    pub async fn update_preferences(
        &self,
        update: PreferenceUpdate,
    ) -> Result<PreferencesView, PreferenceUpdateError> {
        if let Some(provider) = &update.provider {
            provider
                .parse::<ProviderId>()
                .map_err(|()| PreferenceUpdateError::UnsupportedProvider(provider.clone()))?;
        }
        if let Some(length) = &update.length {
            length
                .parse::<LengthClass>()
                .map_err(|()| PreferenceUpdateError::UnsupportedLength(length.clone()))?;
        }

        let mut preferences = self.preferences.lock().await;
        let mut next = preferences.clone();
        if let Some(provider) = update.provider {
            next.provider = provider.trim().to_lowercase();
        }
        if let Some(api_key) = update.api_key {
            next.api_key = api_key;
        }
        if let Some(length) = update.length {
            next.length = length.trim().to_lowercase();
        }
        next.save(self.store.as_ref())?;
        *preferences = next;
        tracing::info!(preferences = ?*preferences, "Preferences updated");
        Ok(preferences.view())
    }

    /// Redacted view of the stored preferences.
    pub async fn preferences(&self) -> PreferencesView {
        self.preferences.lock().await.view()
    }

    /// Snapshot of the session for presentation.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let has_key = self.preferences.lock().await.has_api_key();
        let session = self.session.lock().await;
        let in_flight = self.in_flight.load(Ordering::Acquire);
        SessionSnapshot {
            document: session.document.as_ref().map(DocumentInfo::from),
            summary: session.summary.clone(),
            status: session.status.clone(),
            can_summarize: session.document.is_some() && has_key && !in_flight,
            in_flight,
        }
    }

    /// Whether the summarize action is currently available.
    pub async fn can_summarize(&self) -> bool {
        self.snapshot().await.can_summarize
    }

    /// Pipeline counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn set_status(&self, kind: StatusKind, text: impl Into<String>) {
        self.session.lock().await.status = Some(StatusMessage::new(kind, text));
    }
}

fn build_request(
    session: &Session,
    preferences: &Preferences,
    overrides: SummaryOverrides,
) -> Result<SummaryRequest, SummarizeError> {
    let api_key = overrides
        .api_key
        .unwrap_or_else(|| preferences.api_key.clone())
        .trim()
        .to_string();
    let document = session.document.as_ref().ok_or(SummarizeError::MissingInput)?;
    if api_key.is_empty() {
        return Err(SummarizeError::MissingInput);
    }
    let provider = match overrides.provider {
        Some(provider) => provider,
        None => preferences.provider_id()?,
    };
    let length = match overrides.length {
        Some(length) => length,
        None => preferences.length_class()?,
    };

    Ok(SummaryRequest {
        source_text: document.extracted_text.clone(),
        provider,
        length,
        api_key,
    })
}

fn status_text(error: &SummarizeError) -> String {
    match error {
        SummarizeError::MissingInput => error.to_string(),
        other => format!("Error: {other}"),
    }
}

/// Download file name for a summary of `document_name`.
///
/// The base name is everything before the first `.`.
pub fn summary_file_name(document_name: Option<&str>) -> String {
    match document_name {
        Some(name) => {
            let base = name.split('.').next().unwrap_or_default();
            format!("{base}_summary.txt")
        }
        None => DEFAULT_SUMMARY_FILE_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::fixtures::docx_with_paragraphs;
    use crate::ingestion::{DOCX_MIME, PDF_MIME};
    use crate::preferences::MemoryStore;
    use crate::summarization::SummaryResult;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    const BODY: &str = "The committee reviewed the annual budget and approved funding for three new parks.";

    #[derive(Default)]
    struct RecordingClient {
        requests: StdMutex<Vec<SummaryRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl SummaryClient for RecordingClient {
        async fn summarize(
            &self,
            request: SummaryRequest,
        ) -> Result<SummaryResult, SummarizeError> {
            self.requests.lock().expect("lock").push(request);
            if self.fail {
                Err(SummarizeError::ProviderHttpError("bad key".into()))
            } else {
                Ok(SummaryResult {
                    text: "Parks were funded.".into(),
                })
            }
        }
    }

    fn controller(client: Arc<RecordingClient>) -> SessionController {
        SessionController::new(Box::new(MemoryStore::new()), client).expect("controller")
    }

    fn docx(name: &str) -> SourceFile {
        SourceFile {
            name: name.into(),
            mime_type: DOCX_MIME.into(),
            bytes: docx_with_paragraphs(&[BODY]),
        }
    }

    async fn set_key(controller: &SessionController, key: &str) {
        controller
            .update_preferences(PreferenceUpdate {
                api_key: Some(key.into()),
                ..PreferenceUpdate::default()
            })
            .await
            .expect("update");
    }

    #[tokio::test]
    async fn summarize_requires_document_and_key() {
        let client = Arc::new(RecordingClient::default());
        let controller = controller(client.clone());
        assert!(!controller.can_summarize().await);

        controller.select_file(docx("minutes.docx")).await.expect("select");
        assert!(!controller.can_summarize().await);
        set_key(&controller, "   ").await;
        assert!(!controller.can_summarize().await);

        let error = controller.summarize().await.expect_err("missing key");
        assert!(matches!(error, SummarizeError::MissingInput));
        assert_eq!(
            controller.snapshot().await.status.expect("status").text,
            "Please upload a document and enter your API key."
        );

        set_key(&controller, " sk-1 ").await;
        assert!(controller.can_summarize().await);
        let summary = controller.summarize().await.expect("summary");
        assert_eq!(summary, "Parks were funded.");

        let requests = client.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].api_key, "sk-1");
        assert_eq!(requests[0].provider, ProviderId::OpenAi);
        assert_eq!(requests[0].length, LengthClass::Medium);
        assert_eq!(requests[0].source_text, BODY);
    }

    #[tokio::test]
    async fn unsupported_type_keeps_previous_document() {
        let controller = controller(Arc::new(RecordingClient::default()));
        controller.select_file(docx("first.docx")).await.expect("select");

        let error = controller
            .select_file(SourceFile {
                name: "notes.txt".into(),
                mime_type: "text/plain".into(),
                bytes: BODY.as_bytes().to_vec(),
            })
            .await
            .expect_err("unsupported");
        assert!(matches!(error, IngestError::UnsupportedType { .. }));

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.document.expect("document kept").name, "first.docx");
        let status = snapshot.status.expect("status");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Please select a PDF or DOCX file.");
    }

    #[tokio::test]
    async fn extraction_failure_clears_session() {
        let controller = controller(Arc::new(RecordingClient::default()));
        controller.select_file(docx("first.docx")).await.expect("select");

        let error = controller
            .select_file(SourceFile {
                name: "broken.pdf".into(),
                mime_type: PDF_MIME.into(),
                bytes: b"garbage".to_vec(),
            })
            .await
            .expect_err("broken");
        assert!(matches!(error, IngestError::ExtractionFailed { .. }));

        let snapshot = controller.snapshot().await;
        assert!(snapshot.document.is_none());
        assert_eq!(
            snapshot.status.expect("status").text,
            "Error processing file. Please try again."
        );
        assert_eq!(controller.metrics_snapshot().ingest_failures, 1);
    }

    #[tokio::test]
    async fn new_selection_drops_previous_summary() {
        let controller = controller(Arc::new(RecordingClient::default()));
        set_key(&controller, "sk").await;
        controller.select_file(docx("first.docx")).await.expect("select");
        controller.summarize().await.expect("summary");
        assert!(controller.snapshot().await.summary.is_some());

        controller.select_file(docx("second.docx")).await.expect("select");
        let snapshot = controller.snapshot().await;
        assert!(snapshot.summary.is_none());
        assert_eq!(snapshot.document.expect("document").name, "second.docx");
    }

    #[tokio::test]
    async fn remove_file_clears_everything() {
        let controller = controller(Arc::new(RecordingClient::default()));
        set_key(&controller, "sk").await;
        controller.select_file(docx("first.docx")).await.expect("select");
        controller.summarize().await.expect("summary");

        controller.remove_file().await;
        let snapshot = controller.snapshot().await;
        assert!(snapshot.document.is_none());
        assert!(snapshot.summary.is_none());
        assert!(snapshot.status.is_none());
        assert!(!snapshot.can_summarize);
    }

    #[tokio::test]
    async fn provider_errors_become_status_messages() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..RecordingClient::default()
        });
        let controller = controller(client);
        set_key(&controller, "sk").await;
        controller.select_file(docx("first.docx")).await.expect("select");

        let error = controller.summarize().await.expect_err("provider error");
        assert!(matches!(error, SummarizeError::ProviderHttpError(_)));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status.expect("status").text, "Error: bad key");
        assert!(!snapshot.in_flight);
        assert!(snapshot.can_summarize);
    }

    #[derive(Default)]
    struct GatedClient {
        started: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl SummaryClient for GatedClient {
        async fn summarize(
            &self,
            _request: SummaryRequest,
        ) -> Result<SummaryResult, SummarizeError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(SummaryResult {
                text: "Done.".into(),
            })
        }
    }

    #[tokio::test]
    async fn second_summarize_while_in_flight_is_busy() {
        let client = Arc::new(GatedClient::default());
        let controller = Arc::new(
            SessionController::new(Box::new(MemoryStore::new()), client.clone())
                .expect("controller"),
        );
        set_key(&controller, "sk").await;
        controller.select_file(docx("first.docx")).await.expect("select");

        let background = controller.clone();
        let first = tokio::spawn(async move { background.summarize().await });
        client.started.notified().await;

        let snapshot = controller.snapshot().await;
        assert!(snapshot.in_flight);
        assert!(!snapshot.can_summarize);
        let error = controller.summarize().await.expect_err("busy");
        assert!(matches!(error, SummarizeError::Busy));

        client.release.notify_one();
        let summary = first.await.expect("join").expect("summary");
        assert_eq!(summary, "Done.");
        assert!(!controller.snapshot().await.in_flight);
    }

    #[tokio::test]
    async fn dropped_summarize_releases_the_trigger() {
        let client = Arc::new(GatedClient::default());
        let controller = SessionController::new(Box::new(MemoryStore::new()), client.clone())
            .expect("controller");
        set_key(&controller, "sk").await;
        controller.select_file(docx("first.docx")).await.expect("select");

        let cancelled =
            tokio::time::timeout(Duration::from_millis(50), controller.summarize()).await;
        assert!(cancelled.is_err());

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.in_flight);
        assert!(snapshot.can_summarize);
        assert!(snapshot.status.is_none());

        client.release.notify_one();
        let summary = controller.summarize().await.expect("retry succeeds");
        assert_eq!(summary, "Done.");
        assert!(!controller.snapshot().await.in_flight);
    }

    #[tokio::test]
    async fn stored_unknown_provider_is_reported() {
        let store = MemoryStore::new();
        store
            .set_all(&[("aiProvider", "claude"), ("apiKey", "sk")])
            .expect("seed");
        let controller = SessionController::new(
            Box::new(store),
            Arc::new(RecordingClient::default()),
        )
        .expect("controller");
        controller.select_file(docx("first.docx")).await.expect("select");

        let error = controller.summarize().await.expect_err("unsupported");
        assert!(matches!(error, SummarizeError::UnsupportedProvider(ref p) if p == "claude"));
    }

    #[tokio::test]
    async fn overrides_take_precedence_over_preferences() {
        let client = Arc::new(RecordingClient::default());
        let controller = controller(client.clone());
        controller.select_file(docx("first.docx")).await.expect("select");

        controller
            .summarize_with(SummaryOverrides {
                provider: Some(ProviderId::Gemini),
                length: Some(LengthClass::Short),
                api_key: Some("one-off".into()),
            })
            .await
            .expect("summary");

        let requests = client.requests.lock().expect("lock");
        assert_eq!(requests[0].provider, ProviderId::Gemini);
        assert_eq!(requests[0].length, LengthClass::Short);
        assert_eq!(requests[0].api_key, "one-off");
        drop(requests);
        assert!(!controller.preferences().await.api_key_set);
    }

    #[tokio::test]
    async fn preference_updates_are_validated_and_persisted() {
        let controller = controller(Arc::new(RecordingClient::default()));
        let error = controller
            .update_preferences(PreferenceUpdate {
                provider: Some("claude".into()),
                ..PreferenceUpdate::default()
            })
            .await
            .expect_err("invalid provider");
        assert!(matches!(error, PreferenceUpdateError::UnsupportedProvider(_)));

        let view = controller
            .update_preferences(PreferenceUpdate {
                provider: Some("Gemini".into()),
                length: Some("long".into()),
                api_key: Some("X".into()),
            })
            .await
            .expect("update");
        assert_eq!(view.provider, "gemini");
        assert_eq!(view.length, "long");
        assert!(view.api_key_set);
    }

    #[tokio::test]
    async fn download_uses_document_base_name() {
        let controller = controller(Arc::new(RecordingClient::default()));
        assert!(controller.download().await.is_none());

        set_key(&controller, "sk").await;
        controller
            .select_file(docx("report.final.docx"))
            .await
            .expect("select");
        controller.summarize().await.expect("summary");

        let download = controller.download().await.expect("download");
        assert_eq!(download.file_name, "report_summary.txt");
        assert_eq!(download.contents, "Parks were funded.");
    }

    #[test]
    fn summary_file_names() {
        assert_eq!(summary_file_name(Some("report.final.pdf")), "report_summary.txt");
        assert_eq!(summary_file_name(Some("README")), "README_summary.txt");
        assert_eq!(summary_file_name(None), "document_summary.txt");
    }
}
