//! Fail-fast ingestion workflow.
//!
//! Documents run `Blob -> Vector -> Database`; videos run `VideoIndex`
//! after every document stage has succeeded. The first failing stage stops
//! the run, and nothing after it is attempted.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};

use super::{ChunkingParams, IngestionBatch, LocalFile, VideoBatch};
use crate::error::ApiError;
use crate::validate::ValidationError;

/// Progress through an ingestion run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IngestStage {
    Select,
    Blob,
    Vector,
    Database,
    VideoIndex,
    Done,
}

impl IngestStage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Select => "Selecting files",
            Self::Blob => "Uploading to blob storage",
            Self::Vector => "Storing in vector store",
            Self::Database => "Recording documents",
            Self::VideoIndex => "Submitting videos to indexer",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a batch lands: course, domain, and the acting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestTarget {
    pub course: String,
    pub domain: String,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No files selected")]
    EmptySelection,

    #[error(
        "Unsupported file format: {0} (accepted: .pdf, .docx, .pptx, .txt, .mp4, .mov, .mkv, .webm, .avi)"
    )]
    UnsupportedFile(String),

    #[error(transparent)]
    InvalidChunking(#[from] ValidationError),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: IngestStage,
        #[source]
        source: ApiError,
    },
}

impl IngestError {
    /// The stage that failed, for backend failures.
    pub fn stage(&self) -> Option<IngestStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Stage { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

/// The backend calls an ingestion run needs. Each returns the backend's
/// acknowledgement message.
#[async_trait]
pub trait IngestBackend: Send + Sync {
    async fn upload_blobs(
        &self,
        target: &IngestTarget,
        files: &[LocalFile],
    ) -> Result<String, ApiError>;

    async fn store_in_vector_store(
        &self,
        course: &str,
        chunking: ChunkingParams,
    ) -> Result<String, ApiError>;

    async fn create_documents(
        &self,
        target: &IngestTarget,
        files: &[LocalFile],
    ) -> Result<String, ApiError>;

    async fn index_videos(&self, videos: &VideoBatch) -> Result<String, ApiError>;
}

/// Hooks for progress display. All methods default to no-ops.
pub trait IngestObserver {
    fn stage_started(&mut self, _stage: IngestStage) {}
    fn stage_succeeded(&mut self, _stage: IngestStage, _message: &str) {}
    /// Called once, only after every stage succeeded.
    fn completed(&mut self, _report: &IngestReport) {}
    fn failed(&mut self, _error: &IngestError) {}
}

impl IngestObserver for () {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: IngestStage,
    pub message: String,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub videos: usize,
    pub stages: Vec<StageOutcome>,
}

pub struct IngestionWorkflow<'a, B: IngestBackend + ?Sized> {
    backend: &'a B,
    chunking: ChunkingParams,
    video_description: Option<String>,
}

impl<'a, B: IngestBackend + ?Sized> IngestionWorkflow<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            chunking: ChunkingParams::default(),
            video_description: None,
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingParams) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_video_description(mut self, description: impl Into<String>) -> Self {
        self.video_description = Some(description.into());
        self
    }

    /// Stages a batch will run, in order.
    pub fn plan(batch: &IngestionBatch) -> Vec<IngestStage> {
        let mut stages = Vec::with_capacity(4);
        if batch.has_documents() {
            stages.extend([IngestStage::Blob, IngestStage::Vector, IngestStage::Database]);
        }
        if batch.has_videos() {
            stages.push(IngestStage::VideoIndex);
        }
        stages
    }

    pub async fn run<O: IngestObserver + ?Sized>(
        &self,
        target: &IngestTarget,
        batch: &IngestionBatch,
        observer: &mut O,
    ) -> Result<IngestReport, IngestError> {
        if let Err(e) = self.chunking.validate() {
            let err = IngestError::from(e);
            observer.failed(&err);
            return Err(err);
        }
        if batch.is_empty() {
            let err = IngestError::EmptySelection;
            observer.failed(&err);
            return Err(err);
        }

        info!(
            "Ingesting {} document(s) and {} video(s) into {}/{}",
            batch.documents().len(),
            batch.videos().len(),
            target.course,
            target.domain
        );

        let mut report = IngestReport {
            documents: batch.documents().len(),
            videos: batch.videos().len(),
            stages: Vec::new(),
        };

        for stage in Self::plan(batch) {
            observer.stage_started(stage);
            debug!("Starting stage: {}", stage);

            let result = match stage {
                IngestStage::Blob => {
                    self.backend
                        .upload_blobs(target, batch.documents())
                        .await
                }
                IngestStage::Vector => {
                    self.backend
                        .store_in_vector_store(&target.course, self.chunking)
                        .await
                }
                IngestStage::Database => {
                    self.backend
                        .create_documents(target, batch.documents())
                        .await
                }
                IngestStage::VideoIndex => {
                    let videos = VideoBatch::encode(
                        &target.course,
                        batch.videos(),
                        self.video_description.as_deref(),
                    );
                    self.backend.index_videos(&videos).await
                }
                IngestStage::Select | IngestStage::Done => continue,
            };

            match result {
                Ok(message) => {
                    debug!("Stage {} succeeded: {}", stage, message);
                    observer.stage_succeeded(stage, &message);
                    report.stages.push(StageOutcome { stage, message });
                }
                Err(source) => {
                    let err = IngestError::Stage { stage, source };
                    error!("Ingestion stopped: {}", err);
                    observer.failed(&err);
                    return Err(err);
                }
            }
        }

        info!("Ingestion into {}/{} complete", target.course, target.domain);
        observer.completed(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Blob(Vec<String>),
        Vector(String, ChunkingParams),
        Database(Vec<String>),
        Videos(Vec<String>),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        fail_at: Option<IngestStage>,
    }

    impl RecordingBackend {
        fn failing_at(stage: IngestStage) -> Self {
            Self {
                fail_at: Some(stage),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, stage: IngestStage, call: Call) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.fail_at == Some(stage) {
                return Err(ApiError::Server {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("{} broke", stage),
                });
            }
            Ok(format!("{} ok", stage))
        }
    }

    fn names(files: &[LocalFile]) -> Vec<String> {
        files.iter().map(|f| f.name.clone()).collect()
    }

    #[async_trait]
    impl IngestBackend for RecordingBackend {
        async fn upload_blobs(
            &self,
            _target: &IngestTarget,
            files: &[LocalFile],
        ) -> Result<String, ApiError> {
            self.record(IngestStage::Blob, Call::Blob(names(files)))
        }

        async fn store_in_vector_store(
            &self,
            course: &str,
            chunking: ChunkingParams,
        ) -> Result<String, ApiError> {
            self.record(IngestStage::Vector, Call::Vector(course.to_string(), chunking))
        }

        async fn create_documents(
            &self,
            _target: &IngestTarget,
            files: &[LocalFile],
        ) -> Result<String, ApiError> {
            self.record(IngestStage::Database, Call::Database(names(files)))
        }

        async fn index_videos(&self, videos: &VideoBatch) -> Result<String, ApiError> {
            let names = videos.video.iter().map(|v| v.video_name.clone()).collect();
            self.record(IngestStage::VideoIndex, Call::Videos(names))
        }
    }

    #[derive(Default)]
    struct Events {
        started: Vec<IngestStage>,
        completed: usize,
        failed: Option<IngestStage>,
    }

    impl IngestObserver for Events {
        fn stage_started(&mut self, stage: IngestStage) {
            self.started.push(stage);
        }
        fn completed(&mut self, _report: &IngestReport) {
            self.completed += 1;
        }
        fn failed(&mut self, error: &IngestError) {
            self.failed = error.stage();
        }
    }

    fn target() -> IngestTarget {
        IngestTarget {
            course: "cs1003".to_string(),
            domain: "week1".to_string(),
            user: "alice@example.com".to_string(),
        }
    }

    fn batch(names: &[&str]) -> IngestionBatch {
        IngestionBatch::new(
            names
                .iter()
                .map(|n| LocalFile::new(*n, b"data".to_vec()).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_documents_run_three_stages_in_order() {
        let backend = RecordingBackend::default();
        let mut events = Events::default();
        let report = IngestionWorkflow::new(&backend)
            .run(&target(), &batch(&["a.pdf", "b.txt"]), &mut events)
            .await
            .unwrap();

        let docs = vec!["a.pdf".to_string(), "b.txt".to_string()];
        assert_eq!(
            backend.calls(),
            vec![
                Call::Blob(docs.clone()),
                Call::Vector("cs1003".to_string(), ChunkingParams::default()),
                Call::Database(docs),
            ]
        );
        assert_eq!(report.documents, 2);
        assert_eq!(report.stages.len(), 3);
        assert_eq!(events.completed, 1);
    }

    #[tokio::test]
    async fn test_videos_only_skip_document_stages() {
        let backend = RecordingBackend::default();
        IngestionWorkflow::new(&backend)
            .run(&target(), &batch(&["lecture.mp4"]), &mut ())
            .await
            .unwrap();
        assert_eq!(
            backend.calls(),
            vec![Call::Videos(vec!["lecture.mp4".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_mixed_batch_sends_documents_then_videos() {
        let backend = RecordingBackend::default();
        let mut events = Events::default();
        IngestionWorkflow::new(&backend)
            .run(&target(), &batch(&["lecture.mp4", "notes.pdf"]), &mut events)
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Blob(vec!["notes.pdf".to_string()]));
        assert_eq!(calls[2], Call::Database(vec!["notes.pdf".to_string()]));
        assert_eq!(calls[3], Call::Videos(vec!["lecture.mp4".to_string()]));
        assert_eq!(
            events.started,
            vec![
                IngestStage::Blob,
                IngestStage::Vector,
                IngestStage::Database,
                IngestStage::VideoIndex
            ]
        );
    }

    #[tokio::test]
    async fn test_vector_failure_stops_the_run() {
        let backend = RecordingBackend::failing_at(IngestStage::Vector);
        let mut events = Events::default();
        let err = IngestionWorkflow::new(&backend)
            .run(&target(), &batch(&["a.pdf", "b.mp4"]), &mut events)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(IngestStage::Vector));
        assert_eq!(backend.calls().len(), 2);
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Database(_) | Call::Videos(_))));
        assert_eq!(events.completed, 0);
        assert_eq!(events.failed, Some(IngestStage::Vector));
    }

    #[tokio::test]
    async fn test_blob_failure_stops_before_vector() {
        let backend = RecordingBackend::failing_at(IngestStage::Blob);
        let err = IngestionWorkflow::new(&backend)
            .run(&target(), &batch(&["a.pdf"]), &mut ())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(IngestStage::Blob));
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(err.user_message(), "Uploading to blob storage broke");
    }

    #[tokio::test]
    async fn test_invalid_chunking_sends_nothing() {
        let backend = RecordingBackend::default();
        let err = IngestionWorkflow::new(&backend)
            .with_chunking(ChunkingParams {
                chunk_size: 10,
                overlap: 0,
            })
            .run(&target(), &batch(&["a.pdf"]), &mut ())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidChunking(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_chunking_reaches_vector_store() {
        let backend = RecordingBackend::default();
        let chunking = ChunkingParams::new(1500, 200).unwrap();
        IngestionWorkflow::new(&backend)
            .with_chunking(chunking)
            .run(&target(), &batch(&["a.pdf"]), &mut ())
            .await
            .unwrap();
        assert_eq!(
            backend.calls()[1],
            Call::Vector("cs1003".to_string(), chunking)
        );
    }

    #[test]
    fn test_plan() {
        let plan = IngestionWorkflow::<RecordingBackend>::plan(&batch(&["a.docx", "b.mov"]));
        assert_eq!(
            plan,
            vec![
                IngestStage::Blob,
                IngestStage::Vector,
                IngestStage::Database,
                IngestStage::VideoIndex
            ]
        );
        assert!(IngestStage::Select < IngestStage::Blob);
        assert!(IngestStage::VideoIndex < IngestStage::Done);
    }
}
