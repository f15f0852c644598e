//! File ingestion: classify local files and push them through the backend.
//!
//! Documents go to blob storage, then the vector store, then get database
//! records. Videos are base64-encoded and submitted to the video indexer.
//! See [`IngestionWorkflow`] for the ordering rules.

mod pipeline;
mod video;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::validate::{validate_range, ValidationError};

pub use pipeline::{
    IngestBackend, IngestError, IngestObserver, IngestReport, IngestStage, IngestTarget,
    IngestionWorkflow, StageOutcome,
};
pub use video::{VideoBatch, VideoUpload};

/// Extensions accepted as text documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "pptx", "txt"];

/// Extensions accepted as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

/// How a selected file is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Document,
    Video,
}

impl FileKind {
    /// Classify by extension, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
        if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Document)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }
}

/// A selected file, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub kind: FileKind,
    pub contents: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Result<Self, IngestError> {
        let name = name.into();
        let kind = FileKind::from_name(&name)
            .ok_or_else(|| IngestError::UnsupportedFile(name.clone()))?;
        Ok(Self {
            name,
            kind,
            contents,
        })
    }

    pub async fn read(path: &Path) -> Result<Self, IngestError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IngestError::UnsupportedFile(path.display().to_string()))?
            .to_string();

        // Classify before reading so a bad selection costs no I/O.
        if FileKind::from_name(&name).is_none() {
            return Err(IngestError::UnsupportedFile(name));
        }

        let contents = tokio::fs::read(path).await.map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(name, contents)
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// The user's file selection, split by kind.
///
/// The workflow only borrows a batch, so a failed run leaves the selection
/// intact for a retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionBatch {
    documents: Vec<LocalFile>,
    videos: Vec<LocalFile>,
}

impl IngestionBatch {
    pub fn new(files: Vec<LocalFile>) -> Result<Self, IngestError> {
        if files.is_empty() {
            return Err(IngestError::EmptySelection);
        }
        let (documents, videos) = files
            .into_iter()
            .partition(|f| f.kind == FileKind::Document);
        Ok(Self { documents, videos })
    }

    /// Read and classify every path. Fails on the first unsupported or unreadable file.
    pub async fn from_paths(paths: &[PathBuf]) -> Result<Self, IngestError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(LocalFile::read(path).await?);
        }
        Self::new(files)
    }

    pub fn documents(&self) -> &[LocalFile] {
        &self.documents
    }

    pub fn videos(&self) -> &[LocalFile] {
        &self.videos
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn has_videos(&self) -> bool {
        !self.videos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len() + self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Text-splitting parameters sent to the vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingParams {
    pub chunk_size: u32,
    pub overlap: u32,
}

impl ChunkingParams {
    pub const MIN_CHUNK_SIZE: u32 = 500;
    pub const MAX_CHUNK_SIZE: u32 = 2000;
    pub const MAX_OVERLAP: u32 = 500;

    pub fn new(chunk_size: u32, overlap: u32) -> Result<Self, ValidationError> {
        let params = Self {
            chunk_size,
            overlap,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_range(
            "Chunk size",
            self.chunk_size,
            Self::MIN_CHUNK_SIZE,
            Self::MAX_CHUNK_SIZE,
        )?;
        validate_range("Overlap", self.overlap, 0, Self::MAX_OVERLAP)
    }
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_by_extension() {
        for name in ["notes.pdf", "essay.DOCX", "slides.pptx", "readme.txt"] {
            assert_eq!(FileKind::from_name(name), Some(FileKind::Document), "{name}");
        }
        for name in ["lecture.mp4", "clip.MOV", "talk.mkv", "demo.webm", "old.avi"] {
            assert_eq!(FileKind::from_name(name), Some(FileKind::Video), "{name}");
        }
        for name in ["archive.zip", "noext", "image.png", ".pdf"] {
            assert_eq!(FileKind::from_name(name), None, "{name}");
        }
    }

    #[test]
    fn test_batch_partitions_files() {
        let batch = IngestionBatch::new(vec![
            LocalFile::new("a.pdf", b"a".to_vec()).unwrap(),
            LocalFile::new("b.mp4", b"b".to_vec()).unwrap(),
            LocalFile::new("c.txt", b"c".to_vec()).unwrap(),
        ])
        .unwrap();
        let docs: Vec<_> = batch.documents().iter().map(|f| f.name.as_str()).collect();
        let videos: Vec<_> = batch.videos().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(docs, vec!["a.pdf", "c.txt"]);
        assert_eq!(videos, vec!["b.mp4"]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(matches!(
            IngestionBatch::new(Vec::new()),
            Err(IngestError::EmptySelection)
        ));
    }

    #[test]
    fn test_unsupported_file_is_rejected() {
        let err = LocalFile::new("data.csv", Vec::new()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFile(ref n) if n == "data.csv"));
    }

    #[tokio::test]
    async fn test_from_paths_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let batch = IngestionBatch::from_paths(&[pdf]).await.unwrap();
        assert_eq!(batch.documents()[0].contents, b"%PDF-1.4");
        assert_eq!(batch.documents()[0].mime_type(), "application/pdf");
    }

    #[tokio::test]
    async fn test_from_paths_rejects_unsupported_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.exe");
        let err = IngestionBatch::from_paths(&[missing]).await.unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFile(_)));
    }

    #[tokio::test]
    async fn test_from_paths_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = IngestionBatch::from_paths(&[missing.clone()]).await.unwrap_err();
        assert!(matches!(err, IngestError::Io { ref path, .. } if *path == missing));
    }

    #[test]
    fn test_chunking_bounds() {
        assert!(ChunkingParams::new(500, 0).is_ok());
        assert!(ChunkingParams::new(2000, 500).is_ok());
        assert!(ChunkingParams::new(499, 100).is_err());
        assert!(ChunkingParams::new(1000, 501).is_err());
        assert_eq!(
            ChunkingParams::default(),
            ChunkingParams {
                chunk_size: 1000,
                overlap: 100
            }
        );
    }
}
