//! Ingestion runs against a fake backend.

use mockito::{Matcher, Server, ServerGuard};
use narelle_admin::api::ApiClient;
use narelle_admin::config::Settings;
use narelle_admin::ingest::{
    IngestError, IngestObserver, IngestReport, IngestStage, IngestTarget, IngestionBatch,
    IngestionWorkflow, LocalFile,
};
use serde_json::json;

fn client(server: &ServerGuard) -> ApiClient {
    ApiClient::new(&Settings {
        api_url: server.url(),
        video_api_url: server.url(),
        ..Default::default()
    })
    .unwrap()
}

fn target() -> IngestTarget {
    IngestTarget {
        course: "cs1003".to_string(),
        domain: "week1".to_string(),
        user: "alice".to_string(),
    }
}

#[derive(Default)]
struct Hooks {
    completed: bool,
    failed_at: Option<IngestStage>,
}

impl IngestObserver for Hooks {
    fn completed(&mut self, _report: &IngestReport) {
        self.completed = true;
    }

    fn failed(&mut self, error: &IngestError) {
        self.failed_at = error.stage();
    }
}

#[tokio::test]
async fn test_pdf_and_video_run_every_stage() {
    let mut server = Server::new_async().await;

    let blob = server
        .mock("PUT", "/api/cs1003/week1/alice/createblob")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files"; filename="notes.pdf""#.to_string()),
            Matcher::Regex("%PDF-1.4 notes".to_string()),
        ]))
        .with_status(201)
        .with_body(r#"{"message": "Files uploaded successfully"}"#)
        .expect(1)
        .create_async()
        .await;

    let vector = server
        .mock("PUT", "/vectorstore")
        .match_body(Matcher::Json(json!({
            "containername": "cs1003",
            "chunksize": 1000,
            "overlap": 100
        })))
        .with_status(201)
        .with_body(r#"{"message": "Stored in vector store"}"#)
        .expect(1)
        .create_async()
        .await;

    let database = server
        .mock("PUT", "/api/cs1003/week1/alice/createdocument")
        .match_body(Matcher::Regex(r#"filename="notes.pdf""#.to_string()))
        .with_status(201)
        .with_body(r#"{"message": "Documents recorded"}"#)
        .expect(1)
        .create_async()
        .await;

    let videos = server
        .mock("POST", "/vi/videos")
        .match_body(Matcher::Json(json!({
            "course_code": "cs1003",
            "video": [{
                "video_name": "lecture.mp4",
                "base64_encoded_video": "bXA0IGJ5dGVz",
                "video_description": "lecture.mp4"
            }]
        })))
        .with_status(200)
        .with_body(r#"{"message": "Videos queued"}"#)
        .expect(1)
        .create_async()
        .await;

    let batch = IngestionBatch::new(vec![
        LocalFile::new("notes.pdf", b"%PDF-1.4 notes".to_vec()).unwrap(),
        LocalFile::new("lecture.mp4", b"mp4 bytes".to_vec()).unwrap(),
    ])
    .unwrap();

    let api = client(&server);
    let mut hooks = Hooks::default();
    let report = IngestionWorkflow::new(&api)
        .run(&target(), &batch, &mut hooks)
        .await
        .unwrap();

    blob.assert_async().await;
    vector.assert_async().await;
    database.assert_async().await;
    videos.assert_async().await;

    assert!(hooks.completed);
    assert_eq!(report.documents, 1);
    assert_eq!(report.videos, 1);
    let messages: Vec<_> = report.stages.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Files uploaded successfully",
            "Stored in vector store",
            "Documents recorded",
            "Videos queued"
        ]
    );
}

#[tokio::test]
async fn test_vector_store_failure_skips_remaining_stages() {
    let mut server = Server::new_async().await;

    let blob = server
        .mock("PUT", "/api/cs1003/week1/alice/createblob")
        .with_status(201)
        .expect(1)
        .create_async()
        .await;
    let vector = server
        .mock("PUT", "/vectorstore")
        .with_status(500)
        .with_body(r#"{"error": "Embedding service unavailable"}"#)
        .expect(1)
        .create_async()
        .await;
    let database = server
        .mock("PUT", "/api/cs1003/week1/alice/createdocument")
        .expect(0)
        .create_async()
        .await;
    let videos = server
        .mock("POST", "/vi/videos")
        .expect(0)
        .create_async()
        .await;

    let batch = IngestionBatch::new(vec![
        LocalFile::new("notes.pdf", b"pdf".to_vec()).unwrap(),
        LocalFile::new("lecture.mp4", b"mp4".to_vec()).unwrap(),
    ])
    .unwrap();

    let api = client(&server);
    let mut hooks = Hooks::default();
    let err = IngestionWorkflow::new(&api)
        .run(&target(), &batch, &mut hooks)
        .await
        .unwrap_err();

    blob.assert_async().await;
    vector.assert_async().await;
    database.assert_async().await;
    videos.assert_async().await;

    assert_eq!(err.stage(), Some(IngestStage::Vector));
    assert_eq!(err.user_message(), "Embedding service unavailable");
    assert!(!hooks.completed);
    assert_eq!(hooks.failed_at, Some(IngestStage::Vector));

    // The selection survives for a retry.
    assert_eq!(batch.len(), 2);
}

#[tokio::test]
async fn test_videos_only_go_straight_to_indexer() {
    let mut server = Server::new_async().await;

    let blob = server
        .mock("PUT", "/api/cs1003/week1/alice/createblob")
        .expect(0)
        .create_async()
        .await;
    let videos = server
        .mock("POST", "/vi/videos")
        .match_body(Matcher::PartialJson(json!({ "course_code": "cs1003" })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let batch =
        IngestionBatch::new(vec![LocalFile::new("talk.webm", b"webm".to_vec()).unwrap()]).unwrap();

    let api = client(&server);
    let report = IngestionWorkflow::new(&api)
        .with_video_description("Guest talk")
        .run(&target(), &batch, &mut ())
        .await
        .unwrap();

    blob.assert_async().await;
    videos.assert_async().await;
    assert_eq!(report.stages.len(), 1);
    assert_eq!(report.stages[0].message, "HTTP 201 Created");
}

#[tokio::test]
async fn test_unsupported_file_never_reaches_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grades.xlsx");
    std::fs::write(&path, b"data").unwrap();

    let err = IngestionBatch::from_paths(&[path]).await.unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFile(ref n) if n == "grades.xlsx"));
}
