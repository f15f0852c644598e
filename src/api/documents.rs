//! File routes: listing, multipart upload, vector store moves and deletion.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::ingest::{ChunkingParams, IngestBackend, IngestTarget, LocalFile, VideoBatch};
use crate::models::Document;
use crate::validate::container_name;

#[derive(Serialize)]
struct VectorStoreRequest<'a> {
    containername: &'a str,
    chunksize: u32,
    overlap: u32,
}

#[derive(Serialize)]
struct MoveRequest<'a> {
    containername: &'a str,
    domainname: &'a str,
    versionid: &'a str,
    filename: &'a str,
    chunksize: u32,
    overlap: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MovementRecord<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    collection_name: &'a str,
    domain_name: &'a str,
    file_name: &'a str,
    version_id: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingsRequest<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    file_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDocumentRequest<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    file_name: &'a str,
    version_id: &'a str,
    is_root_blob: &'a str,
    username: &'a str,
    action: &'a str,
}

impl ApiClient {
    pub async fn list_documents(
        &self,
        user: &str,
        course: &str,
        domain: &str,
    ) -> Result<Vec<Document>, ApiError> {
        self.get_json(&self.endpoint(&["api", "collections", user, course, domain]))
            .await
    }

    /// Upload documents to course blob storage.
    pub async fn upload_blobs(
        &self,
        target: &IngestTarget,
        files: &[LocalFile],
    ) -> Result<String, ApiError> {
        self.put_files(target, "createblob", files).await
    }

    /// Create database records for uploaded documents.
    pub async fn create_documents(
        &self,
        target: &IngestTarget,
        files: &[LocalFile],
    ) -> Result<String, ApiError> {
        self.put_files(target, "createdocument", files).await
    }

    /// Chunk and embed everything pending in the course container.
    pub async fn store_in_vector_store(
        &self,
        course: &str,
        chunking: ChunkingParams,
    ) -> Result<String, ApiError> {
        let container = container_name(course);
        let body = VectorStoreRequest {
            containername: &container,
            chunksize: chunking.chunk_size,
            overlap: chunking.overlap,
        };
        let url = self.endpoint(&["vectorstore"]);
        let request = self.upload_request(Method::PUT, &url).json(&body);
        Ok(self.send(request, &Method::PUT, &url).await?.message())
    }

    /// Embed a single stored file version.
    pub async fn move_to_vector_store(
        &self,
        course: &str,
        domain: &str,
        doc: &Document,
        chunking: ChunkingParams,
    ) -> Result<String, ApiError> {
        let container = container_name(course);
        let body = MoveRequest {
            containername: &container,
            domainname: domain,
            versionid: &doc.version_id,
            filename: &doc.name,
            chunksize: chunking.chunk_size,
            overlap: chunking.overlap,
        };
        let url = self.endpoint(&["movetovectorstore"]);
        let request = self.upload_request(Method::PUT, &url).json(&body);
        Ok(self.send(request, &Method::PUT, &url).await?.message())
    }

    /// Mark a moved file as vectorized.
    pub async fn record_movement(
        &self,
        course: &str,
        domain: &str,
        doc: &Document,
        user: &str,
    ) -> Result<String, ApiError> {
        let body = MovementRecord {
            id: &doc.id,
            collection_name: course,
            domain_name: domain,
            file_name: &doc.name,
            version_id: &doc.version_id,
            username: user,
        };
        self.send_json(Method::PUT, &self.endpoint(&["updatemovement"]), &body)
            .await
    }

    pub async fn delete_embeddings(&self, course: &str, doc: &Document) -> Result<String, ApiError> {
        let body = EmbeddingsRequest {
            id: &doc.id,
            file_name: &doc.name,
        };
        self.send_json(
            Method::DELETE,
            &self.endpoint(&["api", course, "deleteembeddings"]),
            &body,
        )
        .await
    }

    /// Delete the file record and its blob version.
    pub async fn delete_document(
        &self,
        course: &str,
        domain: &str,
        doc: &Document,
        user: &str,
    ) -> Result<String, ApiError> {
        let body = DeleteDocumentRequest {
            id: &doc.id,
            file_name: &doc.name,
            version_id: &doc.version_id,
            is_root_blob: if doc.is_root_blob { "yes" } else { "no" },
            username: user,
            action: "File Deletion",
        };
        self.send_json(
            Method::DELETE,
            &self.endpoint(&["api", course, domain, "deletedocument"]),
            &body,
        )
        .await
    }

    async fn put_files(
        &self,
        target: &IngestTarget,
        route: &str,
        files: &[LocalFile],
    ) -> Result<String, ApiError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.contents.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type())
                .map_err(ApiError::Client)?;
            form = form.part("files", part);
        }

        let url = self.endpoint(&[
            "api",
            &target.course,
            &target.domain,
            &target.user,
            route,
        ]);
        let request = self.upload_request(Method::PUT, &url).multipart(form);
        Ok(self.send(request, &Method::PUT, &url).await?.message())
    }
}

#[async_trait]
impl IngestBackend for ApiClient {
    async fn upload_blobs(
        &self,
        target: &IngestTarget,
        files: &[LocalFile],
    ) -> Result<String, ApiError> {
        ApiClient::upload_blobs(self, target, files).await
    }

    async fn store_in_vector_store(
        &self,
        course: &str,
        chunking: ChunkingParams,
    ) -> Result<String, ApiError> {
        ApiClient::store_in_vector_store(self, course, chunking).await
    }

    async fn create_documents(
        &self,
        target: &IngestTarget,
        files: &[LocalFile],
    ) -> Result<String, ApiError> {
        ApiClient::create_documents(self, target, files).await
    }

    async fn index_videos(&self, videos: &VideoBatch) -> Result<String, ApiError> {
        self.submit_videos(videos).await
    }
}
