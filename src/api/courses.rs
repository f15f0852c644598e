use reqwest::Method;
use serde::Serialize;
use tracing::info;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::Course;

/// Shown when a course code is already taken.
pub const DUPLICATE_COURSE_MESSAGE: &str =
    "This course code already exists. Try a different course code.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRequest<'a> {
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

#[derive(Serialize)]
struct VideoCourseRequest<'a> {
    course_id: &'a str,
    course_name: &'a str,
    course_description: &'a str,
}

impl ApiClient {
    /// Courses visible to `user`, owned or shared.
    pub async fn list_courses(&self, user: &str) -> Result<Vec<Course>, ApiError> {
        self.get_json(&self.endpoint(&["api", "collections", user]))
            .await
    }

    pub async fn course_file_count(&self, course: &str) -> Result<u64, ApiError> {
        self.get_json(&self.endpoint(&["api", course, "totalFiles"]))
            .await
    }

    /// Create the search index backing a new course.
    pub async fn create_search_index(&self, course: &str) -> Result<String, ApiError> {
        let body = CollectionRequest {
            collection_name: course,
            username: None,
        };
        self.send_json(Method::PUT, &self.endpoint(&["createindex"]), &body)
            .await
    }

    /// Create the course collection and storage container, owned by `user`.
    pub async fn create_collection(&self, course: &str, user: &str) -> Result<String, ApiError> {
        let body = CollectionRequest {
            collection_name: course,
            username: Some(user),
        };
        self.send_json(
            Method::PUT,
            &self.endpoint(&["api", "createcollection"]),
            &body,
        )
        .await
        .map_err(duplicate_course)
    }

    /// Register the course with the video service.
    pub async fn register_video_course(
        &self,
        course: &str,
        description: &str,
    ) -> Result<String, ApiError> {
        let body = VideoCourseRequest {
            course_id: course,
            course_name: course,
            course_description: description,
        };
        self.send_json(Method::POST, &self.video_endpoint(&["vi", "courses"]), &body)
            .await
    }

    /// Create a course: search index, collection, then video registration.
    /// Stops at the first failing step.
    pub async fn create_course(
        &self,
        course: &str,
        description: &str,
        user: &str,
    ) -> Result<String, ApiError> {
        self.create_search_index(course).await?;
        let message = self.create_collection(course, user).await?;
        self.register_video_course(course, description).await?;
        info!("Created course {} for {}", course, user);
        Ok(message)
    }

    /// Delete a course with all its domains and files.
    pub async fn delete_course(&self, course: &str) -> Result<String, ApiError> {
        let body = CollectionRequest {
            collection_name: course,
            username: None,
        };
        self.send_json(
            Method::DELETE,
            &self.endpoint(&["api", "deletecourse"]),
            &body,
        )
        .await
    }
}

/// Map "already exists" failures to the fixed duplicate message.
fn duplicate_course(err: ApiError) -> ApiError {
    if is_duplicate_course(&err) {
        if let ApiError::Validation { status, .. } | ApiError::Server { status, .. } = err {
            return ApiError::Validation {
                status,
                message: DUPLICATE_COURSE_MESSAGE.to_string(),
            };
        }
    }
    err
}

fn is_duplicate_course(err: &ApiError) -> bool {
    if err.status() == Some(reqwest::StatusCode::CONFLICT) {
        return true;
    }
    match err {
        ApiError::Validation { message, .. } | ApiError::Server { message, .. } => {
            let message = message.to_lowercase();
            // The backend spells it both ways.
            message.contains("already exists") || message.contains("already exsists")
        }
        _ => false,
    }
}
