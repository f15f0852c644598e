use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Serialize)]
struct InviteRequest<'a> {
    email: &'a str,
    course: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeRequest<'a> {
    collection_name: &'a str,
    username: &'a str,
}

impl ApiClient {
    /// Usernames the course has been shared with.
    pub async fn list_course_users(&self, course: &str) -> Result<Vec<String>, ApiError> {
        self.get_json(&self.endpoint(&["manageaccess", course]))
            .await
    }

    /// Invite `email` to administer `course`.
    pub async fn invite_user(&self, course: &str, email: &str) -> Result<String, ApiError> {
        let body = InviteRequest {
            email: email.trim(),
            course,
        };
        self.send_json(Method::POST, &self.endpoint(&["invite"]), &body)
            .await
    }

    pub async fn revoke_access(&self, course: &str, user: &str) -> Result<String, ApiError> {
        let body = RevokeRequest {
            collection_name: course,
            username: user,
        };
        self.send_json(
            Method::DELETE,
            &self.endpoint(&["manageaccess", "deleteUser"]),
            &body,
        )
        .await
    }
}
