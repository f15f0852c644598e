use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::Domain;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDomainRequest<'a> {
    domain_name: &'a str,
    course_name: &'a str,
    user: &'a str,
    action: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDomainRequest<'a> {
    collection_name: &'a str,
    domain_name: &'a str,
    username: &'a str,
}

impl ApiClient {
    pub async fn list_domains(&self, user: &str, course: &str) -> Result<Vec<Domain>, ApiError> {
        self.get_json(&self.endpoint(&["api", "collections", user, course, "domains"]))
            .await
    }

    pub async fn domain_file_count(&self, course: &str, domain: &str) -> Result<u64, ApiError> {
        self.get_json(&self.endpoint(&["api", course, domain, "totalFiles"]))
            .await
    }

    pub async fn create_domain(
        &self,
        course: &str,
        domain: &str,
        user: &str,
    ) -> Result<String, ApiError> {
        let body = CreateDomainRequest {
            domain_name: domain,
            course_name: course,
            user,
            action: "Domain Creation",
        };
        self.send_json(Method::PUT, &self.endpoint(&["api", "createdomain"]), &body)
            .await
    }

    /// Delete a domain and every file in it.
    pub async fn delete_domain(
        &self,
        course: &str,
        domain: &str,
        user: &str,
    ) -> Result<String, ApiError> {
        let body = DeleteDomainRequest {
            collection_name: course,
            domain_name: domain,
            username: user,
        };
        self.send_json(
            Method::DELETE,
            &self.endpoint(&["api", "deletedomain"]),
            &body,
        )
        .await
    }
}
