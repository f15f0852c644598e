use super::ApiClient;
use crate::error::ApiError;
use crate::models::Activity;

impl ApiClient {
    /// Activity log entries for courses `user` can see.
    pub async fn list_activities(&self, user: &str) -> Result<Vec<Activity>, ApiError> {
        self.get_json(&self.endpoint(&["activities", user, "viewactivities"]))
            .await
    }
}
