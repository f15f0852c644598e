use super::ApiClient;
use crate::error::ApiError;
use crate::models::{DashboardSummary, Series};

impl ApiClient {
    pub async fn total_users(&self, user: &str) -> Result<u64, ApiError> {
        self.get_json(&self.endpoint(&["chats", "totalUsers", user]))
            .await
    }

    pub async fn total_queries(&self, user: &str) -> Result<u64, ApiError> {
        self.get_json(&self.endpoint(&["chats", "totalQueries", user]))
            .await
    }

    pub async fn queries_by_month(&self, user: &str) -> Result<Series, ApiError> {
        self.chat_series("queriesByMonth", user).await
    }

    pub async fn queries_by_course(&self, user: &str) -> Result<Series, ApiError> {
        self.chat_series("queriesByCourse", user).await
    }

    pub async fn user_sentiments(&self, user: &str) -> Result<Series, ApiError> {
        self.chat_series("userSentiments", user).await
    }

    pub async fn user_emotions(&self, user: &str) -> Result<Series, ApiError> {
        self.chat_series("userEmotions", user).await
    }

    /// Every dashboard figure, fetched one after another.
    pub async fn dashboard_summary(&self, user: &str) -> Result<DashboardSummary, ApiError> {
        Ok(DashboardSummary {
            total_users: self.total_users(user).await?,
            total_queries: self.total_queries(user).await?,
            queries_by_month: self.queries_by_month(user).await?,
            queries_by_course: self.queries_by_course(user).await?,
            sentiments: self.user_sentiments(user).await?,
            emotions: self.user_emotions(user).await?,
        })
    }

    async fn chat_series(&self, route: &str, user: &str) -> Result<Series, ApiError> {
        self.get_json(&self.endpoint(&["chats", route, user])).await
    }
}
