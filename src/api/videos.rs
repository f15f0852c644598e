use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::ingest::VideoBatch;

impl ApiClient {
    /// Submit encoded videos to the video indexer.
    pub async fn submit_videos(&self, videos: &VideoBatch) -> Result<String, ApiError> {
        let url = self.video_endpoint(&["vi", "videos"]);
        let request = self.upload_request(Method::POST, &url).json(videos);
        Ok(self.send(request, &Method::POST, &url).await?.message())
    }
}
