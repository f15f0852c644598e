//! Video indexer submission payload.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::LocalFile;

/// One video, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoUpload {
    pub video_name: String,
    pub base64_encoded_video: String,
    pub video_description: String,
}

/// Body of `POST /vi/videos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoBatch {
    pub course_code: String,
    pub video: Vec<VideoUpload>,
}

impl VideoBatch {
    /// Encode `videos` for `course`. Without a description, each video is
    /// described by its file name.
    pub fn encode(course: &str, videos: &[LocalFile], description: Option<&str>) -> Self {
        let video = videos
            .iter()
            .map(|file| VideoUpload {
                video_name: file.name.clone(),
                base64_encoded_video: STANDARD.encode(&file.contents),
                video_description: description
                    .map(str::to_string)
                    .unwrap_or_else(|| file.name.clone()),
            })
            .collect();
        Self {
            course_code: course.to_string(),
            video,
        }
    }
}
