//! Activity log records written by the backend on every mutation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::document::parse_day;

/// What a logged activity did.
///
/// The backend stores free text; the known values get their own variants and
/// anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityAction {
    UploadedFile,
    DomainCreation,
    DomainDeletion,
    FileDeletion,
    MovedToVectorStore,
    Other(String),
}

impl ActivityAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::UploadedFile => "Uploaded File",
            Self::DomainCreation => "Domain Creation",
            Self::DomainDeletion => "Domain Deletion",
            Self::FileDeletion => "File Deletion",
            Self::MovedToVectorStore => "Moved to vector store",
            Self::Other(s) => s,
        }
    }

    /// Parse a label or a short alias (`upload`, `domain-create`, ...), case-insensitively.
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "uploaded file" | "upload" => Self::UploadedFile,
            "domain creation" | "domain create" => Self::DomainCreation,
            "domain deletion" | "domain delete" => Self::DomainDeletion,
            "file deletion" | "file delete" => Self::FileDeletion,
            "moved to vector store" | "move" => Self::MovedToVectorStore,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for ActivityAction {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ActivityAction> for String {
    fn from(action: ActivityAction) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The backend spells this key `uername`.
    #[serde(rename = "uername", alias = "username", default)]
    pub user: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub domain: String,
    /// `"null"` for activities that do not touch a file.
    #[serde(default)]
    pub file: String,
    pub action: ActivityAction,
    #[serde(default)]
    pub date_str: String,
    #[serde(default)]
    pub time_str: String,
}

impl Activity {
    pub fn date(&self) -> Option<NaiveDate> {
        parse_day(&self.date_str)
    }

    pub fn file_name(&self) -> Option<&str> {
        match self.file.as_str() {
            "" | "null" => None,
            name => Some(name),
        }
    }
}
