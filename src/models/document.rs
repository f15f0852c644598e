//! Uploaded files and their lifecycle flags.
//!
//! A file starts as a blob in course storage and becomes searchable once it
//! is moved into the vector store. `is_root_blob` marks the original upload;
//! later versions of the same name share its blob path.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A file record as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub blob_name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub date_str: String,
    #[serde(default)]
    pub time_str: String,
    #[serde(default, with = "yes_no")]
    pub in_vector_store: bool,
    #[serde(default, with = "yes_no")]
    pub is_root_blob: bool,
}

/// Mutations offered for a file, depending on its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Remove embeddings, then the record and blob.
    Delete,
    /// Remove a non-root blob that never reached the vector store.
    DeleteFromStorage,
    MoveToVectorStore,
}

impl FileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::DeleteFromStorage => "delete-blob",
            Self::MoveToVectorStore => "move",
        }
    }
}

impl Document {
    /// Upload date, if the backend sent a parseable one.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_day(&self.date_str)
    }

    pub fn actions(&self) -> Vec<FileAction> {
        let mut actions = Vec::new();
        if self.in_vector_store || self.is_root_blob {
            actions.push(FileAction::Delete);
        }
        if !self.in_vector_store && !self.is_root_blob {
            actions.push(FileAction::DeleteFromStorage);
        }
        if !self.in_vector_store {
            actions.push(FileAction::MoveToVectorStore);
        }
        actions
    }

    pub fn allows(&self, action: FileAction) -> bool {
        self.actions().contains(&action)
    }
}

/// Parse a backend `date_str` (`YYYY-MM-DD`).
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// The backend stores flags as `"yes"`/`"no"` strings.
mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => b,
            Raw::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
            }
        })
    }
}
