//! Mutations the admin can confirm and run.
//!
//! Each [`PendingAction`] validates locally, carries the warning shown before
//! confirmation, runs its backend calls in order (stopping at the first
//! failure), and names the listings it makes stale.

use thiserror::Error;
use tracing::info;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::ingest::ChunkingParams;
use crate::models::{Document, FileAction};
use crate::refresh::RefreshKey;
use crate::session::Principal;
use crate::validate::{
    validate_course_code, validate_domain_name, validate_email, ValidationError,
};

pub const FOLDER_DELETION_WARNING: &str = "Deleting this folder will delete all the content inside.";

pub const ROOT_FILE_WARNING: &str =
    "This is the root file. Deleting it will delete all other versions of this file if they exist.";

/// A mutation awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    CreateCourse {
        code: String,
        description: Option<String>,
    },
    DeleteCourse {
        course: String,
    },
    CreateDomain {
        course: String,
        domain: String,
    },
    DeleteDomain {
        course: String,
        domain: String,
    },
    /// Remove embeddings, then the record and blob.
    DeleteFile {
        course: String,
        domain: String,
        file: Document,
    },
    /// Remove the record and blob of a file that was never vectorized.
    DeleteBlob {
        course: String,
        domain: String,
        file: Document,
    },
    MoveToVectorStore {
        course: String,
        domain: String,
        file: Document,
        chunking: ChunkingParams,
    },
    ShareCourse {
        course: String,
        email: String,
    },
    RevokeAccess {
        course: String,
        user: String,
    },
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Cannot {action} '{file}' in its current state")]
    NotAllowed { action: &'static str, file: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub message: String,
    /// Listings to invalidate.
    pub refresh: Vec<RefreshKey>,
}

impl PendingAction {
    /// Short description for the confirmation prompt.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateCourse { code, .. } => format!("Create course {}", code),
            Self::DeleteCourse { course } => format!("Delete course {}", course),
            Self::CreateDomain { course, domain } => {
                format!("Create domain {} in {}", domain, course)
            }
            Self::DeleteDomain { course, domain } => {
                format!("Delete domain {} from {}", domain, course)
            }
            Self::DeleteFile { file, .. } => format!("Delete {}", file.name),
            Self::DeleteBlob { file, .. } => format!("Delete {} from file storage", file.name),
            Self::MoveToVectorStore { file, .. } => {
                format!("Move {} to the vector store", file.name)
            }
            Self::ShareCourse { course, email } => format!("Share {} with {}", course, email),
            Self::RevokeAccess { course, user } => {
                format!("Revoke {}'s access to {}", user, course)
            }
        }
    }

    /// Advisory shown before a destructive action.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Self::DeleteCourse { .. } | Self::DeleteDomain { .. } => Some(FOLDER_DELETION_WARNING),
            Self::DeleteFile { file, .. } | Self::DeleteBlob { file, .. } if file.is_root_blob => {
                Some(ROOT_FILE_WARNING)
            }
            _ => None,
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::DeleteCourse { .. }
                | Self::DeleteDomain { .. }
                | Self::DeleteFile { .. }
                | Self::DeleteBlob { .. }
                | Self::RevokeAccess { .. }
        )
    }

    /// Listings made stale by this action.
    pub fn refresh_keys(&self) -> Vec<RefreshKey> {
        match self {
            Self::CreateCourse { .. } => vec![RefreshKey::Courses],
            Self::DeleteCourse { course } => vec![
                RefreshKey::Courses,
                RefreshKey::domains(course),
                RefreshKey::Activities,
            ],
            Self::CreateDomain { course, .. } => {
                vec![RefreshKey::domains(course), RefreshKey::Activities]
            }
            Self::DeleteDomain { course, domain } => vec![
                RefreshKey::domains(course),
                RefreshKey::files(course, domain),
                RefreshKey::Activities,
            ],
            Self::DeleteFile { course, domain, .. }
            | Self::DeleteBlob { course, domain, .. }
            | Self::MoveToVectorStore { course, domain, .. } => {
                vec![RefreshKey::files(course, domain), RefreshKey::Activities]
            }
            Self::ShareCourse { course, .. } | Self::RevokeAccess { course, .. } => {
                vec![RefreshKey::access(course)]
            }
        }
    }

    /// Local checks, run before any request.
    pub fn validate(&self) -> Result<(), ActionError> {
        match self {
            Self::CreateCourse { code, .. } => validate_course_code(code)?,
            Self::CreateDomain { domain, .. } => validate_domain_name(domain)?,
            Self::ShareCourse { email, .. } => validate_email(email)?,
            Self::MoveToVectorStore { file, chunking, .. } => {
                chunking.validate()?;
                require(file, FileAction::MoveToVectorStore)?;
            }
            Self::DeleteFile { file, .. } => require(file, FileAction::Delete)?,
            Self::DeleteBlob { file, .. } => require(file, FileAction::DeleteFromStorage)?,
            Self::DeleteCourse { .. } | Self::DeleteDomain { .. } | Self::RevokeAccess { .. } => {}
        }
        Ok(())
    }

    /// Run the action's backend calls in order, stopping at the first failure.
    pub async fn execute(
        &self,
        api: &ApiClient,
        principal: &Principal,
    ) -> Result<ActionOutcome, ActionError> {
        self.validate()?;
        let user = principal.username();

        let message = match self {
            Self::CreateCourse { code, description } => {
                api.create_course(code, description.as_deref().unwrap_or(code), user)
                    .await?
            }
            Self::DeleteCourse { course } => api.delete_course(course).await?,
            Self::CreateDomain { course, domain } => {
                api.create_domain(course, domain, user).await?
            }
            Self::DeleteDomain { course, domain } => {
                api.delete_domain(course, domain, user).await?
            }
            Self::DeleteFile {
                course,
                domain,
                file,
            } => {
                api.delete_embeddings(course, file).await?;
                api.delete_document(course, domain, file, user).await?
            }
            Self::DeleteBlob {
                course,
                domain,
                file,
            } => api.delete_document(course, domain, file, user).await?,
            Self::MoveToVectorStore {
                course,
                domain,
                file,
                chunking,
            } => {
                let message = api
                    .move_to_vector_store(course, domain, file, *chunking)
                    .await?;
                api.record_movement(course, domain, file, user).await?;
                message
            }
            Self::ShareCourse { course, email } => api.invite_user(course, email).await?,
            Self::RevokeAccess { course, user: target } => {
                api.revoke_access(course, target).await?
            }
        };

        info!("{}: {}", self.describe(), message);
        Ok(ActionOutcome {
            message,
            refresh: self.refresh_keys(),
        })
    }
}

fn require(file: &Document, action: FileAction) -> Result<(), ActionError> {
    if file.allows(action) {
        Ok(())
    } else {
        Err(ActionError::NotAllowed {
            action: match action {
                FileAction::Delete => "delete",
                FileAction::DeleteFromStorage => "delete from file storage",
                FileAction::MoveToVectorStore => "move to the vector store",
            },
            file: file.name.clone(),
        })
    }
}
