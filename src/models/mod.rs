//! Records exchanged with the AskNarelle backend.

mod activity;
mod course;
mod dashboard;
mod document;

pub use activity::{Activity, ActivityAction};
pub use course::{Course, Domain, UserType};
pub use dashboard::{DashboardSummary, Series};
pub use document::{parse_day, Document, FileAction};
