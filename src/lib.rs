//! narelle-admin - administration client for AskNarelle knowledge bases.
//!
//! Wraps the AskNarelle REST backend: courses, domains and files, ingestion
//! into the vector store, the activity log, access sharing and usage
//! dashboards. The backend owns all state; this crate only orchestrates
//! requests against it.

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod refresh;
pub mod session;
pub mod validate;
