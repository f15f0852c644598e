//! Spinner feedback for ingestion runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::icons::{error, success};
use narelle_admin::ingest::{IngestError, IngestObserver, IngestReport, IngestStage};

/// Shows the current ingestion stage and prints a line per finished stage.
pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new(total_stages: usize) -> anyhow::Result<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(format!("{} ({} stage(s))", IngestStage::Select, total_stages));
        Ok(Self { bar })
    }

    /// Spinner that draws nothing, for `--json` output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl IngestObserver for StageSpinner {
    fn stage_started(&mut self, stage: IngestStage) {
        self.bar.set_message(format!("{}...", stage));
    }

    fn stage_succeeded(&mut self, stage: IngestStage, message: &str) {
        self.bar
            .println(format!("{} {}: {}", success(), stage, message));
    }

    fn completed(&mut self, report: &IngestReport) {
        self.bar.finish_with_message(format!(
            "{} {} document(s), {} video(s)",
            IngestStage::Done,
            report.documents,
            report.videos
        ));
    }

    fn failed(&mut self, err: &IngestError) {
        self.bar.abandon_with_message(format!("{} {}", error(), err));
    }
}
