use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use postreview_git::Vcs;
use postreview_logging::{LogEvent, Logger};

use crate::batch::{ArchiveBatcher, DEFAULT_BATCH_LIMIT};
use crate::classify::classify_files;
use crate::{ExportError, Side};

/// What to export and where
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub from: String,
    pub to: String,
    pub export_dir: PathBuf,
}

impl ExportRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, export_dir: PathBuf) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            export_dir,
        }
    }
}

/// Counts for a finished export
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub from: String,
    pub to: String,
    pub export_dir: PathBuf,
    pub old_files: usize,
    pub new_files: usize,
    pub old_batches: usize,
    pub new_batches: usize,
    pub total_duration_secs: f64,
}

impl ExportSummary {
    pub fn total_batches(&self) -> usize {
        self.old_batches + self.new_batches
    }
}

/// Builds the `old/` and `new/` trees for a commit range
pub struct ReviewExporter<'a> {
    vcs: &'a dyn Vcs,
    logger: Arc<Logger>,
    batch_limit: usize,
}

impl<'a> ReviewExporter<'a> {
    pub fn new(vcs: &'a dyn Vcs, logger: Arc<Logger>) -> Self {
        Self {
            vcs,
            logger,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Classify, then export the old side followed by the new side.
    pub async fn run(&self, request: &ExportRequest) -> Result<ExportSummary, ExportError> {
        let result = self.export(request).await;
        if let Err(ref e) = result {
            warn!(error = %e, "Export failed");
            self.logger.log(&LogEvent::ErrorEncountered {
                error: e.to_string(),
            });
        }
        result
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportSummary, ExportError> {
        let start = Instant::now();

        self.logger.log(&LogEvent::ExportStarted {
            from: request.from.clone(),
            to: request.to.clone(),
            export_dir: request.export_dir.clone(),
        });

        let sets = classify_files(self.vcs, &request.from, &request.to).await?;
        if sets.is_empty() {
            info!(from = %request.from, to = %request.to, "No changed files");
        }

        self.logger.log(&LogEvent::FilesClassified {
            old_files: sets.old_files.len(),
            new_files: sets.new_files.len(),
        });

        let batcher = ArchiveBatcher::new(self.vcs, &self.logger, self.batch_limit);
        let old = batcher
            .export_side(Side::Old, &request.from, &sets.old_files, &request.export_dir)
            .await?;
        let new = batcher
            .export_side(Side::New, &request.to, &sets.new_files, &request.export_dir)
            .await?;

        let summary = ExportSummary {
            from: request.from.clone(),
            to: request.to.clone(),
            export_dir: request.export_dir.clone(),
            old_files: old.files,
            new_files: new.files,
            old_batches: old.batches,
            new_batches: new.batches,
            total_duration_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            old_files = summary.old_files,
            new_files = summary.new_files,
            batches = summary.total_batches(),
            "Export complete"
        );

        self.logger.log(&LogEvent::ExportCompleted {
            old_files: summary.old_files,
            new_files: summary.new_files,
            batches: summary.total_batches(),
            duration_secs: summary.total_duration_secs,
        });

        Ok(summary)
    }
}
