use std::path::Path;

use postreview_git::{ArchiveRequest, Vcs};
use postreview_logging::{LogEvent, Logger};
use tracing::debug;

use crate::extract::{extract_zip, ArchiveGuard};
use crate::provision::provision_mirror_dirs;
use crate::{decode_path, ExportError, FileSet, Side};

/// Estimated command length at which a batch is closed
pub const DEFAULT_BATCH_LIMIT: usize = 1700;

/// Paths exported by one `git archive` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub paths: Vec<String>,
    /// Base command plus every quoted path argument, in characters
    pub estimated_len: usize,
}

/// Length of `archive --format=zip --prefix=<prefix> <reference>`
pub fn base_command_len(prefix: &str, reference: &str) -> usize {
    "archive --format=zip --prefix=".len() + prefix.chars().count() + 1 + reference.chars().count()
}

/// Length a path adds to the command line as ` "<path>"`
pub fn quoted_len(path: &str) -> usize {
    path.chars().count() + 3
}

/// Group paths into batches in the given order.
///
/// Each path is added to the open batch; once the running estimate reaches
/// `limit` the batch is closed and the estimate resets to `base_len`. The
/// path that crosses the limit stays in the batch it crossed. A trailing
/// partial batch is kept, and no input means no batches.
pub fn plan_batches(paths: &[String], base_len: usize, limit: usize) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Batch {
        paths: Vec::new(),
        estimated_len: base_len,
    };

    for path in paths {
        current.paths.push(path.clone());
        current.estimated_len += quoted_len(path);

        if current.estimated_len >= limit {
            let full = std::mem::replace(
                &mut current,
                Batch {
                    paths: Vec::new(),
                    estimated_len: base_len,
                },
            );
            batches.push(full);
        }
    }

    if !current.paths.is_empty() {
        batches.push(current);
    }

    batches
}

/// Result of exporting one side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideReport {
    pub files: usize,
    pub batches: usize,
}

/// Exports one side of the review through batched `git archive` calls
pub struct ArchiveBatcher<'a> {
    vcs: &'a dyn Vcs,
    logger: &'a Logger,
    limit: usize,
}

impl<'a> ArchiveBatcher<'a> {
    pub fn new(vcs: &'a dyn Vcs, logger: &'a Logger, limit: usize) -> Self {
        Self { vcs, logger, limit }
    }

    /// Decode, provision mirror directories, then archive and extract every
    /// batch into `export_dir`. The first failing batch aborts the side.
    pub async fn export_side(
        &self,
        side: Side,
        reference: &str,
        files: &FileSet,
        export_dir: &Path,
    ) -> Result<SideReport, ExportError> {
        let mut decoded = files
            .iter()
            .map(|file| decode_path(file))
            .collect::<Result<Vec<_>, _>>()?;
        decoded.sort();
        decoded.dedup();

        if decoded.is_empty() {
            debug!(side = %side, "No files to export");
            return Ok(SideReport::default());
        }

        provision_mirror_dirs(export_dir, side.opposite(), &decoded)?;

        let base_len = base_command_len(side.prefix(), reference);
        let batches = plan_batches(&decoded, base_len, self.limit);

        debug!(
            side = %side,
            files = decoded.len(),
            batches = batches.len(),
            limit = self.limit,
            "Planned archive batches"
        );

        let archive_path = export_dir.join(side.archive_name());
        for (index, batch) in batches.iter().enumerate() {
            self.run_batch(side, reference, batch, &archive_path, export_dir)
                .await?;

            self.logger.log(&LogEvent::BatchExtracted {
                side: side.to_string(),
                batch: index,
                files: batch.paths.len(),
            });
        }

        let report = SideReport {
            files: decoded.len(),
            batches: batches.len(),
        };

        self.logger.log(&LogEvent::SideCompleted {
            side: side.to_string(),
            files: report.files,
            batches: report.batches,
        });

        Ok(report)
    }

    async fn run_batch(
        &self,
        side: Side,
        reference: &str,
        batch: &Batch,
        archive_path: &Path,
        export_dir: &Path,
    ) -> Result<(), ExportError> {
        // Guard first so a partial file from a failed archive is removed too
        let guard = ArchiveGuard::new(archive_path.to_path_buf());

        self.vcs
            .archive(&ArchiveRequest {
                prefix: side.prefix(),
                reference,
                paths: &batch.paths,
                output: guard.path(),
            })
            .await?;

        extract_zip(guard.path(), export_dir)?;
        Ok(())
    }
}
