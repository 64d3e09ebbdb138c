//! # postreview-core
//!
//! Builds a side-by-side review export: for two commits, an `old/` and a
//! `new/` tree holding only the files that changed between them.
//!
//! ## Pipeline
//!
//! 1. [`classify_files`] asks git for modified, deleted and added paths.
//! 2. [`decode_path`] turns git's octal escapes back into UTF-8.
//! 3. [`provision_mirror_dirs`] creates empty folders on the opposite side.
//! 4. [`ArchiveBatcher`] runs `git archive` in size-bounded batches and
//!    extracts each zip into the export directory.
//!
//! [`ReviewExporter`] drives the whole run, one side after the other.

mod batch;
mod classify;
mod decode;
mod error;
mod export;
mod extract;
mod provision;
mod side;

pub use batch::{
    base_command_len, plan_batches, quoted_len, ArchiveBatcher, Batch, SideReport,
    DEFAULT_BATCH_LIMIT,
};
pub use classify::{classify, classify_files, parse_listing, ChangeSets, FileSet};
pub use decode::decode_path;
pub use error::{DecodeError, ExportError};
pub use export::{ExportRequest, ExportSummary, ReviewExporter};
pub use extract::{extract_zip, ArchiveGuard};
pub use provision::provision_mirror_dirs;
pub use side::Side;
