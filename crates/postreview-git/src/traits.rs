use async_trait::async_trait;
use std::path::Path;

use crate::GitError;

/// Change status passed to `git diff --diff-filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeFilter {
    Modified,
    Deleted,
    Added,
}

impl ChangeFilter {
    /// The single-letter code git expects
    pub fn letter(&self) -> char {
        match self {
            ChangeFilter::Modified => 'M',
            ChangeFilter::Deleted => 'D',
            ChangeFilter::Added => 'A',
        }
    }
}

impl std::fmt::Display for ChangeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeFilter::Modified => write!(f, "modified"),
            ChangeFilter::Deleted => write!(f, "deleted"),
            ChangeFilter::Added => write!(f, "added"),
        }
    }
}

/// One `git archive` invocation restricted to an explicit path list
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRequest<'a> {
    /// Tree prefix injected into every entry, e.g. `old/`
    pub prefix: &'a str,
    /// Commit to export the paths from
    pub reference: &'a str,
    /// Decoded repository-relative paths
    pub paths: &'a [String],
    /// Where git writes the zip file
    pub output: &'a Path,
}

/// The version-control operations the export pipeline depends on
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Raw `git diff --name-only --diff-filter=<filter>` output between two refs.
    ///
    /// Paths are newline-delimited and may be quote-wrapped with octal escapes.
    async fn list_changes(
        &self,
        filter: ChangeFilter,
        from: &str,
        to: &str,
    ) -> Result<String, GitError>;

    /// Write a zip archive of `request.paths` at `request.reference`.
    async fn archive(&self, request: &ArchiveRequest<'_>) -> Result<(), GitError>;
}
