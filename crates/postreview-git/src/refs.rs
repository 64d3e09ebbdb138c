use git2::Repository;
use std::path::Path;
use tracing::debug;

use crate::GitError;

/// Check that `repo_dir` is inside a repository and every ref names a commit.
///
/// Runs before any git process is spawned so a typo in a ref is reported by
/// name instead of as a failed `git diff`.
pub fn verify_refs(repo_dir: &Path, refs: &[&str]) -> Result<(), GitError> {
    let repo = Repository::discover(repo_dir)
        .map_err(|_| GitError::NotARepo(repo_dir.display().to_string()))?;

    for reference in refs {
        let commit = repo
            .revparse_single(reference)
            .and_then(|object| object.peel_to_commit())
            .map_err(|source| GitError::UnknownRef {
                reference: reference.to_string(),
                source,
            })?;
        debug!(reference = %reference, commit = %commit.id(), "Resolved commit reference");
    }

    Ok(())
}
