use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Unknown commit reference '{reference}': {source}")]
    UnknownRef {
        reference: String,
        #[source]
        source: git2::Error,
    },

    #[error("Git executable not found: {0}")]
    NotFound(String),

    #[error("Failed to launch {}: {source}", binary.display())]
    SpawnFailed {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {command}` exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
}
