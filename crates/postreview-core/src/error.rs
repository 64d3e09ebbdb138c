use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid octal digit '{digit}' at offset {offset} in {path:?}")]
    InvalidDigit {
        path: String,
        offset: usize,
        digit: char,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Git error: {0}")]
    GitError(#[from] postreview_git::GitError),

    #[error("Filename decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Failed to extract {}: {source}", archive.display())]
    ExtractFailed {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry escapes the export directory: {0}")]
    UnsafeEntry(String),

    #[error("IO error at {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ExportError::IoError { path, source }
    }
}
