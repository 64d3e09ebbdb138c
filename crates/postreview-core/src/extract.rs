use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::ExportError;

/// Removes the archive file when dropped, whether or not extraction succeeded
#[derive(Debug)]
pub struct ArchiveGuard {
    path: PathBuf,
}

impl ArchiveGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed archive"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove archive"),
        }
    }
}

/// Unpack a zip into `dest`, overwriting files that already exist.
///
/// Returns the number of file entries written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, ExportError> {
    let zip_err = |source: zip::result::ZipError| ExportError::ExtractFailed {
        archive: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(ExportError::io(archive))?;
    let mut zip = ZipArchive::new(file).map_err(zip_err)?;
    let mut written = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(zip_err)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ExportError::UnsafeEntry(entry.name().to_string()))?;
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(ExportError::io(&target))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(ExportError::io(parent))?;
        }

        let mode = entry.unix_mode();
        if mode.is_some_and(is_symlink_mode) {
            write_symlink(&mut entry, &target)?;
            written += 1;
            continue;
        }

        // a link left by an earlier run must not be written through
        if fs::symlink_metadata(&target).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(&target).map_err(ExportError::io(&target))?;
        }

        let mut out = File::create(&target).map_err(ExportError::io(&target))?;
        io::copy(&mut entry, &mut out).map_err(ExportError::io(&target))?;

        #[cfg(unix)]
        if let Some(mode) = mode.map(|m| m & 0o777).filter(|m| *m != 0) {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                .map_err(ExportError::io(&target))?;
        }

        written += 1;
    }

    debug!(
        archive = %archive.display(),
        dest = %dest.display(),
        files = written,
        "Extracted archive"
    );

    Ok(written)
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

fn is_symlink_mode(mode: u32) -> bool {
    mode & S_IFMT == S_IFLNK
}

/// Recreate a symlink entry. The entry body is the link target.
#[cfg(unix)]
fn write_symlink(entry: &mut impl io::Read, target: &Path) -> Result<(), ExportError> {
    let mut link = String::new();
    entry
        .read_to_string(&mut link)
        .map_err(ExportError::io(target))?;

    match fs::remove_file(target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ExportError::io(target)(e)),
    }
    std::os::unix::fs::symlink(&link, target).map_err(ExportError::io(target))
}

/// Without unix symlinks the target text is written as a plain file, as git
/// does with `core.symlinks=false`.
#[cfg(not(unix))]
fn write_symlink(entry: &mut impl io::Read, target: &Path) -> Result<(), ExportError> {
    let mut out = File::create(target).map_err(ExportError::io(target))?;
    io::copy(entry, &mut out).map_err(ExportError::io(target))?;
    Ok(())
}
