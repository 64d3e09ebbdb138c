use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{ExportError, Side};

/// Create `export_dir/<side>/<parent>` for the parent of every path.
///
/// Called with the side opposite to the one being exported, so an added file
/// leaves an empty folder under `old/` and a deleted file an empty folder
/// under `new/`. Top-level paths ensure the side root itself exists.
/// Returns the number of distinct directories ensured.
pub fn provision_mirror_dirs(
    export_dir: &Path,
    side: Side,
    paths: &[String],
) -> Result<usize, ExportError> {
    let root = export_dir.join(side.dir_name());

    let dirs: BTreeSet<PathBuf> = paths
        .iter()
        .map(|path| match Path::new(path).parent() {
            Some(parent) => root.join(parent),
            None => root.clone(),
        })
        .collect();

    for dir in &dirs {
        std::fs::create_dir_all(dir).map_err(ExportError::io(dir))?;
    }

    Ok(dirs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_parents_on_given_side() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            "src/lib/a.rs".to_string(),
            "src/lib/b.rs".to_string(),
            "docs/guide.md".to_string(),
        ];

        let count = provision_mirror_dirs(dir.path(), Side::New, &paths).unwrap();

        assert_eq!(count, 2);
        assert!(dir.path().join("new/src/lib").is_dir());
        assert!(dir.path().join("new/docs").is_dir());
        assert!(!dir.path().join("old").exists());
        assert!(!dir.path().join("new/src/lib/a.rs").exists());
    }

    #[test]
    fn test_top_level_file_creates_side_root() {
        let dir = TempDir::new().unwrap();
        provision_mirror_dirs(dir.path(), Side::Old, &["README.md".to_string()]).unwrap();
        assert!(dir.path().join("old").is_dir());
    }

    #[test]
    fn test_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let paths = vec!["a/b/c.txt".to_string()];

        provision_mirror_dirs(dir.path(), Side::Old, &paths).unwrap();
        std::fs::write(dir.path().join("old/a/b/c.txt"), "extracted").unwrap();
        provision_mirror_dirs(dir.path(), Side::Old, &paths).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("old/a/b/c.txt")).unwrap(),
            "extracted"
        );
    }
}
