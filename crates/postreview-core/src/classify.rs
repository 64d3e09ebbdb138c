use std::collections::BTreeSet;

use postreview_git::{ChangeFilter, Vcs};
use tracing::debug;

use crate::ExportError;

/// Repository-relative path tokens, quote-trimmed but still escaped
pub type FileSet = BTreeSet<String>;

/// Files to export for each side of the review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSets {
    /// Modified and deleted paths, taken from the older commit
    pub old_files: FileSet,
    /// Modified and added paths, taken from the newer commit
    pub new_files: FileSet,
}

impl ChangeSets {
    pub fn is_empty(&self) -> bool {
        self.old_files.is_empty() && self.new_files.is_empty()
    }
}

/// Split one `git diff --name-only` listing into path tokens.
///
/// Lines may end in `\n` or `\r\n`. Wrapping double quotes are trimmed and
/// blank lines dropped.
pub fn parse_listing(output: &str) -> impl Iterator<Item = &str> {
    output
        .split(['\n', '\r'])
        .map(|token| token.trim_matches('"'))
        .filter(|token| !token.is_empty())
}

/// Partition the three change listings into old and new file sets.
///
/// Renames are not queried, so a path that only moved shows up in neither set.
pub fn classify(modified: &str, deleted: &str, added: &str) -> ChangeSets {
    let old_files = parse_listing(modified)
        .chain(parse_listing(deleted))
        .map(str::to_string)
        .collect();
    let new_files = parse_listing(modified)
        .chain(parse_listing(added))
        .map(str::to_string)
        .collect();

    ChangeSets {
        old_files,
        new_files,
    }
}

/// Query git for modified, deleted and added paths between two refs.
pub async fn classify_files(
    vcs: &dyn Vcs,
    from: &str,
    to: &str,
) -> Result<ChangeSets, ExportError> {
    let modified = vcs.list_changes(ChangeFilter::Modified, from, to).await?;
    let deleted = vcs.list_changes(ChangeFilter::Deleted, from, to).await?;
    let added = vcs.list_changes(ChangeFilter::Added, from, to).await?;

    let sets = classify(&modified, &deleted, &added);

    debug!(
        old_files = sets.old_files.len(),
        new_files = sets.new_files.len(),
        "Classified changed files"
    );

    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> FileSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_partitions_by_status() {
        let sets = classify("src/m.rs\n", "src/d.rs\n", "src/a.rs\n");

        assert_eq!(sets.old_files, set(&["src/m.rs", "src/d.rs"]));
        assert_eq!(sets.new_files, set(&["src/m.rs", "src/a.rs"]));
    }

    #[test]
    fn test_classify_empty_listings() {
        let sets = classify("", "\n", "");
        assert!(sets.is_empty());
    }

    #[test]
    fn test_parse_listing_trims_quotes_and_crlf() {
        let output = "plain.txt\r\n\"\\346\\227\\245.txt\"\r\n\r\nlast.md";
        let tokens: Vec<&str> = parse_listing(output).collect();

        assert_eq!(tokens, vec!["plain.txt", r"\346\227\245.txt", "last.md"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let sets = classify("a.txt\na.txt\n", "a.txt\n", "");
        assert_eq!(sets.old_files, set(&["a.txt"]));
        assert_eq!(sets.new_files, set(&["a.txt"]));
    }
}
