//! Exports against a real repository. Skipped when git is not on PATH.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{IndexAddOption, Oid, Repository, Signature};
use postreview_core::{ExportRequest, ReviewExporter};
use postreview_git::{GitCli, GitLocator, PathLocator};
use postreview_logging::{LogFormat, Logger};
use tempfile::TempDir;

fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.update_all(["*"].iter(), None).unwrap();
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Review Bot", "review@example.com").unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Every file below `root`, relative and sorted
fn files_under(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

fn locate_git() -> Option<PathBuf> {
    match PathLocator::new().locate() {
        Ok(path) => Some(path),
        Err(_) => {
            eprintln!("git not on PATH, skipping");
            None
        }
    }
}

#[tokio::test]
async fn test_single_modified_file() {
    let Some(git_path) = locate_git() else {
        return;
    };
    let repo_dir = TempDir::new().unwrap();
    let repo = Repository::init(repo_dir.path()).unwrap();

    write(repo_dir.path(), "src/a.txt", "old content\n");
    write(repo_dir.path(), "src/untouched.txt", "same\n");
    let first = commit_all(&repo, "initial");
    write(repo_dir.path(), "src/a.txt", "new content\n");
    let second = commit_all(&repo, "edit");

    let out = TempDir::new().unwrap();
    let git = GitCli::new(git_path, repo_dir.path().to_path_buf());
    let logger = Arc::new(Logger::new(LogFormat::Compact));
    let request = ExportRequest::new(
        first.to_string(),
        second.to_string(),
        out.path().to_path_buf(),
    );

    ReviewExporter::new(&git, logger.clone())
        .run(&request)
        .await
        .unwrap();

    assert_eq!(
        files_under(out.path()),
        vec!["new/src/a.txt".to_string(), "old/src/a.txt".to_string()]
    );
    assert_eq!(
        fs::read_to_string(out.path().join("old/src/a.txt")).unwrap(),
        "old content\n"
    );
    assert_eq!(
        fs::read_to_string(out.path().join("new/src/a.txt")).unwrap(),
        "new content\n"
    );

    // second run into the same directory
    ReviewExporter::new(&git, logger)
        .run(&request)
        .await
        .unwrap();
    assert_eq!(files_under(out.path()).len(), 2);
}

#[tokio::test]
async fn test_mixed_changes_with_non_ascii_names() {
    let Some(git_path) = locate_git() else {
        return;
    };
    let repo_dir = TempDir::new().unwrap();
    let repo = Repository::init(repo_dir.path()).unwrap();
    // force escaped output regardless of the user's git config
    repo.config().unwrap().set_bool("core.quotepath", true).unwrap();

    write(repo_dir.path(), "keep.md", "v1\n");
    write(repo_dir.path(), "old/removed.txt", "gone soon\n");
    let first = commit_all(&repo, "initial");

    write(repo_dir.path(), "keep.md", "v2\n");
    fs::remove_file(repo_dir.path().join("old/removed.txt")).unwrap();
    write(repo_dir.path(), "資料/メモ.txt", "こんにちは\n");
    let second = commit_all(&repo, "mixed");

    let out = TempDir::new().unwrap();
    let git = GitCli::new(git_path, repo_dir.path().to_path_buf());
    let request = ExportRequest::new(
        first.to_string(),
        second.to_string(),
        out.path().to_path_buf(),
    );

    let summary = ReviewExporter::new(&git, Arc::new(Logger::new(LogFormat::Compact)))
        .run(&request)
        .await
        .unwrap();

    assert_eq!(summary.old_files, 2);
    assert_eq!(summary.new_files, 2);
    assert_eq!(
        files_under(out.path()),
        vec![
            "new/keep.md".to_string(),
            "new/資料/メモ.txt".to_string(),
            "old/keep.md".to_string(),
            "old/old/removed.txt".to_string(),
        ]
    );
    assert!(out.path().join("new/old").is_dir());
    assert!(out.path().join("old/資料").is_dir());
    assert!(!out.path().join("old.zip").exists());
    assert!(!out.path().join("new.zip").exists());
}

#[tokio::test]
async fn test_glob_and_dash_names_are_archived_literally() {
    let Some(git_path) = locate_git() else {
        return;
    };
    let repo_dir = TempDir::new().unwrap();
    let repo = Repository::init(repo_dir.path()).unwrap();

    write(repo_dir.path(), "a.txt", "untouched\n");
    write(repo_dir.path(), "[ab].txt", "bracket v1\n");
    write(repo_dir.path(), "-n.txt", "dash v1\n");
    let first = commit_all(&repo, "initial");

    write(repo_dir.path(), "[ab].txt", "bracket v2\n");
    write(repo_dir.path(), "-n.txt", "dash v2\n");
    let second = commit_all(&repo, "edit");

    let out = TempDir::new().unwrap();
    let git = GitCli::new(git_path, repo_dir.path().to_path_buf());
    let request = ExportRequest::new(
        first.to_string(),
        second.to_string(),
        out.path().to_path_buf(),
    );

    ReviewExporter::new(&git, Arc::new(Logger::new(LogFormat::Compact)))
        .run(&request)
        .await
        .unwrap();

    // a.txt matches the glob `[ab].txt` but did not change
    assert_eq!(
        files_under(out.path()),
        vec![
            "new/-n.txt".to_string(),
            "new/[ab].txt".to_string(),
            "old/-n.txt".to_string(),
            "old/[ab].txt".to_string(),
        ]
    );
    assert_eq!(
        fs::read_to_string(out.path().join("old/-n.txt")).unwrap(),
        "dash v1\n"
    );
    assert_eq!(
        fs::read_to_string(out.path().join("new/[ab].txt")).unwrap(),
        "bracket v2\n"
    );
}
