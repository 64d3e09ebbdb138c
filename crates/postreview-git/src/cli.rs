use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{ArchiveRequest, ChangeFilter, GitError, GitLocator, Vcs};

/// Captured result of a finished git process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs the git executable as a child process
#[derive(Debug, Clone)]
pub struct GitCli {
    binary_path: PathBuf,
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(binary_path: PathBuf, repo_dir: PathBuf) -> Self {
        Self {
            binary_path,
            repo_dir,
        }
    }

    /// Resolve the executable through a locator
    pub fn locate(locator: &dyn GitLocator, repo_dir: PathBuf) -> Result<Self, GitError> {
        let binary_path = locator.locate()?;
        Ok(Self::new(binary_path, repo_dir))
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Check the executable can be launched at all
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Run git to completion. A non-zero exit status is an error.
    pub async fn run(&self, args: &[OsString]) -> Result<ProcessOutput, GitError> {
        let start = Instant::now();
        let command_line = render_args(args);

        debug!(
            binary = %self.binary_path.display(),
            repo_dir = %self.repo_dir.display(),
            args = %command_line,
            "Spawning git process"
        );

        let output = Command::new(&self.binary_path)
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| GitError::SpawnFailed {
                binary: self.binary_path.clone(),
                source,
            })?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        debug!(
            exit_code = result.exit_code,
            duration_ms = start.elapsed().as_millis(),
            stdout_bytes = result.stdout.len(),
            "Git process completed"
        );
        trace!(stderr = %result.stderr, "git stderr");

        if !result.success() {
            return Err(GitError::CommandFailed {
                command: command_line,
                code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(result)
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn list_changes(
        &self,
        filter: ChangeFilter,
        from: &str,
        to: &str,
    ) -> Result<String, GitError> {
        let args = diff_args(filter, from, to);
        let output = self.run(&args).await?;
        debug!(
            filter = %filter,
            paths = output.stdout.lines().count(),
            "Listed changed paths"
        );
        Ok(output.stdout)
    }

    async fn archive(&self, request: &ArchiveRequest<'_>) -> Result<(), GitError> {
        let args = archive_args(request);
        self.run(&args).await?;
        Ok(())
    }
}

/// `diff --name-only --diff-filter=<X> <from> <to>`
pub fn diff_args(filter: ChangeFilter, from: &str, to: &str) -> Vec<OsString> {
    vec![
        "diff".into(),
        "--name-only".into(),
        format!("--diff-filter={}", filter.letter()).into(),
        from.into(),
        to.into(),
    ]
}

/// `--literal-pathspecs archive --format=zip --prefix=<prefix> -o <output> <ref> -- <paths...>`
///
/// Paths are matched literally, so `[ab].txt` never pulls in `a.txt` and a
/// leading `-` is never read as an option.
pub fn archive_args(request: &ArchiveRequest<'_>) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(request.paths.len() + 8);
    args.push("--literal-pathspecs".into());
    args.push("archive".into());
    args.push("--format=zip".into());
    args.push(format!("--prefix={}", request.prefix).into());
    args.push("-o".into());
    args.push(request.output.as_os_str().to_owned());
    args.push(request.reference.into());
    args.push("--".into());
    args.extend(request.paths.iter().map(OsString::from));
    args
}

fn render_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_args_shape() {
        let args = diff_args(ChangeFilter::Deleted, "v1.0", "HEAD");
        assert_eq!(
            render_args(&args),
            "diff --name-only --diff-filter=D v1.0 HEAD"
        );
    }

    #[test]
    fn test_archive_args_shape() {
        let paths = vec!["src/a.txt".to_string(), "docs/read me.md".to_string()];
        let output = PathBuf::from("/tmp/export/old.zip");
        let request = ArchiveRequest {
            prefix: "old/",
            reference: "abc123",
            paths: &paths,
            output: &output,
        };

        let args = archive_args(&request);
        assert_eq!(args.len(), 10);
        assert_eq!(args[0], OsString::from("--literal-pathspecs"));
        assert_eq!(args[1], OsString::from("archive"));
        assert_eq!(args[3], OsString::from("--prefix=old/"));
        assert_eq!(args[4], OsString::from("-o"));
        assert_eq!(args[5], OsString::from("/tmp/export/old.zip"));
        assert_eq!(args[6], OsString::from("abc123"));
        assert_eq!(args[7], OsString::from("--"));
        assert_eq!(args[9], OsString::from("docs/read me.md"));
    }

    #[test]
    fn test_archive_args_keep_option_like_paths_after_separator() {
        let paths = vec!["-n.txt".to_string(), "[ab].txt".to_string()];
        let output = PathBuf::from("new.zip");
        let request = ArchiveRequest {
            prefix: "new/",
            reference: "HEAD",
            paths: &paths,
            output: &output,
        };

        assert_eq!(
            render_args(&archive_args(&request)),
            "--literal-pathspecs archive --format=zip --prefix=new/ -o new.zip HEAD -- -n.txt [ab].txt"
        );
    }
}
