use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::GitError;

/// Finds the git executable on the host
pub trait GitLocator {
    fn locate(&self) -> Result<PathBuf, GitError>;
}

/// Uses a path the user configured explicitly
#[derive(Debug, Clone)]
pub struct ExplicitLocator {
    path: PathBuf,
}

impl ExplicitLocator {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl GitLocator for ExplicitLocator {
    fn locate(&self) -> Result<PathBuf, GitError> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(GitError::NotFound(self.path.display().to_string()))
        }
    }
}

/// Searches the directories listed in `PATH`
#[derive(Debug, Clone, Default)]
pub struct PathLocator {
    search_path: Option<OsString>,
}

impl PathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search this list instead of the process environment
    pub fn with_search_path(search_path: OsString) -> Self {
        Self {
            search_path: Some(search_path),
        }
    }

    fn executable_name() -> &'static str {
        if cfg!(windows) {
            "git.exe"
        } else {
            "git"
        }
    }
}

impl GitLocator for PathLocator {
    fn locate(&self) -> Result<PathBuf, GitError> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_default();

        let found = std::env::split_paths(&search_path)
            .map(|dir| dir.join(Self::executable_name()))
            .find(|candidate| is_executable(candidate));

        match found {
            Some(path) => {
                debug!(path = %path.display(), "Located git on PATH");
                Ok(path)
            }
            None => Err(GitError::NotFound(format!(
                "{} is not on PATH",
                Self::executable_name()
            ))),
        }
    }
}

/// Tries each locator in order and returns the first hit
pub struct FallbackLocator {
    locators: Vec<Box<dyn GitLocator>>,
}

impl FallbackLocator {
    pub fn new(locators: Vec<Box<dyn GitLocator>>) -> Self {
        Self { locators }
    }
}

impl GitLocator for FallbackLocator {
    fn locate(&self) -> Result<PathBuf, GitError> {
        let mut last_err = GitError::NotFound("no git locator configured".to_string());
        for locator in &self.locators {
            match locator.locate() {
                Ok(path) => return Ok(path),
                Err(e) => {
                    debug!(error = %e, "Git locator missed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

/// Reads the Git for Windows install directory from the registry
#[cfg(windows)]
#[derive(Debug, Clone, Default)]
pub struct RegistryLocator;

#[cfg(windows)]
impl GitLocator for RegistryLocator {
    fn locate(&self) -> Result<PathBuf, GitError> {
        use winreg::enums::HKEY_LOCAL_MACHINE;
        use winreg::RegKey;

        let install: String = RegKey::predef(HKEY_LOCAL_MACHINE)
            .open_subkey(GIT_FOR_WINDOWS_KEY)
            .and_then(|key| key.get_value("InstallPath"))
            .map_err(|e| GitError::NotFound(format!("HKLM\\{GIT_FOR_WINDOWS_KEY}: {e}")))?;

        let path = git_in_install_dir(Path::new(&install));
        if path.is_file() {
            debug!(path = %path.display(), "Located git from registry");
            Ok(path)
        } else {
            Err(GitError::NotFound(path.display().to_string()))
        }
    }
}

#[cfg(windows)]
const GIT_FOR_WINDOWS_KEY: &str = r"SOFTWARE\GitForWindows";

#[cfg_attr(not(windows), allow(dead_code))]
fn git_in_install_dir(install_dir: &Path) -> PathBuf {
    install_dir.join("bin").join("git.exe")
}

/// Discovery used when no executable is configured: the Git for Windows
/// registry entry first on Windows, then `PATH`.
pub fn host_locator() -> FallbackLocator {
    let mut locators: Vec<Box<dyn GitLocator>> = Vec::new();
    #[cfg(windows)]
    locators.push(Box::new(RegistryLocator));
    locators.push(Box::new(PathLocator::new()));
    FallbackLocator::new(locators)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
