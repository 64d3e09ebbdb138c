//! # postreview-git
//!
//! The version-control collaborator for postreview.
//!
//! The export pipeline only ever talks to git through the [`Vcs`] trait, so
//! tests can substitute an in-memory implementation. The real implementation,
//! [`GitCli`], spawns the git executable found by a [`GitLocator`].
//!
//! ## Key Types
//!
//! - [`Vcs`] - change listing and archive export
//! - [`GitCli`] - process-backed [`Vcs`]
//! - [`GitLocator`] - executable discovery ([`PathLocator`], [`ExplicitLocator`],
//!   [`FallbackLocator`]; [`host_locator`] adds the registry lookup on Windows)
//! - [`verify_refs`] - resolve commit references up front via libgit2
//!
//! ## Commands
//!
//! ```text
//! git diff --name-only --diff-filter=<M|D|A> <from> <to>
//! git --literal-pathspecs archive --format=zip --prefix=<side>/ -o <zip> <ref> -- <paths...>
//! ```

mod cli;
mod error;
mod locate;
mod refs;
mod traits;

pub use cli::{archive_args, diff_args, GitCli, ProcessOutput};
pub use error::GitError;
pub use locate::{host_locator, ExplicitLocator, FallbackLocator, GitLocator, PathLocator};
#[cfg(windows)]
pub use locate::RegistryLocator;
pub use refs::verify_refs;
pub use traits::{ArchiveRequest, ChangeFilter, Vcs};
