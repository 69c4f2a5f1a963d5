pub mod append;
pub mod convert;
pub mod diff;
pub mod init;
pub mod render;
pub mod search;

pub use append::{append, AppendArgs};
pub use convert::{convert, ConvertArgs};
pub use diff::{diff, DiffArgs};
pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use search::{search, SearchArgs};

use std::path::{Path, PathBuf};

/// Resolve a command-line path against the working directory
pub(crate) fn resolve_path(cwd: &str, path: &Path) -> PathBuf {
    PathBuf::from(cwd).join(path)
}
