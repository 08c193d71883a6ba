//! The bundled full-stack bootstrap.
//!
//! # Modules
//!
//! - [`fullstack`] - Plan for a Python API backend plus TypeScript frontend
//! - [`host_os`] - Host operating system and package manager detection

pub mod fullstack;
pub mod host_os;

pub use fullstack::{activate_installed_node, build_plan, BootstrapOptions, ManagerRoots};
pub use host_os::HostOs;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StackupError};

static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap());

/// Check that a project name is usable as a directory and package name.
pub fn validate_project_name(name: &str) -> Result<()> {
    if PROJECT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(StackupError::InvalidInvocation {
            message: format!(
                "invalid project name '{}': use a letter followed by letters, digits, '-' or '_'",
                name
            ),
        })
    }
}

/// Where the project lives: an explicit root (made absolute against
/// `cwd`) or `<cwd>/<name>`.
pub fn resolve_root(name: &str, root: Option<&Path>, cwd: &Path) -> PathBuf {
    match root {
        Some(root) if root.is_absolute() => root.to_path_buf(),
        Some(root) => cwd.join(root),
        None => cwd.join(name),
    }
}
