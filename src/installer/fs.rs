//! Directory creation.

use std::path::PathBuf;

use crate::context::ProjectContext;
use crate::error::{Result, StackupError};
use crate::shell::HostEnv;

use super::Installer;

/// Creates a directory and any missing parents.
#[derive(Debug, Clone)]
pub struct CreateDirInstaller {
    path: PathBuf,
}

impl CreateDirInstaller {
    /// Create `path`; relative paths resolve against the project root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Installer for CreateDirInstaller {
    fn describe(&self) -> String {
        format!("create {}", self.path.display())
    }

    fn execute(&self, _host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()> {
        let full = ctx.resolve(&self.path);
        std::fs::create_dir_all(&full).map_err(|e| StackupError::io_at(&full, e))
    }
}
