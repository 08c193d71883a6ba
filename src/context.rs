//! Project context threaded through a plan run.
//!
//! The root path and project name are fixed when the context is created.
//! Resolved tool versions only ever grow: the plan runner records a version
//! whenever a probe reports one, and later steps and templates read it back.
//! Nothing is persisted; every run re-derives state from the host.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, StackupError};

/// Accumulated state for one bootstrap run.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root_path: PathBuf,
    project_name: String,
    pinned_versions: BTreeMap<String, String>,
    resolved_versions: BTreeMap<String, String>,
}

impl ProjectContext {
    /// Create a context for `project_name` rooted at `root_path`.
    ///
    /// The root must be absolute; it is never relocated during a run.
    pub fn new(project_name: impl Into<String>, root_path: impl Into<PathBuf>) -> Result<Self> {
        let root_path = root_path.into();
        if !root_path.is_absolute() {
            return Err(StackupError::InvalidInvocation {
                message: format!("root path must be absolute: {}", root_path.display()),
            });
        }
        let project_name = project_name.into();
        if project_name.is_empty() {
            return Err(StackupError::InvalidInvocation {
                message: "project name cannot be empty".to_string(),
            });
        }
        Ok(Self {
            root_path,
            project_name,
            pinned_versions: BTreeMap::new(),
            resolved_versions: BTreeMap::new(),
        })
    }

    /// Pin the wanted version of a tool.
    pub fn with_pin(mut self, tool: impl Into<String>, version: impl Into<String>) -> Self {
        self.pinned_versions.insert(tool.into(), version.into());
        self
    }

    /// The project root.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// The project name.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// A path inside the project root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root_path.join(relative)
    }

    /// Resolve a possibly relative path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_path.join(path)
        }
    }

    /// Pinned version for a tool.
    pub fn pinned(&self, tool: &str) -> Option<&str> {
        self.pinned_versions.get(tool).map(String::as_str)
    }

    /// Concrete version observed for a tool during this run.
    pub fn resolved(&self, tool: &str) -> Option<&str> {
        self.resolved_versions.get(tool).map(String::as_str)
    }

    /// All resolved versions.
    pub fn resolved_versions(&self) -> &BTreeMap<String, String> {
        &self.resolved_versions
    }

    /// Record a resolved version. Returns `false` if the tool already had one.
    ///
    /// An existing entry is never replaced.
    pub fn record_version(&mut self, tool: &str, version: &str) -> bool {
        if self.resolved_versions.contains_key(tool) {
            return false;
        }
        self.resolved_versions
            .insert(tool.to_string(), version.to_string());
        true
    }

    /// Placeholder values for templates.
    ///
    /// Includes `project_name`, `root_path`, `<tool>_version` for every pin
    /// and `<tool>_resolved` for every resolved version.
    pub fn substitutions(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("project_name".to_string(), self.project_name.clone());
        values.insert(
            "root_path".to_string(),
            self.root_path.display().to_string(),
        );
        for (tool, version) in &self.pinned_versions {
            values.insert(format!("{}_version", tool), version.clone());
        }
        for (tool, version) in &self.resolved_versions {
            values.insert(format!("{}_resolved", tool), version.clone());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        std::env::temp_dir().join("demo")
    }

    #[test]
    fn relative_root_is_rejected() {
        let err = ProjectContext::new("demo", "relative/demo").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(ProjectContext::new("", root()).is_err());
    }

    #[test]
    fn resolved_versions_grow_monotonically() {
        let mut ctx = ProjectContext::new("demo", root()).unwrap();
        assert!(ctx.record_version("python", "3.12.1"));
        assert!(!ctx.record_version("python", "3.9.0"));
        assert_eq!(ctx.resolved("python"), Some("3.12.1"));
    }

    #[test]
    fn substitutions_include_pins_and_resolutions() {
        let mut ctx = ProjectContext::new("demo", root())
            .unwrap()
            .with_pin("node", "20");
        ctx.record_version("node", "20.11.0");

        let values = ctx.substitutions();
        assert_eq!(values["project_name"], "demo");
        assert_eq!(values["node_version"], "20");
        assert_eq!(values["node_resolved"], "20.11.0");
        assert_eq!(values["root_path"], root().display().to_string());
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let ctx = ProjectContext::new("demo", root()).unwrap();
        let abs = std::env::temp_dir().join("elsewhere");
        assert_eq!(ctx.resolve(&abs), abs);
        assert_eq!(ctx.resolve(Path::new("backend")), root().join("backend"));
    }
}
