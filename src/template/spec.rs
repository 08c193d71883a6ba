//! Template descriptions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::interpolation::render;

/// What to do when the destination exists with different content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Leave the existing file untouched.
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
    /// Copy the existing file to `<name>.bak`, then replace it.
    BackupThenOverwrite,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::BackupThenOverwrite => "backup_then_overwrite",
        };
        f.write_str(name)
    }
}

/// A file to materialize from a template.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    destination: PathBuf,
    content: String,
    values: BTreeMap<String, String>,
    on_conflict: ConflictPolicy,
}

impl TemplateSpec {
    /// Emit `content` to `destination` (relative to the project root).
    pub fn new(destination: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            content: content.into(),
            values: BTreeMap::new(),
            on_conflict: ConflictPolicy::default(),
        }
    }

    /// Add a substitution value.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Set the conflict policy.
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }

    /// Destination path as given.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Conflict policy.
    pub fn policy(&self) -> ConflictPolicy {
        self.on_conflict
    }

    /// Raw template text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Substitute placeholders from this spec's own values.
    pub fn render(&self) -> Result<String> {
        self.render_over(&BTreeMap::new())
    }

    /// Substitute placeholders from `base` overlaid with this spec's values.
    pub fn render_over(&self, base: &BTreeMap<String, String>) -> Result<String> {
        let mut values = base.clone();
        values.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        render(&self.destination.display().to_string(), &self.content, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_values_win_over_base() {
        let spec = TemplateSpec::new("README.md", "# {{project_name}}")
            .with_value("project_name", "override");
        let mut base = BTreeMap::new();
        base.insert("project_name".to_string(), "demo".to_string());
        assert_eq!(spec.render_over(&base).unwrap(), "# override");
    }

    #[test]
    fn errors_name_destination() {
        let err = TemplateSpec::new("backend/main.py", "{{missing}}")
            .render()
            .unwrap_err();
        assert!(err.to_string().contains("backend/main.py"));
    }

    #[test]
    fn policy_serde_names() {
        let policy: ConflictPolicy = serde_yaml::from_str("backup_then_overwrite").unwrap();
        assert_eq!(policy, ConflictPolicy::BackupThenOverwrite);
        assert_eq!(policy.to_string(), "backup_then_overwrite");
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::Skip);
    }
}
