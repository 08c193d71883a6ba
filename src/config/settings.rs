//! User settings file.
//!
//! Settings live in `$XDG_CONFIG_HOME/stackup/config.yml` (or
//! `~/.config/stackup/config.yml`) unless `--config` names another file. A
//! missing file means defaults; command-line flags override whatever the
//! file says.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackupError};
use crate::probe::Version;
use crate::template::ConflictPolicy;

/// Bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Python version installed with pyenv.
    #[serde(deserialize_with = "version_string")]
    pub python_version: String,

    /// Node.js version installed with nvm.
    #[serde(deserialize_with = "version_string")]
    pub node_version: String,

    /// System packages installed with the host package manager.
    pub system_packages: Vec<String>,

    /// What to do with existing files that differ from a template.
    pub on_conflict: ConflictPolicy,

    /// Profile file for version-manager setup (defaults to the login
    /// shell's rc file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_profile: Option<PathBuf>,

    /// Install backend and frontend dependencies.
    pub install_dependencies: bool,
}

/// Accept `20` and `3.12` unquoted as well as strings.
///
/// Unquoted YAML numbers lose trailing zeros (`3.10` reads as `3.1`), so
/// such versions must be quoted.
fn version_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version, got {:?}",
            other
        ))),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            python_version: "3.12".to_string(),
            node_version: "20".to_string(),
            system_packages: vec!["git".to_string(), "curl".to_string()],
            on_conflict: ConflictPolicy::Skip,
            shell_profile: None,
            install_dependencies: true,
        }
    }
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> Option<PathBuf> {
        crate::sys::config_dir().map(|dir| dir.join("stackup").join("config.yml"))
    }

    /// Load settings from `explicit`, else from the default location.
    ///
    /// An explicitly named file must exist; the default one may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(StackupError::ConfigParse {
                        path: path.to_path_buf(),
                        message: "file not found".to_string(),
                    });
                }
                Self::load_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a settings file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StackupError::io_at(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse settings text; `path` is used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self =
            serde_yaml::from_str(content).map_err(|e| StackupError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        settings.validate(path)?;
        Ok(settings)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for (field, value) in [
            ("python_version", &self.python_version),
            ("node_version", &self.node_version),
        ] {
            if value.parse::<Version>().is_err() {
                return Err(StackupError::ConfigParse {
                    path: path.to_path_buf(),
                    message: format!("{} must be a numeric version, got '{}'", field, value),
                });
            }
        }
        if let Some(bad) = self
            .system_packages
            .iter()
            .find(|p| p.is_empty() || p.starts_with('-') || p.contains(char::is_whitespace))
        {
            return Err(StackupError::ConfigParse {
                path: path.to_path_buf(),
                message: format!("invalid system package name '{}'", bad),
            });
        }
        Ok(())
    }
}
