//! Executable lookup and version-manager discovery.
//!
//! Version managers (pyenv, nvm, volta, mise) are frequently installed but
//! not on `PATH` in the non-interactive process stackup runs in. The
//! [`ManagerDiscovery`] scan finds them at well-known locations so tool
//! lookups see the same binaries the user's interactive shell would.
//!
//! # Example
//!
//! ```no_run
//! use stackup::probe::path::ManagerDiscovery;
//!
//! let home = std::path::PathBuf::from("/home/dev");
//! let discovery = ManagerDiscovery::run(&home, |key| std::env::var(key).ok());
//! for dir in discovery.augmented_path() {
//!     println!("Additional PATH entry: {}", dir.display());
//! }
//! ```

use std::path::{Path, PathBuf};

/// Definition of a version manager to look for.
struct ManagerDef {
    name: &'static str,
    env_var: Option<&'static str>,
    default_path: &'static str,
    sentinel: &'static str,
    path_subpaths: &'static [&'static str],
}

/// Known version manager definitions.
const MANAGER_DEFS: &[ManagerDef] = &[
    ManagerDef {
        name: "pyenv",
        env_var: Some("PYENV_ROOT"),
        default_path: ".pyenv",
        sentinel: "bin/pyenv",
        path_subpaths: &["bin", "shims"],
    },
    ManagerDef {
        name: "nvm",
        env_var: Some("NVM_DIR"),
        default_path: ".nvm",
        sentinel: "nvm.sh",
        path_subpaths: &[],
    },
    ManagerDef {
        name: "volta",
        env_var: Some("VOLTA_HOME"),
        default_path: ".volta",
        sentinel: "bin/volta",
        path_subpaths: &["bin"],
    },
    ManagerDef {
        name: "mise",
        env_var: Some("MISE_DATA_DIR"),
        default_path: ".local/share/mise",
        sentinel: "bin/mise",
        path_subpaths: &["bin", "shims"],
    },
];

/// A version manager found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredManager {
    /// Manager name (e.g., "pyenv", "nvm").
    pub name: String,
    /// Root install path (e.g., ~/.pyenv).
    pub install_path: PathBuf,
}

/// Result of scanning for version managers.
#[derive(Debug, Clone, Default)]
pub struct ManagerDiscovery {
    managers: Vec<DiscoveredManager>,
    augmented_path: Vec<PathBuf>,
}

impl ManagerDiscovery {
    /// Scan well-known locations under `home`, honouring relocation variables.
    pub fn run<F>(home: &Path, env_fn: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut discovery = Self::default();

        for def in MANAGER_DEFS {
            let default = home.join(def.default_path);
            let Some(root) = locate_manager(def.env_var, &default, def.sentinel, &env_fn) else {
                continue;
            };
            for sub in def.path_subpaths {
                let dir = root.join(sub);
                if dir.is_dir() && !discovery.augmented_path.contains(&dir) {
                    discovery.augmented_path.push(dir);
                }
            }
            discovery.managers.push(DiscoveredManager {
                name: def.name.to_string(),
                install_path: root,
            });
        }

        for prefix in homebrew_default_prefixes() {
            if is_executable(&prefix.join("bin/brew")) {
                for sub in ["bin", "sbin"] {
                    let dir = prefix.join(sub);
                    if dir.is_dir() && !discovery.augmented_path.contains(&dir) {
                        discovery.augmented_path.push(dir);
                    }
                }
            }
        }

        discovery
    }

    /// Directories worth adding to the search path.
    pub fn augmented_path(&self) -> &[PathBuf] {
        &self.augmented_path
    }

    /// Managers that were found.
    pub fn managers(&self) -> &[DiscoveredManager] {
        &self.managers
    }

    /// Look up a discovered manager by name.
    pub fn manager(&self, name: &str) -> Option<&DiscoveredManager> {
        self.managers.iter().find(|m| m.name == name)
    }

    /// Build a search path: discovered directories prepended to `system`,
    /// without duplicates.
    pub fn merge_into(&self, system: &[PathBuf]) -> Vec<PathBuf> {
        let mut merged = self.augmented_path.clone();
        for dir in system {
            if !merged.contains(dir) {
                merged.push(dir.clone());
            }
        }
        merged
    }
}

/// Find a manager's root: the relocation variable first, then the default.
pub fn locate_manager<F>(
    env_var: Option<&str>,
    default_path: &Path,
    sentinel: &str,
    env_fn: &F,
) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(var) = env_var {
        if let Some(val) = env_fn(var).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(val);
            if path.join(sentinel).exists() {
                return Some(path);
            }
        }
    }

    if default_path.join(sentinel).exists() {
        return Some(default_path.to_path_buf());
    }

    None
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On non-Unix hosts, any regular file counts as executable.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve a tool's binary path by iterating over search path entries.
///
/// Returns the first match that exists and is executable. Does not use
/// `which`, whose behavior varies across systems.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    if tool.contains('/') {
        let direct = PathBuf::from(tool);
        return is_executable(&direct).then_some(direct);
    }
    path_entries
        .iter()
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

/// Parse the process `PATH` into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Default Homebrew prefixes (absolute, not relative to home).
fn homebrew_default_prefixes() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            vec![PathBuf::from("/opt/homebrew")]
        } else {
            vec![PathBuf::from("/usr/local")]
        }
    } else if cfg!(target_os = "linux") {
        vec![PathBuf::from("/home/linuxbrew/.linuxbrew")]
    } else {
        Vec::new()
    }
}
