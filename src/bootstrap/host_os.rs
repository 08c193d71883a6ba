//! Host operating system detection.
//!
//! Detection happens before any plan step runs: an unsupported host is an
//! invocation error (exit 2), not a step failure.

use std::collections::BTreeMap;

use crate::error::{Result, StackupError};
use crate::installer::PackageManager;

const OS_RELEASE: &str = "/etc/os-release";

/// A supported host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOs {
    /// Distribution identifier (`macos`, `ubuntu`, `fedora`, ...).
    pub id: String,
    /// Human-readable name for messages.
    pub name: String,
    /// System package manager used for base packages.
    pub package_manager: PackageManager,
}

/// Parse `KEY=value` lines from an os-release file.
///
/// Values may be double- or single-quoted; comments and blank lines are
/// ignored.
pub fn parse_os_release(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), unquoted.to_string())
        })
        .collect()
}

fn linux_package_manager(ids: &[&str]) -> Option<PackageManager> {
    ids.iter().find_map(|id| match *id {
        "debian" | "ubuntu" | "linuxmint" | "pop" | "raspbian" => Some(PackageManager::Apt),
        "fedora" | "rhel" | "centos" | "rocky" | "almalinux" => Some(PackageManager::Dnf),
        "arch" | "manjaro" | "endeavouros" => Some(PackageManager::Pacman),
        _ => None,
    })
}

/// Classify a host from the OS name and (on Linux) os-release contents.
pub fn classify(os: &str, os_release: Option<&str>) -> Result<HostOs> {
    match os {
        "macos" => Ok(HostOs {
            id: "macos".to_string(),
            name: "macOS".to_string(),
            package_manager: PackageManager::Homebrew,
        }),
        "linux" => {
            let Some(content) = os_release else {
                return Err(StackupError::UnsupportedHost {
                    detail: format!("cannot identify Linux distribution ({} missing)", OS_RELEASE),
                });
            };
            let fields = parse_os_release(content);
            let id = fields.get("ID").cloned().unwrap_or_default();
            let mut ids = vec![id.as_str()];
            if let Some(like) = fields.get("ID_LIKE") {
                ids.extend(like.split_whitespace());
            }

            let package_manager =
                linux_package_manager(&ids).ok_or_else(|| StackupError::UnsupportedHost {
                    detail: format!(
                        "unsupported Linux distribution '{}'",
                        if id.is_empty() { "unknown" } else { &id }
                    ),
                })?;
            let name = fields
                .get("PRETTY_NAME")
                .or_else(|| fields.get("NAME"))
                .cloned()
                .unwrap_or_else(|| id.clone());
            Ok(HostOs {
                id,
                name,
                package_manager,
            })
        }
        other => Err(StackupError::UnsupportedHost {
            detail: format!("unsupported operating system '{}'", other),
        }),
    }
}

/// Detect the running host.
pub fn detect() -> Result<HostOs> {
    let os = std::env::consts::OS;
    let release = if os == "linux" {
        std::fs::read_to_string(OS_RELEASE).ok()
    } else {
        None
    };
    let host = classify(os, release.as_deref())?;
    tracing::debug!("Detected host {} ({:?})", host.name, host.package_manager);
    Ok(host)
}
