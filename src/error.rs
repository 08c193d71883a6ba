//! Error types for stackup operations.
//!
//! This module defines [`StackupError`], the primary error type used
//! throughout the crate, [`InstallError`] for installer failures, and a
//! [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Probes never return errors: a failing check is an `Inconclusive` status
//! - Installers report `InstallError` wrapped in `StackupError::Install`
//! - Every `StackupError` reaching the plan runner aborts the plan
//! - Use `anyhow::Error` (via `StackupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an installer.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The installer lacked the privileges it needed.
    #[error("Permission denied: {detail}")]
    PermissionDenied { detail: String },

    /// An external tool exited unsuccessfully (or could not be launched).
    #[error("`{command}` failed{}", exit_suffix(.exit_code))]
    ExternalToolFailed {
        command: String,
        exit_code: Option<i32>,
    },

    /// The installer has no recipe for this host.
    #[error("Unsupported platform: {detail}")]
    UnsupportedPlatform { detail: String },

    /// The installer needs the network and it is not reachable.
    #[error("Network unavailable: {detail}")]
    NetworkUnavailable { detail: String },

    /// The destination holds something the installer did not create.
    #[error("{} already exists and is not a complete clone of {url}", .path.display())]
    DestinationOccupied { path: PathBuf, url: String },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " to start".to_string(),
    }
}

/// Core error type for stackup operations.
#[derive(Debug, Error)]
pub enum StackupError {
    /// An installer failed.
    #[error(transparent)]
    Install(#[from] InstallError),

    /// The user declined a step that requires confirmation.
    #[error("Confirmation declined for '{step}'")]
    ConfirmationDeclined { step: String },

    /// A step's probe still fails after a successful install.
    #[error("Step '{step}' is defective: {reason}")]
    StepDefect { step: String, reason: String },

    /// A template references something the context cannot supply.
    #[error("Template error in {template}: {message}")]
    TemplateAuthoring { template: String, message: String },

    /// The plan itself is malformed (duplicate names, bad ordering).
    #[error("Invalid plan: {message}")]
    InvalidPlan { message: String },

    /// The host operating system is not supported.
    #[error("Unsupported host: {detail}")]
    UnsupportedHost { detail: String },

    /// The command line or environment overrides are invalid.
    #[error("Invalid invocation: {message}")]
    InvalidInvocation { message: String },

    /// Failed to parse the settings file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// IO error on a known path.
    #[error("IO error at {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackupError {
    /// Attach a path to an IO error.
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// `2` marks problems detected before any plan step could run; every
    /// other failure is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedHost { .. }
            | Self::InvalidInvocation { .. }
            | Self::ConfigParse { .. } => 2,
            _ => 1,
        }
    }

    /// Whether this error describes the host rather than a bug in stackup.
    ///
    /// Unexpected errors are printed with full diagnostic detail.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::StepDefect { .. }
                | Self::TemplateAuthoring { .. }
                | Self::InvalidPlan { .. }
                | Self::Other(_)
        )
    }
}

/// Result type alias for stackup operations.
pub type Result<T> = std::result::Result<T, StackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_tool_failure_displays_command_and_code() {
        let err = InstallError::ExternalToolFailed {
            command: "apt-get install -y git".into(),
            exit_code: Some(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("apt-get install -y git"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn external_tool_without_code_reports_start_failure() {
        let err = InstallError::ExternalToolFailed {
            command: "brew".into(),
            exit_code: None,
        };
        assert!(err.to_string().contains("failed to start"));
    }

    #[test]
    fn install_error_converts_into_stackup_error() {
        let err: StackupError = InstallError::NetworkUnavailable {
            detail: "npm install".into(),
        }
        .into();
        assert!(matches!(err, StackupError::Install(_)));
        assert!(err.to_string().contains("npm install"));
    }

    #[test]
    fn confirmation_declined_displays_step() {
        let err = StackupError::ConfirmationDeclined {
            step: "python".into(),
        };
        assert!(err.to_string().contains("python"));
    }

    #[test]
    fn exit_codes_follow_invocation_contract() {
        let host = StackupError::UnsupportedHost {
            detail: "plan9".into(),
        };
        let invocation = StackupError::InvalidInvocation {
            message: "bad name".into(),
        };
        let declined = StackupError::ConfirmationDeclined { step: "x".into() };
        let io: StackupError = std::io::Error::other("disk full").into();

        assert_eq!(host.exit_code(), 2);
        assert_eq!(invocation.exit_code(), 2);
        assert_eq!(declined.exit_code(), 1);
        assert_eq!(io.exit_code(), 1);
    }

    #[test]
    fn defects_are_unexpected() {
        let defect = StackupError::StepDefect {
            step: "node".into(),
            reason: "still missing".into(),
        };
        let template = StackupError::TemplateAuthoring {
            template: "a.txt".into(),
            message: "missing placeholder".into(),
        };
        assert!(!defect.is_expected());
        assert!(!template.is_expected());
        assert!(StackupError::ConfirmationDeclined { step: "x".into() }.is_expected());
        assert!(StackupError::Install(InstallError::PermissionDenied {
            detail: "sudo".into()
        })
        .is_expected());
    }

    #[test]
    fn io_at_displays_path() {
        let err = StackupError::io_at(
            "/tmp/project/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/project/a.txt"));
    }
}
