//! Side-effect-free checks of host and project state.
//!
//! A [`Probe`] answers one question ("is git installed?", "is Python at
//! least 3.12?", "does `backend/` exist?") without changing anything and
//! without elevated privileges. When the check itself breaks (a version
//! query that crashes, unreadable output) the answer is
//! [`ProbeStatus::Inconclusive`], which callers treat as unsatisfied: a
//! missing tool is an expected condition, not an error.
//!
//! # Modules
//!
//! - [`checks`] - The built-in probe catalogue
//! - [`path`] - Executable lookup and version-manager discovery
//! - [`version`] - Numeric version parsing and comparison

pub mod checks;
pub mod path;
pub mod version;

pub use checks::{
    AllOf, AnyOf, CommandExists, CommandSucceeds, EnvVarPresent, FnProbe, PathExists, ToolVersion,
};
pub use version::{extract_version, Version};

use crate::context::ProjectContext;
use crate::shell::HostEnv;

/// Outcome of evaluating a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The precondition already holds.
    Satisfied,

    /// The precondition does not hold.
    Unsatisfied {
        /// Why, in words suitable for a confirmation prompt.
        reason: String,
    },

    /// The check itself failed; treated as unsatisfied.
    Inconclusive {
        /// What went wrong while checking.
        reason: String,
    },
}

impl ProbeStatus {
    /// Build an unsatisfied status.
    pub fn unsatisfied(reason: impl Into<String>) -> Self {
        Self::Unsatisfied {
            reason: reason.into(),
        }
    }

    /// Build an inconclusive status.
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Self::Inconclusive {
            reason: reason.into(),
        }
    }

    /// Whether the precondition holds.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }

    /// The reason the precondition does not hold, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Satisfied => None,
            Self::Unsatisfied { reason } | Self::Inconclusive { reason } => Some(reason),
        }
    }
}

/// A tool version observed while probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Tool name as used in the project context (e.g., "python").
    pub tool: String,
    /// Concrete version string (e.g., "3.12.1").
    pub version: String,
}

/// Full result of a probe: the status plus anything it learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Whether the precondition holds.
    pub status: ProbeStatus,
    /// Version discovered during the check.
    pub resolved: Option<ResolvedVersion>,
}

impl From<ProbeStatus> for Observation {
    fn from(status: ProbeStatus) -> Self {
        Self {
            status,
            resolved: None,
        }
    }
}

/// A side-effect-free check of one precondition.
pub trait Probe {
    /// Short description of what is checked (e.g., "command `git`").
    fn describe(&self) -> String;

    /// Evaluate the check, reporting any version it resolved.
    fn observe(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation;

    /// Evaluate the check.
    fn evaluate(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> ProbeStatus {
        self.observe(host, ctx).status
    }
}
