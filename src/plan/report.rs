//! Outcome of a plan run.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::error::StackupError;

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The probe was already satisfied.
    Skipped { reason: String },
    /// The installer ran and the probe now passes.
    Installed,
    /// Dry run: the installer would run.
    WouldInstall { reason: String },
    /// The step failed and halted the plan.
    Failed,
}

impl StepOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Skipped { .. } => "skipped",
            Self::Installed => "installed",
            Self::WouldInstall { .. } => "would_install",
            Self::Failed => "failed",
        }
    }
}

/// A step as it appeared in the run.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Step label.
    pub name: String,
    /// Nesting level; top-level steps are 0.
    pub depth: usize,
    /// What happened.
    pub outcome: StepOutcome,
    /// Wall time spent on the step, including nested steps.
    pub duration: Duration,
}

/// The step that halted the plan and why.
#[derive(Debug)]
pub struct StepFailure {
    /// Failing step label.
    pub step: String,
    /// Underlying error.
    pub error: StackupError,
}

/// Everything a plan run did.
#[derive(Debug)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Step records in the order they were visited.
    pub steps: Vec<StepRecord>,
    /// Number of installer invocations.
    pub installs: usize,
    /// Versions resolved into the project context.
    pub resolved_versions: BTreeMap<String, String>,
    /// The failure that halted the run, if any.
    pub failure: Option<StepFailure>,
    /// Total duration.
    pub duration: Duration,
}

impl RunReport {
    pub(crate) fn started() -> Self {
        Self {
            started_at: Utc::now(),
            steps: Vec::new(),
            installs: 0,
            resolved_versions: BTreeMap::new(),
            failure: None,
            duration: Duration::ZERO,
        }
    }

    /// Whether every step ended satisfied.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether a dry run found anything to install.
    pub fn has_pending(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.outcome, StepOutcome::WouldInstall { .. }))
    }

    /// Process exit code: 0 on success, otherwise the failure's code.
    pub fn exit_code(&self) -> i32 {
        self.failure.as_ref().map_or(0, |f| f.error.exit_code())
    }

    /// Record for a step by name (first match).
    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Names of steps whose installer ran.
    pub fn installed(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Installed)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Render as JSON for machine consumption.
    pub fn to_json(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|record| {
                let mut entry = json!({
                    "name": record.name,
                    "depth": record.depth,
                    "outcome": record.outcome.label(),
                    "duration_ms": record.duration.as_millis() as u64,
                });
                if let StepOutcome::Skipped { reason } | StepOutcome::WouldInstall { reason } =
                    &record.outcome
                {
                    entry["reason"] = Value::String(reason.clone());
                }
                entry
            })
            .collect();

        json!({
            "started_at": self.started_at.to_rfc3339(),
            "success": self.is_success(),
            "exit_code": self.exit_code(),
            "installs": self.installs,
            "resolved_versions": self.resolved_versions,
            "steps": steps,
            "failure": self.failure.as_ref().map(|f| json!({
                "step": f.step,
                "error": f.error.to_string(),
            })),
            "duration_ms": self.duration.as_millis() as u64,
        })
    }
}
