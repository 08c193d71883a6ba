//! Shared rendering of run reports.

use crate::plan::{RunReport, StepOutcome};
use crate::ui::{format_duration, UserInterface};

/// Print the failing step and its error.
///
/// Host problems get one line; defects in stackup itself also get the
/// full diagnostic detail.
pub fn show_failure(ui: &mut dyn UserInterface, report: &RunReport) {
    if let Some(failure) = &report.failure {
        ui.error(&format!("Step '{}' failed: {}", failure.step, failure.error));
        if !failure.error.is_expected() {
            ui.error(&format!("{:?}", failure.error));
        }
    }
}

/// Print resolved tool versions.
pub fn show_versions(ui: &mut dyn UserInterface, report: &RunReport) {
    for (tool, version) in &report.resolved_versions {
        ui.message(&format!("  {} {}", tool, version));
    }
}

/// Count of steps by outcome: (skipped, installed, pending).
pub fn outcome_counts(report: &RunReport) -> (usize, usize, usize) {
    report
        .steps
        .iter()
        .fold((0, 0, 0), |(skipped, installed, pending), step| match step.outcome {
            StepOutcome::Skipped { .. } => (skipped + 1, installed, pending),
            StepOutcome::Installed => (skipped, installed + 1, pending),
            StepOutcome::WouldInstall { .. } => (skipped, installed, pending + 1),
            StepOutcome::Failed => (skipped, installed, pending),
        })
}

/// One-line summary of a finished bootstrap.
pub fn summary_line(report: &RunReport) -> String {
    let (skipped, installed, _) = outcome_counts(report);
    format!(
        "{} installed · {} already satisfied · {}",
        installed,
        skipped,
        format_duration(report.duration)
    )
}

/// Print the report as pretty JSON on stdout.
pub fn print_json(report: &RunReport) {
    let rendered = serde_json::to_string_pretty(&report.to_json())
        .unwrap_or_else(|_| report.to_json().to_string());
    println!("{}", rendered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProjectContext;
    use crate::plan::{AutoApprove, Plan, PlanRunner, Step};
    use crate::error::InstallError;
    use crate::installer::FnInstaller;
    use crate::probe::{FnProbe, ProbeStatus};
    use crate::shell::{HostEnv, ScriptedRunner};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn run(steps: Vec<Step>) -> RunReport {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut gate = AutoApprove;
        let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();
        let plan = Plan::new(steps).unwrap();
        PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx)
    }

    fn satisfied(name: &str) -> Step {
        Step::new(
            name,
            FnProbe::new("always", |_, _| ProbeStatus::Satisfied),
            FnInstaller::new("never", |_, _| Ok(())),
        )
    }

    #[test]
    fn counts_outcomes() {
        let report = run(vec![satisfied("a"), satisfied("b")]);
        assert_eq!(outcome_counts(&report), (2, 0, 0));
        assert!(summary_line(&report).starts_with("0 installed · 2 already satisfied"));
    }

    #[test]
    fn expected_failure_is_one_line() {
        let failing = Step::new(
            "node",
            FnProbe::new("missing", |_, _| ProbeStatus::unsatisfied("no node")),
            FnInstaller::new("install", |_, _| {
                Err(InstallError::NetworkUnavailable {
                    detail: "offline".to_string(),
                }
                .into())
            }),
        );
        let report = run(vec![failing]);
        let mut ui = MockUI::new();
        show_failure(&mut ui, &report);
        assert_eq!(ui.errors().len(), 1);
        assert!(ui.has_error("Step 'node' failed: Network unavailable: offline"));
    }

    #[test]
    fn defect_includes_detail() {
        let defective = Step::new(
            "broken",
            FnProbe::new("never", |_, _| ProbeStatus::unsatisfied("nope")),
            FnInstaller::new("noop", |_, _| Ok(())),
        );
        let report = run(vec![defective]);
        let mut ui = MockUI::new();
        show_failure(&mut ui, &report);
        assert_eq!(ui.errors().len(), 2);
        assert!(ui.has_error("StepDefect"));
    }
}
