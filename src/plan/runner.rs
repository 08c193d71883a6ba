//! Sequential plan execution.
//!
//! Steps run one at a time in declared order. For each step the runner
//! probes, asks for confirmation when the step requires it, installs, and
//! re-probes to confirm the install took effect. The first failure halts
//! the plan; nothing after it is probed or installed.

use std::time::{Duration, Instant};

use crate::context::ProjectContext;
use crate::error::StackupError;
use crate::probe::{Observation, ProbeStatus};
use crate::shell::HostEnv;

use super::definition::Plan;
use super::gate::ConfirmationGate;
use super::report::{RunReport, StepFailure, StepOutcome, StepRecord};
use super::step::{Step, StepAction};

/// Progress events emitted while a plan runs.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to be probed.
    StepStarting { name: &'a str, depth: usize },
    /// The step was already satisfied.
    StepSkipped { name: &'a str, depth: usize },
    /// The step's installer is about to run.
    StepInstalling {
        name: &'a str,
        depth: usize,
        action: &'a str,
    },
    /// The installer ran and the probe now passes.
    StepInstalled {
        name: &'a str,
        depth: usize,
        duration: Duration,
    },
    /// Dry run: the installer would run.
    StepWouldInstall {
        name: &'a str,
        depth: usize,
        reason: &'a str,
    },
    /// The step failed; the plan halts.
    StepFailed {
        name: &'a str,
        depth: usize,
        error: &'a StackupError,
    },
}

/// Options for running a plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
    /// Probe only: invoke no installer and no confirmation gate.
    pub dry_run: bool,
}

/// Marker for "the plan has halted; the failure is already recorded".
struct Halted;

type ProgressFn<'f> = dyn FnMut(RunProgress<'_>) + 'f;

/// Runs plans against a host.
pub struct PlanRunner<'r, 'h> {
    host: &'r mut HostEnv<'h>,
    gate: &'r mut dyn ConfirmationGate,
    options: RunOptions,
}

impl<'r, 'h> PlanRunner<'r, 'h> {
    /// Create a runner that installs through `host` and asks `gate`.
    pub fn new(host: &'r mut HostEnv<'h>, gate: &'r mut dyn ConfirmationGate) -> Self {
        Self {
            host,
            gate,
            options: RunOptions::default(),
        }
    }

    /// Replace the run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every step of `plan`.
    pub fn run(&mut self, plan: &Plan, ctx: &mut ProjectContext) -> RunReport {
        self.run_with_progress(plan, ctx, |_| {})
    }

    /// Run every step of `plan`, reporting progress through `on_progress`.
    pub fn run_with_progress(
        &mut self,
        plan: &Plan,
        ctx: &mut ProjectContext,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::started();
        tracing::info!(
            "Running plan with {} steps{}",
            plan.len(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let _ = self.run_steps(plan.steps(), 0, ctx, &mut report, &mut on_progress);

        report.resolved_versions = ctx.resolved_versions().clone();
        report.duration = start.elapsed();
        match &report.failure {
            Some(failure) => tracing::info!("Plan halted at '{}'", failure.step),
            None => tracing::info!("Plan finished with {} installs", report.installs),
        }
        report
    }

    fn run_steps(
        &mut self,
        steps: &[Step],
        depth: usize,
        ctx: &mut ProjectContext,
        report: &mut RunReport,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<(), Halted> {
        for step in steps {
            self.run_step(step, depth, ctx, report, on_progress)?;
        }
        Ok(())
    }

    fn run_step(
        &mut self,
        step: &Step,
        depth: usize,
        ctx: &mut ProjectContext,
        report: &mut RunReport,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<(), Halted> {
        let start = Instant::now();
        let name = step.name();
        on_progress(RunProgress::StepStarting { name, depth });

        // Reserve the slot so nested steps are recorded after their parent.
        let index = report.steps.len();
        report.steps.push(StepRecord {
            name: name.to_string(),
            depth,
            outcome: StepOutcome::Failed,
            duration: Duration::ZERO,
        });

        let observation = step.probe().observe(self.host, ctx);
        let reason = match &observation.status {
            ProbeStatus::Satisfied => {
                record_resolved(ctx, &observation);
                tracing::debug!("{} already satisfied", name);
                let outcome = StepOutcome::Skipped {
                    reason: step.probe().describe(),
                };
                finish(report, index, outcome, start);
                on_progress(RunProgress::StepSkipped { name, depth });
                return Ok(());
            }
            ProbeStatus::Unsatisfied { reason } => reason.clone(),
            ProbeStatus::Inconclusive { reason } => {
                tracing::warn!("Probe for {} was inconclusive: {}", name, reason);
                reason.clone()
            }
        };

        if self.options.dry_run {
            let outcome = StepOutcome::WouldInstall {
                reason: reason.clone(),
            };
            finish(report, index, outcome, start);
            on_progress(RunProgress::StepWouldInstall {
                name,
                depth,
                reason: &reason,
            });
            // Children are probed too so the report shows what is missing.
            return self.run_steps(step.children(), depth + 1, ctx, report, on_progress);
        }

        if step.requires_confirmation() && !self.gate.ask(name, &reason) {
            let error = StackupError::ConfirmationDeclined {
                step: name.to_string(),
            };
            return Err(fail(report, index, step, depth, error, start, on_progress));
        }

        match step.action() {
            StepAction::Install(installer) => {
                let action = installer.describe();
                on_progress(RunProgress::StepInstalling {
                    name,
                    depth,
                    action: &action,
                });
                tracing::info!("Installing {}: {}", name, action);
                report.installs += 1;
                if let Err(error) = installer.execute(self.host, ctx) {
                    return Err(fail(report, index, step, depth, error, start, on_progress));
                }
            }
            StepAction::Nested(children) => {
                if let Err(halted) = self.run_steps(children, depth + 1, ctx, report, on_progress)
                {
                    report.steps[index].duration = start.elapsed();
                    return Err(halted);
                }
            }
        }

        let confirmation = step.probe().observe(self.host, ctx);
        if let Some(still) = confirmation.status.reason() {
            let error = StackupError::StepDefect {
                step: name.to_string(),
                reason: format!("probe still unsatisfied after install: {}", still),
            };
            return Err(fail(report, index, step, depth, error, start, on_progress));
        }
        record_resolved(ctx, &confirmation);

        let duration = start.elapsed();
        finish(report, index, StepOutcome::Installed, start);
        on_progress(RunProgress::StepInstalled {
            name,
            depth,
            duration,
        });
        Ok(())
    }
}

fn record_resolved(ctx: &mut ProjectContext, observation: &Observation) {
    if let Some(resolved) = &observation.resolved {
        if ctx.record_version(&resolved.tool, &resolved.version) {
            tracing::debug!("Resolved {} {}", resolved.tool, resolved.version);
        }
    }
}

fn finish(report: &mut RunReport, index: usize, outcome: StepOutcome, start: Instant) {
    let record = &mut report.steps[index];
    record.outcome = outcome;
    record.duration = start.elapsed();
}

fn fail(
    report: &mut RunReport,
    index: usize,
    step: &Step,
    depth: usize,
    error: StackupError,
    start: Instant,
    on_progress: &mut ProgressFn<'_>,
) -> Halted {
    finish(report, index, StepOutcome::Failed, start);
    on_progress(RunProgress::StepFailed {
        name: step.name(),
        depth,
        error: &error,
    });
    tracing::debug!("{} failed: {:?}", step.name(), error);
    if report.failure.is_none() {
        report.failure = Some(StepFailure {
            step: step.name().to_string(),
            error,
        });
    }
    Halted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::FnInstaller;
    use crate::plan::AutoApprove;
    use crate::probe::{FnProbe, PathExists};
    use crate::shell::ScriptedRunner;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch_step(name: &str, file: &str) -> Step {
        let file = file.to_string();
        Step::new(
            name,
            PathExists::file(file.clone()),
            FnInstaller::new(format!("touch {}", file), move |_, ctx| {
                std::fs::write(ctx.path(&file), "")?;
                Ok(())
            }),
        )
    }

    fn setup(root: &Path) -> ProjectContext {
        ProjectContext::new("demo", root).unwrap()
    }

    #[test]
    fn satisfied_steps_are_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a"), "").unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut gate = AutoApprove;
        let mut ctx = setup(temp.path());

        let plan = Plan::new(vec![touch_step("a", "a")]).unwrap();
        let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);

        assert_eq!(report.installs, 0);
        assert!(matches!(
            report.steps[0].outcome,
            StepOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn install_that_does_not_satisfy_probe_is_defect() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut gate = AutoApprove;
        let mut ctx = setup(temp.path());

        let plan = Plan::new(vec![Step::new(
            "broken",
            PathExists::file("never"),
            FnInstaller::new("noop", |_, _| Ok(())),
        )])
        .unwrap();
        let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);

        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.step, "broken");
        assert!(matches!(failure.error, StackupError::StepDefect { .. }));
        assert!(!failure.error.is_expected());
    }

    #[test]
    fn dry_run_installs_nothing_and_asks_nobody() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut asked = 0;
        let mut gate = |_: &str, _: &str| {
            asked += 1;
            true
        };
        let mut ctx = setup(temp.path());

        let plan = Plan::new(vec![touch_step("a", "a").confirm(), touch_step("b", "b")]).unwrap();
        let report = PlanRunner::new(&mut host, &mut gate)
            .with_options(RunOptions { dry_run: true })
            .run(&plan, &mut ctx);

        assert!(report.is_success());
        assert!(report.has_pending());
        assert_eq!(report.installs, 0);
        assert!(!temp.path().join("a").exists());
        drop(gate);
        assert_eq!(asked, 0);
    }

    #[test]
    fn composite_runs_children_then_rechecks() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut gate = AutoApprove;
        let mut ctx = setup(temp.path());

        let composite = Step::composite(
            "both",
            FnProbe::new("a and b", |_, ctx| {
                if ctx.path("a").exists() && ctx.path("b").exists() {
                    ProbeStatus::Satisfied
                } else {
                    ProbeStatus::unsatisfied("missing files")
                }
            }),
            vec![touch_step("a", "a"), touch_step("b", "b")],
        );
        let plan = Plan::new(vec![composite]).unwrap();
        let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);

        assert!(report.is_success());
        assert_eq!(report.installs, 2);
        let names: Vec<(&str, usize)> = report
            .steps
            .iter()
            .map(|s| (s.name.as_str(), s.depth))
            .collect();
        assert_eq!(names, vec![("both", 0), ("a", 1), ("b", 1)]);
        assert_eq!(report.steps[0].outcome, StepOutcome::Installed);
    }

    #[test]
    fn nested_failure_names_innermost_step() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut gate = AutoApprove;
        let mut ctx = setup(temp.path());

        let composite = Step::composite(
            "outer",
            PathExists::file("x"),
            vec![Step::new(
                "inner",
                PathExists::file("x"),
                FnInstaller::new("fail", |_, _| {
                    Err(crate::error::InstallError::UnsupportedPlatform {
                        detail: "test".to_string(),
                    }
                    .into())
                }),
            )],
        );
        let plan = Plan::new(vec![composite, touch_step("after", "after")]).unwrap();
        let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);

        assert_eq!(report.failure.as_ref().unwrap().step, "inner");
        assert_eq!(report.step("outer").unwrap().outcome, StepOutcome::Failed);
        assert!(report.step("after").is_none());
    }

    #[test]
    fn progress_events_follow_lifecycle() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut gate = AutoApprove;
        let mut ctx = setup(temp.path());
        std::fs::write(temp.path().join("done"), "").unwrap();

        let plan = Plan::new(vec![touch_step("done", "done"), touch_step("new", "new")]).unwrap();
        let mut events = Vec::new();
        PlanRunner::new(&mut host, &mut gate).run_with_progress(&plan, &mut ctx, |event| {
            let label = match event {
                RunProgress::StepStarting { name, .. } => format!("start {}", name),
                RunProgress::StepSkipped { name, .. } => format!("skip {}", name),
                RunProgress::StepInstalling { name, .. } => format!("install {}", name),
                RunProgress::StepInstalled { name, .. } => format!("installed {}", name),
                RunProgress::StepWouldInstall { name, .. } => format!("would {}", name),
                RunProgress::StepFailed { name, .. } => format!("failed {}", name),
            };
            events.push(label);
        });

        assert_eq!(
            events,
            vec![
                "start done",
                "skip done",
                "start new",
                "install new",
                "installed new"
            ]
        );
    }
}
