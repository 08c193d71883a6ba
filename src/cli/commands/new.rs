//! New command implementation.
//!
//! The `stackup new` command (also the default) bootstraps a project:
//! it probes every step of the full-stack plan and installs whatever is
//! missing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::cli::args::NewArgs;
use crate::error::Result;
use crate::plan::{AutoApprove, ConfirmationGate, PlanRunner, UiGate};
use crate::shell::SystemRunner;
use crate::ui::{OutputMode, PlanProgress, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::display::{print_json, show_failure, show_versions, summary_line};
use super::setup::prepare;

/// The new command implementation.
pub struct NewCommand {
    working_dir: PathBuf,
    config: Option<PathBuf>,
    args: NewArgs,
}

impl NewCommand {
    /// Create a new bootstrap command.
    pub fn new(working_dir: &Path, config: Option<PathBuf>, args: NewArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &NewArgs {
        &self.args
    }
}

impl Command for NewCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let runner = SystemRunner;
        let mut workspace = prepare(
            &runner,
            &self.working_dir,
            self.config.as_deref(),
            &self.args.project,
            self.args.force,
            ui,
        )?;

        if self.args.project.json {
            ui.set_output_mode(OutputMode::Silent);
        }
        ui.show_header(&format!(
            "{} · {} · {}",
            workspace.name,
            workspace.root.display(),
            workspace.host_os.name
        ));

        // The gate and the progress renderer take turns with the UI.
        let ui = RefCell::new(ui);
        let mut ask = |label: &str, reason: &str| {
            let mut ui = ui.borrow_mut();
            UiGate::new(&mut **ui).ask(label, reason)
        };
        let mut approve = AutoApprove;
        let gate: &mut dyn ConfirmationGate = if self.args.yes {
            &mut approve
        } else {
            &mut ask
        };

        let mut progress = PlanProgress::new();
        let report = PlanRunner::new(&mut workspace.host, gate).run_with_progress(
            &workspace.plan,
            &mut workspace.ctx,
            |event| progress.handle(&mut **ui.borrow_mut(), &event),
        );

        let ui = ui.into_inner();
        if self.args.project.json {
            print_json(&report);
        }

        if report.is_success() {
            ui.success(&format!("{} is ready: {}", workspace.name, summary_line(&report)));
            if ui.output_mode().shows_details() {
                show_versions(ui, &report);
            }
            Ok(CommandResult::success())
        } else {
            show_failure(ui, &report);
            Ok(CommandResult::failure(report.exit_code()))
        }
    }
}
