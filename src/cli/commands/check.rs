//! Check command implementation.
//!
//! The `stackup check` command probes every step without installing
//! anything and exits non-zero when something would be installed.

use std::path::{Path, PathBuf};

use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::plan::{AutoApprove, PlanRunner, RunOptions};
use crate::shell::SystemRunner;
use crate::ui::{OutputMode, PlanProgress, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::display::{outcome_counts, print_json, show_failure, show_versions};
use super::setup::prepare;

/// The check command implementation.
pub struct CheckCommand {
    working_dir: PathBuf,
    config: Option<PathBuf>,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(working_dir: &Path, config: Option<PathBuf>, args: CheckArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config,
            args,
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let runner = SystemRunner;
        let mut workspace = prepare(
            &runner,
            &self.working_dir,
            self.config.as_deref(),
            &self.args.project,
            false,
            ui,
        )?;

        if self.args.project.json {
            ui.set_output_mode(OutputMode::Silent);
        }
        ui.show_header(&format!("Checking {}", workspace.root.display()));

        // A dry run never consults the gate.
        let mut gate = AutoApprove;
        let mut progress = PlanProgress::new();
        let report = PlanRunner::new(&mut workspace.host, &mut gate)
            .with_options(RunOptions { dry_run: true })
            .run_with_progress(&workspace.plan, &mut workspace.ctx, |event| {
                progress.handle(ui, &event)
            });

        if self.args.project.json {
            print_json(&report);
        }

        if !report.is_success() {
            show_failure(ui, &report);
            return Ok(CommandResult::failure(report.exit_code()));
        }

        let (_, _, pending) = outcome_counts(&report);
        show_versions(ui, &report);
        if pending == 0 {
            ui.success(&format!("{} is fully set up", workspace.name));
            Ok(CommandResult::success())
        } else {
            ui.warning(&format!(
                "{} step(s) would install; run `stackup new {}` to apply",
                pending, workspace.name
            ));
            Ok(CommandResult::failure(1))
        }
    }
}
