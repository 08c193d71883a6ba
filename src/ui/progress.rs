//! Plan progress display.

use std::time::Duration;

use crate::plan::RunProgress;

use super::{SpinnerHandle, UserInterface};

/// Renders plan runner events.
///
/// Installing steps get a spinner that finishes with the outcome; skipped
/// and dry-run steps get a single line. Nested steps are indented two
/// spaces per level.
#[derive(Default)]
pub struct PlanProgress {
    spinner: Option<Box<dyn SpinnerHandle>>,
}

impl PlanProgress {
    /// Create a renderer with no active spinner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one event.
    pub fn handle(&mut self, ui: &mut dyn UserInterface, event: &RunProgress<'_>) {
        match *event {
            RunProgress::StepStarting { name, depth } => {
                tracing::debug!("Probing {} (depth {})", name, depth);
            }
            RunProgress::StepSkipped { name, depth } => {
                ui.skipped(&format!("{}{}", indent(depth), name));
            }
            RunProgress::StepInstalling {
                name,
                depth,
                action,
            } => {
                let message = format!("{} - {}", name, action);
                self.spinner = Some(ui.start_spinner_indented(&message, depth * 2));
            }
            RunProgress::StepInstalled {
                name,
                depth,
                duration,
            } => {
                let message = format!("{} ({})", name, format_duration(duration));
                match self.spinner.take() {
                    Some(mut spinner) => spinner.finish_success(&message),
                    None => ui.success(&format!("{}{}", indent(depth), message)),
                }
            }
            RunProgress::StepWouldInstall {
                name,
                depth,
                reason,
            } => {
                ui.pending(&format!("{}{} - {}", indent(depth), name, reason));
            }
            RunProgress::StepFailed { name, depth, error } => {
                let message = format!("{} - {}", name, error);
                match self.spinner.take() {
                    Some(mut spinner) => spinner.finish_error(&message),
                    None => ui.error(&format!("{}{}", indent(depth), message)),
                }
            }
        }
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * 2)
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackupError;
    use crate::ui::MockUI;

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn installing_step_uses_spinner() {
        let mut ui = MockUI::new();
        let mut progress = PlanProgress::new();
        progress.handle(
            &mut ui,
            &RunProgress::StepInstalling {
                name: "pyenv",
                depth: 1,
                action: "git clone",
            },
        );
        progress.handle(
            &mut ui,
            &RunProgress::StepInstalled {
                name: "pyenv",
                depth: 1,
                duration: Duration::from_millis(5),
            },
        );
        assert_eq!(ui.spinners(), ["pyenv - git clone"]);
        assert!(ui.successes().is_empty());
    }

    #[test]
    fn composite_completion_prints_a_line() {
        let mut ui = MockUI::new();
        let mut progress = PlanProgress::new();
        progress.handle(
            &mut ui,
            &RunProgress::StepInstalled {
                name: "python",
                depth: 0,
                duration: Duration::from_millis(5),
            },
        );
        assert_eq!(ui.successes(), ["python (5ms)"]);
    }

    #[test]
    fn skipped_and_pending_are_indented() {
        let mut ui = MockUI::new();
        let mut progress = PlanProgress::new();
        progress.handle(&mut ui, &RunProgress::StepSkipped { name: "nvm", depth: 1 });
        progress.handle(
            &mut ui,
            &RunProgress::StepWouldInstall {
                name: "node 20",
                depth: 1,
                reason: "`node` not found on PATH",
            },
        );
        assert_eq!(ui.skipped_lines(), ["  nvm"]);
        assert_eq!(ui.pending_lines(), ["  node 20 - `node` not found on PATH"]);
    }

    #[test]
    fn failure_without_spinner_is_an_error_line() {
        let mut ui = MockUI::new();
        let mut progress = PlanProgress::new();
        let error = StackupError::ConfirmationDeclined {
            step: "node".to_string(),
        };
        progress.handle(
            &mut ui,
            &RunProgress::StepFailed {
                name: "node",
                depth: 0,
                error: &error,
            },
        );
        assert!(ui.has_error("node - Confirmation declined"));
    }
}
