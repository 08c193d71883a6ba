//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::StackupTheme;
use super::SpinnerHandle;

/// A progress spinner for a running step.
pub struct ProgressSpinner {
    bar: ProgressBar,
    indent: usize,
    theme: StackupTheme,
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        Self::with_indent(message, 0)
    }

    /// Create a new spinner indented by `indent` spaces (nested steps).
    pub fn with_indent(message: &str, indent: usize) -> Self {
        let bar = ProgressBar::new_spinner();
        let prefix = " ".repeat(indent);
        bar.set_style(style(&format!("{}{{spinner:.cyan}} {{msg}}", prefix)));
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            indent,
            theme: StackupTheme::new(),
        }
    }

    /// Create a spinner that never draws (silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            indent: 0,
            theme: StackupTheme::plain(),
        }
    }

    fn finish(&mut self, line: String) {
        let prefix = " ".repeat(self.indent);
        self.bar.set_style(style("{msg}"));
        self.bar.finish_with_message(format!("{}{}", prefix, line));
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish(line);
    }

    fn finish_pending(&mut self, msg: &str) {
        let line = self.theme.format_pending(msg);
        self.finish(line);
    }
}
