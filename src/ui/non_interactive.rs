//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{Result, StackupError};

use super::prompts::parse_confirm_default;
use super::theme::StackupTheme;
use super::{parse_yes, OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts.
pub const PROMPT_ENV_PREFIX: &str = "STACKUP_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `STACKUP_PROMPT_<KEY>` variables, then from
/// the prompt default. A prompt with neither is an invocation error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
    theme: StackupTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();
        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
            theme: StackupTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_skipped(msg));
        }
    }

    fn pending(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_pending(msg));
        }
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            tracing::debug!("Prompt {} answered by {}", prompt.key, env_key);
            return Ok(match prompt.prompt_type {
                PromptType::Confirm => PromptResult::Bool(parse_yes(value)),
                PromptType::Input => PromptResult::String(value.trim().to_string()),
            });
        }

        match (&prompt.prompt_type, &prompt.default) {
            (PromptType::Confirm, default) => Ok(PromptResult::Bool(parse_confirm_default(
                default.as_deref(),
            ))),
            (PromptType::Input, Some(default)) => Ok(PromptResult::String(default.clone())),
            (PromptType::Input, None) => Err(StackupError::InvalidInvocation {
                message: format!(
                    "cannot prompt for '{}' in non-interactive mode (set {})",
                    prompt.key, env_key
                ),
            }),
        }
    }

    fn start_spinner_indented(&mut self, message: &str, indent: usize) -> Box<dyn SpinnerHandle> {
        let visible = self.mode.shows_spinners();
        if visible {
            println!("{}{}", " ".repeat(indent), message);
        }
        Box::new(LineSpinner {
            indent,
            visible,
            theme: self.theme.clone(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", self.theme.format_header(title));
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner replacement that prints one line when it finishes.
struct LineSpinner {
    indent: usize,
    visible: bool,
    theme: StackupTheme,
}

impl LineSpinner {
    fn print(&self, line: String) {
        if self.visible {
            println!("{}{}", " ".repeat(self.indent), line);
        }
    }
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.print(self.theme.format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        // Failures are shown even when spinners are not.
        eprintln!("{}{}", " ".repeat(self.indent), self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.print(self.theme.format_skipped(msg));
    }

    fn finish_pending(&mut self, msg: &str) {
        self.print(self.theme.format_pending(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(key: &str, prompt_type: PromptType, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "?".to_string(),
            prompt_type,
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn override_answers_input() {
        let mut overrides = HashMap::new();
        overrides.insert("STACKUP_PROMPT_PROJECT_NAME".to_string(), " demo ".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, overrides);

        let answer = ui.prompt(&prompt("project_name", PromptType::Input, None)).unwrap();
        assert_eq!(answer, PromptResult::String("demo".to_string()));
    }

    #[test]
    fn override_answers_confirm() {
        let mut overrides = HashMap::new();
        overrides.insert("STACKUP_PROMPT_INSTALL_NODE".to_string(), "yes".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, overrides);

        let answer = ui
            .prompt(&prompt("install_node", PromptType::Confirm, Some("false")))
            .unwrap();
        assert_eq!(answer, PromptResult::Bool(true));
    }

    #[test]
    fn confirm_falls_back_to_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, HashMap::new());
        let answer = ui
            .prompt(&prompt("install_node", PromptType::Confirm, Some("false")))
            .unwrap();
        assert_eq!(answer, PromptResult::Bool(false));
    }

    #[test]
    fn input_without_default_is_invocation_error() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, HashMap::new());
        let err = ui
            .prompt(&prompt("project_name", PromptType::Input, None))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("STACKUP_PROMPT_PROJECT_NAME"));
    }

    #[test]
    fn never_interactive() {
        let ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        assert!(!ui.is_interactive());
    }
}
