//! Confirmation gating for steps that need explicit approval.

use crate::ui::{Prompt, PromptType, UserInterface};

/// Capability that approves or declines a step before it installs.
pub trait ConfirmationGate {
    /// Ask whether `label` may proceed. `reason` says why it is needed.
    fn ask(&mut self, label: &str, reason: &str) -> bool;
}

/// Gate that approves everything (`--yes`, `STACKUP_NON_INTERACTIVE`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn ask(&mut self, label: &str, _reason: &str) -> bool {
        tracing::debug!("Auto-approving {}", label);
        true
    }
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&str, &str) -> bool,
{
    fn ask(&mut self, label: &str, reason: &str) -> bool {
        self(label, reason)
    }
}

/// Gate that asks through the user interface.
///
/// The prompt defaults to "no"; a prompt that cannot be answered counts as
/// a decline.
pub struct UiGate<'a> {
    ui: &'a mut dyn UserInterface,
}

impl<'a> UiGate<'a> {
    /// Ask through `ui`.
    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui }
    }
}

/// Prompt key for a step's confirmation (`install_system_packages`).
pub fn prompt_key(label: &str) -> String {
    let slug: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("install_{}", slug.trim_matches('_'))
}

impl ConfirmationGate for UiGate<'_> {
    fn ask(&mut self, label: &str, reason: &str) -> bool {
        self.ui.message(&format!("  {}: {}", label, reason));
        let prompt = Prompt {
            key: prompt_key(label),
            question: format!("Install {}?", label),
            prompt_type: PromptType::Confirm,
            default: Some("false".to_string()),
        };
        match self.ui.prompt(&prompt) {
            Ok(answer) => answer.as_bool().unwrap_or(false),
            Err(e) => {
                tracing::warn!("Confirmation for {} failed: {}", label, e);
                false
            }
        }
    }
}
