//! Templates command implementation.
//!
//! The `stackup templates` command lists the embedded starter files and
//! the placeholders each one uses.

use crate::error::{Result, StackupError};
use crate::template::embedded::starter_templates;
use crate::template::interpolation::extract_placeholders;
use crate::template::ConflictPolicy;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The templates command implementation.
#[derive(Debug, Default)]
pub struct TemplatesCommand;

impl TemplatesCommand {
    /// Create a new templates command.
    pub fn new() -> Self {
        Self
    }

    /// One line per embedded template: destination and placeholders.
    pub fn lines() -> Result<Vec<String>> {
        starter_templates(ConflictPolicy::default())?
            .iter()
            .map(|spec| {
                let destination = spec.destination().display().to_string();
                let placeholders = extract_placeholders(spec.content()).map_err(|message| {
                    StackupError::TemplateAuthoring {
                        template: destination.clone(),
                        message,
                    }
                })?;
                if placeholders.is_empty() {
                    return Ok(destination);
                }
                let names: Vec<&str> = placeholders.iter().map(String::as_str).collect();
                Ok(format!("{:<28} {}", destination, names.join(", ")))
            })
            .collect()
    }
}

impl Command for TemplatesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        for line in Self::lines()? {
            ui.message(&line);
        }
        Ok(CommandResult::success())
    }
}
