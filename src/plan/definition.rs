//! Validated, ordered step lists.

use std::collections::HashSet;

use crate::error::{Result, StackupError};

use super::step::Step;

/// An ordered list of steps.
///
/// Order is dependency order: a step may assume every earlier step's
/// effects. Construction rejects duplicate names within one nesting level
/// and prerequisites that do not name an earlier step.
#[derive(Debug)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Validate and wrap `steps`.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        validate_level(&steps, &[])?;
        Ok(Self { steps })
    }

    /// The top-level steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of top-level steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Check one nesting level.
///
/// `enclosing` holds the names visible from outer levels: everything that
/// ran before the composite that owns this level.
fn validate_level(steps: &[Step], enclosing: &[&str]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut visible: Vec<&str> = enclosing.to_vec();

    for step in steps {
        let name = step.name();
        if name.trim().is_empty() {
            return Err(StackupError::InvalidPlan {
                message: "step names cannot be empty".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(StackupError::InvalidPlan {
                message: format!("duplicate step name '{}'", name),
            });
        }

        for prerequisite in step.prerequisites() {
            if prerequisite == name {
                return Err(StackupError::InvalidPlan {
                    message: format!("step '{}' cannot come after itself", name),
                });
            }
            if !visible.contains(&prerequisite.as_str()) {
                let later = steps.iter().any(|s| s.name() == prerequisite);
                let message = if later {
                    format!(
                        "step '{}' depends on '{}', which runs later",
                        name, prerequisite
                    )
                } else {
                    format!("step '{}' depends on unknown step '{}'", name, prerequisite)
                };
                return Err(StackupError::InvalidPlan { message });
            }
        }

        validate_level(step.children(), &visible)?;
        visible.push(name);
    }
    Ok(())
}
