//! Steps: a probe paired with the action that satisfies it.

use crate::installer::Installer;
use crate::probe::Probe;

/// How a step brings its probe to `Satisfied`.
pub enum StepAction {
    /// Run a single installer.
    Install(Box<dyn Installer>),
    /// Run nested steps through the same runner.
    Nested(Vec<Step>),
}

/// A labelled probe/installer pair with a confirmation policy.
pub struct Step {
    name: String,
    probe: Box<dyn Probe>,
    action: StepAction,
    requires_confirmation: bool,
    after: Vec<String>,
}

impl Step {
    /// A step that runs `installer` when `probe` is unsatisfied.
    pub fn new(
        name: impl Into<String>,
        probe: impl Probe + 'static,
        installer: impl Installer + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            probe: Box::new(probe),
            action: StepAction::Install(Box::new(installer)),
            requires_confirmation: false,
            after: Vec::new(),
        }
    }

    /// A step that runs `children` when `probe` is unsatisfied.
    ///
    /// `probe` is re-checked once every child has completed.
    pub fn composite(
        name: impl Into<String>,
        probe: impl Probe + 'static,
        children: Vec<Step>,
    ) -> Self {
        Self {
            name: name.into(),
            probe: Box::new(probe),
            action: StepAction::Nested(children),
            requires_confirmation: false,
            after: Vec::new(),
        }
    }

    /// Require explicit approval before installing.
    pub fn confirm(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Declare that this step relies on an earlier step's effects.
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after.push(name.into());
        self
    }

    /// Step label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The step's probe.
    pub fn probe(&self) -> &dyn Probe {
        self.probe.as_ref()
    }

    /// What runs when the probe is unsatisfied.
    pub fn action(&self) -> &StepAction {
        &self.action
    }

    /// Whether approval is needed before installing.
    pub fn requires_confirmation(&self) -> bool {
        self.requires_confirmation
    }

    /// Names of earlier steps this one relies on.
    pub fn prerequisites(&self) -> &[String] {
        &self.after
    }

    /// Nested steps, if this is a composite.
    pub fn children(&self) -> &[Step] {
        match &self.action {
            StepAction::Nested(children) => children,
            StepAction::Install(_) => &[],
        }
    }

    /// What the install action does, for confirmation prompts.
    pub fn describe_action(&self) -> String {
        match &self.action {
            StepAction::Install(installer) => installer.describe(),
            StepAction::Nested(children) => {
                let names: Vec<&str> = children.iter().map(Step::name).collect();
                names.join(", then ")
            }
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("probe", &self.probe.describe())
            .field("action", &self.describe_action())
            .field("requires_confirmation", &self.requires_confirmation)
            .field("after", &self.after)
            .finish()
    }
}
