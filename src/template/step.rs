//! Probe and installer pair for emitting templates inside a plan.

use std::rc::Rc;

use crate::context::ProjectContext;
use crate::error::Result;
use crate::installer::Installer;
use crate::plan::Step;
use crate::probe::{Observation, Probe, ProbeStatus};
use crate::shell::HostEnv;

use super::emitter::{emit_with, EmitOutcome};
use super::spec::{ConflictPolicy, TemplateSpec};

/// Satisfied when the destination already holds the rendered content, or
/// when the policy is `Skip` and the destination exists.
#[derive(Debug, Clone)]
pub struct TemplateProbe {
    spec: Rc<TemplateSpec>,
}

impl TemplateProbe {
    /// Check `spec` against the filesystem.
    pub fn new(spec: Rc<TemplateSpec>) -> Self {
        Self { spec }
    }
}

impl Probe for TemplateProbe {
    fn describe(&self) -> String {
        format!("{} is up to date", self.spec.destination().display())
    }

    fn observe(&self, _host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        let dest = ctx.resolve(self.spec.destination());
        if !dest.exists() {
            return ProbeStatus::unsatisfied(format!("{} does not exist", dest.display())).into();
        }
        if self.spec.policy() == ConflictPolicy::Skip {
            return ProbeStatus::Satisfied.into();
        }

        let rendered = match self.spec.render_over(&ctx.substitutions()) {
            Ok(rendered) => rendered,
            Err(e) => return ProbeStatus::inconclusive(e.to_string()).into(),
        };
        match std::fs::read(&dest) {
            Ok(existing) if existing == rendered.as_bytes() => ProbeStatus::Satisfied.into(),
            Ok(_) => ProbeStatus::unsatisfied(format!(
                "{} differs from the template",
                dest.display()
            ))
            .into(),
            Err(e) => ProbeStatus::inconclusive(format!("cannot read {}: {}", dest.display(), e))
                .into(),
        }
    }
}

/// Emits a template with the project context's substitutions.
#[derive(Debug, Clone)]
pub struct EmitInstaller {
    spec: Rc<TemplateSpec>,
}

impl EmitInstaller {
    /// Emit `spec`.
    pub fn new(spec: Rc<TemplateSpec>) -> Self {
        Self { spec }
    }
}

impl Installer for EmitInstaller {
    fn describe(&self) -> String {
        format!(
            "write {} ({})",
            self.spec.destination().display(),
            self.spec.policy()
        )
    }

    fn execute(&self, _host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()> {
        match emit_with(&self.spec, ctx.root_path(), &ctx.substitutions())? {
            EmitOutcome::BackedUp { backup, .. } => {
                tracing::info!("Previous content saved to {}", backup.display())
            }
            outcome => tracing::debug!("{:?}", outcome),
        }
        Ok(())
    }
}

/// Wrap a template in a plan step named after its destination.
pub fn template_step(spec: TemplateSpec) -> Step {
    let spec = Rc::new(spec);
    Step::new(
        spec.destination().display().to_string(),
        TemplateProbe::new(Rc::clone(&spec)),
        EmitInstaller::new(spec),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{AutoApprove, Plan, PlanRunner};
    use crate::shell::ScriptedRunner;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn step_emits_once() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();
        let mut gate = AutoApprove;

        let plan = Plan::new(vec![template_step(TemplateSpec::new(
            "README.md",
            "# {{project_name}}\n",
        ))])
        .unwrap();

        let first = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
        assert_eq!(first.installs, 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("README.md")).unwrap(),
            "# demo\n"
        );

        let second = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
        assert_eq!(second.installs, 0);
    }

    #[test]
    fn skip_policy_accepts_any_existing_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "custom").unwrap();
        let runner = ScriptedRunner::new();
        let host = HostEnv::new(&runner, temp.path());
        let ctx = ProjectContext::new("demo", temp.path()).unwrap();

        let spec = Rc::new(TemplateSpec::new("README.md", "# {{project_name}}"));
        assert!(TemplateProbe::new(spec).evaluate(&host, &ctx).is_satisfied());
    }

    #[test]
    fn overwrite_policy_detects_drift() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "custom").unwrap();
        let runner = ScriptedRunner::new();
        let host = HostEnv::new(&runner, temp.path());
        let ctx = ProjectContext::new("demo", temp.path()).unwrap();

        let spec = Rc::new(
            TemplateSpec::new("README.md", "# {{project_name}}")
                .on_conflict(ConflictPolicy::Overwrite),
        );
        let status = TemplateProbe::new(spec).evaluate(&host, &ctx);
        assert!(matches!(status, ProbeStatus::Unsatisfied { .. }));
    }

    #[test]
    fn authoring_error_fails_the_step() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());
        let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();
        let mut gate = AutoApprove;

        let plan = Plan::new(vec![template_step(TemplateSpec::new(
            "main.py",
            "{{undefined_value}}",
        ))])
        .unwrap();
        let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);

        let failure = report.failure.unwrap();
        assert!(matches!(
            failure.error,
            crate::error::StackupError::TemplateAuthoring { .. }
        ));
        assert!(!temp.path().join("main.py").exists());
    }
}
