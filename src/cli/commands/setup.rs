//! Shared preparation for commands that build the bootstrap plan.
//!
//! Everything here happens before the plan runs, so every error is an
//! invocation problem (exit 2) or a defect in the bundled plan.

use std::path::{Path, PathBuf};

use crate::bootstrap::{
    activate_installed_node, build_plan, host_os, resolve_root, validate_project_name,
    BootstrapOptions, HostOs, ManagerRoots,
};
use crate::cli::args::ProjectArgs;
use crate::config::Settings;
use crate::context::ProjectContext;
use crate::error::{Result, StackupError};
use crate::plan::Plan;
use crate::shell::{detect_shell, ExternalProcessRunner, HostEnv};
use crate::template::ConflictPolicy;
use crate::ui::{Prompt, PromptType, UserInterface};

/// Prompt key for the project name (`STACKUP_PROMPT_PROJECT_NAME`).
pub const PROJECT_NAME_KEY: &str = "project_name";

/// A plan ready to run against the live host.
pub struct Workspace<'r> {
    /// Validated project name.
    pub name: String,
    /// Absolute project root.
    pub root: PathBuf,
    /// Detected host.
    pub host_os: HostOs,
    /// Host view the plan runs against.
    pub host: HostEnv<'r>,
    /// The full-stack plan.
    pub plan: Plan,
    /// Project context with tool pins applied.
    pub ctx: ProjectContext,
}

/// Settings from the file, overridden by command-line flags.
pub fn effective_settings(
    config: Option<&Path>,
    args: &ProjectArgs,
    force: bool,
) -> Result<Settings> {
    let mut settings = Settings::load(config)?;
    for (flag, value, target) in [
        ("--python", &args.python, &mut settings.python_version),
        ("--node", &args.node, &mut settings.node_version),
    ] {
        if let Some(version) = value {
            if version.parse::<crate::probe::Version>().is_err() {
                return Err(StackupError::InvalidInvocation {
                    message: format!("{} expects a numeric version, got '{}'", flag, version),
                });
            }
            *target = version.clone();
        }
    }
    if args.skip_deps {
        settings.install_dependencies = false;
    }
    if force {
        settings.on_conflict = ConflictPolicy::BackupThenOverwrite;
    }
    Ok(settings)
}

/// The project name from the arguments, else from a prompt.
pub fn project_name(args: &ProjectArgs, ui: &mut dyn UserInterface) -> Result<String> {
    let name = match &args.name {
        Some(name) => name.trim().to_string(),
        None => ui
            .prompt(&Prompt {
                key: PROJECT_NAME_KEY.to_string(),
                question: "Project name".to_string(),
                prompt_type: PromptType::Input,
                default: None,
            })?
            .as_string(),
    };
    validate_project_name(&name)?;
    Ok(name)
}

/// Resolve the project, detect the host and build the plan.
pub fn prepare<'r>(
    runner: &'r dyn ExternalProcessRunner,
    working_dir: &Path,
    config: Option<&Path>,
    args: &ProjectArgs,
    force: bool,
    ui: &mut dyn UserInterface,
) -> Result<Workspace<'r>> {
    let settings = effective_settings(config, args, force)?;
    let name = project_name(args, ui)?;
    let root = resolve_root(&name, args.root.as_deref(), working_dir);
    let host_os = host_os::detect()?;

    let home = crate::sys::home_dir().ok_or_else(|| StackupError::InvalidInvocation {
        message: "HOME is not set".to_string(),
    })?;
    let mut host = HostEnv::system(runner, &home);

    let profile = settings
        .shell_profile
        .clone()
        .unwrap_or_else(|| detect_shell(&home).profile_file(&home));
    let options = BootstrapOptions::from_settings(&settings, profile);
    let roots = ManagerRoots::for_host(&host);
    activate_installed_node(&mut host, &roots.nvm, &options.node_version);

    let plan = build_plan(&options, &host_os, &roots, &root)?;
    let ctx = options.context(&name, &root)?;
    tracing::debug!(
        "Prepared {} steps for {} at {}",
        plan.len(),
        name,
        root.display()
    );

    Ok(Workspace {
        name,
        root,
        host_os,
        host,
        plan,
        ctx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn settings_file(content: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn flags_override_settings_file() {
        let (_temp, path) = settings_file("python_version: \"3.11\"\nnode_version: 18\n");
        let args = ProjectArgs {
            node: Some("22".to_string()),
            skip_deps: true,
            ..Default::default()
        };
        let settings = effective_settings(Some(&path), &args, true).unwrap();
        assert_eq!(settings.python_version, "3.11");
        assert_eq!(settings.node_version, "22");
        assert!(!settings.install_dependencies);
        assert_eq!(settings.on_conflict, ConflictPolicy::BackupThenOverwrite);
    }

    #[test]
    fn non_numeric_pin_is_invocation_error() {
        let (_temp, path) = settings_file("");
        let args = ProjectArgs {
            python: Some("latest".to_string()),
            ..Default::default()
        };
        let err = effective_settings(Some(&path), &args, false).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn name_is_prompted_when_missing() {
        let mut ui = MockUI::new();
        ui.set_prompt_response(PROJECT_NAME_KEY, "demo");
        let name = project_name(&ProjectArgs::default(), &mut ui).unwrap();
        assert_eq!(name, "demo");
        assert_eq!(ui.prompts_shown(), [PROJECT_NAME_KEY]);
    }

    #[test]
    fn invalid_name_is_rejected_without_prompting() {
        let mut ui = MockUI::new();
        let args = ProjectArgs {
            name: Some("../escape".to_string()),
            ..Default::default()
        };
        let err = project_name(&args, &mut ui).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(ui.prompts_shown().is_empty());
    }
}
