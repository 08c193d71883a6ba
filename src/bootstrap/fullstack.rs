//! The full-stack starter plan: Python API backend plus TypeScript frontend.
//!
//! Step order is dependency order. System packages come first because
//! everything after needs git and curl; the language runtimes come before
//! any project file that names them; dependency installs come last because
//! they need both the runtimes and the emitted manifests.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::installer::{
    packages_present, CommandInstaller, CreateDirInstaller, GitCloneInstaller,
    ProfileBlockInstaller, ProfileBlockPresent, SystemPackagesInstaller,
};
use crate::plan::{Plan, Step};
use crate::probe::{
    AllOf, AnyOf, CommandExists, CommandSucceeds, PathExists, Probe, ToolVersion, Version,
};
use crate::shell::HostEnv;
use crate::template::embedded::starter_templates;
use crate::template::{template_step, ConflictPolicy};

use super::host_os::HostOs;

const PYENV_REPO: &str = "https://github.com/pyenv/pyenv.git";
const NVM_REPO: &str = "https://github.com/nvm-sh/nvm.git";

/// Step names other steps refer to.
pub const SYSTEM_PACKAGES: &str = "system packages";
pub const PYTHON: &str = "python";
pub const NODE: &str = "node";
pub const LAYOUT: &str = "project layout";

/// Everything the full-stack plan depends on.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Pinned Python version (`3.12`).
    pub python_version: String,
    /// Pinned Node.js version (`20`).
    pub node_version: String,
    /// Base packages for the system package manager.
    pub system_packages: Vec<String>,
    /// Policy for existing files that differ from a template.
    pub on_conflict: ConflictPolicy,
    /// Install backend and frontend dependencies.
    pub install_dependencies: bool,
    /// Shell profile that receives version-manager setup.
    pub shell_profile: PathBuf,
}

impl BootstrapOptions {
    /// Options from settings, with the profile resolved by the caller.
    pub fn from_settings(settings: &Settings, shell_profile: PathBuf) -> Self {
        Self {
            python_version: settings.python_version.clone(),
            node_version: settings.node_version.clone(),
            system_packages: settings.system_packages.clone(),
            on_conflict: settings.on_conflict,
            install_dependencies: settings.install_dependencies,
            shell_profile,
        }
    }

    /// Project context with the tool pins applied.
    pub fn context(&self, project_name: &str, root: &Path) -> Result<ProjectContext> {
        Ok(ProjectContext::new(project_name, root)?
            .with_pin("python", &self.python_version)
            .with_pin("node", &self.node_version))
    }
}

/// Version-manager locations for this host.
#[derive(Debug, Clone)]
pub struct ManagerRoots {
    /// pyenv checkout (`$PYENV_ROOT` or `~/.pyenv`).
    pub pyenv: PathBuf,
    /// nvm checkout (`$NVM_DIR` or `~/.nvm`).
    pub nvm: PathBuf,
}

impl ManagerRoots {
    /// Resolve from the host environment.
    pub fn for_host(host: &HostEnv<'_>) -> Self {
        let from_env = |key: &str, default: &str| {
            host.var(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| host.home().join(default))
        };
        Self {
            pyenv: from_env("PYENV_ROOT", ".pyenv"),
            nvm: from_env("NVM_DIR", ".nvm"),
        }
    }
}

/// Put an nvm-installed Node.js matching `pin` on the search path.
///
/// nvm has no shims, so a Node.js installed by an earlier run is invisible
/// until its `bin` directory is added. The newest installed version whose
/// leading components equal the pin wins. Returns the directory added.
pub fn activate_installed_node(host: &mut HostEnv<'_>, nvm_root: &Path, pin: &str) -> Option<PathBuf> {
    let pin: Version = pin.parse().ok()?;
    let versions_dir = nvm_root.join("versions").join("node");
    let entries = std::fs::read_dir(&versions_dir).ok()?;

    let best = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let version: Version = name.parse().ok()?;
            let bin = entry.path().join("bin");
            (version.matches_pin(&pin) && bin.is_dir()).then_some((version, bin))
        })
        .max_by(|a, b| a.0.cmp(&b.0))?;

    host.prepend_path(&best.1);
    tracing::debug!("Activated Node.js {} from nvm", best.0);
    Some(best.1)
}

fn system_packages_step(host_os: &HostOs, packages: &[String]) -> Step {
    Step::new(
        SYSTEM_PACKAGES,
        packages_present(host_os.package_manager, packages),
        SystemPackagesInstaller::new(host_os.package_manager, packages.to_vec()),
    )
    .confirm()
}

fn installed_python(pin: &str) -> ToolVersion {
    ToolVersion::pinned("python", "pyenv").with_args(vec!["latest".to_string(), pin.to_string()])
}

fn python_step(options: &BootstrapOptions, roots: &ManagerRoots) -> Step {
    let pin = &options.python_version;
    let pyenv = roots.pyenv.display().to_string();
    let pyenv_bin = roots.pyenv.join("bin").join("pyenv");

    let clone = Step::new(
        "pyenv",
        AnyOf::new(vec![
            Box::new(CommandExists::new("pyenv")),
            Box::new(PathExists::file(pyenv_bin.clone())),
        ]),
        GitCloneInstaller::new(PYENV_REPO, &roots.pyenv, "bin/pyenv"),
    );

    let profile = Step::new(
        "pyenv shell setup",
        ProfileBlockPresent::new(&options.shell_profile, "pyenv"),
        ProfileBlockInstaller::new(
            &options.shell_profile,
            "pyenv",
            [
                format!("export PYENV_ROOT=\"{}\"", pyenv),
                "[ -d \"$PYENV_ROOT/bin\" ] && export PATH=\"$PYENV_ROOT/bin:$PATH\"".to_string(),
                "eval \"$(pyenv init -)\"".to_string(),
            ],
        )
        .with_path_dir(roots.pyenv.join("bin"))
        .with_path_dir(roots.pyenv.join("shims")),
    )
    .after("pyenv");

    let install = Step::new(
        format!("python {}", pin),
        installed_python(pin),
        CommandInstaller::new("pyenv", ["install", "-s", pin.as_str()])
            .env("PYENV_ROOT", pyenv)
            .needs_network(),
    )
    .after("pyenv shell setup");

    // The backend's .python-version selects the pyenv build, so a pyenv
    // install is as good as a matching python3 on PATH.
    Step::composite(
        PYTHON,
        AnyOf::new(vec![
            Box::new(ToolVersion::pinned("python", "python3")),
            Box::new(installed_python(pin)),
        ]),
        vec![clone, profile, install],
    )
    .confirm()
    .after(SYSTEM_PACKAGES)
}

fn node_step(options: &BootstrapOptions, roots: &ManagerRoots) -> Step {
    let pin = &options.node_version;
    let nvm = roots.nvm.display().to_string();

    let clone = Step::new(
        "nvm",
        PathExists::file(roots.nvm.join("nvm.sh")),
        GitCloneInstaller::new(NVM_REPO, &roots.nvm, "nvm.sh"),
    );

    let profile = Step::new(
        "nvm shell setup",
        ProfileBlockPresent::new(&options.shell_profile, "nvm"),
        ProfileBlockInstaller::new(
            &options.shell_profile,
            "nvm",
            [
                format!("export NVM_DIR=\"{}\"", nvm),
                "[ -s \"$NVM_DIR/nvm.sh\" ] && . \"$NVM_DIR/nvm.sh\"".to_string(),
            ],
        ),
    )
    .after("nvm");

    // nvm is a shell function, so it only runs inside bash. Progress goes
    // to stderr so the last stdout line is the path of the node binary.
    let script = format!(
        ". \"{nvm}/nvm.sh\" && nvm install {pin} >&2 && nvm which {pin}",
        nvm = nvm,
        pin = pin
    );
    let install = Step::new(
        format!("node {}", pin),
        ToolVersion::pinned("node", "node"),
        CommandInstaller::new("bash", ["-c".to_string(), script])
            .env("NVM_DIR", nvm.clone())
            .needs_network()
            .exporting_bin_dir(),
    )
    .after("nvm shell setup");

    Step::composite(
        NODE,
        ToolVersion::pinned("node", "node"),
        vec![clone, profile, install],
    )
    .confirm()
    .after(SYSTEM_PACKAGES)
}

fn layout_step(root: &Path) -> Step {
    let dirs = [root.to_path_buf(), root.join("backend"), root.join("frontend")];
    let probes: Vec<Box<dyn Probe>> = dirs
        .iter()
        .map(|dir| Box::new(PathExists::dir(dir.clone())) as Box<dyn Probe>)
        .collect();
    let children = [("project root", &dirs[0]), ("backend", &dirs[1]), ("frontend", &dirs[2])]
        .into_iter()
        .map(|(name, dir)| {
            Step::new(
                name,
                PathExists::dir(dir.clone()),
                CreateDirInstaller::new(dir.clone()),
            )
        })
        .collect();
    Step::composite(LAYOUT, AllOf::new(probes), children)
}

fn dependency_steps(root: &Path) -> Vec<Step> {
    let venv_python = root.join("backend").join(".venv").join("bin").join("python");
    let venv_python_str = venv_python.display().to_string();

    let venv = Step::new(
        "backend virtualenv",
        PathExists::file(venv_python.clone()),
        CommandInstaller::new("python3", ["-m", "venv", ".venv"]).in_dir("backend"),
    )
    .after(PYTHON);

    let backend = Step::new(
        "backend dependencies",
        CommandSucceeds::new(
            venv_python_str.clone(),
            vec!["-c".to_string(), "import fastapi, uvicorn".to_string()],
        ),
        CommandInstaller::new(
            venv_python_str,
            ["-m", "pip", "install", "-r", "requirements.txt"],
        )
        .in_dir("backend")
        .needs_network(),
    )
    .after("backend virtualenv")
    .after("backend/requirements.txt");

    let frontend = Step::new(
        "frontend dependencies",
        CommandSucceeds::new("npm", vec!["ls".to_string(), "--depth=0".to_string()])
            .in_dir("frontend"),
        CommandInstaller::new("npm", ["install"])
            .in_dir("frontend")
            .needs_network(),
    )
    .after(NODE)
    .after("frontend/package.json");

    vec![venv, backend, frontend]
}

/// Build the full-stack plan for a project rooted at `root`.
pub fn build_plan(
    options: &BootstrapOptions,
    host_os: &HostOs,
    roots: &ManagerRoots,
    root: &Path,
) -> Result<Plan> {
    let mut steps = Vec::new();

    // An empty package list still gets a step so later steps can name it.
    steps.push(system_packages_step(host_os, &options.system_packages));
    steps.push(python_step(options, roots));
    steps.push(node_step(options, roots));
    steps.push(layout_step(root));

    for spec in starter_templates(options.on_conflict)? {
        steps.push(template_step(spec).after(LAYOUT));
    }

    steps.push(
        Step::new(
            "git repository",
            PathExists::dir(root.join(".git")),
            CommandInstaller::new("git", ["init", "--quiet"]).in_dir(root.to_path_buf()),
        )
        .after(SYSTEM_PACKAGES)
        .after(LAYOUT),
    );

    if options.install_dependencies {
        steps.extend(dependency_steps(root));
    }

    Plan::new(steps)
}
