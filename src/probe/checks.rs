//! Built-in probes.
//!
//! Relative paths are resolved against the project root. Command lookups
//! use the host search path, never the `which` command.

use std::path::PathBuf;

use crate::context::ProjectContext;
use crate::shell::{display_command, HostEnv};

use super::version::{extract_version, Version};
use super::{Observation, Probe, ProbeStatus, ResolvedVersion};

/// Satisfied when an executable is found on the search path.
#[derive(Debug, Clone)]
pub struct CommandExists {
    tool: String,
}

impl CommandExists {
    /// Check for `tool` on the search path.
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl Probe for CommandExists {
    fn describe(&self) -> String {
        format!("command `{}`", self.tool)
    }

    fn observe(&self, host: &HostEnv<'_>, _ctx: &ProjectContext) -> Observation {
        match host.which(&self.tool) {
            Some(path) => {
                tracing::debug!("Found {} at {}", self.tool, path.display());
                ProbeStatus::Satisfied.into()
            }
            None => ProbeStatus::unsatisfied(format!("`{}` not found on PATH", self.tool)).into(),
        }
    }
}

/// What a [`ToolVersion`] probe accepts.
#[derive(Debug, Clone)]
enum Requirement {
    /// The project's pin for the tool: leading components must match.
    Pinned,
    /// Any version at least this one.
    AtLeast(String),
}

/// Satisfied when a tool reports an acceptable version.
///
/// A pinned check takes the project's pin for `tool` and accepts only
/// versions starting with the pin's components, so `22.3.0` does not
/// satisfy a pin of `20`. Without a pin any parseable version satisfies. A
/// minimum check accepts anything at least the minimum. A satisfied check
/// resolves the observed version into the project context.
#[derive(Debug, Clone)]
pub struct ToolVersion {
    tool: String,
    command: String,
    args: Vec<String>,
    requirement: Requirement,
}

impl ToolVersion {
    /// Query `command --version` and match it against the pin for `tool`.
    pub fn pinned(tool: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            command: command.into(),
            args: vec!["--version".to_string()],
            requirement: Requirement::Pinned,
        }
    }

    /// Query `command --version` and compare against a fixed minimum.
    pub fn at_least(
        tool: impl Into<String>,
        command: impl Into<String>,
        minimum: impl Into<String>,
    ) -> Self {
        Self {
            requirement: Requirement::AtLeast(minimum.into()),
            ..Self::pinned(tool, command)
        }
    }

    /// Use custom arguments for the version query.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn wanted<'c>(&'c self, ctx: &'c ProjectContext) -> Option<&'c str> {
        match &self.requirement {
            Requirement::Pinned => ctx.pinned(&self.tool),
            Requirement::AtLeast(minimum) => Some(minimum),
        }
    }

    fn verdict(&self, found: &Version, wanted: &Version) -> ProbeStatus {
        match &self.requirement {
            Requirement::Pinned if !found.matches_pin(wanted) => ProbeStatus::unsatisfied(
                format!("{} {} does not match pinned {}", self.tool, found, wanted),
            ),
            Requirement::AtLeast(_) if !found.at_least(wanted) => ProbeStatus::unsatisfied(
                format!("{} {} is older than {}", self.tool, found, wanted),
            ),
            _ => ProbeStatus::Satisfied,
        }
    }
}

impl Probe for ToolVersion {
    fn describe(&self) -> String {
        match &self.requirement {
            Requirement::AtLeast(min) => format!("{} >= {}", self.tool, min),
            Requirement::Pinned => format!("{} at pinned version", self.tool),
        }
    }

    fn observe(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        let wanted = match self.wanted(ctx).map(str::parse::<Version>) {
            Some(Ok(version)) => Some(version),
            Some(Err(e)) => return ProbeStatus::inconclusive(e).into(),
            None => None,
        };

        if host.which(&self.command).is_none() {
            return ProbeStatus::unsatisfied(format!("`{}` not found on PATH", self.command))
                .into();
        }

        let query = display_command(&self.command, &self.args);
        let result = match host.run(&self.command, &self.args, None) {
            Ok(result) => result,
            Err(e) => {
                return ProbeStatus::inconclusive(format!("`{}` could not run: {}", query, e))
                    .into()
            }
        };
        if !result.success {
            return ProbeStatus::inconclusive(format!(
                "`{}` exited with code {:?}",
                query, result.exit_code
            ))
            .into();
        }

        // Some interpreters print their version on stderr.
        let combined = format!("{}\n{}", result.stdout, result.stderr);
        let Some(found) = extract_version(&combined) else {
            return ProbeStatus::inconclusive(format!("no version in output of `{}`", query))
                .into();
        };

        let status = match &wanted {
            Some(wanted) => self.verdict(&found, wanted),
            None => ProbeStatus::Satisfied,
        };

        let resolved = status.is_satisfied().then(|| ResolvedVersion {
            tool: self.tool.clone(),
            version: found.to_string(),
        });

        Observation { status, resolved }
    }
}

/// What kind of filesystem entry [`PathExists`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Any,
    File,
    Dir,
}

/// Satisfied when a path exists.
#[derive(Debug, Clone)]
pub struct PathExists {
    path: PathBuf,
    kind: PathKind,
}

impl PathExists {
    /// Any entry at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: PathKind::Any,
        }
    }

    /// A regular file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: PathKind::File,
            ..Self::new(path)
        }
    }

    /// A directory at `path`.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: PathKind::Dir,
            ..Self::new(path)
        }
    }
}

impl Probe for PathExists {
    fn describe(&self) -> String {
        format!("path {}", self.path.display())
    }

    fn observe(&self, _host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        let full = ctx.resolve(&self.path);
        let status = match (self.kind, full.exists()) {
            (_, false) => ProbeStatus::unsatisfied(format!("{} does not exist", full.display())),
            (PathKind::File, true) if !full.is_file() => {
                ProbeStatus::unsatisfied(format!("{} is not a file", full.display()))
            }
            (PathKind::Dir, true) if !full.is_dir() => {
                ProbeStatus::unsatisfied(format!("{} is not a directory", full.display()))
            }
            _ => ProbeStatus::Satisfied,
        };
        status.into()
    }
}

/// Satisfied when an environment variable is set and non-empty.
#[derive(Debug, Clone)]
pub struct EnvVarPresent {
    name: String,
}

impl EnvVarPresent {
    /// Check for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Probe for EnvVarPresent {
    fn describe(&self) -> String {
        format!("environment variable {}", self.name)
    }

    fn observe(&self, host: &HostEnv<'_>, _ctx: &ProjectContext) -> Observation {
        match host.var(&self.name) {
            Some(value) if !value.is_empty() => ProbeStatus::Satisfied.into(),
            _ => ProbeStatus::unsatisfied(format!("${} is not set", self.name)).into(),
        }
    }
}

/// Satisfied when a command exits with status 0.
///
/// Only use this with read-only commands (`python -c "import fastapi"`,
/// `git rev-parse`).
#[derive(Debug, Clone)]
pub struct CommandSucceeds {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandSucceeds {
    /// Run `program` with `args` from the current directory.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
        }
    }

    /// Run from `cwd` (relative paths resolve against the project root).
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl Probe for CommandSucceeds {
    fn describe(&self) -> String {
        format!("`{}` succeeds", display_command(&self.program, &self.args))
    }

    fn observe(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        let program = if self.program.contains('/') {
            ctx.resolve(std::path::Path::new(&self.program))
                .display()
                .to_string()
        } else {
            self.program.clone()
        };
        let cwd = self.cwd.as_ref().map(|dir| ctx.resolve(dir));
        if let Some(dir) = &cwd {
            if !dir.is_dir() {
                return ProbeStatus::unsatisfied(format!("{} does not exist", dir.display()))
                    .into();
            }
        }

        let rendered = display_command(&self.program, &self.args);
        let status = match host.run(&program, &self.args, cwd.as_deref()) {
            Ok(result) if result.success => ProbeStatus::Satisfied,
            Ok(result) => ProbeStatus::unsatisfied(format!(
                "`{}` exited with code {:?}",
                rendered, result.exit_code
            )),
            Err(crate::error::StackupError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                ProbeStatus::unsatisfied(format!("`{}` not found", self.program))
            }
            Err(e) => ProbeStatus::inconclusive(format!("`{}` could not run: {}", rendered, e)),
        };
        status.into()
    }
}

/// Satisfied when any child probe is satisfied.
pub struct AnyOf {
    probes: Vec<Box<dyn Probe>>,
}

impl AnyOf {
    /// Combine probes; the first satisfied one wins.
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }
}

impl Probe for AnyOf {
    fn describe(&self) -> String {
        let parts: Vec<String> = self.probes.iter().map(|p| p.describe()).collect();
        parts.join(" or ")
    }

    fn observe(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        let mut reasons = Vec::new();
        for probe in &self.probes {
            let obs = probe.observe(host, ctx);
            if obs.status.is_satisfied() {
                return obs;
            }
            if let Some(reason) = obs.status.reason() {
                reasons.push(reason.to_string());
            }
        }
        ProbeStatus::unsatisfied(reasons.join("; ")).into()
    }
}

/// Satisfied when every child probe is satisfied.
pub struct AllOf {
    probes: Vec<Box<dyn Probe>>,
}

impl AllOf {
    /// Combine probes; the first unsatisfied one decides.
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }
}

impl Probe for AllOf {
    fn describe(&self) -> String {
        let parts: Vec<String> = self.probes.iter().map(|p| p.describe()).collect();
        parts.join(" and ")
    }

    fn observe(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        let mut resolved = None;
        for probe in &self.probes {
            let obs = probe.observe(host, ctx);
            if !obs.status.is_satisfied() {
                return obs.status.into();
            }
            resolved = resolved.or(obs.resolved);
        }
        Observation {
            status: ProbeStatus::Satisfied,
            resolved,
        }
    }
}

type ProbeFn = dyn Fn(&HostEnv<'_>, &ProjectContext) -> ProbeStatus;

/// Probe backed by a closure.
pub struct FnProbe {
    label: String,
    check: Box<ProbeFn>,
}

impl FnProbe {
    /// Wrap `check` with a display label.
    pub fn new(
        label: impl Into<String>,
        check: impl Fn(&HostEnv<'_>, &ProjectContext) -> ProbeStatus + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            check: Box::new(check),
        }
    }
}

impl Probe for FnProbe {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn observe(&self, host: &HostEnv<'_>, ctx: &ProjectContext) -> Observation {
        (self.check)(host, ctx).into()
    }
}
