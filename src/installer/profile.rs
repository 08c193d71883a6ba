//! Shell profile activation blocks.
//!
//! Version managers need a few lines in the user's shell profile to work
//! in new shells. Each block is fenced by marker comments so it is written
//! at most once, however many times the bootstrap runs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::context::ProjectContext;
use crate::error::{Result, StackupError};
use crate::probe::{Observation, Probe, ProbeStatus};
use crate::shell::HostEnv;

use super::Installer;

fn open_marker(name: &str) -> String {
    format!("# >>> stackup: {} >>>", name)
}

fn close_marker(name: &str) -> String {
    format!("# <<< stackup: {} <<<", name)
}

/// Whether `profile` already carries the block named `name`.
pub fn has_block(profile: &Path, name: &str) -> bool {
    std::fs::read_to_string(profile)
        .map(|content| content.lines().any(|l| l.trim() == open_marker(name)))
        .unwrap_or(false)
}

/// Appends a named block of lines to a shell profile.
///
/// Directories listed with [`with_path_dir`](Self::with_path_dir) are also
/// put on the search path of the current run, so later steps can use the
/// tool without a new shell.
#[derive(Debug, Clone)]
pub struct ProfileBlockInstaller {
    profile: PathBuf,
    name: String,
    lines: Vec<String>,
    path_dirs: Vec<PathBuf>,
}

impl ProfileBlockInstaller {
    /// Append `lines` to `profile` under the block name `name`.
    pub fn new<I, S>(profile: impl Into<PathBuf>, name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profile: profile.into(),
            name: name.into(),
            lines: lines.into_iter().map(Into::into).collect(),
            path_dirs: Vec::new(),
        }
    }

    /// Also prepend `dir` to the search path after writing.
    pub fn with_path_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_dirs.push(dir.into());
        self
    }

    fn render(&self) -> String {
        let mut block = String::new();
        block.push('\n');
        block.push_str(&open_marker(&self.name));
        block.push('\n');
        for line in &self.lines {
            block.push_str(line);
            block.push('\n');
        }
        block.push_str(&close_marker(&self.name));
        block.push('\n');
        block
    }
}

impl Installer for ProfileBlockInstaller {
    fn describe(&self) -> String {
        format!("add {} setup to {}", self.name, self.profile.display())
    }

    fn execute(&self, host: &mut HostEnv<'_>, _ctx: &ProjectContext) -> Result<()> {
        if has_block(&self.profile, &self.name) {
            tracing::debug!(
                "{} already has the {} block",
                self.profile.display(),
                self.name
            );
        } else {
            if let Some(parent) = self.profile.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StackupError::io_at(parent, e))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.profile)
                .map_err(|e| StackupError::io_at(&self.profile, e))?;
            file.write_all(self.render().as_bytes())
                .map_err(|e| StackupError::io_at(&self.profile, e))?;
            tracing::info!("Updated {}", self.profile.display());
        }

        // Reverse so the first listed directory ends up first.
        for dir in self.path_dirs.iter().rev() {
            host.prepend_path(dir);
        }
        Ok(())
    }
}

/// Satisfied when a profile carries the named block.
#[derive(Debug, Clone)]
pub struct ProfileBlockPresent {
    profile: PathBuf,
    name: String,
}

impl ProfileBlockPresent {
    /// Check `profile` for the block `name`.
    pub fn new(profile: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            name: name.into(),
        }
    }
}

impl Probe for ProfileBlockPresent {
    fn describe(&self) -> String {
        format!("{} block in {}", self.name, self.profile.display())
    }

    fn observe(&self, _host: &HostEnv<'_>, _ctx: &ProjectContext) -> Observation {
        if has_block(&self.profile, &self.name) {
            ProbeStatus::Satisfied.into()
        } else {
            ProbeStatus::unsatisfied(format!(
                "{} has no {} setup",
                self.profile.display(),
                self.name
            ))
            .into()
        }
    }
}
