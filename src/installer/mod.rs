//! Actions that bring a precondition into existence.
//!
//! An [`Installer`] is the side-effecting half of a step. It may run
//! package managers, clone repositories or write files, and it may extend
//! the host search path so later probes see what it installed. Installers
//! are only invoked after their step's probe reported the precondition as
//! unsatisfied.
//!
//! # Modules
//!
//! - [`command`] - Run an external program, optionally elevated
//! - [`fs`] - Create directories
//! - [`git`] - Clone a repository to a fixed location
//! - [`packages`] - System packages through the host package manager
//! - [`profile`] - Append an activation block to a shell profile

pub mod command;
pub mod fs;
pub mod git;
pub mod packages;
pub mod profile;

pub use command::CommandInstaller;
pub use fs::CreateDirInstaller;
pub use git::GitCloneInstaller;
pub use packages::{packages_present, PackageManager, SystemPackagesInstaller};
pub use profile::{ProfileBlockInstaller, ProfileBlockPresent};

use crate::context::ProjectContext;
use crate::error::Result;
use crate::shell::HostEnv;

/// A side-effecting action that makes a probe pass.
pub trait Installer {
    /// Short description of what will be done (shown in confirmations).
    fn describe(&self) -> String;

    /// Perform the installation.
    fn execute(&self, host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()>;
}

type InstallFn = dyn Fn(&mut HostEnv<'_>, &ProjectContext) -> Result<()>;

/// Installer backed by a closure.
pub struct FnInstaller {
    label: String,
    action: Box<InstallFn>,
}

impl FnInstaller {
    /// Wrap `action` with a display label.
    pub fn new(
        label: impl Into<String>,
        action: impl Fn(&mut HostEnv<'_>, &ProjectContext) -> Result<()> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }
}

impl Installer for FnInstaller {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn execute(&self, host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()> {
        (self.action)(host, ctx)
    }
}
