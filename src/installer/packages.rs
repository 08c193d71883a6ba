//! System package installation through the host package manager.

use crate::context::ProjectContext;
use crate::error::Result;
use crate::probe::{AllOf, AnyOf, CommandExists, CommandSucceeds, Probe};
use crate::shell::HostEnv;

use super::{CommandInstaller, Installer};

/// Supported system package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Homebrew,
    Apt,
    Dnf,
    Pacman,
}

impl PackageManager {
    /// Executable name.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Homebrew => "brew",
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
        }
    }

    /// Whether installs need root. Homebrew refuses to run as root.
    pub fn needs_root(&self) -> bool {
        !matches!(self, Self::Homebrew)
    }

    /// Arguments that install `packages` without prompting.
    pub fn install_args(&self, packages: &[String]) -> Vec<String> {
        let prefix: &[&str] = match self {
            Self::Homebrew => &["install"],
            Self::Apt => &["install", "-y"],
            Self::Dnf => &["install", "-y"],
            // Arch does not support syncing the database without upgrading.
            Self::Pacman => &["-Syu", "--needed", "--noconfirm"],
        };
        prefix
            .iter()
            .map(|s| s.to_string())
            .chain(packages.iter().cloned())
            .collect()
    }

    /// Arguments that refresh the package index, if the manager needs it.
    pub fn refresh_args(&self) -> Option<Vec<String>> {
        match self {
            Self::Apt => Some(vec!["update".to_string()]),
            Self::Homebrew | Self::Dnf | Self::Pacman => None,
        }
    }

    /// Read-only query that succeeds when `package` is installed.
    pub fn query(&self, package: &str) -> (&'static str, Vec<String>) {
        let (program, args): (&str, &[&str]) = match self {
            Self::Homebrew => ("brew", &["list", "--versions"]),
            Self::Apt => ("dpkg", &["-s"]),
            Self::Dnf => ("rpm", &["-q"]),
            Self::Pacman => ("pacman", &["-Q"]),
        };
        let mut args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        args.push(package.to_string());
        (program, args)
    }

    fn command(&self, args: Vec<String>) -> CommandInstaller {
        let installer = CommandInstaller::new(self.program(), args).needs_network();
        let installer = if self.needs_root() {
            installer.elevated()
        } else {
            installer
        };
        match self {
            Self::Apt => installer.env("DEBIAN_FRONTEND", "noninteractive"),
            Self::Homebrew => installer.env("HOMEBREW_NO_AUTO_UPDATE", "1"),
            Self::Dnf | Self::Pacman => installer,
        }
    }
}

/// Probe satisfied when every package is present, either as a command on
/// the search path or according to the package manager's database.
pub fn packages_present(manager: PackageManager, packages: &[String]) -> AllOf {
    let probes: Vec<Box<dyn Probe>> = packages
        .iter()
        .map(|package| {
            let (program, args) = manager.query(package);
            Box::new(AnyOf::new(vec![
                Box::new(CommandExists::new(package.clone())),
                Box::new(CommandSucceeds::new(program, args)),
            ])) as Box<dyn Probe>
        })
        .collect();
    AllOf::new(probes)
}

/// Installs system packages, refreshing the package index first where the
/// manager requires it.
#[derive(Debug, Clone)]
pub struct SystemPackagesInstaller {
    manager: PackageManager,
    packages: Vec<String>,
}

impl SystemPackagesInstaller {
    /// Install `packages` with `manager`.
    pub fn new(manager: PackageManager, packages: Vec<String>) -> Self {
        Self { manager, packages }
    }
}

impl Installer for SystemPackagesInstaller {
    fn describe(&self) -> String {
        self.manager
            .command(self.manager.install_args(&self.packages))
            .describe()
    }

    fn execute(&self, host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()> {
        if let Some(refresh) = self.manager.refresh_args() {
            self.manager.command(refresh).execute(host, ctx)?;
        }
        self.manager
            .command(self.manager.install_args(&self.packages))
            .execute(host, ctx)
    }
}
