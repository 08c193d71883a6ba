//! Host capabilities shared by probes and installers.
//!
//! [`HostEnv`] bundles everything a probe or installer may touch on the
//! machine: the process runner, environment variables, the home directory,
//! network reachability and the executable search path. Production code
//! builds it with [`HostEnv::system`]; tests substitute each capability.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use stackup::shell::{HostEnv, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new();
//! let mut env = HashMap::new();
//! env.insert("EDITOR".to_string(), "vim".to_string());
//!
//! let host = HostEnv::new(&runner, "/home/dev").with_env(env);
//! assert_eq!(host.var("EDITOR").as_deref(), Some("vim"));
//! assert!(host.var("VISUAL").is_none());
//! ```

use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::probe::path::{parse_system_path, resolve_tool_path, ManagerDiscovery};

use super::command::{CommandOptions, CommandResult};
use super::runner::ExternalProcessRunner;

/// Mockable view of the host machine.
pub struct HostEnv<'a> {
    runner: &'a dyn ExternalProcessRunner,
    env_lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
    check_network: Box<dyn Fn() -> bool + 'a>,
    home: PathBuf,
    search_path: Vec<PathBuf>,
    elevated: bool,
}

impl<'a> HostEnv<'a> {
    /// Host view with the given runner and home, no environment variables,
    /// an empty search path and the network reported as reachable.
    pub fn new(runner: &'a dyn ExternalProcessRunner, home: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            env_lookup: Box::new(|_| None),
            check_network: Box::new(|| true),
            home: home.into(),
            search_path: Vec::new(),
            elevated: false,
        }
    }

    /// Host view backed by the real process environment.
    ///
    /// The search path is `PATH` with discovered version-manager directories
    /// prepended.
    pub fn system(runner: &'a dyn ExternalProcessRunner, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let discovery = ManagerDiscovery::run(&home, |key| std::env::var(key).ok());
        let search_path = discovery.merge_into(&parse_system_path());
        tracing::debug!(
            "Search path augmented with {} discovered entries",
            discovery.augmented_path().len()
        );

        Self {
            runner,
            env_lookup: Box::new(|key| std::env::var(key).ok()),
            check_network: Box::new(default_network_check),
            home,
            search_path,
            elevated: super::platform::is_elevated(),
        }
    }

    /// Replace environment lookups with a fixed map.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env_lookup = Box::new(move |key| env.get(key).cloned());
        self
    }

    /// Replace the search path.
    pub fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Report the network as reachable or not.
    pub fn with_network(mut self, reachable: bool) -> Self {
        self.check_network = Box::new(move || reachable);
        self
    }

    /// Report the process as running with root privileges or not.
    pub fn with_elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }

    /// Look up an environment variable.
    pub fn var(&self, key: &str) -> Option<String> {
        (self.env_lookup)(key)
    }

    /// The user's home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Current executable search path.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Put `dir` at the front of the search path.
    ///
    /// Later probes and every command launched afterwards see it. A
    /// directory already present is moved to the front.
    pub fn prepend_path(&mut self, dir: &Path) {
        self.search_path.retain(|existing| existing != dir);
        self.search_path.insert(0, dir.to_path_buf());
        tracing::debug!("Prepended {} to search path", dir.display());
    }

    /// Resolve a tool against the search path.
    pub fn which(&self, tool: &str) -> Option<PathBuf> {
        resolve_tool_path(tool, &self.search_path)
    }

    /// Whether the network is reachable.
    pub fn network_available(&self) -> bool {
        (self.check_network)()
    }

    /// Whether the process runs as root.
    pub fn is_elevated(&self) -> bool {
        self.elevated
    }

    /// Run a program capturing its output, with the current search path.
    pub fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandResult> {
        let options = CommandOptions {
            cwd: cwd.map(Path::to_path_buf),
            ..CommandOptions::captured()
        };
        self.run_with(program, args, options)
    }

    /// Run a program with explicit options; the search path is always applied.
    pub fn run_with(
        &self,
        program: &str,
        args: &[String],
        mut options: CommandOptions,
    ) -> Result<CommandResult> {
        if options.search_path.is_none() && !self.search_path.is_empty() {
            options.search_path = Some(self.search_path.clone());
        }
        self.runner.run(program, args, &options)
    }
}

/// Try a TCP connection to a few well-known hosts with a short timeout.
fn default_network_check() -> bool {
    const TARGETS: &[&str] = &["1.1.1.1:443", "8.8.8.8:443", "9.9.9.9:443"];
    let timeout = Duration::from_secs(2);

    TARGETS.iter().any(|target| {
        target
            .parse::<SocketAddr>()
            .map(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok())
            .unwrap_or(false)
    })
}
