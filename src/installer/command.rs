//! Installer that runs an external program.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::context::ProjectContext;
use crate::error::{InstallError, Result, StackupError};
use crate::shell::{display_command, CommandOptions, HostEnv};

use super::Installer;

/// Exit status shells use for "found but not executable".
const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Runs `program args...` to completion.
///
/// Failures map onto [`InstallError`]: a spawn refused by the OS or exit
/// status 126 is `PermissionDenied`, any other non-zero exit is
/// `ExternalToolFailed`.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: HashMap<String, String>,
    requires_network: bool,
    elevate: bool,
    exports_bin_dir: bool,
}

impl CommandInstaller {
    /// Run `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: HashMap::new(),
            requires_network: false,
            elevate: false,
            exports_bin_dir: false,
        }
    }

    /// Run from `dir`; relative paths resolve against the project root.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set an extra environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Fail fast with `NetworkUnavailable` when offline.
    pub fn needs_network(mut self) -> Self {
        self.requires_network = true;
        self
    }

    /// Run through `sudo` unless already root.
    pub fn elevated(mut self) -> Self {
        self.elevate = true;
        self
    }

    /// Treat the last line of stdout as the path of an installed executable
    /// and put its directory on the search path.
    pub fn exporting_bin_dir(mut self) -> Self {
        self.exports_bin_dir = true;
        self
    }

    fn invocation(&self, host: &HostEnv<'_>) -> (String, Vec<String>) {
        if self.elevate && !host.is_elevated() {
            let mut args = Vec::with_capacity(self.args.len() + 1);
            args.push(self.program.clone());
            args.extend(self.args.iter().cloned());
            ("sudo".to_string(), args)
        } else {
            (self.program.clone(), self.args.clone())
        }
    }

    fn export_bin_dir(&self, host: &mut HostEnv<'_>, stdout_line: Option<&str>) {
        let Some(line) = stdout_line else {
            tracing::warn!(
                "`{}` printed no path to export",
                display_command(&self.program, &self.args)
            );
            return;
        };
        let reported = Path::new(line);
        let dir = if reported.is_dir() {
            Some(reported)
        } else {
            reported.parent()
        };
        if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
            host.prepend_path(dir);
        }
    }
}

impl Installer for CommandInstaller {
    fn describe(&self) -> String {
        let rendered = display_command(&self.program, &self.args);
        if self.elevate {
            format!("{} (as root)", rendered)
        } else {
            rendered
        }
    }

    fn execute(&self, host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()> {
        let rendered = display_command(&self.program, &self.args);

        if self.requires_network && !host.network_available() {
            return Err(InstallError::NetworkUnavailable {
                detail: format!("`{}` needs network access", rendered),
            }
            .into());
        }

        let (program, args) = self.invocation(host);
        let options = CommandOptions {
            cwd: self.cwd.as_ref().map(|dir| ctx.resolve(dir)),
            env: self.env.clone(),
            ..CommandOptions::captured()
        };

        tracing::info!("Running {}", display_command(&program, &args));
        let result = match host.run_with(&program, &args, options) {
            Ok(result) => result,
            Err(StackupError::Io(e)) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(InstallError::PermissionDenied {
                    detail: format!("cannot start `{}`: {}", rendered, e),
                }
                .into())
            }
            Err(StackupError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{}", e);
                return Err(InstallError::ExternalToolFailed {
                    command: rendered,
                    exit_code: None,
                }
                .into());
            }
            Err(e) => return Err(e),
        };

        if !result.stderr.trim().is_empty() {
            tracing::debug!("{} stderr:\n{}", rendered, result.stderr.trim_end());
        }

        match result.exit_code {
            _ if result.success => {}
            Some(EXIT_NOT_EXECUTABLE) => {
                return Err(InstallError::PermissionDenied {
                    detail: format!("`{}` is not executable", rendered),
                }
                .into())
            }
            code => {
                return Err(InstallError::ExternalToolFailed {
                    command: rendered,
                    exit_code: code,
                }
                .into())
            }
        }

        if self.exports_bin_dir {
            self.export_bin_dir(host, result.last_stdout_line());
        }
        Ok(())
    }
}
