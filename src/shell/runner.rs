//! Process runner capability.
//!
//! Every probe and installer launches external programs through an
//! [`ExternalProcessRunner`], so tests can swap in [`ScriptedRunner`]
//! instead of invoking real package managers.
//!
//! # Example
//!
//! ```
//! use stackup::shell::{CommandOptions, ExternalProcessRunner, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new();
//! runner.respond("python3 --version", 0, "Python 3.12.1\n");
//!
//! let result = runner
//!     .run("python3", &["--version".to_string()], &CommandOptions::captured())
//!     .unwrap();
//! assert!(result.stdout.contains("3.12.1"));
//! assert_eq!(runner.invocations(), vec!["python3 --version".to_string()]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

use super::command::{display_command, execute, CommandOptions, CommandResult};

/// Capability for launching external programs.
pub trait ExternalProcessRunner {
    /// Run `program` with `args` and wait for it to exit.
    ///
    /// Returns `Err` only when the process could not be started.
    fn run(&self, program: &str, args: &[String], options: &CommandOptions)
        -> Result<CommandResult>;
}

/// Runner that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ExternalProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        execute(program, args, options)
    }
}

/// Canned response for a scripted command.
#[derive(Debug, Clone)]
enum ScriptedResponse {
    Exit { code: i32, stdout: String },
    SpawnError(std::io::ErrorKind),
}

/// Runner with pre-configured responses, recording every invocation.
///
/// Responses are matched on the full rendered command line first
/// (`"pyenv install -s 3.12"`) and then on the program name alone. Unmatched
/// commands behave like a missing program.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: RefCell<HashMap<String, ScriptedResponse>>,
    invocations: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    /// Create a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `command` (full command line or program name) with an exit code.
    pub fn respond(&self, command: &str, code: i32, stdout: &str) {
        self.responses.borrow_mut().insert(
            command.to_string(),
            ScriptedResponse::Exit {
                code,
                stdout: stdout.to_string(),
            },
        );
    }

    /// Make `command` fail to start with the given IO error kind.
    pub fn fail_to_spawn(&self, command: &str, kind: std::io::ErrorKind) {
        self.responses
            .borrow_mut()
            .insert(command.to_string(), ScriptedResponse::SpawnError(kind));
    }

    /// All command lines run so far, in order.
    pub fn invocations(&self) -> Vec<String> {
        self.invocations.borrow().clone()
    }

    /// Number of invocations whose command line starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.invocations
            .borrow()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

impl ExternalProcessRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        _options: &CommandOptions,
    ) -> Result<CommandResult> {
        let line = display_command(program, args);
        self.invocations.borrow_mut().push(line.clone());

        let response = {
            let responses = self.responses.borrow();
            responses
                .get(&line)
                .or_else(|| responses.get(program))
                .cloned()
        };

        match response {
            Some(ScriptedResponse::Exit { code: 0, stdout }) => {
                Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
            }
            Some(ScriptedResponse::Exit { code, stdout }) => Ok(CommandResult::failure(
                Some(code),
                stdout,
                String::new(),
                Duration::ZERO,
            )),
            Some(ScriptedResponse::SpawnError(kind)) => {
                Err(std::io::Error::new(kind, format!("cannot start {}", program)).into())
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: not found", program),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_command_line_beats_program_match() {
        let runner = ScriptedRunner::new();
        runner.respond("git", 0, "generic");
        runner.respond("git --version", 0, "git version 2.43.0");

        let result = runner
            .run("git", &args(&["--version"]), &CommandOptions::captured())
            .unwrap();
        assert_eq!(result.stdout, "git version 2.43.0");

        let result = runner
            .run("git", &args(&["init"]), &CommandOptions::captured())
            .unwrap();
        assert_eq!(result.stdout, "generic");
    }

    #[test]
    fn non_zero_exit_is_failure_result() {
        let runner = ScriptedRunner::new();
        runner.respond("npm install", 1, "");

        let result = runner
            .run("npm", &args(&["install"]), &CommandOptions::captured())
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[test]
    fn unscripted_command_is_not_found() {
        let runner = ScriptedRunner::new();
        let err = runner
            .run("brew", &[], &CommandOptions::captured())
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn records_invocations_in_order() {
        let runner = ScriptedRunner::new();
        runner.respond("a", 0, "");
        runner.respond("b", 0, "");
        let _ = runner.run("a", &[], &CommandOptions::default());
        let _ = runner.run("b", &args(&["x"]), &CommandOptions::default());
        let _ = runner.run("a", &args(&["y"]), &CommandOptions::default());

        assert_eq!(runner.invocations(), vec!["a", "b x", "a y"]);
        assert_eq!(runner.count("a"), 2);
    }

    #[test]
    fn spawn_error_kind_is_preserved() {
        let runner = ScriptedRunner::new();
        runner.fail_to_spawn("apt-get", std::io::ErrorKind::PermissionDenied);
        let err = runner
            .run("apt-get", &args(&["install"]), &CommandOptions::default())
            .unwrap_err();
        match err {
            crate::error::StackupError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied)
            }
            other => panic!("Expected Io, got {:?}", other),
        }
    }
}
