//! External process execution and host environment access.

pub mod command;
pub mod host;
pub mod platform;
pub mod runner;

pub use command::{display_command, execute, CommandOptions, CommandResult};
pub use host::HostEnv;
pub use platform::{detect_shell, is_ci, is_elevated, ShellInfo, ShellType};
pub use runner::{ExternalProcessRunner, ScriptedRunner, SystemRunner};
