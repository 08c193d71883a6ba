//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. `new` and `check` share plan
//! preparation through [`setup`].

pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod new;
pub mod setup;
pub mod templates;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
