//! Stackup - Idempotent bootstrapper for full-stack starter projects.
//!
//! Stackup checks a host for everything a Python API plus TypeScript
//! frontend project needs, installs only what is missing, and emits the
//! starter files. Running it again on a finished project changes nothing.
//!
//! # Modules
//!
//! - [`bootstrap`] - The bundled full-stack plan and host detection
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings file loading
//! - [`context`] - Project state threaded through a run
//! - [`error`] - Error types and result aliases
//! - [`installer`] - Actions that establish missing preconditions
//! - [`plan`] - Steps, plans, and the sequential runner
//! - [`probe`] - Side-effect-free checks of host and project state
//! - [`shell`] - External process execution and the host environment
//! - [`template`] - Template rendering and atomic file emission
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use stackup::template::TemplateSpec;
//!
//! let spec = TemplateSpec::new("a.txt", "hello {{name}}").with_value("name", "Bob");
//! assert_eq!(spec.render().unwrap(), "hello Bob");
//! ```

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod installer;
pub mod plan;
pub mod probe;
pub mod shell;
pub mod sys;
pub mod template;
pub mod ui;

pub use error::{Result, StackupError};
