//! Configuration loading.
//!
//! # Modules
//!
//! - [`settings`] - The optional YAML settings file

pub mod settings;

pub use settings::Settings;
