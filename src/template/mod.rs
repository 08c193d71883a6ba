//! Template emission.
//!
//! # Modules
//!
//! - [`interpolation`] - `{{ name }}` placeholder substitution
//! - [`spec`] - Template descriptions and conflict policies
//! - [`emitter`] - Atomic writes honoring the conflict policy
//! - [`step`] - Plan steps that emit templates
//! - [`embedded`] - Starter-project templates bundled into the binary

pub mod embedded;
pub mod emitter;
pub mod interpolation;
pub mod spec;
pub mod step;

pub use emitter::{backup_path, emit, emit_with, EmitOutcome};
pub use spec::{ConflictPolicy, TemplateSpec};
pub use step::{template_step, EmitInstaller, TemplateProbe};
