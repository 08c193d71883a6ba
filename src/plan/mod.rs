//! Plans, steps and the runner that executes them.
//!
//! A [`Step`] pairs a [`Probe`](crate::probe::Probe) with an
//! [`Installer`](crate::installer::Installer) (or nested steps). A [`Plan`]
//! is an ordered, validated list of steps, and [`PlanRunner`] executes it
//! strictly in order, producing a [`RunReport`].
//!
//! # Example
//!
//! ```
//! use stackup::context::ProjectContext;
//! use stackup::installer::CreateDirInstaller;
//! use stackup::plan::{AutoApprove, Plan, PlanRunner, Step};
//! use stackup::probe::PathExists;
//! use stackup::shell::{HostEnv, ScriptedRunner};
//!
//! let temp = tempfile::tempdir().unwrap();
//! let runner = ScriptedRunner::new();
//! let mut host = HostEnv::new(&runner, temp.path());
//! let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();
//!
//! let plan = Plan::new(vec![Step::new(
//!     "backend",
//!     PathExists::dir("backend"),
//!     CreateDirInstaller::new("backend"),
//! )])
//! .unwrap();
//!
//! let mut gate = AutoApprove;
//! let first = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
//! assert_eq!(first.installs, 1);
//!
//! let second = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
//! assert_eq!(second.installs, 0);
//! assert_eq!(second.exit_code(), 0);
//! ```

pub mod definition;
pub mod gate;
pub mod report;
pub mod runner;
pub mod step;

pub use definition::Plan;
pub use gate::{AutoApprove, ConfirmationGate, UiGate};
pub use report::{RunReport, StepFailure, StepOutcome, StepRecord};
pub use runner::{PlanRunner, RunOptions, RunProgress};
pub use step::{Step, StepAction};
