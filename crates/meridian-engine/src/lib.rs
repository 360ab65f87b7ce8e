//! Meridian Engine
//!
//! The batch surface of Meridian: `validate`, `repair` and `score` over a
//! whole corpus or one domain, plus the report and exit status the CLI prints.
//!
//! # Example
//!
//! ```no_run
//! use meridian_engine::{Engine, Scope, SeverityThresholds};
//! use meridian_gatekeeper::SchemaRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::open("content", SchemaRegistry::builtin())?;
//!
//! let report = engine.validate(Scope::All)?;
//! println!("{} violation(s)", report.total);
//!
//! let outcome = engine.repair(Scope::All, false)?;
//! println!("{}", outcome.result.summary());
//!
//! std::process::exit(outcome.after.exit_status(&SeverityThresholds::default()).code());
//! # }
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
mod report;

pub use engine::{Engine, RepairOutcome, Scope};
pub use error::EngineError;
pub use report::{CompletenessTable, CoverageRow, ExitStatus, Report, SeverityThresholds};
