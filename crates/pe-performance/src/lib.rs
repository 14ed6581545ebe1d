//! pe-performance: rocket nozzle performance on top of chemical equilibrium.
//!
//! Provides:
//! - Exit conditions (pressure, supersonic or subsonic area ratio)
//! - Frozen, shifting and full-equilibrium strategies
//! - The `PerformanceEngine` stage machine (chamber → throat → exit →
//!   performance) and multi-exit reports
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pe_core::units::atm;
//! use pe_equilibrium::{Composition, EquilibriumSolver};
//! use pe_performance::{ExitCondition, PerformanceEngine, Strategy};
//! use pe_thermo::{PropellantTable, SpeciesTable};
//!
//! let props = PropellantTable::builtin().unwrap();
//! let species = SpeciesTable::builtin().unwrap();
//! let comp = Composition::oxidizer_fuel(&props, "RP-1 (RPL)", "OXYGEN (LIQUID)", 2.3).unwrap();
//! let mut engine = PerformanceEngine::new(
//!     EquilibriumSolver::new(&species),
//!     Arc::new(comp),
//!     atm(68.0),
//!     Strategy::Shifting,
//! )
//! .unwrap();
//! let report = engine.run(&[ExitCondition::SupersonicAreaRatio(40.0)]).unwrap();
//! println!("Isp = {:.1} s", report.exits[0].performance.isp_seconds());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod exit;

// Re-exports for ergonomics
pub use config::NozzleConfig;
pub use engine::{ExitResult, PerformanceEngine, PerformanceReport, Stage, Station, evaluate};
pub use error::{PerformanceError, PerformanceResult};
pub use exit::{ChamberClosure, ExitCondition, Strategy};
