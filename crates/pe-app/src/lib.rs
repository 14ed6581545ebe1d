//! Application service layer for propeq.
//!
//! Loads the thermo tables once, turns case files into solver runs and
//! produces serializable summaries for the command line front end.

pub mod case_service;
pub mod error;
pub mod query;
pub mod run_service;
pub mod summary;
pub mod sweep;
pub mod tables;

pub use case_service::{composition_for, load_case, save_case, validate_case};
pub use error::{AppError, AppResult};
pub use query::{PropellantRow, SpeciesRow, list_propellants, list_species};
pub use run_service::{run_case, run_case_file};
pub use summary::{
    ExitSummary, PerformanceSummary, REPORT_FRACTION_FLOOR, RunResult, RunSummary,
    SpeciesFraction, StateSummary,
};
pub use sweep::{SweepPoint, SweepRequest, of_range, sweep_of};
pub use tables::{builtin_tables, tables_for};
