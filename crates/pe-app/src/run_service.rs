//! Case execution.

use crate::case_service::{self, composition_for};
use crate::error::AppResult;
use crate::summary::{PerformanceSummary, RunResult, RunSummary, StateSummary};
use crate::tables::tables_for;
use pe_case::{CaseFile, ProblemDef};
use pe_equilibrium::{CpKind, Equilibrium, EquilibriumSolver};
use pe_performance::PerformanceEngine;
use pe_thermo::ThermoTables;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Load the case at `path`, its tables (relative to the case file), and run it.
pub fn run_case_file(path: &Path) -> AppResult<RunSummary> {
    let case = case_service::load_case(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    let tables = tables_for(case.tables.as_ref(), base_dir)?;
    run_case(&case, &tables)
}

/// Run a validated case against `tables`.
pub fn run_case(case: &CaseFile, tables: &ThermoTables) -> AppResult<RunSummary> {
    let started = Instant::now();
    pe_case::validate_case(case)?;
    let composition = composition_for(case, tables)?;
    let solver = EquilibriumSolver::with_config(&tables.species, case.solver)?;
    let pressure = case.problem.pressure()?;

    let result = match &case.problem {
        ProblemDef::Equilibrium { closure, .. } => {
            let closure = closure
                .resolve()?
                .closure(composition.enthalpy_j_per_kg());
            let mut eq = Equilibrium::new(composition, &tables.species)?;
            solver.solve(&mut eq, pressure, closure, false)?;
            eq.compute_properties(&tables.species, CpKind::Equilibrium)?;
            RunResult::Equilibrium {
                closure: closure.label().to_string(),
                state: StateSummary::from_equilibrium(&eq, &tables.species)?,
            }
        }
        ProblemDef::Performance { strategy, .. } => {
            let exits = case.problem.exits()?;
            let report =
                PerformanceEngine::new(solver, composition, pressure, strategy.resolve()?)?
                    .with_nozzle_config(case.nozzle)
                    .run(&exits)?;
            RunResult::Performance(PerformanceSummary::from_report(&report, &tables.species)?)
        }
    };

    let elapsed_s = started.elapsed().as_secs_f64();
    info!(case = %case.name, elapsed_s, "case finished");
    Ok(RunSummary {
        case: case.name.clone(),
        elapsed_s,
        result,
    })
}
