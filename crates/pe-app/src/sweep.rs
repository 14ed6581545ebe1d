//! Parallel O/F sweeps.

use crate::error::{AppError, AppResult};
use pe_core::units::{Pressure, to_bar, to_k, to_mps};
use pe_equilibrium::{Composition, EquilibriumSolver, SolverConfig};
use pe_performance::{ExitCondition, NozzleConfig, PerformanceEngine, Strategy};
use pe_thermo::ThermoTables;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// One fuel/oxidizer pair evaluated at several mixture ratios.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub fuel: String,
    pub oxidizer: String,
    pub of_ratios: Vec<f64>,
    pub chamber_pressure: Pressure,
    pub strategy: Strategy,
    pub exit: ExitCondition,
    pub solver: SolverConfig,
    pub nozzle: NozzleConfig,
}

/// Result at one mixture ratio. Failed points carry `error` and no figures.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepPoint {
    pub of_ratio: f64,
    pub chamber_temperature_k: Option<f64>,
    pub molar_mass: Option<f64>,
    pub cstar_mps: Option<f64>,
    pub isp_s: Option<f64>,
    pub ivac_s: Option<f64>,
    pub exit_temperature_k: Option<f64>,
    pub error: Option<String>,
}

impl SweepPoint {
    fn failed(of_ratio: f64, error: String) -> Self {
        Self {
            of_ratio,
            chamber_temperature_k: None,
            molar_mass: None,
            cstar_mps: None,
            isp_s: None,
            ivac_s: None,
            exit_temperature_k: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Evenly spaced ratios from `start` to `stop` inclusive.
pub fn of_range(start: f64, stop: f64, step: f64) -> AppResult<Vec<f64>> {
    let increasing = start > 0.0 && step > 0.0 && stop >= start && stop.is_finite();
    if !increasing {
        return Err(AppError::InvalidInput(format!(
            "O/F range {start}..{stop} step {step} is not a positive increasing range"
        )));
    }
    let count = ((stop - start) / step + 1e-9).floor() as usize + 1;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

/// Evaluate every ratio in parallel; output order follows `of_ratios`.
pub fn sweep_of(tables: &ThermoTables, request: &SweepRequest) -> AppResult<Vec<SweepPoint>> {
    if request.of_ratios.is_empty() {
        return Err(AppError::InvalidInput("sweep needs at least one O/F ratio".into()));
    }
    request.solver.validate()?;
    request.exit.validate(request.chamber_pressure)?;

    let points: Vec<SweepPoint> = request
        .of_ratios
        .par_iter()
        .map(|&of| match sweep_point(tables, request, of) {
            Ok(point) => point,
            Err(e) => {
                warn!(of_ratio = of, error = %e, "sweep point failed");
                SweepPoint::failed(of, e.to_string())
            }
        })
        .collect();

    info!(
        fuel = %request.fuel,
        oxidizer = %request.oxidizer,
        pressure_bar = to_bar(request.chamber_pressure),
        points = points.len(),
        failed = points.iter().filter(|p| !p.is_ok()).count(),
        "sweep finished"
    );
    Ok(points)
}

fn sweep_point(tables: &ThermoTables, request: &SweepRequest, of: f64) -> AppResult<SweepPoint> {
    let composition = Arc::new(Composition::oxidizer_fuel(
        &tables.propellants,
        &request.fuel,
        &request.oxidizer,
        of,
    )?);
    let solver = EquilibriumSolver::with_config(&tables.species, request.solver)?;
    let report = PerformanceEngine::new(
        solver,
        composition,
        request.chamber_pressure,
        request.strategy,
    )?
    .with_nozzle_config(request.nozzle)
    .run(&[request.exit])?;

    let exit = report
        .exits
        .first()
        .ok_or_else(|| AppError::Performance("no exit station".into()))?;
    let chamber = report.chamber.properties()?;
    Ok(SweepPoint {
        of_ratio: of,
        chamber_temperature_k: Some(to_k(chamber.temperature)),
        molar_mass: Some(chamber.molar_mass),
        cstar_mps: Some(to_mps(report.cstar)),
        isp_s: Some(exit.performance.isp_seconds()),
        ivac_s: Some(exit.performance.ivac_seconds()),
        exit_temperature_k: Some(to_k(exit.station.equilibrium.temperature())),
        error: None,
    })
}
