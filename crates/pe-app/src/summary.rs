//! Serializable run summaries.

use crate::error::AppResult;
use pe_core::units::{to_bar, to_k, to_kgpm3, to_mps};
use pe_equilibrium::{Equilibrium, PerformanceProperties};
use pe_performance::{ExitResult, PerformanceReport};
use pe_thermo::SpeciesTable;
use serde::Serialize;

/// Species below this mole fraction are left out of summaries.
pub const REPORT_FRACTION_FLOOR: f64 = 5e-6;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeciesFraction {
    pub name: String,
    pub condensed: bool,
    pub mole_fraction: f64,
}

/// Thermodynamic state of one converged equilibrium.
#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub pressure_bar: f64,
    pub temperature_k: f64,
    pub enthalpy_j_per_kg: f64,
    pub internal_energy_j_per_kg: f64,
    pub entropy_j_per_kg_k: f64,
    pub molar_mass: f64,
    pub cp_j_per_kg_k: f64,
    pub cv_j_per_kg_k: f64,
    pub gamma: f64,
    pub isentropic_exponent: f64,
    pub sound_speed_mps: f64,
    pub density_kg_per_m3: f64,
    pub dlnv_dlnp: f64,
    pub dlnv_dlnt: f64,
    pub iterations: usize,
    pub extrapolated: bool,
    pub species: Vec<SpeciesFraction>,
}

impl StateSummary {
    pub fn from_equilibrium(eq: &Equilibrium, table: &SpeciesTable) -> AppResult<Self> {
        let props = eq.properties()?;
        let mut species = Vec::new();
        for (id, fraction) in eq.mole_fractions()? {
            if fraction < REPORT_FRACTION_FLOOR {
                continue;
            }
            let s = table.species(id)?;
            species.push(SpeciesFraction {
                name: s.name.clone(),
                condensed: !s.is_gas(),
                mole_fraction: fraction,
            });
        }
        Ok(Self {
            pressure_bar: to_bar(props.pressure),
            temperature_k: to_k(props.temperature),
            enthalpy_j_per_kg: props.enthalpy,
            internal_energy_j_per_kg: props.internal_energy,
            entropy_j_per_kg_k: props.entropy,
            molar_mass: props.molar_mass,
            cp_j_per_kg_k: props.cp,
            cv_j_per_kg_k: props.cv,
            gamma: props.gamma,
            isentropic_exponent: props.isentropic_exponent,
            sound_speed_mps: to_mps(props.sound_speed),
            density_kg_per_m3: to_kgpm3(props.density),
            dlnv_dlnp: props.dlnv_dlnp,
            dlnv_dlnt: props.dlnv_dlnt,
            iterations: eq.iterations(),
            extrapolated: eq.used_extrapolation(),
            species,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExitSummary {
    pub condition: String,
    pub state: StateSummary,
    pub area_ratio: f64,
    /// m²·s/kg
    pub area_per_mass_flow: f64,
    pub cf: f64,
    pub isp_mps: f64,
    pub isp_s: f64,
    pub ivac_mps: f64,
    pub ivac_s: f64,
    pub mach: f64,
}

impl ExitSummary {
    pub fn from_exit(exit: &ExitResult, table: &SpeciesTable) -> AppResult<Self> {
        let p: &PerformanceProperties = &exit.performance;
        Ok(Self {
            condition: exit.condition.describe(),
            state: StateSummary::from_equilibrium(&exit.station.equilibrium, table)?,
            area_ratio: p.area_ratio,
            area_per_mass_flow: p.area_per_mass_flow,
            cf: p.cf,
            isp_mps: to_mps(p.isp),
            isp_s: p.isp_seconds(),
            ivac_mps: to_mps(p.ivac),
            ivac_s: p.ivac_seconds(),
            mach: p.mach,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub strategy: String,
    pub chamber_pressure_bar: f64,
    pub cstar_mps: f64,
    pub chamber: StateSummary,
    pub throat: StateSummary,
    pub exits: Vec<ExitSummary>,
}

impl PerformanceSummary {
    pub fn from_report(report: &PerformanceReport, table: &SpeciesTable) -> AppResult<Self> {
        Ok(Self {
            strategy: report.strategy.label().to_string(),
            chamber_pressure_bar: to_bar(report.chamber_pressure),
            cstar_mps: to_mps(report.cstar),
            chamber: StateSummary::from_equilibrium(&report.chamber, table)?,
            throat: StateSummary::from_equilibrium(&report.throat.equilibrium, table)?,
            exits: report
                .exits
                .iter()
                .map(|e| ExitSummary::from_exit(e, table))
                .collect::<AppResult<Vec<_>>>()?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RunResult {
    Equilibrium { closure: String, state: StateSummary },
    Performance(PerformanceSummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub case: String,
    pub elapsed_s: f64,
    pub result: RunResult,
}

impl RunSummary {
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
