//! Exit conditions and performance strategies.

use crate::error::{PerformanceError, PerformanceResult};
use pe_core::units::{Pressure, Temperature, to_bar, to_k};
use pe_equilibrium::Closure;

/// How the nozzle exit is specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitCondition {
    /// Exit pressure, below chamber pressure.
    Pressure(Pressure),
    /// Ae/At ≥ 1 on the supersonic branch.
    SupersonicAreaRatio(f64),
    /// Ae/At ≥ 1 on the subsonic branch.
    SubsonicAreaRatio(f64),
}

impl ExitCondition {
    /// Reject conditions that have no solution for a chamber at `chamber`.
    pub fn validate(&self, chamber: Pressure) -> PerformanceResult<()> {
        match *self {
            ExitCondition::Pressure(p) => {
                let (pe, pc) = (to_bar(p), to_bar(chamber));
                if !pe.is_finite() || pe <= 0.0 {
                    return Err(PerformanceError::invalid_exit(
                        "exit pressure must be finite and positive",
                    ));
                }
                if pe >= pc {
                    return Err(PerformanceError::invalid_exit(format!(
                        "exit pressure {pe} bar is not below chamber pressure {pc} bar"
                    )));
                }
            }
            ExitCondition::SupersonicAreaRatio(ratio) | ExitCondition::SubsonicAreaRatio(ratio) => {
                if !ratio.is_finite() || ratio < 1.0 {
                    return Err(PerformanceError::invalid_exit(format!(
                        "area ratio {ratio} must be at least 1"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        match self {
            ExitCondition::Pressure(p) => format!("Pe = {:.4} bar", to_bar(*p)),
            ExitCondition::SupersonicAreaRatio(r) => format!("Ae/At = {r} (supersonic)"),
            ExitCondition::SubsonicAreaRatio(r) => format!("Ae/At = {r} (subsonic)"),
        }
    }
}

/// Chamber closure for the full-equilibrium strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChamberClosure {
    /// HP at the reactant enthalpy.
    #[default]
    Adiabatic,
    Temperature(Temperature),
    /// J/kg
    Enthalpy(f64),
    /// J/(kg K)
    Entropy(f64),
}

impl ChamberClosure {
    /// Solver closure given the reactant enthalpy (J/kg).
    pub fn closure(&self, reactant_enthalpy: f64) -> Closure {
        match *self {
            ChamberClosure::Adiabatic => Closure::Enthalpy(reactant_enthalpy),
            ChamberClosure::Temperature(t) => Closure::Temperature(t),
            ChamberClosure::Enthalpy(h) => Closure::Enthalpy(h),
            ChamberClosure::Entropy(s) => Closure::Entropy(s),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ChamberClosure::Adiabatic => "adiabatic".to_string(),
            ChamberClosure::Temperature(t) => format!("T = {} K", to_k(*t)),
            ChamberClosure::Enthalpy(h) => format!("H = {h} J/kg"),
            ChamberClosure::Entropy(s) => format!("S = {s} J/(kg K)"),
        }
    }
}

/// Treatment of the composition downstream of the chamber.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Strategy {
    /// Composition fixed at the chamber value.
    Frozen,
    /// Composition re-equilibrated at every station.
    #[default]
    Shifting,
    /// Shifting expansion from a chamber with a caller-chosen closure.
    Equilibrium(ChamberClosure),
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Frozen => "frozen",
            Strategy::Shifting => "shifting",
            Strategy::Equilibrium(_) => "equilibrium",
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, Strategy::Frozen)
    }

    /// Chamber closure; frozen and shifting runs use the adiabatic chamber.
    pub fn chamber_closure(&self) -> ChamberClosure {
        match self {
            Strategy::Frozen | Strategy::Shifting => ChamberClosure::Adiabatic,
            Strategy::Equilibrium(closure) => *closure,
        }
    }
}
