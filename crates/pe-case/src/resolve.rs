//! Conversion of case definitions into solver inputs.

use crate::schema::{ClosureDef, ExitDef, ProblemDef, ReactantDef, StrategyDef};
use crate::units::{self, UnitError};
use crate::validate::ValidationError;
use pe_core::units::Pressure;
use pe_equilibrium::Amount;
use pe_performance::{ChamberClosure, ExitCondition, Strategy};

fn field(name: &str, err: UnitError) -> ValidationError {
    ValidationError::InvalidValue {
        field: name.to_string(),
        value: String::new(),
        reason: err.to_string(),
    }
}

impl ReactantDef {
    pub fn amount(&self) -> Result<Amount, ValidationError> {
        match (&self.mass, self.moles) {
            (Some(mass), None) => units::mass(mass)
                .map(Amount::Mass)
                .map_err(|e| field(&format!("reactant '{}' mass", self.name), e)),
            (None, Some(moles)) if moles.is_finite() && moles > 0.0 => Ok(Amount::Moles(moles)),
            (None, Some(moles)) => Err(ValidationError::InvalidValue {
                field: format!("reactant '{}' moles", self.name),
                value: moles.to_string(),
                reason: "must be finite and positive".to_string(),
            }),
            _ => Err(ValidationError::InvalidValue {
                field: format!("reactant '{}'", self.name),
                value: String::new(),
                reason: "give exactly one of 'mass' or 'moles'".to_string(),
            }),
        }
    }
}

impl ClosureDef {
    pub fn resolve(&self) -> Result<ChamberClosure, ValidationError> {
        Ok(match self {
            ClosureDef::Adiabatic => ChamberClosure::Adiabatic,
            ClosureDef::Temperature { temperature } => ChamberClosure::Temperature(
                units::temperature(temperature).map_err(|e| field("closure temperature", e))?,
            ),
            ClosureDef::Enthalpy { enthalpy } => ChamberClosure::Enthalpy(
                units::specific_enthalpy(enthalpy).map_err(|e| field("closure enthalpy", e))?,
            ),
            ClosureDef::Entropy { entropy } => ChamberClosure::Entropy(
                units::specific_entropy(entropy).map_err(|e| field("closure entropy", e))?,
            ),
        })
    }
}

impl StrategyDef {
    pub fn resolve(&self) -> Result<Strategy, ValidationError> {
        Ok(match self {
            StrategyDef::Frozen => Strategy::Frozen,
            StrategyDef::Shifting => Strategy::Shifting,
            StrategyDef::Equilibrium { closure } => Strategy::Equilibrium(closure.resolve()?),
        })
    }
}

impl ExitDef {
    pub fn resolve(&self) -> Result<ExitCondition, ValidationError> {
        Ok(match self {
            ExitDef::Pressure { pressure } => ExitCondition::Pressure(
                units::pressure(pressure).map_err(|e| field("exit pressure", e))?,
            ),
            ExitDef::SupersonicAreaRatio { ratio } => ExitCondition::SupersonicAreaRatio(*ratio),
            ExitDef::SubsonicAreaRatio { ratio } => ExitCondition::SubsonicAreaRatio(*ratio),
        })
    }
}

impl ProblemDef {
    /// Chamber pressure for performance problems, the equilibrium
    /// pressure otherwise.
    pub fn pressure(&self) -> Result<Pressure, ValidationError> {
        match self {
            ProblemDef::Equilibrium { pressure, .. } => {
                units::pressure(pressure).map_err(|e| field("pressure", e))
            }
            ProblemDef::Performance {
                chamber_pressure, ..
            } => units::pressure(chamber_pressure).map_err(|e| field("chamber_pressure", e)),
        }
    }

    pub fn exits(&self) -> Result<Vec<ExitCondition>, ValidationError> {
        match self {
            ProblemDef::Equilibrium { .. } => Ok(Vec::new()),
            ProblemDef::Performance { exits, .. } => exits.iter().map(ExitDef::resolve).collect(),
        }
    }
}
