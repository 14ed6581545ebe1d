//! Case validation logic.

use crate::schema::{CaseFile, LATEST_VERSION, ProblemDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate reactant: {name}")]
    DuplicateReactant { name: String },

    #[error("Missing {what}")]
    Missing { what: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Check a case without touching any table.
///
/// Propellant names are resolved later, against whichever tables the run
/// uses.
pub fn validate_case(case: &CaseFile) -> Result<(), ValidationError> {
    if case.version == 0 || case.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }
    if case.name.trim().is_empty() {
        return Err(ValidationError::Missing {
            what: "case name".to_string(),
        });
    }
    if case.reactants.is_empty() {
        return Err(ValidationError::Missing {
            what: "reactants".to_string(),
        });
    }

    let mut names = HashSet::new();
    for reactant in &case.reactants {
        if reactant.name.trim().is_empty() {
            return Err(ValidationError::Missing {
                what: "reactant name".to_string(),
            });
        }
        if !names.insert(reactant.name.to_uppercase()) {
            return Err(ValidationError::DuplicateReactant {
                name: reactant.name.clone(),
            });
        }
        reactant.amount()?;
    }

    let pressure = case.problem.pressure()?;
    match &case.problem {
        ProblemDef::Equilibrium { closure, .. } => {
            closure.resolve()?;
        }
        ProblemDef::Performance {
            strategy, exits, ..
        } => {
            strategy.resolve()?;
            if exits.is_empty() {
                return Err(ValidationError::Missing {
                    what: "exit conditions".to_string(),
                });
            }
            for (i, exit) in case.problem.exits()?.iter().enumerate() {
                exit.validate(pressure)
                    .map_err(|e| ValidationError::InvalidValue {
                        field: format!("exits[{i}]"),
                        value: exit.describe(),
                        reason: e.to_string(),
                    })?;
            }
        }
    }

    case.solver
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: "solver".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;
    let nozzle = &case.nozzle;
    if nozzle.throat_iterations == 0
        || nozzle.exit_iterations == 0
        || !is_positive(nozzle.throat_tolerance)
        || !is_positive(nozzle.exit_tolerance)
    {
        return Err(ValidationError::InvalidValue {
            field: "nozzle".to_string(),
            value: format!("{nozzle:?}"),
            reason: "iteration budgets and tolerances must be positive".to_string(),
        });
    }
    Ok(())
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}
