//! Error types for equilibrium operations.

use pe_core::CoreError;
use pe_thermo::ThermoError;
use thiserror::Error;

/// Errors that can occur while building compositions or solving for equilibrium.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquilibriumError {
    #[error("Unknown propellant: {name}")]
    UnknownPropellant { name: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Equilibrium did not converge after {iterations} iterations: {what}")]
    DidNotConverge { iterations: usize, what: String },

    #[error("Singular linear system at iteration {iteration}")]
    Singular { iteration: usize },

    #[error("Properties unavailable: equilibrium status is {status}")]
    PropertiesUnavailable { status: &'static str },

    #[error("Performance unavailable: equilibrium status is {status}")]
    PerformanceUnavailable { status: &'static str },

    #[error("Thermo error: {0}")]
    Thermo(#[from] ThermoError),
}

pub type EquilibriumResult<T> = Result<T, EquilibriumError>;

impl EquilibriumError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidArg { what: what.into() }
    }
}

impl From<CoreError> for EquilibriumError {
    fn from(e: CoreError) -> Self {
        EquilibriumError::InvalidArg {
            what: e.to_string(),
        }
    }
}
