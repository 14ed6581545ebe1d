//! Error types for nozzle performance.

use crate::engine::Stage;
use pe_equilibrium::EquilibriumError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerformanceError {
    #[error("Invalid exit condition: {what}")]
    InvalidExitCondition { what: String },

    #[error("{operation} called out of order (stage: {stage})")]
    OutOfOrder { operation: &'static str, stage: Stage },

    #[error("{station} station failed: {what}")]
    Failed { station: &'static str, what: String },

    #[error("Equilibrium error: {0}")]
    Equilibrium(#[from] EquilibriumError),
}

pub type PerformanceResult<T> = Result<T, PerformanceError>;

impl PerformanceError {
    pub(crate) fn invalid_exit(what: impl Into<String>) -> Self {
        Self::InvalidExitCondition { what: what.into() }
    }
}
