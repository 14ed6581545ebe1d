//! Error types for the pe-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Case error: {0}")]
    Case(String),

    #[error("Failed to read case file: {path}")]
    CaseFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write case file: {path}")]
    CaseFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Thermo table error: {0}")]
    Tables(String),

    #[error("Reactant error: {0}")]
    Reactant(String),

    #[error("Equilibrium error: {0}")]
    Equilibrium(String),

    #[error("Performance error: {0}")]
    Performance(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<pe_case::CaseError> for AppError {
    fn from(err: pe_case::CaseError) -> Self {
        AppError::Case(err.to_string())
    }
}

impl From<pe_case::ValidationError> for AppError {
    fn from(err: pe_case::ValidationError) -> Self {
        AppError::Case(err.to_string())
    }
}

impl From<pe_thermo::ThermoError> for AppError {
    fn from(err: pe_thermo::ThermoError) -> Self {
        AppError::Tables(err.to_string())
    }
}

impl From<pe_equilibrium::EquilibriumError> for AppError {
    fn from(err: pe_equilibrium::EquilibriumError) -> Self {
        AppError::Equilibrium(err.to_string())
    }
}

impl From<pe_performance::PerformanceError> for AppError {
    fn from(err: pe_performance::PerformanceError) -> Self {
        AppError::Performance(err.to_string())
    }
}
