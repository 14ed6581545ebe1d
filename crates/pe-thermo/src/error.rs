//! Thermodynamic table errors.

use pe_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for table loading and thermo evaluation.
pub type ThermoResult<T> = Result<T, ThermoError>;

/// Errors raised while loading tables or evaluating species data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// Unknown species, propellant or element symbol.
    #[error("{kind} not found: '{name}'")]
    NotFound { kind: &'static str, name: String },

    /// Malformed table record.
    #[error("Malformed table{}: {what}", at_line(.line))]
    FileFormat { line: Option<usize>, what: String },

    /// Temperature outside every fitted interval of a species.
    #[error("Temperature {temperature} K outside [{low}, {high}] K for {species}")]
    OutOfRange {
        species: String,
        temperature: f64,
        low: f64,
        high: f64,
    },

    /// Species carries no Cp fit (reactant-only entry).
    #[error("No thermodynamic fit for {species}")]
    NoFit { species: String },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Table source could not be read.
    #[error("Failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(l) => format!(" at line {l}"),
        None => String::new(),
    }
}

impl ThermoError {
    pub(crate) fn format(line: Option<usize>, what: impl Into<String>) -> Self {
        Self::FileFormat {
            line,
            what: what.into(),
        }
    }
}

impl From<CoreError> for ThermoError {
    fn from(err: CoreError) -> Self {
        ThermoError::InvalidArg { what: err.what() }
    }
}

impl From<serde_yaml::Error> for ThermoError {
    fn from(err: serde_yaml::Error) -> Self {
        // serde_yaml reports 1-based lines already
        let line = err.location().map(|loc| loc.line());
        ThermoError::FileFormat {
            line,
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ThermoError::NotFound {
            kind: "species",
            name: "XYZ".into(),
        };
        assert!(err.to_string().contains("XYZ"));

        let err = ThermoError::format(Some(12), "bad interval count");
        assert!(err.to_string().contains("line 12"));

        let err = ThermoError::format(None, "bad interval count");
        assert!(!err.to_string().contains("line"));
    }

    #[test]
    fn core_error_maps_to_invalid_arg() {
        let err: ThermoError = CoreError::NonFinite {
            what: "density",
            value: f64::NAN,
        }
        .into();
        assert_eq!(err, ThermoError::InvalidArg { what: "density" });
    }
}
