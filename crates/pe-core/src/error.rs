use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },
}

impl CoreError {
    /// Name of the offending quantity.
    pub fn what(&self) -> &'static str {
        match self {
            CoreError::NonFinite { what, .. } | CoreError::NonPositive { what, .. } => what,
        }
    }
}
