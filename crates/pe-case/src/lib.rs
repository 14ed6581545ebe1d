//! pe-case: YAML case files, unit-aware quantities and case validation.

pub mod resolve;
pub mod schema;
pub mod units;
pub mod validate;

pub use schema::*;
pub use units::{Quantity, UnitError, parse_quantity};
pub use validate::{ValidationError, validate_case};

pub type CaseResult<T> = Result<T, CaseError>;

#[derive(thiserror::Error, Debug)]
pub enum CaseError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> CaseResult<CaseFile> {
    let case: CaseFile = serde_yaml::from_str(content)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn load_yaml(path: &std::path::Path) -> CaseResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn to_yaml_string(case: &CaseFile) -> CaseResult<String> {
    validate_case(case)?;
    Ok(serde_yaml::to_string(case)?)
}

pub fn save_yaml(path: &std::path::Path, case: &CaseFile) -> CaseResult<()> {
    let content = to_yaml_string(case)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> CaseResult<CaseFile> {
    let content = std::fs::read_to_string(path)?;
    let case: CaseFile = serde_json::from_str(&content)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn save_json(path: &std::path::Path, case: &CaseFile) -> CaseResult<()> {
    validate_case(case)?;
    let content = serde_json::to_string_pretty(case)?;
    std::fs::write(path, content)?;
    Ok(())
}
