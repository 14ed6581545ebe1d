//! Case loading, saving and validation against the tables.

use crate::error::{AppError, AppResult};
use pe_case::CaseFile;
use pe_equilibrium::Composition;
use pe_thermo::ThermoTables;
use std::path::Path;
use std::sync::Arc;

/// Load and structurally validate a case from a YAML file.
pub fn load_case(path: &Path) -> AppResult<CaseFile> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::CaseFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(pe_case::from_yaml_str(&content)?)
}

pub fn save_case(path: &Path, case: &CaseFile) -> AppResult<()> {
    let content = pe_case::to_yaml_string(case)?;
    std::fs::write(path, content).map_err(|e| AppError::CaseFileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Structural checks plus propellant lookup in `tables`.
pub fn validate_case(case: &CaseFile, tables: &ThermoTables) -> AppResult<()> {
    pe_case::validate_case(case)?;
    composition_for(case, tables)?;
    Ok(())
}

/// Reactant mixture of a case.
pub fn composition_for(case: &CaseFile, tables: &ThermoTables) -> AppResult<Arc<Composition>> {
    let mut builder = Composition::builder(&tables.propellants);
    for reactant in &case.reactants {
        let amount = reactant.amount()?;
        builder = builder
            .add_by_name(&reactant.name, amount)
            .map_err(|e| AppError::Reactant(format!("{}: {e}", reactant.name)))?;
    }
    let composition = builder
        .build()
        .map_err(|e| AppError::Reactant(e.to_string()))?;
    Ok(Arc::new(composition))
}
