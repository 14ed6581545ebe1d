//! Thermo table handles shared by every run.

use crate::error::{AppError, AppResult};
use pe_case::TablesDef;
use pe_thermo::{PropellantTable, SpeciesTable, ThermoTables};
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Built-in tables, parsed once per process.
pub fn builtin_tables() -> AppResult<Arc<ThermoTables>> {
    static BUILTIN: OnceLock<Result<Arc<ThermoTables>, String>> = OnceLock::new();
    BUILTIN
        .get_or_init(|| {
            ThermoTables::builtin()
                .map(Arc::new)
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(AppError::Tables)
}

/// Tables for a case: files named by `def` (relative to `base_dir`) replace
/// the corresponding built-in table.
pub fn tables_for(def: Option<&TablesDef>, base_dir: &Path) -> AppResult<Arc<ThermoTables>> {
    let builtin = builtin_tables()?;
    let Some(def) = def else {
        return Ok(builtin);
    };
    if def.species.is_none() && def.propellants.is_none() {
        return Ok(builtin);
    }
    let species = match &def.species {
        Some(path) => SpeciesTable::load(&base_dir.join(path))?,
        None => builtin.species.clone(),
    };
    let propellants = match &def.propellants {
        Some(path) => PropellantTable::load(&base_dir.join(path))?,
        None => builtin.propellants.clone(),
    };
    Ok(Arc::new(ThermoTables {
        species,
        propellants,
    }))
}
