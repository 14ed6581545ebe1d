//! Loading tables from files.
//!
//! The format is picked from the extension: `.yaml`/`.yml` use the native
//! YAML layout, anything else is read as CEA `thermo.inp` (species) or
//! PEP-style records (propellants).

use crate::error::{ThermoError, ThermoResult};
use crate::propellant::PropellantTable;
use crate::table::SpeciesTable;
use std::path::Path;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("yaml" | "yml")
    )
}

fn read_source(path: &Path) -> ThermoResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ThermoError::NotFound {
            kind: "table file",
            name: path.display().to_string(),
        },
        _ => ThermoError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })
}

impl SpeciesTable {
    pub fn load(path: &Path) -> ThermoResult<Self> {
        let text = read_source(path)?;
        let table = if is_yaml(path) {
            Self::from_yaml_str(&text)?
        } else {
            Self::from_cea_str(&text)?
        };
        tracing::info!(path = %path.display(), count = table.len(), "loaded species table");
        Ok(table)
    }

    /// Load `path` into this table, returning the number of entries added.
    pub fn load_into(&mut self, path: &Path) -> ThermoResult<usize> {
        let before = self.len();
        self.merge(Self::load(path)?);
        Ok(self.len() - before)
    }
}

impl PropellantTable {
    pub fn load(path: &Path) -> ThermoResult<Self> {
        let text = read_source(path)?;
        let table = if is_yaml(path) {
            Self::from_yaml_str(&text)?
        } else {
            Self::from_pep_str(&text)?
        };
        tracing::info!(path = %path.display(), count = table.len(), "loaded propellant table");
        Ok(table)
    }
}

/// Species and propellant tables loaded together, shared read-only by all solves.
#[derive(Debug, Clone, Default)]
pub struct ThermoTables {
    pub species: SpeciesTable,
    pub propellants: PropellantTable,
}

impl ThermoTables {
    pub fn builtin() -> ThermoResult<Self> {
        Ok(Self {
            species: SpeciesTable::builtin()?,
            propellants: PropellantTable::builtin()?,
        })
    }

    pub fn load(species: &Path, propellants: &Path) -> ThermoResult<Self> {
        Ok(Self {
            species: SpeciesTable::load(species)?,
            propellants: PropellantTable::load(propellants)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join("pe_thermo_definitely_missing.yaml");
        assert!(matches!(
            SpeciesTable::load(&path),
            Err(ThermoError::NotFound { kind: "table file", .. })
        ));
    }

    #[test]
    fn load_into_counts_new_entries() {
        let path = std::env::temp_dir().join("pe_thermo_load_into.yaml");
        std::fs::write(
            &path,
            "species:\n  - name: XE_TEST\n    formula: { Xe: 1 }\n    phase: gas\n    heat_of_formation: 0.0\n    intervals:\n      - { range: [200, 6000], nasa7: [2.5, 0, 0, 0, 0, -745.375, 6.16] }\n",
        )
        .unwrap();
        let mut table = SpeciesTable::builtin().unwrap();
        assert_eq!(table.load_into(&path).unwrap(), 1);
        // second load adds nothing
        assert_eq!(table.load_into(&path).unwrap(), 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn extension_selects_format() {
        assert!(is_yaml(Path::new("a/species.YAML")));
        assert!(is_yaml(Path::new("b.yml")));
        assert!(!is_yaml(Path::new("thermo.inp")));
    }
}
