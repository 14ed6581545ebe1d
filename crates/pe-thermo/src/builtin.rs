//! Data sets compiled into the crate.

use crate::error::ThermoResult;
use crate::propellant::PropellantTable;
use crate::table::SpeciesTable;

const SPECIES_YAML: &str = include_str!("../data/species.yaml");
const PROPELLANTS_YAML: &str = include_str!("../data/propellants.yaml");

impl SpeciesTable {
    /// H/O/C/N/Ar combustion products.
    pub fn builtin() -> ThermoResult<Self> {
        Self::from_yaml_str(SPECIES_YAML)
    }
}

impl PropellantTable {
    /// Common liquid and gaseous propellants.
    pub fn builtin() -> ThermoResult<Self> {
        Self::from_yaml_str(PROPELLANTS_YAML)
    }
}
