//! Table listings.

use pe_thermo::ThermoTables;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeciesRow {
    pub name: String,
    pub condensed: bool,
    pub molar_mass: f64,
    /// J/mol at 298.15 K
    pub heat_of_formation: f64,
    pub t_low: Option<f64>,
    pub t_high: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropellantRow {
    pub name: String,
    pub molar_mass: f64,
    /// J/g
    pub enthalpy_per_gram: f64,
    /// g/cm³
    pub density: f64,
}

fn matches(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| name.to_uppercase().contains(&f.trim().to_uppercase()))
}

/// Species whose name contains `filter` (case-insensitive), in table order.
pub fn list_species(tables: &ThermoTables, filter: Option<&str>) -> Vec<SpeciesRow> {
    tables
        .species
        .iter()
        .filter(|(_, s)| matches(&s.name, filter))
        .map(|(_, s)| {
            let range = s.range();
            SpeciesRow {
                name: s.name.clone(),
                condensed: !s.is_gas(),
                molar_mass: s.molar_mass,
                heat_of_formation: s.heat_of_formation,
                t_low: range.map(|r| r.0),
                t_high: range.map(|r| r.1),
            }
        })
        .collect()
}

pub fn list_propellants(tables: &ThermoTables, filter: Option<&str>) -> Vec<PropellantRow> {
    tables
        .propellants
        .iter()
        .filter(|(_, p)| matches(&p.name, filter))
        .map(|(_, p)| PropellantRow {
            name: p.name.clone(),
            molar_mass: p.molar_mass(),
            enthalpy_per_gram: p.enthalpy_per_gram(),
            density: p.density,
        })
        .collect()
}
