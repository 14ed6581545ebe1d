//! Native YAML table format.
//!
//! ```yaml
//! species:
//!   - name: H2O
//!     formula: { H: 2, O: 1 }
//!     phase: gas
//!     intervals:
//!       - { range: [200.0, 1000.0], nasa7: [a1, a2, a3, a4, a5, a6, a7] }
//!       - range: [1000.0, 6000.0]
//!         exponents: [-2, -1, 0, 1, 2, 3, 4]
//!         coefficients: [...]
//!         b1: ...
//!         b2: ...
//! propellants:
//!   - { name: OXYGEN (LIQUID), formula: { O: 2 }, heat_of_formation: -12979.0, density: 1.149 }
//! ```
//!
//! Heats of formation are J/mol, densities g/cm^3. `molar_mass` and
//! `heat_of_formation` are derived from the formula and fit when omitted.

use crate::element::Formula;
use crate::error::{ThermoError, ThermoResult};
use crate::propellant::{Propellant, PropellantTable};
use crate::species::{Interval, Phase, PolyTerm, Species};
use crate::table::SpeciesTable;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SpeciesFile {
    #[serde(default)]
    species: Vec<SpeciesDef>,
}

#[derive(Debug, Deserialize)]
struct SpeciesDef {
    name: String,
    formula: Formula,
    phase: Phase,
    #[serde(default)]
    molar_mass: Option<f64>,
    #[serde(default)]
    heat_of_formation: Option<f64>,
    #[serde(default)]
    h298_offset: f64,
    #[serde(default)]
    intervals: Vec<IntervalDef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntervalDef {
    Nasa7 {
        range: [f64; 2],
        nasa7: [f64; 7],
    },
    General {
        range: [f64; 2],
        exponents: Vec<f64>,
        coefficients: Vec<f64>,
        b1: f64,
        b2: f64,
    },
}

impl IntervalDef {
    fn into_interval(self, species: &str) -> ThermoResult<Interval> {
        match self {
            IntervalDef::Nasa7 { range, nasa7 } => Ok(Interval::nasa7(range[0], range[1], nasa7)),
            IntervalDef::General {
                range,
                exponents,
                coefficients,
                b1,
                b2,
            } => {
                if exponents.len() != coefficients.len() {
                    return Err(ThermoError::format(
                        None,
                        format!("{species}: exponents and coefficients differ in length"),
                    ));
                }
                let terms = exponents
                    .into_iter()
                    .zip(coefficients)
                    .map(|(exponent, coefficient)| PolyTerm {
                        exponent,
                        coefficient,
                    })
                    .collect();
                Ok(Interval {
                    t_low: range[0],
                    t_high: range[1],
                    terms,
                    b1,
                    b2,
                })
            }
        }
    }
}

impl SpeciesDef {
    fn into_species(self) -> ThermoResult<Species> {
        let name = self.name;
        let intervals = self
            .intervals
            .into_iter()
            .map(|iv| iv.into_interval(&name))
            .collect::<ThermoResult<Vec<_>>>()?;
        let molar_mass = self.molar_mass.unwrap_or_else(|| self.formula.molar_mass());
        let mut species = Species {
            name,
            formula: self.formula,
            phase: self.phase,
            molar_mass,
            heat_of_formation: self.heat_of_formation.unwrap_or(0.0),
            h298_offset: self.h298_offset,
            intervals,
        };
        if self.heat_of_formation.is_none() {
            species.heat_of_formation = species.fitted_heat_of_formation().ok_or_else(|| {
                ThermoError::format(
                    None,
                    format!("{}: heat_of_formation required", species.name),
                )
            })?;
        }
        species.validate().map_err(|what| ThermoError::format(None, what))?;
        Ok(species)
    }
}

#[derive(Debug, Deserialize)]
struct PropellantFile {
    #[serde(default)]
    propellants: Vec<PropellantDef>,
}

#[derive(Debug, Deserialize)]
struct PropellantDef {
    name: String,
    formula: Formula,
    heat_of_formation: f64,
    #[serde(default)]
    density: f64,
}

impl SpeciesTable {
    /// Parse the native YAML species format.
    pub fn from_yaml_str(text: &str) -> ThermoResult<Self> {
        let file: SpeciesFile = serde_yaml::from_str(text)?;
        let species = file
            .species
            .into_iter()
            .map(SpeciesDef::into_species)
            .collect::<ThermoResult<Vec<_>>>()?;
        Ok(Self::new(species))
    }
}

impl PropellantTable {
    /// Parse the native YAML propellant format.
    pub fn from_yaml_str(text: &str) -> ThermoResult<Self> {
        let file: PropellantFile = serde_yaml::from_str(text)?;
        let propellants = file
            .propellants
            .into_iter()
            .map(|def| {
                let name = def.name.clone();
                Propellant::new(def.name, def.formula, def.heat_of_formation, def.density)
                    .map_err(|e| ThermoError::format(None, format!("{name}: {e}")))
            })
            .collect::<ThermoResult<Vec<_>>>()?;
        Ok(Self::new(propellants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const H2: &str = r#"
species:
  - name: H2
    formula: { H: 2 }
    phase: gas
    intervals:
      - range: [200.0, 1000.0]
        nasa7: [2.34433112E+00, 7.98052075E-03, -1.94781510E-05, 2.01572094E-08, -7.37611761E-12, -9.17935173E+02, 6.83010238E-01]
      - range: [1000.0, 3500.0]
        exponents: [0, 1, 2, 3, 4]
        coefficients: [3.33727920E+00, -4.94024731E-05, 4.99456778E-07, -1.79566394E-10, 2.00255376E-14]
        b1: -9.50158922E+02
        b2: -3.20502331E+00
"#;

    #[test]
    fn loads_both_interval_forms() {
        let table = SpeciesTable::from_yaml_str(H2).unwrap();
        assert_eq!(table.len(), 1);
        let h2 = table.species(table.search("H2").unwrap()).unwrap();
        assert_eq!(h2.intervals.len(), 2);
        assert_relative_eq!(h2.molar_mass, 2.01588, epsilon = 1e-9);
        // H2 is a reference element: heat of formation ~ 0
        assert!(h2.heat_of_formation.abs() < 1.0);
    }

    #[test]
    fn syntax_errors_report_line() {
        let err = SpeciesTable::from_yaml_str("species:\n  - name: [unclosed\n").unwrap_err();
        assert!(matches!(err, ThermoError::FileFormat { line: Some(_), .. }));
    }

    #[test]
    fn unknown_element_is_rejected() {
        let text = "species:\n  - name: Zz\n    formula: { Zz: 1 }\n    phase: gas\n";
        assert!(matches!(
            SpeciesTable::from_yaml_str(text),
            Err(ThermoError::FileFormat { .. })
        ));
    }

    #[test]
    fn mismatched_term_lengths_rejected() {
        let text = r#"
species:
  - name: X
    formula: { H: 1 }
    phase: gas
    heat_of_formation: 0.0
    intervals:
      - { range: [200, 1000], exponents: [0, 1], coefficients: [1.0], b1: 0, b2: 0 }
"#;
        assert!(SpeciesTable::from_yaml_str(text).is_err());
    }

    #[test]
    fn propellants_load() {
        let text = r#"
propellants:
  - { name: OXYGEN (LIQUID), formula: { O: 2 }, heat_of_formation: -12979.0, density: 1.149 }
  - { name: RP-1 (RPL), formula: { C: 1, H: 1.9423 }, heat_of_formation: -24717.7, density: 0.773 }
"#;
        let table = PropellantTable::from_yaml_str(text).unwrap();
        assert_eq!(table.len(), 2);
        let rp1 = table.propellant(table.search("rp-1 (rpl)").unwrap()).unwrap();
        assert_relative_eq!(rp1.density, 0.773);
    }
}
