//! Propellant definitions and the propellant table.

use crate::element::Formula;
use crate::error::{ThermoError, ThermoResult};
use pe_core::PropellantId;
use std::collections::HashMap;

/// Maximum number of distinct elements in a propellant formula.
pub const MAX_PROPELLANT_ELEMENTS: usize = 6;

/// A reactant as stored in the propellant table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Propellant {
    pub name: String,
    pub formula: Formula,
    /// J/mol at the storage state
    pub heat_of_formation: f64,
    /// g/cm^3 (0 when unknown)
    pub density: f64,
}

impl Propellant {
    pub fn new(
        name: impl Into<String>,
        formula: Formula,
        heat_of_formation: f64,
        density: f64,
    ) -> ThermoResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ThermoError::InvalidArg {
                what: "propellant name must not be empty",
            });
        }
        if formula.is_empty() {
            return Err(ThermoError::InvalidArg {
                what: "propellant formula must not be empty",
            });
        }
        if formula.len() > MAX_PROPELLANT_ELEMENTS {
            return Err(ThermoError::InvalidArg {
                what: "propellant formula has more than six elements",
            });
        }
        pe_core::ensure_finite(heat_of_formation, "propellant heat of formation")?;
        if !density.is_finite() || density < 0.0 {
            return Err(ThermoError::InvalidArg {
                what: "propellant density must be finite and non-negative",
            });
        }
        Ok(Self {
            name,
            formula,
            heat_of_formation,
            density,
        })
    }

    /// g/mol
    pub fn molar_mass(&self) -> f64 {
        self.formula.molar_mass()
    }

    /// Heat of formation per unit mass, J/g.
    pub fn enthalpy_per_gram(&self) -> f64 {
        self.heat_of_formation / self.molar_mass()
    }
}

/// Read-only propellant lookup.
#[derive(Debug, Clone, Default)]
pub struct PropellantTable {
    propellants: Vec<Propellant>,
    by_name: HashMap<String, PropellantId>,
}

impl PropellantTable {
    /// Build a table; duplicate names keep the first entry.
    pub fn new(propellants: Vec<Propellant>) -> Self {
        let mut by_name = HashMap::with_capacity(propellants.len());
        for (i, p) in propellants.iter().enumerate() {
            by_name
                .entry(p.name.to_uppercase())
                .or_insert(PropellantId::from_index(i));
        }
        Self {
            propellants,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.propellants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.propellants.is_empty()
    }

    pub fn get(&self, id: PropellantId) -> Option<&Propellant> {
        self.propellants.get(id.index())
    }

    /// Lookup by id, failing with `NotFound`.
    pub fn propellant(&self, id: PropellantId) -> ThermoResult<&Propellant> {
        self.get(id).ok_or_else(|| ThermoError::NotFound {
            kind: "propellant",
            name: id.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropellantId, &Propellant)> {
        self.propellants
            .iter()
            .enumerate()
            .map(|(i, p)| (PropellantId::from_index(i), p))
    }

    /// Case-insensitive name lookup. An unambiguous prefix also matches.
    pub fn search(&self, name: &str) -> ThermoResult<PropellantId> {
        let key = name.trim().to_uppercase();
        if let Some(id) = self.by_name.get(&key) {
            return Ok(*id);
        }
        let mut prefixed = self
            .iter()
            .filter(|(_, p)| !key.is_empty() && p.name.to_uppercase().starts_with(&key));
        match (prefixed.next(), prefixed.next()) {
            (Some((id, _)), None) => Ok(id),
            _ => Err(ThermoError::NotFound {
                kind: "propellant",
                name: name.to_string(),
            }),
        }
    }

    /// First propellant whose elemental formula equals `formula`.
    pub fn search_by_formula(&self, formula: &str) -> ThermoResult<PropellantId> {
        let wanted = Formula::parse(formula)?;
        self.iter()
            .find(|(_, p)| formula_matches(&p.formula, &wanted))
            .map(|(id, _)| id)
            .ok_or_else(|| ThermoError::NotFound {
                kind: "propellant",
                name: formula.to_string(),
            })
    }
}

pub(crate) fn formula_matches(a: &Formula, b: &Formula) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|((ea, na), (eb, nb))| ea == eb && (na - nb).abs() <= 1e-9 * na.max(nb))
}
