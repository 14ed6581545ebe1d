//! Read-only species lookup.

use crate::element::{Element, Formula};
use crate::error::{ThermoError, ThermoResult};
use crate::propellant::formula_matches;
use crate::species::{Phase, Species};
use pe_core::SpeciesId;
use std::collections::HashMap;

/// Species table shared by every solve.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    species: Vec<Species>,
    by_name: HashMap<String, SpeciesId>,
}

impl SpeciesTable {
    /// Build a table; duplicate names keep the first entry.
    pub fn new(species: Vec<Species>) -> Self {
        let mut by_name = HashMap::with_capacity(species.len());
        for (i, sp) in species.iter().enumerate() {
            by_name
                .entry(sp.name.to_uppercase())
                .or_insert(SpeciesId::from_index(i));
        }
        Self { species, by_name }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(id.index())
    }

    /// Lookup by id, failing with `NotFound`.
    pub fn species(&self, id: SpeciesId) -> ThermoResult<&Species> {
        self.get(id).ok_or_else(|| ThermoError::NotFound {
            kind: "species",
            name: id.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &Species)> {
        self.species
            .iter()
            .enumerate()
            .map(|(i, sp)| (SpeciesId::from_index(i), sp))
    }

    /// Name (case-insensitive) or chemical formula to id.
    ///
    /// A formula match prefers the gas phase.
    pub fn search(&self, name_or_formula: &str) -> ThermoResult<SpeciesId> {
        let key = name_or_formula.trim().to_uppercase();
        if let Some(id) = self.by_name.get(&key) {
            return Ok(*id);
        }
        self.search_by_formula(name_or_formula)
    }

    pub fn search_by_formula(&self, formula: &str) -> ThermoResult<SpeciesId> {
        let not_found = || ThermoError::NotFound {
            kind: "species",
            name: formula.to_string(),
        };
        let wanted = Formula::parse(formula).map_err(|_| not_found())?;
        let mut matches = self
            .iter()
            .filter(|(_, sp)| formula_matches(&sp.formula, &wanted));
        let first = matches.next().ok_or_else(not_found)?;
        if first.1.phase == Phase::Gas {
            return Ok(first.0);
        }
        Ok(matches
            .find(|(_, sp)| sp.phase == Phase::Gas)
            .map(|(id, _)| id)
            .unwrap_or(first.0))
    }

    /// Product candidates for an element set: species with a fit whose
    /// elements are all present. Gases first, then condensed, table order
    /// within each phase.
    pub fn candidates(&self, elements: &[Element]) -> (Vec<SpeciesId>, Vec<SpeciesId>) {
        let mut gas = Vec::new();
        let mut condensed = Vec::new();
        for (id, sp) in self.iter() {
            if !sp.has_fit() || !sp.formula.is_subset_of(elements) {
                continue;
            }
            match sp.phase {
                Phase::Gas => gas.push(id),
                Phase::Condensed => condensed.push(id),
            }
        }
        (gas, condensed)
    }

    /// Append another table's entries (names already present are skipped).
    pub fn merge(&mut self, other: SpeciesTable) {
        for sp in other.species {
            let key = sp.name.to_uppercase();
            if self.by_name.contains_key(&key) {
                continue;
            }
            self.by_name
                .insert(key, SpeciesId::from_index(self.species.len()));
            self.species.push(sp);
        }
    }
}
