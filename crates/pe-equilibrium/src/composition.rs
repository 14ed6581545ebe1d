//! Reactant mixtures.
//!
//! A composition is built from (propellant, amount) contributions and
//! reduced to what the solver needs: moles of each element per gram of
//! mixture, the reactant enthalpy per gram, and the mixture density.

use crate::error::{EquilibriumError, EquilibriumResult};
use pe_core::units::{Density, Mass, grams, kgpm3, to_grams};
use pe_core::PropellantId;
use pe_thermo::{Element, PropellantTable, ThermoError};

/// Quantity of one propellant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Mass(Mass),
    Moles(f64),
}

/// One reactant contribution, stored in moles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub propellant: PropellantId,
    pub moles: f64,
}

/// Immutable reactant mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    components: Vec<Component>,
    /// mol of element per gram of mixture, sorted by atomic number
    elements: Vec<(Element, f64)>,
    mass_g: f64,
    enthalpy_j_per_g: f64,
    density_g_per_cm3: f64,
}

impl Composition {
    pub fn builder(table: &PropellantTable) -> CompositionBuilder<'_> {
        CompositionBuilder::new(table)
    }

    /// Fuel/oxidizer pair at an oxidizer-to-fuel mass ratio, per gram of fuel.
    pub fn oxidizer_fuel(
        table: &PropellantTable,
        fuel: &str,
        oxidizer: &str,
        of_ratio: f64,
    ) -> EquilibriumResult<Self> {
        if !of_ratio.is_finite() || of_ratio <= 0.0 {
            return Err(EquilibriumError::invalid("O/F ratio must be positive"));
        }
        CompositionBuilder::new(table)
            .add_by_name(fuel, Amount::Mass(grams(1.0)))?
            .add_by_name(oxidizer, Amount::Mass(grams(of_ratio)))?
            .build()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// (element, mol per gram of mixture) pairs.
    pub fn element_vector(&self) -> &[(Element, f64)] {
        &self.elements
    }

    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.elements.iter().map(|(e, _)| *e)
    }

    /// mol of `element` per gram of mixture.
    pub fn element_amount(&self, element: Element) -> f64 {
        self.elements
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, b)| *b)
            .unwrap_or(0.0)
    }

    pub fn mass(&self) -> Mass {
        grams(self.mass_g)
    }

    /// Reactant enthalpy, J/kg.
    pub fn enthalpy_j_per_kg(&self) -> f64 {
        self.enthalpy_j_per_g * 1000.0
    }

    /// Mass-weighted harmonic mean of component densities (zero when no
    /// component has a density).
    pub fn density(&self) -> Density {
        kgpm3(self.density_g_per_cm3 * 1000.0)
    }

    /// Mass fraction of each component.
    pub fn mass_fractions<'a>(
        &'a self,
        table: &'a PropellantTable,
    ) -> impl Iterator<Item = (PropellantId, f64)> + 'a {
        self.components.iter().filter_map(move |c| {
            let p = table.get(c.propellant)?;
            Some((c.propellant, c.moles * p.molar_mass() / self.mass_g))
        })
    }
}

/// Accumulates propellant contributions into a `Composition`.
#[derive(Debug, Clone)]
pub struct CompositionBuilder<'t> {
    table: &'t PropellantTable,
    components: Vec<Component>,
}

impl<'t> CompositionBuilder<'t> {
    pub fn new(table: &'t PropellantTable) -> Self {
        Self {
            table,
            components: Vec::new(),
        }
    }

    /// Add a contribution; repeated propellants are merged.
    pub fn add(mut self, propellant: PropellantId, amount: Amount) -> EquilibriumResult<Self> {
        let p = self
            .table
            .get(propellant)
            .ok_or_else(|| EquilibriumError::UnknownPropellant {
                name: propellant.to_string(),
            })?;
        let moles = match amount {
            Amount::Mass(m) => to_grams(m) / p.molar_mass(),
            Amount::Moles(n) => n,
        };
        if !moles.is_finite() || moles <= 0.0 {
            return Err(EquilibriumError::invalid(format!(
                "amount of {} must be finite and positive",
                p.name
            )));
        }
        match self
            .components
            .iter_mut()
            .find(|c| c.propellant == propellant)
        {
            Some(c) => c.moles += moles,
            None => self.components.push(Component { propellant, moles }),
        }
        Ok(self)
    }

    pub fn add_by_name(self, name: &str, amount: Amount) -> EquilibriumResult<Self> {
        let id = self.table.search(name).map_err(|e| match e {
            ThermoError::NotFound { .. } => EquilibriumError::UnknownPropellant {
                name: name.to_string(),
            },
            other => other.into(),
        })?;
        self.add(id, amount)
    }

    pub fn build(self) -> EquilibriumResult<Composition> {
        if self.components.is_empty() {
            return Err(EquilibriumError::invalid("composition has no propellants"));
        }

        let mut mass_g = 0.0;
        let mut enthalpy_j = 0.0;
        let mut volume_cm3 = 0.0;
        let mut dense_mass_g = 0.0;
        let mut element_moles: Vec<(Element, f64)> = Vec::new();

        for c in &self.components {
            let p = self
                .table
                .get(c.propellant)
                .ok_or_else(|| EquilibriumError::UnknownPropellant {
                    name: c.propellant.to_string(),
                })?;
            let m = c.moles * p.molar_mass();
            mass_g += m;
            enthalpy_j += c.moles * p.heat_of_formation;
            if p.density > 0.0 {
                volume_cm3 += m / p.density;
                dense_mass_g += m;
            }
            // merged by atomic number
            for (element, count) in p.formula.iter() {
                match element_moles.iter_mut().find(|(e, _)| *e == element) {
                    Some((_, n)) => *n += c.moles * count,
                    None => element_moles.push((element, c.moles * count)),
                }
            }
        }

        element_moles.sort_by_key(|(e, _)| *e);
        for (_, n) in &mut element_moles {
            *n /= mass_g;
        }
        let density_g_per_cm3 = if volume_cm3 > 0.0 {
            dense_mass_g / volume_cm3
        } else {
            0.0
        };

        Ok(Composition {
            components: self.components,
            elements: element_moles,
            mass_g,
            enthalpy_j_per_g: enthalpy_j / mass_g,
            density_g_per_cm3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pe_core::units::to_kgpm3;
    use proptest::prelude::*;

    fn table() -> PropellantTable {
        PropellantTable::builtin().unwrap()
    }

    #[test]
    fn lh2_lox_element_vector() {
        let t = table();
        let c = Composition::oxidizer_fuel(&t, "HYDROGEN (CRYOGENIC)", "OXYGEN (LIQUID)", 5.551)
            .unwrap();
        assert_relative_eq!(to_grams(c.mass()), 6.551, epsilon = 1e-12);
        let h = Element::from_symbol("H").unwrap();
        let o = Element::from_symbol("O").unwrap();
        assert_relative_eq!(c.element_amount(h), 1.0 / 1.00794 / 6.551, max_relative = 1e-12);
        assert_relative_eq!(c.element_amount(o), 5.551 / 15.9994 / 6.551, max_relative = 1e-12);
        assert_eq!(c.elements().count(), 2);
    }

    #[test]
    fn density_is_harmonic_mean() {
        let t = table();
        let c = Composition::oxidizer_fuel(&t, "HYDROGEN (CRYOGENIC)", "OXYGEN (LIQUID)", 5.551)
            .unwrap();
        let expected = 6.551 / (1.0 / 0.071 + 5.551 / 1.149);
        assert_relative_eq!(to_kgpm3(c.density()), expected * 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn enthalpy_per_kg() {
        let t = table();
        let c = Composition::builder(&t)
            .add_by_name("OXYGEN (LIQUID)", Amount::Moles(2.0))
            .unwrap()
            .build()
            .unwrap();
        assert_relative_eq!(c.enthalpy_j_per_kg(), -12979.0 / 31.9988 * 1000.0, max_relative = 1e-9);
    }

    #[test]
    fn repeated_propellant_merges() {
        let t = table();
        let c = Composition::builder(&t)
            .add_by_name("WATER", Amount::Moles(1.0))
            .unwrap()
            .add_by_name("water", Amount::Moles(1.0))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(c.components().len(), 1);
        assert_relative_eq!(c.components()[0].moles, 2.0);
    }

    #[test]
    fn shared_elements_merge_across_propellants() {
        let t = table();
        // water and hydrogen peroxide both carry H and O
        let c = Composition::builder(&t)
            .add_by_name("WATER", Amount::Moles(1.0))
            .unwrap()
            .add_by_name("HYDROGEN PEROXIDE (100%)", Amount::Moles(1.0))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(c.element_vector().len(), 2);
        let o = Element::from_symbol("O").unwrap();
        let mass = 18.01528 + 34.01468;
        assert_relative_eq!(c.element_amount(o), 3.0 / mass, max_relative = 1e-6);
    }

    #[test]
    fn unknown_propellant_aborts() {
        let t = table();
        let err = Composition::builder(&t)
            .add_by_name("UNOBTAINIUM", Amount::Moles(1.0))
            .unwrap_err();
        assert!(matches!(err, EquilibriumError::UnknownPropellant { .. }));
    }

    #[test]
    fn rejects_empty_and_non_positive() {
        let t = table();
        assert!(Composition::builder(&t).build().is_err());
        assert!(
            Composition::builder(&t)
                .add_by_name("WATER", Amount::Moles(-1.0))
                .is_err()
        );
        assert!(Composition::oxidizer_fuel(&t, "RP-1", "OXYGEN (LIQUID)", 0.0).is_err());
    }

    proptest! {
        #[test]
        fn element_mass_sums_to_one_gram(of in 0.05f64..20.0) {
            let t = table();
            let c = Composition::oxidizer_fuel(&t, "RP-1 (RPL)", "OXYGEN (LIQUID)", of).unwrap();
            let mass: f64 = c.element_vector().iter().map(|(e, b)| b * e.atomic_mass()).sum();
            prop_assert!((mass - 1.0).abs() < 1e-12);
            let fractions: f64 = c.mass_fractions(&t).map(|(_, w)| w).sum();
            prop_assert!((fractions - 1.0).abs() < 1e-12);
        }
    }
}
