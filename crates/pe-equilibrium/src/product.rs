//! Candidate product species for one composition.

use crate::composition::Composition;
use crate::error::{EquilibriumError, EquilibriumResult};
use nalgebra::DMatrix;
use pe_core::SpeciesId;
use pe_thermo::{Element, SpeciesTable};

/// Progress of product enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProductStage {
    Empty,
    ElementsListed,
    SpeciesListed,
    /// Mole numbers over the listed species satisfy equilibrium.
    Converged,
}

/// Elements present, candidate species split by phase, and the
/// element-by-species coefficient matrix.
///
/// Species columns are ordered gas first, then condensed. The buffers are
/// sized once when species are listed and never resized during a solve.
#[derive(Debug, Clone)]
pub struct Product {
    stage: ProductStage,
    elements: Vec<Element>,
    gas: Vec<SpeciesId>,
    condensed: Vec<SpeciesId>,
    coefficients: DMatrix<f64>,
}

impl Default for Product {
    fn default() -> Self {
        Self::new()
    }
}

impl Product {
    pub fn new() -> Self {
        Self {
            stage: ProductStage::Empty,
            elements: Vec::new(),
            gas: Vec::new(),
            condensed: Vec::new(),
            coefficients: DMatrix::zeros(0, 0),
        }
    }

    /// Enumerate and list in one go.
    pub fn for_composition(
        composition: &Composition,
        table: &SpeciesTable,
    ) -> EquilibriumResult<Self> {
        let mut product = Self::new();
        product.list_elements(composition)?;
        product.list_species(table)?;
        Ok(product)
    }

    pub fn list_elements(&mut self, composition: &Composition) -> EquilibriumResult<()> {
        self.elements = composition.elements().collect();
        if self.elements.is_empty() {
            return Err(EquilibriumError::invalid("composition has no elements"));
        }
        self.gas.clear();
        self.condensed.clear();
        self.coefficients = DMatrix::zeros(0, 0);
        self.stage = ProductStage::ElementsListed;
        Ok(())
    }

    /// Every table species built only from the listed elements. Species
    /// that cannot form are skipped.
    pub fn list_species(&mut self, table: &SpeciesTable) -> EquilibriumResult<()> {
        if self.stage < ProductStage::ElementsListed {
            return Err(EquilibriumError::invalid(
                "product elements must be listed before species",
            ));
        }
        let (gas, condensed) = table.candidates(&self.elements);
        if gas.is_empty() {
            return Err(EquilibriumError::invalid(
                "no gaseous product species for the composition elements",
            ));
        }
        let n_species = gas.len() + condensed.len();
        let mut coefficients = DMatrix::zeros(self.elements.len(), n_species);
        for (j, id) in gas.iter().chain(condensed.iter()).enumerate() {
            let sp = table.species(*id)?;
            for (i, element) in self.elements.iter().enumerate() {
                coefficients[(i, j)] = sp.formula.count(*element);
            }
        }
        self.gas = gas;
        self.condensed = condensed;
        self.coefficients = coefficients;
        self.stage = ProductStage::SpeciesListed;
        Ok(())
    }

    pub fn stage(&self) -> ProductStage {
        self.stage
    }

    pub(crate) fn mark_converged(&mut self) {
        if self.stage >= ProductStage::SpeciesListed {
            self.stage = ProductStage::Converged;
        }
    }

    /// Back to `SpeciesListed` before the mole numbers change again.
    pub(crate) fn reopen(&mut self) {
        self.stage = self.stage.min(ProductStage::SpeciesListed);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn gas(&self) -> &[SpeciesId] {
        &self.gas
    }

    pub fn condensed(&self) -> &[SpeciesId] {
        &self.condensed
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn n_gas(&self) -> usize {
        self.gas.len()
    }

    pub fn n_condensed(&self) -> usize {
        self.condensed.len()
    }

    /// Atoms of element `i` in gas species `j`.
    #[inline]
    pub fn a_gas(&self, i: usize, j: usize) -> f64 {
        self.coefficients[(i, j)]
    }

    /// Atoms of element `i` in condensed species `c`.
    #[inline]
    pub fn a_condensed(&self, i: usize, c: usize) -> f64 {
        self.coefficients[(i, self.gas.len() + c)]
    }

    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pe_thermo::PropellantTable;

    #[test]
    fn lists_in_order() {
        let props = PropellantTable::builtin().unwrap();
        let species = SpeciesTable::builtin().unwrap();
        let comp =
            Composition::oxidizer_fuel(&props, "RP-1 (RPL)", "OXYGEN (LIQUID)", 2.5).unwrap();

        let mut product = Product::new();
        assert!(product.list_species(&species).is_err());
        product.list_elements(&comp).unwrap();
        assert_eq!(product.stage(), ProductStage::ElementsListed);
        product.list_species(&species).unwrap();
        assert_eq!(product.stage(), ProductStage::SpeciesListed);
        product.mark_converged();
        assert_eq!(product.stage(), ProductStage::Converged);
        product.reopen();
        assert_eq!(product.stage(), ProductStage::SpeciesListed);

        // C, H, O: no nitrogen or argon species
        assert_eq!(product.n_elements(), 3);
        assert_eq!(product.n_condensed(), 1);
        for id in product.gas() {
            let sp = species.species(*id).unwrap();
            assert!(sp.formula.is_subset_of(product.elements()), "{}", sp.name);
        }
    }

    #[test]
    fn coefficient_matrix_matches_formulas() {
        let props = PropellantTable::builtin().unwrap();
        let species = SpeciesTable::builtin().unwrap();
        let comp = Composition::oxidizer_fuel(
            &props,
            "HYDROGEN (CRYOGENIC)",
            "OXYGEN (LIQUID)",
            5.551,
        )
        .unwrap();
        let product = Product::for_composition(&comp, &species).unwrap();
        let h2o = species.search("H2O").unwrap();
        let j = product.gas().iter().position(|id| *id == h2o).unwrap();
        // elements sorted by atomic number: H, O
        assert_eq!(product.a_gas(0, j), 2.0);
        assert_eq!(product.a_gas(1, j), 1.0);
    }
}
