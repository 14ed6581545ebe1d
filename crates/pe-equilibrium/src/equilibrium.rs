//! The `Equilibrium` aggregate and its status machine.

use crate::composition::Composition;
use crate::error::{EquilibriumError, EquilibriumResult};
use crate::iteration::IterationVariables;
use crate::product::Product;
use crate::solver::SolverConfig;
use crate::properties::{CpKind, EquilibriumProperties, PerformanceProperties};
use pe_core::{SpeciesId, relative_difference};
use pe_core::constants::R_J_PER_MOL_K;
use pe_core::units::{Pressure, Temperature, bar, k};
use pe_thermo::{Element, ExtrapolationPolicy, SpeciesTable};
use std::fmt;
use std::sync::Arc;

/// Progress of one equilibrium. Derived state is only readable once its
/// stage has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EquilibriumStatus {
    Pending,
    Converged,
    PropertiesComputed,
    PerformanceComputed,
}

impl EquilibriumStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Converged => "converged",
            Self::PropertiesComputed => "properties computed",
            Self::PerformanceComputed => "performance computed",
        }
    }
}

impl fmt::Display for EquilibriumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The second state variable held fixed next to pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Closure {
    /// TP: fixed temperature.
    Temperature(Temperature),
    /// HP: fixed mixture enthalpy, J/kg.
    Enthalpy(f64),
    /// SP: fixed mixture entropy, J/(kg K).
    Entropy(f64),
}

impl Closure {
    pub fn label(&self) -> &'static str {
        match self {
            Closure::Temperature(_) => "TP",
            Closure::Enthalpy(_) => "HP",
            Closure::Entropy(_) => "SP",
        }
    }

    pub fn fixes_temperature(&self) -> bool {
        matches!(self, Closure::Temperature(_))
    }
}

/// Composition, products and solver state at one (P, closure) point.
#[derive(Debug, Clone)]
pub struct Equilibrium {
    composition: Arc<Composition>,
    /// mol/g, aligned with `product.elements()`
    b0: Vec<f64>,
    pub(crate) product: Product,
    pub(crate) itn: IterationVariables,
    pub(crate) pressure_bar: f64,
    pub(crate) temperature_k: f64,
    pub(crate) closure: Option<Closure>,
    pub(crate) frozen: bool,
    pub(crate) extrapolated: bool,
    pub(crate) trace_threshold: f64,
    pub(crate) extrapolation: ExtrapolationPolicy,
    status: EquilibriumStatus,
    properties: Option<EquilibriumProperties>,
    performance: Option<PerformanceProperties>,
}

impl Equilibrium {
    /// Enumerate products for `composition` and size the working buffers.
    pub fn new(composition: Arc<Composition>, table: &SpeciesTable) -> EquilibriumResult<Self> {
        let product = Product::for_composition(&composition, table)?;
        let b0 = product
            .elements()
            .iter()
            .map(|e| composition.element_amount(*e))
            .collect();
        let defaults = SolverConfig::default();
        let itn = IterationVariables::with_capacity(
            product.n_elements(),
            product.n_gas(),
            product.n_condensed(),
        );
        Ok(Self {
            composition,
            b0,
            product,
            itn,
            pressure_bar: 0.0,
            temperature_k: 0.0,
            closure: None,
            frozen: false,
            extrapolated: false,
            trace_threshold: defaults.trace_threshold,
            extrapolation: defaults.extrapolation,
            status: EquilibriumStatus::Pending,
            properties: None,
            performance: None,
        })
    }

    pub fn status(&self) -> EquilibriumStatus {
        self.status
    }

    pub fn composition(&self) -> &Arc<Composition> {
        &self.composition
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn iteration(&self) -> &IterationVariables {
        &self.itn
    }

    pub(crate) fn element_targets(&self) -> &[f64] {
        &self.b0
    }

    pub fn pressure(&self) -> Pressure {
        bar(self.pressure_bar)
    }

    pub fn temperature(&self) -> Temperature {
        k(self.temperature_k)
    }

    /// Closure of the last successful solve. `None` before any solve and
    /// for frozen-composition states.
    pub fn closure(&self) -> Option<Closure> {
        self.closure
    }

    /// Composition was held fixed (frozen expansion).
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Some species fit was evaluated outside its range during the last solve.
    pub fn used_extrapolation(&self) -> bool {
        self.extrapolated
    }

    /// Newton iterations spent in the last solve.
    pub fn iterations(&self) -> usize {
        self.itn.iterations
    }

    pub fn properties(&self) -> EquilibriumResult<&EquilibriumProperties> {
        match (&self.properties, self.status) {
            (Some(p), s) if s >= EquilibriumStatus::PropertiesComputed => Ok(p),
            _ => Err(EquilibriumError::PropertiesUnavailable {
                status: self.status.as_str(),
            }),
        }
    }

    pub fn performance(&self) -> EquilibriumResult<&PerformanceProperties> {
        match (&self.performance, self.status) {
            (Some(p), EquilibriumStatus::PerformanceComputed) => Ok(p),
            _ => Err(EquilibriumError::PerformanceUnavailable {
                status: self.status.as_str(),
            }),
        }
    }

    /// Derive and store thermodynamic properties.
    pub fn compute_properties(
        &mut self,
        table: &SpeciesTable,
        kind: CpKind,
    ) -> EquilibriumResult<&EquilibriumProperties> {
        let props = crate::properties::derive(self, table, kind)?;
        self.properties = Some(props);
        self.performance = None;
        self.status = EquilibriumStatus::PropertiesComputed;
        self.properties()
    }

    /// Attach performance figures computed for this state (exit station).
    pub fn set_performance(&mut self, performance: PerformanceProperties) -> EquilibriumResult<()> {
        if self.status < EquilibriumStatus::PropertiesComputed {
            return Err(EquilibriumError::PropertiesUnavailable {
                status: self.status.as_str(),
            });
        }
        self.performance = Some(performance);
        self.status = EquilibriumStatus::PerformanceComputed;
        Ok(())
    }

    /// Drop everything derived from the current solution.
    pub fn invalidate(&mut self) {
        self.status = EquilibriumStatus::Pending;
        self.product.reopen();
        self.properties = None;
        self.performance = None;
    }

    pub(crate) fn mark_converged(&mut self, closure: Option<Closure>, frozen: bool) {
        self.closure = closure;
        self.frozen = frozen;
        self.properties = None;
        self.performance = None;
        self.product.mark_converged();
        self.status = EquilibriumStatus::Converged;
    }

    pub(crate) fn ensure_converged(&self) -> EquilibriumResult<()> {
        if self.status >= EquilibriumStatus::Converged {
            Ok(())
        } else {
            Err(EquilibriumError::PropertiesUnavailable {
                status: self.status.as_str(),
            })
        }
    }

    /// Moles per gram of every gas and active condensed species.
    pub fn species_moles(&self) -> EquilibriumResult<Vec<(SpeciesId, f64)>> {
        self.ensure_converged()?;
        let gas = self
            .product
            .gas()
            .iter()
            .enumerate()
            .map(|(j, id)| (*id, self.itn.gas_moles(j)));
        let condensed = self
            .product
            .condensed()
            .iter()
            .enumerate()
            .filter(|(c, _)| self.itn.active[*c])
            .map(|(c, id)| (*id, self.itn.n_condensed[c]));
        Ok(gas.chain(condensed).collect())
    }

    /// Mole fractions over gas plus condensed moles, largest first.
    pub fn mole_fractions(&self) -> EquilibriumResult<Vec<(SpeciesId, f64)>> {
        let moles = self.species_moles()?;
        let total: f64 = moles.iter().map(|(_, m)| m).sum();
        let mut fractions: Vec<_> = moles.into_iter().map(|(id, m)| (id, m / total)).collect();
        fractions.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(fractions)
    }

    /// mol of each element per gram held in the products.
    pub fn element_totals(&self) -> Vec<(Element, f64)> {
        let p = &self.product;
        (0..p.n_elements())
            .map(|i| {
                let gas: f64 = (0..p.n_gas())
                    .map(|j| p.a_gas(i, j) * self.itn.gas_moles(j))
                    .sum();
                let cond: f64 = (0..p.n_condensed())
                    .filter(|c| self.itn.active[*c])
                    .map(|c| p.a_condensed(i, c) * self.itn.n_condensed[c])
                    .sum();
                (p.elements()[i], gas + cond)
            })
            .collect()
    }

    /// Largest relative deviation of product element totals from the reactants.
    pub fn element_balance_error(&self) -> f64 {
        self.element_totals()
            .iter()
            .zip(&self.b0)
            .map(|((_, have), want)| relative_difference(*have, *want))
            .fold(0.0, f64::max)
    }

    /// Mixture molar mass, g/mol: one gram over the gas moles, so
    /// condensed mass counts but condensed moles do not.
    pub fn molar_mass(&self) -> f64 {
        1.0 / self.itn.n
    }

    /// Gas constant of the mixture, J/(kg K).
    pub fn gas_constant(&self) -> f64 {
        self.itn.n * R_J_PER_MOL_K * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductStage;
    use pe_thermo::PropellantTable;

    fn fresh() -> Equilibrium {
        let props = PropellantTable::builtin().unwrap();
        let species = SpeciesTable::builtin().unwrap();
        let comp = Composition::oxidizer_fuel(
            &props,
            "HYDROGEN (CRYOGENIC)",
            "OXYGEN (LIQUID)",
            5.551,
        )
        .unwrap();
        Equilibrium::new(Arc::new(comp), &species).unwrap()
    }

    #[test]
    fn derived_state_is_gated_by_status() {
        let mut eq = fresh();
        assert_eq!(eq.status(), EquilibriumStatus::Pending);
        assert!(matches!(
            eq.properties(),
            Err(EquilibriumError::PropertiesUnavailable { status: "pending" })
        ));
        assert!(eq.performance().is_err());
        assert!(eq.mole_fractions().is_err());
        assert!(eq.set_performance(PerformanceProperties::default()).is_err());
    }

    #[test]
    fn converged_state_still_hides_properties() {
        let mut eq = fresh();
        eq.mark_converged(Some(Closure::Enthalpy(0.0)), false);
        assert_eq!(eq.product().stage(), ProductStage::Converged);
        assert!(eq.mole_fractions().is_ok());
        assert!(matches!(
            eq.properties(),
            Err(EquilibriumError::PropertiesUnavailable { status: "converged" })
        ));
        eq.invalidate();
        assert_eq!(eq.status(), EquilibriumStatus::Pending);
        assert_eq!(eq.product().stage(), ProductStage::SpeciesListed);
    }

    #[test]
    fn statuses_are_ordered() {
        assert!(EquilibriumStatus::Pending < EquilibriumStatus::Converged);
        assert!(EquilibriumStatus::PropertiesComputed < EquilibriumStatus::PerformanceComputed);
        assert_eq!(Closure::Entropy(1.0).label(), "SP");
    }
}
