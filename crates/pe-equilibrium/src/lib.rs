//! pe-equilibrium: chemical equilibrium of combustion products.
//!
//! Provides:
//! - `Composition` built from propellant contributions
//! - Product enumeration and the Newton working state
//! - The Gibbs-minimization solver for TP, HP and SP closures, plus the
//!   fixed-composition (frozen) re-solve
//! - Thermodynamic property derivation (frozen and equilibrium Cp)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pe_core::units::{bar, k};
//! use pe_equilibrium::{Composition, CpKind, EquilibriumSolver};
//! use pe_thermo::{PropellantTable, SpeciesTable};
//!
//! let props = PropellantTable::builtin().unwrap();
//! let species = SpeciesTable::builtin().unwrap();
//! let comp = Composition::oxidizer_fuel(&props, "HYDROGEN (GAS)", "OXYGEN (GAS)", 8.0).unwrap();
//!
//! let solver = EquilibriumSolver::new(&species);
//! let mut eq = solver.solve_tp(Arc::new(comp), bar(10.0), k(3000.0)).unwrap();
//! let p = eq.compute_properties(&species, CpKind::Equilibrium).unwrap();
//! assert!(p.molar_mass > 10.0 && p.molar_mass < 18.1);
//! ```

pub mod composition;
pub mod equilibrium;
pub mod error;
pub mod iteration;
pub mod product;
pub mod properties;
pub mod solver;

// Re-exports for ergonomics
pub use composition::{Amount, Component, Composition, CompositionBuilder};
pub use equilibrium::{Closure, Equilibrium, EquilibriumStatus};
pub use error::{EquilibriumError, EquilibriumResult};
pub use iteration::IterationVariables;
pub use product::{Product, ProductStage};
pub use properties::{
    CpKind, EquilibriumProperties, PerformanceProperties, SpecEnthalpy, SpecEntropy,
    SpecHeatCapacity,
};
pub use solver::{EquilibriumSolver, SolverConfig};
