//! pe-thermo: species and propellant data plus thermodynamic evaluation.
//!
//! Provides:
//! - Elements keyed by atomic number and elemental formulas
//! - Species with piecewise Cp0/R fits
//! - Species and propellant tables (YAML, CEA `thermo.inp`, PEP records,
//!   built-in data sets)
//! - The thermo evaluator (H, S, G, Cp per species and mixture Cp)
//!
//! # Example
//!
//! ```
//! use pe_thermo::{SpeciesTable, ThermoEvaluator};
//!
//! let table = SpeciesTable::builtin().unwrap();
//! let h2o = table.species(table.search("H2O").unwrap()).unwrap();
//! let cp = ThermoEvaluator::default().specific_heat_0(h2o, 1500.0).unwrap();
//! assert!(cp > 40.0 && cp < 55.0);
//! ```

pub mod builtin;
pub mod cea;
pub mod element;
pub mod error;
mod fixed;
pub mod load;
pub mod pep;
pub mod propellant;
pub mod species;
pub mod table;
pub mod thermo;
pub mod yaml;

// Re-exports for ergonomics
pub use element::{Element, Formula, atomic_number};
pub use error::{ThermoError, ThermoResult};
pub use load::ThermoTables;
pub use propellant::{MAX_PROPELLANT_ELEMENTS, Propellant, PropellantTable};
pub use species::{ExtrapolationPolicy, Interval, Phase, PolyTerm, Species, ThermoPoint};
pub use table::SpeciesTable;
pub use thermo::{
    MixtureCp, ThermoEvaluator, frozen_cp_r, heat_of_formation, mixture_enthalpy_r,
    temperature_check, transition_temperature,
};
