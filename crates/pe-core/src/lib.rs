//! pe-core: stable foundation for propeq.
//!
//! Contains:
//! - units (uom SI types + constructors, physical constants)
//! - numeric (finiteness checks, relative differences)
//! - ids (compact table identifiers for species and propellants)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
