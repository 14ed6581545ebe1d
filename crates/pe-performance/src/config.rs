//! Nozzle iteration settings.

use serde::{Deserialize, Serialize};

/// Budgets and tolerances of the throat and exit searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NozzleConfig {
    pub throat_iterations: usize,
    /// |u² - a²| / u² at the throat
    pub throat_tolerance: f64,
    pub exit_iterations: usize,
    /// |Δ ln(Pc/Pe)| on the supersonic branch, |ln(Ae/At) - ln target| on
    /// the subsonic one
    pub exit_tolerance: f64,
}

impl Default for NozzleConfig {
    fn default() -> Self {
        Self {
            throat_iterations: 30,
            throat_tolerance: 1e-7,
            exit_iterations: 60,
            exit_tolerance: 4e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: NozzleConfig = serde_yaml::from_str("throat_iterations: 12").unwrap();
        assert_eq!(cfg.throat_iterations, 12);
        assert_eq!(cfg.exit_tolerance, 4e-6);
    }
}
