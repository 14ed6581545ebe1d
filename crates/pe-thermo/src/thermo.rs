//! Thermo evaluator: per-species standard-state and mixture properties.
//!
//! Molar quantities are J/mol or J/(mol K). Pressures are bar; the
//! standard state is `P_REF_BAR`.

use crate::error::ThermoResult;
use crate::species::{ExtrapolationPolicy, Species, ThermoPoint};
use pe_core::constants::{P_REF_BAR, R_J_PER_MOL_K};

/// Pure evaluation functions bound to an extrapolation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThermoEvaluator {
    pub policy: ExtrapolationPolicy,
}

impl ThermoEvaluator {
    pub fn new(policy: ExtrapolationPolicy) -> Self {
        Self { policy }
    }

    /// Dimensionless point (Cp0/R, H0/RT, S0/R).
    pub fn point(&self, species: &Species, t: f64) -> ThermoResult<ThermoPoint> {
        species.evaluate(t, self.policy)
    }

    /// H0(T), J/mol.
    pub fn enthalpy_0(&self, species: &Species, t: f64) -> ThermoResult<f64> {
        Ok(self.point(species, t)?.h_rt * R_J_PER_MOL_K * t)
    }

    /// S0(T), J/(mol K).
    pub fn entropy_0(&self, species: &Species, t: f64) -> ThermoResult<f64> {
        Ok(self.point(species, t)?.s_r * R_J_PER_MOL_K)
    }

    /// Cp0(T), J/(mol K).
    pub fn specific_heat_0(&self, species: &Species, t: f64) -> ThermoResult<f64> {
        Ok(self.point(species, t)?.cp_r * R_J_PER_MOL_K)
    }

    /// G0(T) = H0 - T S0, J/mol.
    pub fn gibbs_0(&self, species: &Species, t: f64) -> ThermoResult<f64> {
        Ok(self.point(species, t)?.g_rt() * R_J_PER_MOL_K * t)
    }

    /// Entropy in a mixture, J/(mol K).
    ///
    /// Gases: S0 - R ln(n_j/n) - R ln(P/P0). Condensed species: S0.
    pub fn entropy(
        &self,
        species: &Species,
        ln_mole_fraction: f64,
        t: f64,
        p_bar: f64,
    ) -> ThermoResult<f64> {
        let s0 = self.entropy_0(species, t)?;
        if species.is_gas() {
            Ok(s0 - R_J_PER_MOL_K * (ln_mole_fraction + (p_bar / P_REF_BAR).ln()))
        } else {
            Ok(s0)
        }
    }

    /// Chemical potential in a mixture, J/mol.
    pub fn gibbs(
        &self,
        species: &Species,
        ln_mole_fraction: f64,
        t: f64,
        p_bar: f64,
    ) -> ThermoResult<f64> {
        let g0 = self.gibbs_0(species, t)?;
        if species.is_gas() {
            Ok(g0 + R_J_PER_MOL_K * t * (ln_mole_fraction + (p_bar / P_REF_BAR).ln()))
        } else {
            Ok(g0)
        }
    }
}

/// Heat of formation at 298.15 K, J/mol.
pub fn heat_of_formation(species: &Species) -> f64 {
    species.heat_of_formation
}

/// True when `t` lies inside the fitted range of `species`.
pub fn temperature_check(species: &Species, t: f64) -> bool {
    species.interval_at(t).is_some()
}

/// Nearest fitted range bound to `t` (the phase transition temperature
/// for condensed species stored as separate phases).
pub fn transition_temperature(species: &Species, t: f64) -> Option<f64> {
    let (low, high) = species.range()?;
    if (t - low).abs() <= (t - high).abs() {
        Some(low)
    } else {
        Some(high)
    }
}

/// Mixture heat capacity split into the fixed-composition part and the
/// contribution of composition shifts with temperature.
///
/// Both parts are Cp/R per unit mass of mixture (mol/g when mole numbers
/// are per gram).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MixtureCp {
    pub frozen: f64,
    pub reaction: f64,
}

impl MixtureCp {
    pub fn frozen_only(frozen: f64) -> Self {
        Self {
            frozen,
            reaction: 0.0,
        }
    }

    /// Equilibrium (shifting) Cp/R.
    pub fn total(&self) -> f64 {
        self.frozen + self.reaction
    }
}

/// Frozen mixture Cp/R: sum of n_j Cp_j/R.
pub fn frozen_cp_r<'a>(
    evaluator: &ThermoEvaluator,
    items: impl IntoIterator<Item = (&'a Species, f64)>,
    t: f64,
) -> ThermoResult<f64> {
    items.into_iter().try_fold(0.0, |acc, (species, moles)| {
        Ok(acc + moles * evaluator.point(species, t)?.cp_r)
    })
}

/// Mixture enthalpy H/R (mole numbers times H0/RT times T), i.e. K per
/// unit of the mole basis.
pub fn mixture_enthalpy_r<'a>(
    evaluator: &ThermoEvaluator,
    items: impl IntoIterator<Item = (&'a Species, f64)>,
    t: f64,
) -> ThermoResult<f64> {
    items.into_iter().try_fold(0.0, |acc, (species, moles)| {
        Ok(acc + moles * evaluator.point(species, t)?.h_rt * t)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Formula;
    use crate::species::{Interval, Phase};
    use approx::assert_relative_eq;

    fn o2() -> Species {
        Species {
            name: "O2".into(),
            formula: Formula::parse("O2").unwrap(),
            phase: Phase::Gas,
            molar_mass: 31.9988,
            heat_of_formation: 0.0,
            h298_offset: 8680.0,
            intervals: vec![
                Interval::nasa7(
                    200.0,
                    1000.0,
                    [3.78245636E+00, -2.99673416E-03, 9.84730201E-06, -9.68129509E-09, 3.24372837E-12, -1.06394356E+03, 3.65767573E+00],
                ),
                Interval::nasa7(
                    1000.0,
                    3500.0,
                    [3.28253784E+00, 1.48308754E-03, -7.57966669E-07, 2.09470555E-10, -2.16717794E-14, -1.08845772E+03, 5.45323129E+00],
                ),
            ],
        }
    }

    #[test]
    fn reference_state_values() {
        let ev = ThermoEvaluator::default();
        let o2 = o2();
        assert!(ev.enthalpy_0(&o2, 298.15).unwrap().abs() < 5.0);
        // JANAF: S0(298.15) = 205.15 J/(mol K), Cp0 = 29.38 J/(mol K)
        assert_relative_eq!(ev.entropy_0(&o2, 298.15).unwrap(), 205.15, max_relative = 1e-3);
        assert_relative_eq!(ev.specific_heat_0(&o2, 298.15).unwrap(), 29.38, max_relative = 2e-3);
    }

    #[test]
    fn intervals_join_continuously() {
        let ev = ThermoEvaluator::default();
        let o2 = o2();
        let below = ev.enthalpy_0(&o2, 999.999).unwrap();
        let above = ev.enthalpy_0(&o2, 1000.0).unwrap();
        assert!((below - above).abs() < 5.0);
    }

    #[test]
    fn mixing_terms_apply_to_gases_only() {
        let ev = ThermoEvaluator::default();
        let o2 = o2();
        let t = 1500.0;
        let s0 = ev.entropy_0(&o2, t).unwrap();
        let x: f64 = 0.5;
        let s = ev.entropy(&o2, x.ln(), t, 10.0).unwrap();
        assert_relative_eq!(s, s0 - R_J_PER_MOL_K * (x.ln() + 10.0_f64.ln()), epsilon = 1e-9);

        let mut solid = o2.clone();
        solid.phase = Phase::Condensed;
        assert_relative_eq!(ev.entropy(&solid, x.ln(), t, 10.0).unwrap(), s0);

        let g = ev.gibbs(&o2, 0.0, t, 1.0).unwrap();
        assert_relative_eq!(g, ev.gibbs_0(&o2, t).unwrap());
    }

    #[test]
    fn range_helpers() {
        let o2 = o2();
        assert!(temperature_check(&o2, 3500.0));
        assert!(!temperature_check(&o2, 3600.0));
        assert_eq!(transition_temperature(&o2, 3000.0), Some(3500.0));
        assert_eq!(transition_temperature(&o2, 500.0), Some(200.0));
        assert_eq!(heat_of_formation(&o2), 0.0);
    }

    #[test]
    fn mixture_cp_sums_weighted_terms() {
        let ev = ThermoEvaluator::default();
        let o2 = o2();
        let single = ev.point(&o2, 2000.0).unwrap().cp_r;
        let cp = frozen_cp_r(&ev, [(&o2, 0.25), (&o2, 0.75)], 2000.0).unwrap();
        assert_relative_eq!(cp, single, epsilon = 1e-12);

        let mix = MixtureCp {
            frozen: cp,
            reaction: 0.5,
        };
        assert_relative_eq!(mix.total(), cp + 0.5);
        assert_eq!(MixtureCp::frozen_only(1.0).total(), 1.0);
    }
}
