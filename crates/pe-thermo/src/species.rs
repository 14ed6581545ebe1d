//! Species definitions and Cp0/R interval fits.

use crate::element::Formula;
use crate::error::{ThermoError, ThermoResult};
use pe_core::constants::T_REF_K;

/// Phase of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Gas,
    Condensed,
}

/// What to do when a temperature falls outside every fitted interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationPolicy {
    /// Fail with `OutOfRange`.
    Forbid,
    /// Evaluate the nearest interval and flag the point as extrapolated.
    #[default]
    Nearest,
}

/// One term `coefficient * T^exponent` of a Cp0/R polynomial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyTerm {
    pub exponent: f64,
    pub coefficient: f64,
}

/// Cp0/R fit valid over `[t_low, t_high)`.
///
/// H0/RT and S0/R follow by integration; `b1` and `b2` are the enthalpy
/// and entropy integration constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub t_low: f64,
    pub t_high: f64,
    pub terms: Vec<PolyTerm>,
    pub b1: f64,
    pub b2: f64,
}

impl Interval {
    /// NASA 7-term fit: a1..a5 on exponents 0..4, a6 = b1, a7 = b2.
    pub fn nasa7(t_low: f64, t_high: f64, a: [f64; 7]) -> Self {
        let terms = (0..5)
            .map(|i| PolyTerm {
                exponent: i as f64,
                coefficient: a[i],
            })
            .collect();
        Self {
            t_low,
            t_high,
            terms,
            b1: a[5],
            b2: a[6],
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_low && t < self.t_high
    }

    /// (Cp0/R, H0/RT, S0/R) at `t`.
    pub fn evaluate(&self, t: f64) -> (f64, f64, f64) {
        let ln_t = t.ln();
        let mut cp = 0.0;
        let mut h = self.b1 / t;
        let mut s = self.b2;
        for term in &self.terms {
            let a = term.coefficient;
            let e = term.exponent;
            let te = pow(t, e);
            cp += a * te;
            if e == -1.0 {
                h += a * ln_t / t;
            } else {
                h += a * te / (e + 1.0);
            }
            if e == 0.0 {
                s += a * ln_t;
            } else {
                s += a * te / e;
            }
        }
        (cp, h, s)
    }
}

#[inline]
fn pow(t: f64, e: f64) -> f64 {
    if e.fract() == 0.0 {
        t.powi(e as i32)
    } else {
        t.powf(e)
    }
}

/// Dimensionless standard-state properties of one species at one temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoPoint {
    pub cp_r: f64,
    pub h_rt: f64,
    pub s_r: f64,
    /// Evaluated outside the fitted range under `ExtrapolationPolicy::Nearest`.
    pub extrapolated: bool,
}

impl ThermoPoint {
    /// G0/RT = H0/RT - S0/R.
    pub fn g_rt(&self) -> f64 {
        self.h_rt - self.s_r
    }
}

/// A chemical species as stored in the species table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub formula: Formula,
    pub phase: Phase,
    /// g/mol
    pub molar_mass: f64,
    /// Heat of formation at 298.15 K, J/mol (assigned enthalpy for
    /// reactant-only entries).
    pub heat_of_formation: f64,
    /// H(298.15) - H(0), J/mol. Zero when unknown.
    pub h298_offset: f64,
    /// Sorted, non-overlapping fits. Empty for reactant-only entries.
    pub intervals: Vec<Interval>,
}

impl Species {
    /// Usable as a combustion product (has at least one fit).
    pub fn has_fit(&self) -> bool {
        !self.intervals.is_empty()
    }

    pub fn is_gas(&self) -> bool {
        self.phase == Phase::Gas
    }

    /// Fitted temperature range `(low, high)`.
    pub fn range(&self) -> Option<(f64, f64)> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some((first.t_low, last.t_high))
    }

    /// Interval containing `t`; the top bound of the last interval is inclusive.
    pub fn interval_at(&self, t: f64) -> Option<&Interval> {
        self.intervals.iter().find(|iv| iv.contains(t)).or_else(|| {
            self.intervals
                .last()
                .filter(|last| t == last.t_high)
        })
    }

    /// Standard-state (Cp0/R, H0/RT, S0/R) at `t`.
    pub fn evaluate(&self, t: f64, policy: ExtrapolationPolicy) -> ThermoResult<ThermoPoint> {
        if !t.is_finite() || t <= 0.0 {
            return Err(ThermoError::InvalidArg {
                what: "temperature must be finite and positive",
            });
        }
        let (low, high) = self.range().ok_or_else(|| ThermoError::NoFit {
            species: self.name.clone(),
        })?;

        let (interval, extrapolated) = match self.interval_at(t) {
            Some(iv) => (iv, false),
            None => match policy {
                ExtrapolationPolicy::Forbid => {
                    return Err(ThermoError::OutOfRange {
                        species: self.name.clone(),
                        temperature: t,
                        low,
                        high,
                    });
                }
                ExtrapolationPolicy::Nearest => {
                    let nearest = if t < low {
                        self.intervals.first()
                    } else if t >= high {
                        self.intervals.last()
                    } else {
                        // inside a gap between intervals
                        self.intervals.iter().find(|iv| iv.t_low > t)
                    };
                    match nearest {
                        Some(iv) => (iv, true),
                        None => {
                            return Err(ThermoError::NoFit {
                                species: self.name.clone(),
                            });
                        }
                    }
                }
            },
        };

        let (cp_r, h_rt, s_r) = interval.evaluate(t);
        Ok(ThermoPoint {
            cp_r,
            h_rt,
            s_r,
            extrapolated,
        })
    }

    /// Check ordering and positivity of the interval list.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.molar_mass <= 0.0 || !self.molar_mass.is_finite() {
            return Err(format!("{}: molar mass must be positive", self.name));
        }
        if self.formula.is_empty() {
            return Err(format!("{}: empty formula", self.name));
        }
        let mut prev_high = f64::NEG_INFINITY;
        for iv in &self.intervals {
            if !(iv.t_low > 0.0 && iv.t_high > iv.t_low) {
                return Err(format!(
                    "{}: invalid interval [{}, {}]",
                    self.name, iv.t_low, iv.t_high
                ));
            }
            if iv.t_low < prev_high - 1e-6 {
                return Err(format!("{}: overlapping or unsorted intervals", self.name));
            }
            if iv.terms.is_empty() || iv.terms.len() > 8 {
                return Err(format!("{}: expected 1..=8 Cp terms", self.name));
            }
            prev_high = iv.t_high;
        }
        Ok(())
    }

    /// H0(298.15) from the fit, J/mol, when the fit covers the reference temperature.
    pub(crate) fn fitted_heat_of_formation(&self) -> Option<f64> {
        let iv = self.interval_at(T_REF_K)?;
        let (_, h_rt, _) = iv.evaluate(T_REF_K);
        Some(h_rt * pe_core::constants::R_J_PER_MOL_K * T_REF_K)
    }
}
