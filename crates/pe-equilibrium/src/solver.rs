//! Gibbs free-energy minimization.
//!
//! Gordon–McBride formulation in log-mole space, per gram of mixture. Each
//! Newton iteration solves for the element multipliers, condensed mole
//! corrections, Δln n and (HP/SP) Δln T; the gas corrections follow from
//! those.

use crate::composition::Composition;
use crate::equilibrium::{Closure, Equilibrium};
use crate::error::{EquilibriumError, EquilibriumResult};
use crate::iteration::IterationVariables;
use crate::product::Product;
use crate::properties::mixture_state;
use nalgebra::{DMatrix, DVector};
use pe_core::constants::{P_REF_BAR, R_J_PER_MOL_K};
use pe_core::units::{Pressure, Temperature, to_bar, to_k};
use pe_core::ensure_positive;
use pe_thermo::{ExtrapolationPolicy, Species, SpeciesTable, ThermoEvaluator, temperature_check};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Solver tuning. Every field has a default; case files may override any
/// subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Newton iterations per phase pass
    pub max_iterations: usize,
    /// Condensed admission passes after gas convergence
    pub max_phase_passes: usize,
    /// Relative mole-correction tolerance
    pub tolerance: f64,
    /// |Δln T| tolerance
    pub temperature_tolerance: f64,
    /// ln(n_j/n) below which a gas is trace
    pub trace_threshold: f64,
    /// Highest ln(n_j/n) a trace gas may reach in one step
    pub trace_reentry: f64,
    /// Floor on ln(n_j/n)
    pub log_floor: f64,
    /// Numerator of the step bound λ1
    pub step_bound: f64,
    /// K
    pub t_min: f64,
    /// K
    pub t_max: f64,
    /// Starting temperature for HP/SP cold starts, K
    pub initial_temperature: f64,
    /// Starting total gas moles for cold starts, mol/g
    pub initial_moles: f64,
    pub extrapolation: ExtrapolationPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_phase_passes: 10,
            tolerance: 0.5e-5,
            temperature_tolerance: 1e-4,
            trace_threshold: -18.420_681,
            trace_reentry: -9.210_340_4,
            log_floor: -87.0,
            step_bound: 2.0,
            t_min: 160.0,
            t_max: 6000.0,
            initial_temperature: 3800.0,
            initial_moles: 0.1,
            extrapolation: ExtrapolationPolicy::Nearest,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> EquilibriumResult<()> {
        if self.max_iterations == 0 || self.max_phase_passes == 0 {
            return Err(EquilibriumError::invalid("iteration budgets must be positive"));
        }
        ensure_positive(self.tolerance, "tolerance")?;
        ensure_positive(self.temperature_tolerance, "temperature_tolerance")?;
        ensure_positive(self.step_bound, "step_bound")?;
        ensure_positive(self.t_min, "t_min")?;
        ensure_positive(self.initial_moles, "initial_moles")?;
        if self.t_max <= self.t_min {
            return Err(EquilibriumError::invalid("t_max must exceed t_min"));
        }
        if !(self.t_min..=self.t_max).contains(&self.initial_temperature) {
            return Err(EquilibriumError::invalid(
                "initial_temperature must lie within [t_min, t_max]",
            ));
        }
        if self.log_floor >= self.trace_threshold || self.trace_threshold >= self.trace_reentry {
            return Err(EquilibriumError::invalid(
                "expected log_floor < trace_threshold < trace_reentry",
            ));
        }
        Ok(())
    }
}

/// Closure target in solver units (per gram, divided by R).
#[derive(Debug, Clone, Copy)]
enum Target {
    Temperature,
    /// H/R, K mol/g
    Enthalpy(f64),
    /// S/R, mol/g
    Entropy(f64),
}

impl Target {
    fn from_closure(closure: Closure) -> Self {
        match closure {
            Closure::Temperature(_) => Target::Temperature,
            Closure::Enthalpy(h) => Target::Enthalpy(h / 1000.0 / R_J_PER_MOL_K),
            Closure::Entropy(s) => Target::Entropy(s / 1000.0 / R_J_PER_MOL_K),
        }
    }
}

/// Standard-state values of one species list at the current temperature.
#[derive(Debug, Clone, Default)]
struct Standard {
    h_rt: Vec<f64>,
    s_r: Vec<f64>,
    cp_r: Vec<f64>,
}

impl Standard {
    fn sized(n: usize) -> Self {
        Self {
            h_rt: vec![0.0; n],
            s_r: vec![0.0; n],
            cp_r: vec![0.0; n],
        }
    }
}

/// Equilibrium solver bound to a species table.
#[derive(Debug, Clone)]
pub struct EquilibriumSolver<'t> {
    table: &'t SpeciesTable,
    config: SolverConfig,
}

impl<'t> EquilibriumSolver<'t> {
    pub fn new(table: &'t SpeciesTable) -> Self {
        Self {
            table,
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(table: &'t SpeciesTable, config: SolverConfig) -> EquilibriumResult<Self> {
        config.validate()?;
        Ok(Self { table, config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn table(&self) -> &'t SpeciesTable {
        self.table
    }

    pub fn evaluator(&self) -> ThermoEvaluator {
        ThermoEvaluator::new(self.config.extrapolation)
    }

    /// Fixed temperature and pressure.
    pub fn solve_tp(
        &self,
        composition: Arc<Composition>,
        pressure: Pressure,
        temperature: Temperature,
    ) -> EquilibriumResult<Equilibrium> {
        self.solve_new(composition, pressure, Closure::Temperature(temperature))
    }

    /// Fixed enthalpy (J/kg) and pressure.
    pub fn solve_hp(
        &self,
        composition: Arc<Composition>,
        pressure: Pressure,
        enthalpy_j_per_kg: f64,
    ) -> EquilibriumResult<Equilibrium> {
        self.solve_new(composition, pressure, Closure::Enthalpy(enthalpy_j_per_kg))
    }

    /// Fixed entropy (J/(kg K)) and pressure.
    pub fn solve_sp(
        &self,
        composition: Arc<Composition>,
        pressure: Pressure,
        entropy_j_per_kg_k: f64,
    ) -> EquilibriumResult<Equilibrium> {
        self.solve_new(composition, pressure, Closure::Entropy(entropy_j_per_kg_k))
    }

    fn solve_new(
        &self,
        composition: Arc<Composition>,
        pressure: Pressure,
        closure: Closure,
    ) -> EquilibriumResult<Equilibrium> {
        let mut eq = Equilibrium::new(composition, self.table)?;
        self.solve(&mut eq, pressure, closure, false)?;
        Ok(eq)
    }

    /// New equilibrium at (pressure, closure) warm-started from `previous`.
    pub fn solve_from(
        &self,
        previous: &Equilibrium,
        pressure: Pressure,
        closure: Closure,
    ) -> EquilibriumResult<Equilibrium> {
        let mut eq = previous.clone();
        self.solve(&mut eq, pressure, closure, true)?;
        Ok(eq)
    }

    /// Solve in place. With `warm_start` the current estimate (and, for
    /// HP/SP, temperature) seeds the iteration; otherwise the even
    /// initial distribution is used. On failure the status is `Pending`.
    pub fn solve(
        &self,
        eq: &mut Equilibrium,
        pressure: Pressure,
        closure: Closure,
        warm_start: bool,
    ) -> EquilibriumResult<()> {
        eq.invalidate();
        let p_bar = ensure_positive(to_bar(pressure), "pressure")?;
        let target = Target::from_closure(closure);

        let mut t = match closure {
            Closure::Temperature(t) => ensure_positive(to_k(t), "temperature")?,
            _ if warm_start && eq.temperature_k > 0.0 => eq.temperature_k,
            _ => self.config.initial_temperature,
        };
        if let Target::Enthalpy(v) | Target::Entropy(v) = target {
            if !v.is_finite() {
                return Err(EquilibriumError::invalid("closure value must be finite"));
            }
        }
        if warm_start && eq.itn.n > 0.0 {
            eq.itn.clear_deltas();
        } else {
            eq.itn.reset(self.config.initial_moles);
        }

        let b0 = eq.element_targets().to_vec();
        let mut extrapolated = false;
        let iterations = self.iterate(
            &eq.product,
            &b0,
            &mut eq.itn,
            p_bar,
            target,
            &mut t,
            &mut extrapolated,
        )?;

        if extrapolated {
            warn!(
                closure = closure.label(),
                temperature = t,
                "species fit evaluated outside its temperature range"
            );
        }
        debug!(
            closure = closure.label(),
            pressure_bar = p_bar,
            temperature = t,
            iterations,
            condensed = eq.itn.active_condensed().len(),
            "equilibrium converged"
        );

        eq.pressure_bar = p_bar;
        eq.temperature_k = t;
        eq.extrapolated = extrapolated;
        eq.trace_threshold = self.config.trace_threshold;
        eq.extrapolation = self.config.extrapolation;
        eq.mark_converged(Some(closure), false);
        Ok(())
    }

    /// Fixed composition taken from `previous`, re-solved for the
    /// temperature where the mixture entropy equals `entropy_j_per_kg_k`
    /// at `pressure` (frozen expansion).
    pub fn solve_frozen(
        &self,
        previous: &Equilibrium,
        pressure: Pressure,
        entropy_j_per_kg_k: f64,
    ) -> EquilibriumResult<Equilibrium> {
        previous.ensure_converged()?;
        let p_bar = ensure_positive(to_bar(pressure), "pressure")?;
        let s_target = entropy_j_per_kg_k / 1000.0 / R_J_PER_MOL_K;
        let evaluator = self.evaluator();

        let mut eq = previous.clone();
        eq.invalidate();
        eq.pressure_bar = p_bar;
        let mut t = previous.temperature_k;

        for iteration in 1..=self.config.max_iterations {
            let state = mixture_state(&eq, self.table, &evaluator, t)?;
            let d_ln_t = ((s_target - state.s_r) / state.cp_frozen_r).clamp(-0.5, 0.5);
            t = (t * d_ln_t.exp()).clamp(self.config.t_min, self.config.t_max);
            trace!(iteration, temperature = t, d_ln_t, "frozen temperature step");
            if d_ln_t.abs() < 1e-7 {
                eq.temperature_k = t;
                eq.itn.iterations = iteration;
                eq.mark_converged(None, true);
                debug!(pressure_bar = p_bar, temperature = t, iteration, "frozen state solved");
                return Ok(eq);
            }
        }
        Err(EquilibriumError::DidNotConverge {
            iterations: self.config.max_iterations,
            what: format!("frozen temperature at {p_bar:.4} bar"),
        })
    }

    fn species_list(&self, ids: &[pe_core::SpeciesId]) -> EquilibriumResult<Vec<&'t Species>> {
        ids.iter()
            .map(|id| self.table.species(*id).map_err(EquilibriumError::from))
            .collect()
    }

    fn evaluate_into(
        &self,
        species: &[&Species],
        t: f64,
        out: &mut Standard,
        extrapolated: &mut bool,
    ) -> EquilibriumResult<()> {
        for (j, sp) in species.iter().enumerate() {
            let point = sp.evaluate(t, self.config.extrapolation)?;
            out.h_rt[j] = point.h_rt;
            out.s_r[j] = point.s_r;
            out.cp_r[j] = point.cp_r;
            *extrapolated |= point.extrapolated;
        }
        Ok(())
    }

    /// Inactive condensed species valid at `t` with the most negative
    /// μ0/RT - Σ a_ij π_i.
    fn most_favourable_condensed(
        &self,
        product: &Product,
        condensed: &[&Species],
        itn: &IterationVariables,
        t: f64,
    ) -> EquilibriumResult<Option<usize>> {
        let mut best: Option<(usize, f64)> = None;
        for (c, sp) in condensed.iter().enumerate() {
            if itn.active[c] || !temperature_check(sp, t) {
                continue;
            }
            let point = sp.evaluate(t, ExtrapolationPolicy::Forbid)?;
            let delta = point.h_rt
                - point.s_r
                - (0..product.n_elements())
                    .map(|i| product.a_condensed(i, c) * itn.pi[i])
                    .sum::<f64>();
            if delta < 0.0 && best.is_none_or(|(_, d)| delta < d) {
                best = Some((c, delta));
            }
        }
        Ok(best.map(|(c, _)| c))
    }

    #[allow(clippy::too_many_arguments)]
    fn iterate(
        &self,
        product: &Product,
        b0: &[f64],
        itn: &mut IterationVariables,
        p_bar: f64,
        target: Target,
        t: &mut f64,
        extrapolated: &mut bool,
    ) -> EquilibriumResult<usize> {
        let cfg = &self.config;
        let gas = self.species_list(product.gas())?;
        let condensed = self.species_list(product.condensed())?;
        let ne = product.n_elements();
        let ng = gas.len();
        let ln_p = (p_bar / P_REF_BAR).ln();
        let solves_t = !matches!(target, Target::Temperature);

        let mut g = Standard::sized(ng);
        let mut cd = Standard::sized(condensed.len());
        let mut nj = vec![0.0; ng];
        let mut mu = vec![0.0; ng];
        let mut trace_mask = vec![false; ng];
        let mut total = 0;
        let mut passes = 0;

        loop {
            let mut converged = false;
            for it in 0..cfg.max_iterations {
                total += 1;
                let n = itn.ln_n.exp();
                itn.n = n;
                self.evaluate_into(&gas, *t, &mut g, extrapolated)?;
                self.evaluate_into(&condensed, *t, &mut cd, extrapolated)?;
                for j in 0..ng {
                    nj[j] = itn.ln_nj[j].exp();
                    trace_mask[j] = itn.ln_mole_fraction(j) < cfg.trace_threshold;
                    mu[j] = g.h_rt[j] - g.s_r[j] + itn.ln_mole_fraction(j) + ln_p;
                }
                let active = itn.active_condensed();
                let ga: Vec<usize> = (0..ng).filter(|j| !trace_mask[*j]).collect();
                let sum_n: f64 = ga.iter().map(|&j| nj[j]).sum();

                let i_n = ne + active.len();
                let i_t = i_n + 1;
                let size = i_n + 1 + usize::from(solves_t);
                let mut a = DMatrix::<f64>::zeros(size, size);
                let mut r = DVector::<f64>::zeros(size);

                for i in 0..ne {
                    for kk in 0..ne {
                        a[(i, kk)] = ga
                            .iter()
                            .map(|&j| product.a_gas(kk, j) * product.a_gas(i, j) * nj[j])
                            .sum();
                    }
                    for (pos, &c) in active.iter().enumerate() {
                        a[(i, ne + pos)] = product.a_condensed(i, c);
                    }
                    a[(i, i_n)] = ga.iter().map(|&j| product.a_gas(i, j) * nj[j]).sum();
                    if solves_t {
                        a[(i, i_t)] = ga
                            .iter()
                            .map(|&j| product.a_gas(i, j) * nj[j] * g.h_rt[j])
                            .sum();
                    }
                    let b_now: f64 = a[(i, i_n)]
                        + active
                            .iter()
                            .map(|&c| product.a_condensed(i, c) * itn.n_condensed[c])
                            .sum::<f64>();
                    r[i] = b0[i] - b_now
                        + ga
                            .iter()
                            .map(|&j| product.a_gas(i, j) * nj[j] * mu[j])
                            .sum::<f64>();
                }

                for (pos, &c) in active.iter().enumerate() {
                    let row = ne + pos;
                    for i in 0..ne {
                        a[(row, i)] = product.a_condensed(i, c);
                    }
                    if solves_t {
                        a[(row, i_t)] = cd.h_rt[c];
                    }
                    r[row] = cd.h_rt[c] - cd.s_r[c];
                }

                let nh: f64 = ga.iter().map(|&j| nj[j] * g.h_rt[j]).sum();
                for i in 0..ne {
                    a[(i_n, i)] = a[(i, i_n)];
                }
                a[(i_n, i_n)] = sum_n - n;
                if solves_t {
                    a[(i_n, i_t)] = nh;
                }
                r[i_n] = n - sum_n + ga.iter().map(|&j| nj[j] * mu[j]).sum::<f64>();

                let cp_sum: f64 = ga.iter().map(|&j| nj[j] * g.cp_r[j]).sum::<f64>()
                    + active
                        .iter()
                        .map(|&c| itn.n_condensed[c] * cd.cp_r[c])
                        .sum::<f64>();
                match target {
                    Target::Temperature => {}
                    Target::Enthalpy(h_r) => {
                        for i in 0..ne {
                            a[(i_t, i)] = a[(i, i_t)];
                        }
                        for (pos, &c) in active.iter().enumerate() {
                            a[(i_t, ne + pos)] = cd.h_rt[c];
                        }
                        a[(i_t, i_n)] = nh;
                        a[(i_t, i_t)] =
                            cp_sum + ga.iter().map(|&j| nj[j] * g.h_rt[j].powi(2)).sum::<f64>();
                        let h_now = nh
                            + active
                                .iter()
                                .map(|&c| itn.n_condensed[c] * cd.h_rt[c])
                                .sum::<f64>();
                        r[i_t] = h_r / *t - h_now
                            + ga.iter().map(|&j| nj[j] * g.h_rt[j] * mu[j]).sum::<f64>();
                    }
                    Target::Entropy(s_r) => {
                        let sj: Vec<f64> = (0..ng)
                            .map(|j| g.s_r[j] - itn.ln_mole_fraction(j) - ln_p)
                            .collect();
                        for i in 0..ne {
                            a[(i_t, i)] = ga
                                .iter()
                                .map(|&j| product.a_gas(i, j) * nj[j] * sj[j])
                                .sum();
                        }
                        for (pos, &c) in active.iter().enumerate() {
                            a[(i_t, ne + pos)] = cd.s_r[c];
                        }
                        let ns: f64 = ga.iter().map(|&j| nj[j] * sj[j]).sum();
                        a[(i_t, i_n)] = ns;
                        a[(i_t, i_t)] = cp_sum
                            + ga.iter().map(|&j| nj[j] * g.h_rt[j] * sj[j]).sum::<f64>();
                        let s_now = ns
                            + active
                                .iter()
                                .map(|&c| itn.n_condensed[c] * cd.s_r[c])
                                .sum::<f64>();
                        r[i_t] = s_r - s_now + n - sum_n
                            + ga.iter().map(|&j| nj[j] * sj[j] * mu[j]).sum::<f64>();
                    }
                }

                let x = a
                    .lu()
                    .solve(&r)
                    .filter(|x| x.iter().all(|v| v.is_finite()))
                    .ok_or(EquilibriumError::Singular { iteration: total })?;

                let pi = &x.as_slice()[..ne];
                let d_ln_n = x[i_n];
                let d_ln_t = if solves_t { x[i_t] } else { 0.0 };
                for j in 0..ng {
                    itn.delta_ln_nj[j] = (0..ne).map(|i| product.a_gas(i, j) * pi[i]).sum::<f64>()
                        + d_ln_n
                        + g.h_rt[j] * d_ln_t
                        - mu[j];
                }
                for (pos, &c) in active.iter().enumerate() {
                    itn.delta_n_condensed[c] = x[ne + pos];
                }
                itn.delta_ln_n = d_ln_n;
                itn.delta_ln_t = d_ln_t;
                itn.sum_n = sum_n;
                itn.pi.copy_from_slice(pi);

                // step control
                let mut largest = 5.0 * d_ln_t.abs().max(d_ln_n.abs());
                for j in 0..ng {
                    if !trace_mask[j] && itn.delta_ln_nj[j] > 0.0 {
                        largest = largest.max(itn.delta_ln_nj[j]);
                    }
                }
                let lambda1 = if largest > 0.0 {
                    cfg.step_bound / largest
                } else {
                    1.0
                };
                let mut lambda2: f64 = 1.0;
                for j in 0..ng {
                    let d = itn.delta_ln_nj[j];
                    if trace_mask[j] && d >= 0.0 {
                        let den = d - d_ln_n;
                        if den > 0.0 {
                            lambda2 = lambda2.min(
                                ((cfg.trace_reentry - itn.ln_mole_fraction(j)) / den).abs(),
                            );
                        }
                    }
                }
                let lambda = lambda1.min(lambda2).min(1.0);

                for j in 0..ng {
                    itn.ln_nj[j] += lambda * itn.delta_ln_nj[j];
                }
                for &c in &active {
                    itn.n_condensed[c] += lambda * itn.delta_n_condensed[c];
                }
                itn.ln_n += lambda * d_ln_n;
                *t = (*t * (lambda * d_ln_t).exp()).clamp(cfg.t_min, cfg.t_max);
                for j in 0..ng {
                    if itn.ln_mole_fraction(j) < cfg.log_floor {
                        itn.ln_nj[j] = itn.ln_n + cfg.log_floor;
                    }
                }

                let mut removed = false;
                for &c in &active {
                    if itn.n_condensed[c] <= 0.0 || !temperature_check(condensed[c], *t) {
                        itn.active[c] = false;
                        itn.n_condensed[c] = 0.0;
                        removed = true;
                        trace!(species = %condensed[c].name, "condensed species removed");
                    }
                }

                trace!(
                    iteration = total,
                    lambda,
                    d_ln_t,
                    temperature = *t,
                    condensed = active.len(),
                    "newton step"
                );

                let sum_all: f64 = ga.iter().map(|&j| itn.ln_nj[j].exp()).sum::<f64>()
                    + active.iter().map(|&c| itn.n_condensed[c]).sum::<f64>();
                let tol = cfg.tolerance * sum_all;
                let ok = ga
                    .iter()
                    .all(|&j| nj[j] * itn.delta_ln_nj[j].abs() <= tol)
                    && active
                        .iter()
                        .all(|&c| itn.delta_n_condensed[c].abs() <= tol)
                    && n * d_ln_n.abs() <= tol
                    && d_ln_t.abs() <= cfg.temperature_tolerance;
                if ok && !removed {
                    itn.n = itn.ln_n.exp();
                    converged = true;
                    break;
                }

                if !removed && it >= 2 {
                    if let Some(c) =
                        self.most_favourable_condensed(product, &condensed, itn, *t)?
                    {
                        trace!(species = %condensed[c].name, "condensed species admitted");
                        itn.active[c] = true;
                        itn.n_condensed[c] = 0.0;
                    }
                }
            }

            if !converged {
                itn.iterations = total;
                return Err(EquilibriumError::DidNotConverge {
                    iterations: total,
                    what: format!("pass {} at {:.1} K, {:.4} bar", passes + 1, *t, p_bar),
                });
            }

            passes += 1;
            match self.most_favourable_condensed(product, &condensed, itn, *t)? {
                Some(c) if passes < cfg.max_phase_passes => {
                    trace!(species = %condensed[c].name, pass = passes, "condensed species admitted after convergence");
                    itn.active[c] = true;
                    itn.n_condensed[c] = 0.0;
                }
                Some(c) => {
                    warn!(
                        species = %condensed[c].name,
                        passes,
                        "condensed phase passes exhausted with a favourable species left out"
                    );
                    break;
                }
                None => break,
            }
        }
        itn.iterations = total;
        Ok(total)
    }
}
