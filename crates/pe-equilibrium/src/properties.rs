//! Thermodynamic and performance properties derived from a converged state.

use crate::equilibrium::Equilibrium;
use crate::error::{EquilibriumError, EquilibriumResult};
use nalgebra::{DMatrix, DVector};
use pe_core::constants::{G0_MPS2, P_REF_BAR, R_J_PER_MOL_K};
use pe_core::units::{Density, Pressure, Temperature, Velocity, bar, k, kgpm3, mps, to_mps};
use pe_thermo::{MixtureCp, Species, SpeciesTable, ThermoEvaluator, frozen_cp_r, mixture_enthalpy_r};

/// Specific enthalpy [J/kg]
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)]
pub type SpecEntropy = f64;

/// Specific heat capacity [J/(kg·K)]
pub type SpecHeatCapacity = f64;

/// Heat capacity basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpKind {
    /// Composition held fixed.
    Frozen,
    /// Composition shifts with T and P.
    Equilibrium,
}

/// Thermodynamic state of one equilibrium, per kg of mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumProperties {
    pub kind: CpKind,
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub enthalpy: SpecEnthalpy,
    pub internal_energy: SpecEnthalpy,
    pub gibbs: SpecEnthalpy,
    pub entropy: SpecEntropy,
    /// g/mol
    pub molar_mass: f64,
    pub cp: SpecHeatCapacity,
    pub cv: SpecHeatCapacity,
    /// Cp/R per gram, split into frozen and reaction parts
    pub cp_split: MixtureCp,
    /// Cp/Cv
    pub gamma: f64,
    /// γs = -γ / (∂lnV/∂lnP)_T
    pub isentropic_exponent: f64,
    pub sound_speed: Velocity,
    /// (∂lnV/∂lnP)_T
    pub dlnv_dlnp: f64,
    /// (∂lnV/∂lnT)_P
    pub dlnv_dlnt: f64,
    /// Gas-phase density; condensed volume neglected
    pub density: Density,
}

/// Rocket performance at one exit station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceProperties {
    /// Ae/At
    pub area_ratio: f64,
    /// Ae/ṁ, m²·s/kg
    pub area_per_mass_flow: f64,
    pub cstar: Velocity,
    pub cf: f64,
    /// Effective exhaust velocity
    pub isp: Velocity,
    pub ivac: Velocity,
    pub mach: f64,
}

impl Default for PerformanceProperties {
    fn default() -> Self {
        Self {
            area_ratio: 0.0,
            area_per_mass_flow: 0.0,
            cstar: mps(0.0),
            cf: 0.0,
            isp: mps(0.0),
            ivac: mps(0.0),
            mach: 0.0,
        }
    }
}

impl PerformanceProperties {
    /// Specific impulse in seconds (Isp / g0).
    pub fn isp_seconds(&self) -> f64 {
        to_mps(self.isp) / G0_MPS2
    }

    pub fn ivac_seconds(&self) -> f64 {
        to_mps(self.ivac) / G0_MPS2
    }
}

/// Fixed-composition mixture sums per gram, divided by R.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MixtureState {
    /// K mol/g
    pub h_r: f64,
    /// mol/g
    pub s_r: f64,
    /// mol/g
    pub cp_frozen_r: f64,
}

fn species_of<'t>(
    table: &'t SpeciesTable,
    ids: &[pe_core::SpeciesId],
) -> EquilibriumResult<Vec<&'t Species>> {
    ids.iter()
        .map(|id| table.species(*id).map_err(EquilibriumError::from))
        .collect()
}

/// Mixture enthalpy, entropy and frozen Cp of the current composition at
/// `t` and the equilibrium's pressure.
pub(crate) fn mixture_state(
    eq: &Equilibrium,
    table: &SpeciesTable,
    evaluator: &ThermoEvaluator,
    t: f64,
) -> EquilibriumResult<MixtureState> {
    let itn = &eq.itn;
    let gas = species_of(table, eq.product.gas())?;
    let condensed = species_of(table, eq.product.condensed())?;
    let ln_p = (eq.pressure_bar / P_REF_BAR).ln();

    let moles = || {
        gas.iter()
            .enumerate()
            .map(|(j, sp)| (*sp, itn.gas_moles(j)))
            .chain(
                condensed
                    .iter()
                    .enumerate()
                    .filter(|(c, _)| itn.active[*c])
                    .map(|(c, sp)| (*sp, itn.n_condensed[c])),
            )
    };
    let h_r = mixture_enthalpy_r(evaluator, moles(), t)?;
    let cp_frozen_r = frozen_cp_r(evaluator, moles(), t)?;

    let mut s_r = 0.0;
    for (j, sp) in gas.iter().enumerate() {
        let s0 = evaluator.point(sp, t)?.s_r;
        s_r += itn.gas_moles(j) * (s0 - itn.ln_mole_fraction(j) - ln_p);
    }
    for (c, sp) in condensed.iter().enumerate() {
        if itn.active[c] {
            s_r += itn.n_condensed[c] * evaluator.point(sp, t)?.s_r;
        }
    }
    Ok(MixtureState {
        h_r,
        s_r,
        cp_frozen_r,
    })
}

/// Solve the temperature- and pressure-derivative systems.
///
/// Returns ((∂lnV/∂lnT)_P, (∂lnV/∂lnP)_T, reaction Cp/R).
fn derivatives(
    eq: &Equilibrium,
    gas: &[&Species],
    condensed: &[&Species],
    evaluator: &ThermoEvaluator,
) -> EquilibriumResult<(f64, f64, f64)> {
    let product = &eq.product;
    let itn = &eq.itn;
    let t = eq.temperature_k;
    let ne = product.n_elements();

    let ga: Vec<usize> = (0..gas.len())
        .filter(|j| itn.ln_mole_fraction(*j) >= eq.trace_threshold)
        .collect();
    let active = itn.active_condensed();
    let nj: Vec<f64> = (0..gas.len()).map(|j| itn.gas_moles(j)).collect();
    let h_gas = gas
        .iter()
        .map(|sp| evaluator.point(sp, t).map(|p| p.h_rt))
        .collect::<Result<Vec<f64>, _>>()?;
    let h_cond = condensed
        .iter()
        .map(|sp| evaluator.point(sp, t).map(|p| p.h_rt))
        .collect::<Result<Vec<f64>, _>>()?;

    let size = ne + active.len() + 1;
    let last = size - 1;
    let mut a = DMatrix::<f64>::zeros(size, size);
    let mut rt = DVector::<f64>::zeros(size);
    let mut rp = DVector::<f64>::zeros(size);

    for i in 0..ne {
        for kk in 0..ne {
            a[(i, kk)] = ga
                .iter()
                .map(|&j| product.a_gas(kk, j) * product.a_gas(i, j) * nj[j])
                .sum();
        }
        for (pos, &c) in active.iter().enumerate() {
            a[(i, ne + pos)] = product.a_condensed(i, c);
            a[(ne + pos, i)] = product.a_condensed(i, c);
        }
        let an: f64 = ga.iter().map(|&j| product.a_gas(i, j) * nj[j]).sum();
        a[(i, last)] = an;
        a[(last, i)] = an;
        rt[i] = -ga
            .iter()
            .map(|&j| product.a_gas(i, j) * nj[j] * h_gas[j])
            .sum::<f64>();
        rp[i] = an;
    }
    for (pos, &c) in active.iter().enumerate() {
        rt[ne + pos] = -h_cond[c];
    }
    let nh: f64 = ga.iter().map(|&j| nj[j] * h_gas[j]).sum();
    rt[last] = -nh;
    rp[last] = ga.iter().map(|&j| nj[j]).sum();

    let lu = a.lu();
    let singular = EquilibriumError::Singular {
        iteration: itn.iterations,
    };
    let xt = lu.solve(&rt).ok_or_else(|| singular.clone())?;
    let xp = lu.solve(&rp).ok_or(singular)?;

    let dlnv_dlnt = 1.0 + xt[last];
    let dlnv_dlnp = -1.0 + xp[last];
    let mut reaction = nh * xt[last] + ga.iter().map(|&j| nj[j] * h_gas[j].powi(2)).sum::<f64>();
    for i in 0..ne {
        reaction += ga
            .iter()
            .map(|&j| product.a_gas(i, j) * nj[j] * h_gas[j])
            .sum::<f64>()
            * xt[i];
    }
    for (pos, &c) in active.iter().enumerate() {
        reaction += h_cond[c] * xt[ne + pos];
    }
    Ok((dlnv_dlnt, dlnv_dlnp, reaction))
}

/// Properties of a converged equilibrium.
pub(crate) fn derive(
    eq: &Equilibrium,
    table: &SpeciesTable,
    kind: CpKind,
) -> EquilibriumResult<EquilibriumProperties> {
    eq.ensure_converged()?;
    let evaluator = ThermoEvaluator::new(eq.extrapolation);
    let t = eq.temperature_k;
    let p_bar = eq.pressure_bar;
    let n = eq.itn.ln_n.exp();
    let state = mixture_state(eq, table, &evaluator, t)?;

    let (dlnv_dlnt, dlnv_dlnp, cp_split) = match kind {
        CpKind::Frozen => (1.0, -1.0, MixtureCp::frozen_only(state.cp_frozen_r)),
        CpKind::Equilibrium => {
            let gas = species_of(table, eq.product.gas())?;
            let condensed = species_of(table, eq.product.condensed())?;
            let (dvt, dvp, reaction) = derivatives(eq, &gas, &condensed, &evaluator)?;
            (
                dvt,
                dvp,
                MixtureCp {
                    frozen: state.cp_frozen_r,
                    reaction,
                },
            )
        }
    };

    let cp_r = cp_split.total();
    let cv_r = cp_r + n * dlnv_dlnt.powi(2) / dlnv_dlnp;
    let gamma = cp_r / cv_r;
    let isentropic_exponent = -gamma / dlnv_dlnp;
    // per kg: mol/g * 1000
    let r_mass = n * R_J_PER_MOL_K * 1000.0;
    let density = p_bar * 1e5 / (r_mass * t);
    let enthalpy = state.h_r * R_J_PER_MOL_K * 1000.0;
    let entropy = state.s_r * R_J_PER_MOL_K * 1000.0;

    Ok(EquilibriumProperties {
        kind,
        pressure: bar(p_bar),
        temperature: k(t),
        enthalpy,
        internal_energy: enthalpy - p_bar * 1e5 / density,
        gibbs: enthalpy - t * entropy,
        entropy,
        molar_mass: 1.0 / n,
        cp: cp_r * R_J_PER_MOL_K * 1000.0,
        cv: cv_r * R_J_PER_MOL_K * 1000.0,
        cp_split,
        gamma,
        isentropic_exponent,
        sound_speed: mps((r_mass * t * isentropic_exponent).sqrt()),
        dlnv_dlnp,
        dlnv_dlnt,
        density: kgpm3(density),
    })
}
