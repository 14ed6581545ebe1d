//! Newton working vectors.

/// Working state of one equilibrium solve, per gram of mixture.
///
/// Sized once to the product's candidate set. Gas species carry ln n_j,
/// condensed species carry n_j directly.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationVariables {
    /// Total gas moles, mol/g
    pub n: f64,
    pub ln_n: f64,
    /// Sum of non-trace gas moles at the last iteration
    pub sum_n: f64,
    pub delta_ln_n: f64,
    pub delta_ln_t: f64,
    pub ln_nj: Vec<f64>,
    pub delta_ln_nj: Vec<f64>,
    pub n_condensed: Vec<f64>,
    pub delta_n_condensed: Vec<f64>,
    pub active: Vec<bool>,
    /// Element multipliers (dimensionless, per RT)
    pub pi: Vec<f64>,
    /// Newton iterations spent in the last solve
    pub iterations: usize,
}

impl IterationVariables {
    pub fn with_capacity(n_elements: usize, n_gas: usize, n_condensed: usize) -> Self {
        let mut itn = Self {
            n: 0.0,
            ln_n: 0.0,
            sum_n: 0.0,
            delta_ln_n: 0.0,
            delta_ln_t: 0.0,
            ln_nj: vec![0.0; n_gas],
            delta_ln_nj: vec![0.0; n_gas],
            n_condensed: vec![0.0; n_condensed],
            delta_n_condensed: vec![0.0; n_condensed],
            active: vec![false; n_condensed],
            pi: vec![0.0; n_elements],
            iterations: 0,
        };
        itn.reset(0.1);
        itn
    }

    /// Initial estimate: `total` mol/g spread evenly over the gases, no condensed phase.
    pub fn reset(&mut self, total: f64) {
        let n_gas = self.ln_nj.len().max(1) as f64;
        self.n = total;
        self.ln_n = total.ln();
        self.sum_n = total;
        self.delta_ln_n = 0.0;
        self.delta_ln_t = 0.0;
        self.ln_nj.fill((total / n_gas).ln());
        self.delta_ln_nj.fill(0.0);
        self.n_condensed.fill(0.0);
        self.delta_n_condensed.fill(0.0);
        self.active.fill(false);
        self.pi.fill(0.0);
        self.iterations = 0;
    }

    /// Clear the per-iteration corrections, keeping the estimate.
    pub fn clear_deltas(&mut self) {
        self.delta_ln_n = 0.0;
        self.delta_ln_t = 0.0;
        self.delta_ln_nj.fill(0.0);
        self.delta_n_condensed.fill(0.0);
        self.iterations = 0;
    }

    #[inline]
    pub fn gas_moles(&self, j: usize) -> f64 {
        self.ln_nj[j].exp()
    }

    /// ln(n_j / n)
    #[inline]
    pub fn ln_mole_fraction(&self, j: usize) -> f64 {
        self.ln_nj[j] - self.ln_n
    }

    /// Indices of active condensed species.
    pub fn active_condensed(&self) -> Vec<usize> {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(c, on)| on.then_some(c))
            .collect()
    }

    pub fn n_gas(&self) -> usize {
        self.ln_nj.len()
    }

    pub fn n_condensed(&self) -> usize {
        self.n_condensed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reset_spreads_moles_evenly() {
        let itn = IterationVariables::with_capacity(2, 8, 1);
        let total: f64 = (0..8).map(|j| itn.gas_moles(j)).sum();
        assert_relative_eq!(total, 0.1, epsilon = 1e-15);
        assert_relative_eq!(itn.ln_mole_fraction(0), (1.0f64 / 8.0).ln(), epsilon = 1e-12);
        assert!(itn.active_condensed().is_empty());
    }

    #[test]
    fn clear_deltas_keeps_estimate() {
        let mut itn = IterationVariables::with_capacity(2, 3, 2);
        itn.ln_nj[1] = -3.0;
        itn.delta_ln_nj[1] = 0.5;
        itn.active[1] = true;
        itn.clear_deltas();
        assert_eq!(itn.ln_nj[1], -3.0);
        assert_eq!(itn.delta_ln_nj[1], 0.0);
        assert_eq!(itn.active_condensed(), vec![1]);
    }
}
