//! Nozzle stations and the performance state machine.
//!
//! The chamber is solved once; the throat is found by iterating on
//! ln(Pc/Pt) until the flow velocity equals the sound speed; each exit is
//! found by iterating on ln(Pc/Pe) toward the requested pressure or area
//! ratio. Downstream stations hold the chamber entropy.

use crate::config::NozzleConfig;
use crate::error::{PerformanceError, PerformanceResult};
use crate::exit::{ExitCondition, Strategy};
use pe_core::units::{Pressure, Velocity, bar, mps, to_bar, to_k, to_kgpm3, to_mps, to_pa};
use pe_equilibrium::{
    Closure, Composition, CpKind, Equilibrium, EquilibriumProperties, EquilibriumSolver,
    PerformanceProperties,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Progress of one performance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    NotStarted,
    ChamberSolved,
    ThroatSolved,
    ExitSolved,
    PerformanceComputed,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::NotStarted => "not started",
            Stage::ChamberSolved => "chamber solved",
            Stage::ThroatSolved => "throat solved",
            Stage::ExitSolved => "exit solved",
            Stage::PerformanceComputed => "performance computed",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point along the nozzle.
#[derive(Debug, Clone)]
pub struct Station {
    pub equilibrium: Equilibrium,
    /// ln(Pc/P)
    pub ln_pressure_ratio: f64,
    pub velocity: Velocity,
}

impl Station {
    pub fn properties(&self) -> PerformanceResult<&EquilibriumProperties> {
        Ok(self.equilibrium.properties()?)
    }

    pub fn pressure(&self) -> Pressure {
        self.equilibrium.pressure()
    }

    pub fn mach(&self) -> PerformanceResult<f64> {
        Ok(to_mps(self.velocity) / to_mps(self.properties()?.sound_speed))
    }

    /// ρu, kg/(m² s)
    fn mass_flux(&self) -> PerformanceResult<f64> {
        Ok(to_kgpm3(self.properties()?.density) * to_mps(self.velocity))
    }
}

/// Performance at one exit condition.
#[derive(Debug, Clone)]
pub struct ExitResult {
    pub condition: ExitCondition,
    pub station: Station,
    pub performance: PerformanceProperties,
}

/// Chamber, throat and every requested exit of one run.
#[derive(Debug, Clone)]
pub struct PerformanceReport {
    pub strategy: Strategy,
    pub chamber_pressure: Pressure,
    pub chamber: Equilibrium,
    pub throat: Station,
    pub cstar: Velocity,
    pub exits: Vec<ExitResult>,
}

/// Drives chamber → throat → exit → performance for one composition.
#[derive(Debug)]
pub struct PerformanceEngine<'t> {
    solver: EquilibriumSolver<'t>,
    nozzle: NozzleConfig,
    strategy: Strategy,
    composition: Arc<Composition>,
    chamber_pressure: Pressure,
    stage: Stage,
    chamber: Option<Equilibrium>,
    throat: Option<Station>,
    exit: Option<(ExitCondition, Station)>,
}

impl<'t> PerformanceEngine<'t> {
    pub fn new(
        solver: EquilibriumSolver<'t>,
        composition: Arc<Composition>,
        chamber_pressure: Pressure,
        strategy: Strategy,
    ) -> PerformanceResult<Self> {
        let pc = to_bar(chamber_pressure);
        if !pc.is_finite() || pc <= 0.0 {
            return Err(PerformanceError::Failed {
                station: "chamber",
                what: format!("chamber pressure {pc} bar must be finite and positive"),
            });
        }
        Ok(Self {
            solver,
            nozzle: NozzleConfig::default(),
            strategy,
            composition,
            chamber_pressure,
            stage: Stage::NotStarted,
            chamber: None,
            throat: None,
            exit: None,
        })
    }

    pub fn with_nozzle_config(mut self, nozzle: NozzleConfig) -> Self {
        self.nozzle = nozzle;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn chamber(&self) -> Option<&Equilibrium> {
        self.chamber.as_ref()
    }

    pub fn throat(&self) -> Option<&Station> {
        self.throat.as_ref()
    }

    /// Latest exit station.
    pub fn exit(&self) -> Option<&Station> {
        self.exit.as_ref().map(|(_, s)| s)
    }

    fn expect_stage(&self, operation: &'static str, allowed: &[Stage]) -> PerformanceResult<()> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(PerformanceError::OutOfOrder {
                operation,
                stage: self.stage,
            })
        }
    }

    fn record<T>(&mut self, result: PerformanceResult<T>) -> PerformanceResult<T> {
        if result.is_err() {
            self.stage = Stage::Failed;
        }
        result
    }

    fn out_of_order(&self, operation: &'static str) -> PerformanceError {
        PerformanceError::OutOfOrder {
            operation,
            stage: self.stage,
        }
    }

    pub fn solve_chamber(&mut self) -> PerformanceResult<&Equilibrium> {
        self.expect_stage("solve_chamber", &[Stage::NotStarted])?;
        let result = self.chamber_state();
        let chamber = self.record(result)?;
        self.stage = Stage::ChamberSolved;
        Ok(self.chamber.insert(chamber))
    }

    pub fn solve_throat(&mut self) -> PerformanceResult<&Station> {
        self.expect_stage("solve_throat", &[Stage::ChamberSolved])?;
        let chamber = self
            .chamber
            .as_ref()
            .ok_or_else(|| self.out_of_order("solve_throat"))?;
        let result = self.throat_state(chamber);
        let throat = self.record(result)?;
        self.stage = Stage::ThroatSolved;
        Ok(self.throat.insert(throat))
    }

    /// Solve one exit station. May be repeated after `compute_performance`
    /// for further exits sharing the same chamber and throat.
    pub fn solve_exit(&mut self, condition: ExitCondition) -> PerformanceResult<&Station> {
        self.expect_stage(
            "solve_exit",
            &[Stage::ThroatSolved, Stage::PerformanceComputed],
        )?;
        let (Some(chamber), Some(throat)) = (self.chamber.as_ref(), self.throat.as_ref()) else {
            return Err(self.out_of_order("solve_exit"));
        };
        let result = self.exit_state(chamber, throat, condition);
        let station = self.record(result)?;
        self.stage = Stage::ExitSolved;
        let (_, station) = self.exit.insert((condition, station));
        Ok(station)
    }

    /// Performance figures at the latest exit.
    pub fn compute_performance(&mut self) -> PerformanceResult<PerformanceProperties> {
        self.expect_stage("compute_performance", &[Stage::ExitSolved])?;
        let (Some(throat), Some((_, exit))) = (self.throat.as_ref(), self.exit.as_ref()) else {
            return Err(self.out_of_order("compute_performance"));
        };
        let result = self.performance_of(throat, exit);
        let performance = self.record(result)?;
        if let Some((_, exit)) = self.exit.as_mut() {
            exit.equilibrium.set_performance(performance)?;
        }
        self.stage = Stage::PerformanceComputed;
        Ok(performance)
    }

    /// Every step in order for each exit condition.
    pub fn run(&mut self, exits: &[ExitCondition]) -> PerformanceResult<PerformanceReport> {
        if exits.is_empty() {
            return Err(PerformanceError::invalid_exit(
                "at least one exit condition is required",
            ));
        }
        self.solve_chamber()?;
        self.solve_throat()?;

        let mut results = Vec::with_capacity(exits.len());
        for condition in exits {
            self.solve_exit(*condition)?;
            let performance = self.compute_performance()?;
            let (condition, station) = self
                .exit
                .take()
                .ok_or_else(|| self.out_of_order("run"))?;
            results.push(ExitResult {
                condition,
                station,
                performance,
            });
        }

        let (Some(chamber), Some(throat)) = (self.chamber.clone(), self.throat.clone()) else {
            return Err(self.out_of_order("run"));
        };
        let cstar = mps(to_pa(self.chamber_pressure) / throat.mass_flux()?);
        info!(
            strategy = self.strategy.label(),
            pressure_bar = to_bar(self.chamber_pressure),
            cstar = to_mps(cstar),
            exits = results.len(),
            "performance computed"
        );
        Ok(PerformanceReport {
            strategy: self.strategy,
            chamber_pressure: self.chamber_pressure,
            chamber,
            throat,
            cstar,
            exits: results,
        })
    }

    fn chamber_state(&self) -> PerformanceResult<Equilibrium> {
        let closure = self
            .strategy
            .chamber_closure()
            .closure(self.composition.enthalpy_j_per_kg());
        let table = self.solver.table();
        let mut eq = Equilibrium::new(self.composition.clone(), table)?;
        self.solver
            .solve(&mut eq, self.chamber_pressure, closure, false)?;
        eq.compute_properties(table, CpKind::Equilibrium)?;
        debug!(
            closure = closure.label(),
            temperature = to_k(eq.temperature()),
            "chamber solved"
        );
        Ok(eq)
    }

    /// Isentropic state at `p_bar` warm-started from `previous`.
    fn expand(
        &self,
        chamber: &Equilibrium,
        previous: &Equilibrium,
        p_bar: f64,
    ) -> PerformanceResult<Equilibrium> {
        let s = chamber.properties()?.entropy;
        let table = self.solver.table();
        let (mut eq, kind) = if self.strategy.is_frozen() {
            (self.solver.solve_frozen(chamber, bar(p_bar), s)?, CpKind::Frozen)
        } else {
            (
                self.solver
                    .solve_from(previous, bar(p_bar), Closure::Entropy(s))?,
                CpKind::Equilibrium,
            )
        };
        eq.compute_properties(table, kind)?;
        Ok(eq)
    }

    /// Velocity from the enthalpy drop, m/s (squared).
    fn velocity_squared(chamber: &Equilibrium, eq: &Equilibrium) -> PerformanceResult<f64> {
        Ok(2.0 * (chamber.properties()?.enthalpy - eq.properties()?.enthalpy))
    }

    fn throat_state(&self, chamber: &Equilibrium) -> PerformanceResult<Station> {
        let pc = to_bar(self.chamber_pressure);
        let g = chamber.properties()?.isentropic_exponent;
        let mut ln_pr = (g / (g - 1.0)) * ((g + 1.0) / 2.0).ln();
        let mut previous: Option<Equilibrium> = None;

        for iteration in 1..=self.nozzle.throat_iterations {
            let eq = self.expand(chamber, previous.as_ref().unwrap_or(chamber), pc / ln_pr.exp())?;
            let u2 = Self::velocity_squared(chamber, &eq)?;
            let props = eq.properties()?;
            let a2 = to_mps(props.sound_speed).powi(2);
            let gs = props.isentropic_exponent;
            if u2.is_nan() || u2 <= 0.0 {
                return Err(PerformanceError::Failed {
                    station: "throat",
                    what: format!("no enthalpy drop at ln(Pc/P) = {ln_pr:.6}"),
                });
            }
            let mismatch = u2 - a2;
            debug!(iteration, ln_pr, mismatch = mismatch / u2, "throat iteration");
            if mismatch.abs() / u2 < self.nozzle.throat_tolerance {
                return Ok(Station {
                    equilibrium: eq,
                    ln_pressure_ratio: ln_pr,
                    velocity: mps(u2.sqrt()),
                });
            }
            ln_pr = (ln_pr - gs * mismatch / ((gs + 1.0) * a2)).max(1e-4);
            previous = Some(eq);
        }
        Err(PerformanceError::Failed {
            station: "throat",
            what: format!(
                "sonic condition not met after {} iterations",
                self.nozzle.throat_iterations
            ),
        })
    }

    fn exit_state(
        &self,
        chamber: &Equilibrium,
        throat: &Station,
        condition: ExitCondition,
    ) -> PerformanceResult<Station> {
        condition.validate(self.chamber_pressure)?;
        match condition {
            ExitCondition::Pressure(p) => {
                let pe = to_bar(p);
                let eq = self.expand(chamber, &throat.equilibrium, pe)?;
                let u2 = Self::velocity_squared(chamber, &eq)?;
                Ok(Station {
                    equilibrium: eq,
                    ln_pressure_ratio: (to_bar(self.chamber_pressure) / pe).ln(),
                    velocity: mps(u2.max(0.0).sqrt()),
                })
            }
            ExitCondition::SupersonicAreaRatio(r) | ExitCondition::SubsonicAreaRatio(r)
                if r == 1.0 =>
            {
                Ok(throat.clone())
            }
            ExitCondition::SupersonicAreaRatio(r) => self.supersonic_exit(chamber, throat, r),
            ExitCondition::SubsonicAreaRatio(r) => self.subsonic_exit(chamber, throat, r),
        }
    }

    fn supersonic_exit(
        &self,
        chamber: &Equilibrium,
        throat: &Station,
        ratio: f64,
    ) -> PerformanceResult<Station> {
        let pc = to_bar(self.chamber_pressure);
        let target = ratio.ln();
        let x_throat = throat.ln_pressure_ratio;
        let throat_flux = throat.mass_flux()?;
        let mut x = x_throat + (3.294 * target * target + 1.535 * target).sqrt();
        let mut previous: Option<Equilibrium> = None;

        for iteration in 1..=self.nozzle.exit_iterations {
            let eq = self.expand(
                chamber,
                previous.as_ref().unwrap_or(&throat.equilibrium),
                pc / x.exp(),
            )?;
            let u2 = Self::velocity_squared(chamber, &eq)?.max(0.0);
            let props = eq.properties()?;
            let a2 = to_mps(props.sound_speed).powi(2);
            let ue = u2.sqrt();
            let area_ratio = throat_flux / (to_kgpm3(props.density) * ue);
            let dx = if u2 > a2 {
                (target - area_ratio.ln()) * props.isentropic_exponent * u2 / (u2 - a2)
            } else {
                // still subsonic: move downstream
                (x - x_throat).max(0.1)
            };
            debug!(iteration, x, area_ratio, "supersonic exit iteration");
            if dx.abs() < self.nozzle.exit_tolerance {
                return Ok(Station {
                    equilibrium: eq,
                    ln_pressure_ratio: x,
                    velocity: mps(ue),
                });
            }
            x = if x + dx > x_throat {
                x + dx
            } else {
                0.5 * (x + x_throat)
            };
            previous = Some(eq);
        }
        Err(PerformanceError::Failed {
            station: "exit",
            what: format!("supersonic area ratio {ratio} not reached"),
        })
    }

    fn subsonic_exit(
        &self,
        chamber: &Equilibrium,
        throat: &Station,
        ratio: f64,
    ) -> PerformanceResult<Station> {
        let pc = to_bar(self.chamber_pressure);
        let target = ratio.ln();
        let x_throat = throat.ln_pressure_ratio;
        let throat_flux = throat.mass_flux()?;
        let (mut lo, mut hi) = (0.0, x_throat);
        let mut x = x_throat / (1.0 + 2.0 * target * ratio);
        let mut previous: Option<Equilibrium> = None;

        for iteration in 1..=self.nozzle.exit_iterations {
            let eq = self.expand(chamber, previous.as_ref().unwrap_or(chamber), pc / x.exp())?;
            let u2 = Self::velocity_squared(chamber, &eq)?.max(1e-9);
            let props = eq.properties()?;
            let a2 = to_mps(props.sound_speed).powi(2);
            let ue = u2.sqrt();
            let area_ratio = throat_flux / (to_kgpm3(props.density) * ue);
            let f = area_ratio.ln() - target;
            if f > 0.0 {
                lo = x;
            } else {
                hi = x;
            }
            debug!(iteration, x, area_ratio, "subsonic exit iteration");
            if f.abs() < self.nozzle.exit_tolerance {
                return Ok(Station {
                    equilibrium: eq,
                    ln_pressure_ratio: x,
                    velocity: mps(ue),
                });
            }
            if hi - lo <= f64::EPSILON * hi {
                return Err(PerformanceError::InvalidExitCondition {
                    what: format!("subsonic search for area ratio {ratio} stalled at {area_ratio:.6}"),
                });
            }
            let mut next = x - f * props.isentropic_exponent * u2 / (u2 - a2);
            if next.is_nan() || next <= lo || next >= hi {
                next = 0.5 * (lo + hi);
            }
            x = next;
            previous = Some(eq);
        }
        Err(PerformanceError::InvalidExitCondition {
            what: format!("no subsonic solution for area ratio {ratio}"),
        })
    }

    fn performance_of(
        &self,
        throat: &Station,
        exit: &Station,
    ) -> PerformanceResult<PerformanceProperties> {
        let throat_flux = throat.mass_flux()?;
        let exit_flux = exit.mass_flux()?;
        if exit_flux.is_nan() || exit_flux <= 0.0 {
            return Err(PerformanceError::Failed {
                station: "exit",
                what: "zero mass flux at exit".to_string(),
            });
        }
        let cstar = to_pa(self.chamber_pressure) / throat_flux;
        let ue = to_mps(exit.velocity);
        let area_per_mass_flow = 1.0 / exit_flux;
        Ok(PerformanceProperties {
            area_ratio: throat_flux / exit_flux,
            area_per_mass_flow,
            cstar: mps(cstar),
            cf: ue / cstar,
            isp: mps(ue),
            ivac: mps(ue + to_pa(exit.pressure()) * area_per_mass_flow),
            mach: exit.mach()?,
        })
    }
}

/// Performance at a single exit in one call.
pub fn evaluate(
    solver: EquilibriumSolver<'_>,
    composition: Arc<Composition>,
    chamber_pressure: Pressure,
    exit: ExitCondition,
    strategy: Strategy,
) -> PerformanceResult<PerformanceProperties> {
    let mut engine = PerformanceEngine::new(solver, composition, chamber_pressure, strategy)?;
    let report = engine.run(&[exit])?;
    report
        .exits
        .into_iter()
        .next()
        .map(|e| e.performance)
        .ok_or_else(|| PerformanceError::invalid_exit("no exit station was produced"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pe_thermo::{PropellantTable, SpeciesTable};

    fn engine(species: &SpeciesTable) -> PerformanceEngine<'_> {
        let props = PropellantTable::builtin().unwrap();
        let comp = Composition::oxidizer_fuel(&props, "HYDROGEN (CRYOGENIC)", "OXYGEN (LIQUID)", 6.0)
            .unwrap();
        PerformanceEngine::new(
            EquilibriumSolver::new(species),
            Arc::new(comp),
            bar(50.0),
            Strategy::Shifting,
        )
        .unwrap()
    }

    #[test]
    fn steps_must_run_in_order() {
        let species = SpeciesTable::builtin().unwrap();
        let mut engine = engine(&species);
        assert!(matches!(
            engine.solve_throat(),
            Err(PerformanceError::OutOfOrder {
                stage: Stage::NotStarted,
                ..
            })
        ));
        assert!(engine.solve_exit(ExitCondition::SupersonicAreaRatio(10.0)).is_err());
        assert!(engine.compute_performance().is_err());

        engine.solve_chamber().unwrap();
        assert_eq!(engine.stage(), Stage::ChamberSolved);
        assert!(engine.solve_chamber().is_err());
        engine.solve_throat().unwrap();
        engine
            .solve_exit(ExitCondition::SupersonicAreaRatio(10.0))
            .unwrap();
        let perf = engine.compute_performance().unwrap();
        assert_eq!(engine.stage(), Stage::PerformanceComputed);
        assert!(perf.mach > 1.0);
        let exit = engine.exit().unwrap();
        assert_eq!(exit.equilibrium.performance().unwrap(), &perf);
    }

    #[test]
    fn failure_is_terminal() {
        let species = SpeciesTable::builtin().unwrap();
        let mut engine = engine(&species);
        engine.solve_chamber().unwrap();
        engine.solve_throat().unwrap();
        let err = engine
            .solve_exit(ExitCondition::Pressure(bar(80.0)))
            .unwrap_err();
        assert!(matches!(err, PerformanceError::InvalidExitCondition { .. }));
        assert_eq!(engine.stage(), Stage::Failed);
        assert!(matches!(
            engine.solve_exit(ExitCondition::Pressure(bar(1.0))),
            Err(PerformanceError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn rejects_bad_chamber_pressure() {
        let species = SpeciesTable::builtin().unwrap();
        let props = PropellantTable::builtin().unwrap();
        let comp = Composition::oxidizer_fuel(&props, "HYDROGEN (GAS)", "OXYGEN (GAS)", 6.0).unwrap();
        assert!(
            PerformanceEngine::new(
                EquilibriumSolver::new(&species),
                Arc::new(comp),
                bar(0.0),
                Strategy::Frozen,
            )
            .is_err()
        );
    }
}
