//! Nozzle performance scenarios on the built-in tables.

use approx::assert_relative_eq;
use pe_core::units::{Pressure, atm, bar, k, to_bar, to_k, to_mps};
use pe_equilibrium::{Composition, EquilibriumSolver};
use pe_performance::{
    ChamberClosure, ExitCondition, PerformanceEngine, PerformanceError, PerformanceReport,
    Strategy,
};
use pe_thermo::{PropellantTable, SpeciesTable};
use std::sync::{Arc, OnceLock};

fn tables() -> &'static (PropellantTable, SpeciesTable) {
    static TABLES: OnceLock<(PropellantTable, SpeciesTable)> = OnceLock::new();
    TABLES.get_or_init(|| {
        (
            PropellantTable::builtin().unwrap(),
            SpeciesTable::builtin().unwrap(),
        )
    })
}

fn composition(fuel: &str, oxidizer: &str, of: f64) -> Arc<Composition> {
    let (props, _) = tables();
    Arc::new(Composition::oxidizer_fuel(props, fuel, oxidizer, of).unwrap())
}

fn hydrolox() -> Arc<Composition> {
    composition("HYDROGEN (CRYOGENIC)", "OXYGEN (LIQUID)", 5.551)
}

fn sutton_pressure() -> Pressure {
    atm(53.317 * 0.986_923)
}

fn run(
    comp: Arc<Composition>,
    pc: Pressure,
    strategy: Strategy,
    exits: &[ExitCondition],
) -> Result<PerformanceReport, PerformanceError> {
    let (_, species) = tables();
    PerformanceEngine::new(EquilibriumSolver::new(species), comp, pc, strategy)?.run(exits)
}

#[test]
fn hydrolox_shifting_expansion() {
    let (_, species) = tables();
    let report = run(
        hydrolox(),
        sutton_pressure(),
        Strategy::Shifting,
        &[ExitCondition::SupersonicAreaRatio(25.0)],
    )
    .unwrap();
    let exit = &report.exits[0];

    assert_relative_eq!(to_k(report.chamber.temperature()), 3389.0, max_relative = 0.01);
    assert_relative_eq!(to_mps(report.cstar), 2332.1, max_relative = 0.001);
    assert_relative_eq!(to_mps(exit.performance.isp), 4124.0, max_relative = 0.01);
    assert_relative_eq!(to_mps(exit.performance.ivac), 4348.0, max_relative = 0.01);
    assert_relative_eq!(exit.performance.area_ratio, 25.0, max_relative = 1e-4);
    assert_relative_eq!(to_k(exit.station.equilibrium.temperature()), 1468.0, max_relative = 0.01);
    assert_relative_eq!(
        exit.performance.cf * to_mps(exit.performance.cstar),
        to_mps(exit.performance.isp),
        max_relative = 1e-12
    );
    assert!(exit.performance.mach > 1.0);

    let throat_mach = report.throat.mach().unwrap();
    assert_relative_eq!(throat_mach, 1.0, max_relative = 1e-6);

    let fractions = exit.station.equilibrium.mole_fractions().unwrap();
    assert!(fractions[0].1 > 0.1);
    assert_eq!(fractions[0].0, species.search("H2O").unwrap());
    assert!(exit.station.equilibrium.iteration().active_condensed().is_empty());
}

#[test]
fn frozen_expansion_shares_chamber_and_yields_less_impulse() {
    let exits = [ExitCondition::SupersonicAreaRatio(25.0)];
    let shifting = run(hydrolox(), sutton_pressure(), Strategy::Shifting, &exits).unwrap();
    let frozen = run(hydrolox(), sutton_pressure(), Strategy::Frozen, &exits).unwrap();

    assert_relative_eq!(
        to_k(frozen.chamber.temperature()),
        to_k(shifting.chamber.temperature()),
        max_relative = 1e-9
    );
    assert_relative_eq!(to_mps(frozen.cstar), 2294.0, max_relative = 0.005);
    assert!(frozen.exits[0].performance.isp < shifting.exits[0].performance.isp);
    assert!(frozen.exits[0].station.equilibrium.is_frozen());
    assert!(
        to_k(frozen.exits[0].station.equilibrium.temperature())
            < to_k(shifting.exits[0].station.equilibrium.temperature())
    );
}

#[test]
fn kerolox_chamber_agrees_across_strategies() {
    let comp = composition("RP-1 (RPL)", "OXYGEN (LIQUID)", 0.13);
    let exits = [ExitCondition::Pressure(atm(1.0))];
    let reports: Vec<_> = [
        Strategy::Frozen,
        Strategy::Shifting,
        Strategy::Equilibrium(ChamberClosure::Adiabatic),
    ]
    .into_iter()
    .map(|s| run(comp.clone(), atm(30.0), s, &exits).unwrap())
    .collect();

    let reference = reports[0].chamber.properties().unwrap();
    assert_relative_eq!(to_k(reference.temperature), 949.3, max_relative = 0.01);
    for report in &reports[1..] {
        let p = report.chamber.properties().unwrap();
        assert_relative_eq!(to_k(p.temperature), to_k(reference.temperature), max_relative = 0.01);
        assert_relative_eq!(p.cp, reference.cp, max_relative = 0.01);
        assert_relative_eq!(p.cv, reference.cv, max_relative = 0.01);
        assert_relative_eq!(
            p.isentropic_exponent,
            reference.isentropic_exponent,
            max_relative = 0.01
        );
    }
}

#[test]
fn several_exits_share_one_throat() {
    let report = run(
        hydrolox(),
        bar(70.0),
        Strategy::Shifting,
        &[
            ExitCondition::SupersonicAreaRatio(10.0),
            ExitCondition::SupersonicAreaRatio(40.0),
            ExitCondition::Pressure(bar(0.5)),
        ],
    )
    .unwrap();
    assert_eq!(report.exits.len(), 3);
    let cstar = to_mps(report.cstar);
    for exit in &report.exits {
        assert_relative_eq!(to_mps(exit.performance.cstar), cstar, max_relative = 1e-12);
    }
    assert!(report.exits[1].performance.isp > report.exits[0].performance.isp);
    assert_relative_eq!(
        to_bar(report.exits[2].station.pressure()),
        0.5,
        max_relative = 1e-12
    );
}

#[test]
fn subsonic_branch_stays_below_sonic() {
    let report = run(
        hydrolox(),
        sutton_pressure(),
        Strategy::Shifting,
        &[
            ExitCondition::SubsonicAreaRatio(4.0),
            ExitCondition::SupersonicAreaRatio(4.0),
        ],
    )
    .unwrap();
    let sub = &report.exits[0];
    let sup = &report.exits[1];
    assert!(sub.performance.mach < 1.0);
    assert!(sup.performance.mach > 1.0);
    assert_relative_eq!(sub.performance.area_ratio, 4.0, max_relative = 1e-4);
    assert!(sub.station.pressure() > report.throat.pressure());
    assert!(sup.station.pressure() < report.throat.pressure());
}

#[test]
fn large_subsonic_ratio_is_matched() {
    for strategy in [Strategy::Shifting, Strategy::Frozen] {
        let report = run(
            hydrolox(),
            sutton_pressure(),
            strategy,
            &[ExitCondition::SubsonicAreaRatio(50.0)],
        )
        .unwrap();
        let exit = &report.exits[0];
        assert_relative_eq!(exit.performance.area_ratio, 50.0, max_relative = 1e-5);
        assert!(exit.performance.mach < 0.02, "{}", strategy.label());
        assert!(exit.station.pressure() < report.chamber.pressure());
    }
}

#[test]
fn unit_area_ratio_is_the_throat() {
    let report = run(
        hydrolox(),
        bar(20.0),
        Strategy::Frozen,
        &[ExitCondition::SupersonicAreaRatio(1.0)],
    )
    .unwrap();
    assert_relative_eq!(report.exits[0].performance.area_ratio, 1.0, max_relative = 1e-12);
    assert_relative_eq!(report.exits[0].performance.mach, 1.0, max_relative = 1e-6);
}

#[test]
fn fixed_temperature_chamber_is_honoured() {
    let report = run(
        hydrolox(),
        bar(30.0),
        Strategy::Equilibrium(ChamberClosure::Temperature(k(3000.0))),
        &[ExitCondition::SupersonicAreaRatio(8.0)],
    )
    .unwrap();
    assert_eq!(to_k(report.chamber.temperature()), 3000.0);
    assert!(to_k(report.throat.equilibrium.temperature()) < 3000.0);
}

#[test]
fn invalid_exit_conditions_are_rejected() {
    for exit in [
        ExitCondition::Pressure(bar(60.0)),
        ExitCondition::SupersonicAreaRatio(0.8),
        ExitCondition::SubsonicAreaRatio(-2.0),
    ] {
        let err = run(hydrolox(), bar(50.0), Strategy::Shifting, &[exit]).unwrap_err();
        assert!(
            matches!(err, PerformanceError::InvalidExitCondition { .. }),
            "{exit:?}: {err}"
        );
    }
    assert!(run(hydrolox(), bar(50.0), Strategy::Shifting, &[]).is_err());
}

#[test]
fn one_call_evaluation_matches_engine_run() {
    let (_, species) = tables();
    let exit = ExitCondition::Pressure(atm(1.0));
    let direct = pe_performance::evaluate(
        EquilibriumSolver::new(species),
        hydrolox(),
        sutton_pressure(),
        exit,
        Strategy::Frozen,
    )
    .unwrap();
    let report = run(hydrolox(), sutton_pressure(), Strategy::Frozen, &[exit]).unwrap();
    assert_eq!(direct, report.exits[0].performance);
}
