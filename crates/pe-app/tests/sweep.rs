use pe_app::*;
use pe_core::units::bar;
use pe_equilibrium::SolverConfig;
use pe_performance::{ExitCondition, NozzleConfig, Strategy};

fn request(of_ratios: Vec<f64>) -> SweepRequest {
    SweepRequest {
        fuel: "HYDROGEN (CRYOGENIC)".to_string(),
        oxidizer: "OXYGEN (LIQUID)".to_string(),
        of_ratios,
        chamber_pressure: bar(50.0),
        strategy: Strategy::Shifting,
        exit: ExitCondition::Pressure(bar(1.0)),
        solver: SolverConfig::default(),
        nozzle: NozzleConfig::default(),
    }
}

#[test]
fn sweep_keeps_input_order() {
    let tables = builtin_tables().unwrap();
    let ratios = of_range(3.0, 6.0, 1.0).unwrap();
    let points = sweep_of(&tables, &request(ratios.clone())).unwrap();
    assert_eq!(points.len(), ratios.len());
    for (point, of) in points.iter().zip(&ratios) {
        assert_eq!(point.of_ratio, *of);
        assert!(point.is_ok(), "{:?}", point.error);
    }
    // Below stoichiometric, hotter as oxidizer is added.
    let temps: Vec<f64> = points
        .iter()
        .map(|p| p.chamber_temperature_k.unwrap())
        .collect();
    assert!(temps.windows(2).all(|w| w[1] > w[0]));
    for p in &points {
        assert!(p.ivac_s.unwrap() > p.isp_s.unwrap());
        assert!(p.exit_temperature_k.unwrap() < p.chamber_temperature_k.unwrap());
    }
}

#[test]
fn sweep_matches_single_run() {
    let tables = builtin_tables().unwrap();
    let swept = sweep_of(&tables, &request(vec![5.551])).unwrap();
    let again = sweep_of(&tables, &request(vec![5.551])).unwrap();
    assert_eq!(swept, again);
}

#[test]
fn bad_sweep_inputs_are_rejected() {
    let tables = builtin_tables().unwrap();
    assert!(matches!(
        sweep_of(&tables, &request(Vec::new())),
        Err(AppError::InvalidInput(_))
    ));
    let mut req = request(vec![5.0]);
    req.exit = ExitCondition::Pressure(bar(80.0));
    assert!(matches!(
        sweep_of(&tables, &req),
        Err(AppError::Performance(_))
    ));
}

#[test]
fn unknown_fuel_fails_each_point() {
    let tables = builtin_tables().unwrap();
    let mut req = request(vec![2.0, 3.0]);
    req.fuel = "UNOBTAINIUM".to_string();
    let points = sweep_of(&tables, &req).unwrap();
    assert!(points.iter().all(|p| !p.is_ok() && p.isp_s.is_none()));
}
