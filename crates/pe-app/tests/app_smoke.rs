//! Service layer runs on the bundled case files.

use approx::assert_relative_eq;
use pe_app::*;
use std::path::PathBuf;

fn case_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.pop();
    path.push("cases");
    path.push(name);
    path
}

#[test]
fn hydrolox_case_runs_end_to_end() {
    let summary = run_case_file(&case_path("hydrolox_sutton.yaml")).unwrap();
    let RunResult::Performance(perf) = &summary.result else {
        panic!("expected a performance result");
    };
    assert_eq!(perf.strategy, "shifting");
    assert_relative_eq!(perf.chamber.temperature_k, 3389.0, max_relative = 0.01);
    assert_relative_eq!(perf.cstar_mps, 2333.4, max_relative = 0.005);
    assert_eq!(perf.exits.len(), 2);

    let sea_level = &perf.exits[0];
    assert_relative_eq!(sea_level.state.pressure_bar, 1.01325, max_relative = 1e-6);
    assert_relative_eq!(sea_level.isp_mps, 3683.5, max_relative = 0.01);
    assert_relative_eq!(sea_level.state.temperature_k, 1973.7, max_relative = 0.01);
    assert!(sea_level.ivac_s > sea_level.isp_s);

    let vacuum = &perf.exits[1];
    assert_relative_eq!(vacuum.area_ratio, 40.0, max_relative = 1e-4);
    assert_relative_eq!(vacuum.isp_mps, 4255.0, max_relative = 0.01);
    assert!(vacuum.mach > sea_level.mach);
    assert!(vacuum.isp_s > sea_level.isp_s);

    assert_relative_eq!(perf.throat.pressure_bar / perf.chamber_pressure_bar, 0.577, epsilon = 0.03);
    assert_eq!(perf.chamber.species[0].name, "H2O");
    assert!(perf.chamber.species.iter().all(|s| !s.condensed));
    assert!(
        perf.chamber
            .species
            .iter()
            .all(|s| s.mole_fraction >= REPORT_FRACTION_FLOOR)
    );
}

#[test]
fn kerolox_gas_generator_reports_graphite() {
    let summary = run_case_file(&case_path("kerolox_rich_hp.yaml")).unwrap();
    let RunResult::Equilibrium { closure, state } = &summary.result else {
        panic!("expected an equilibrium result");
    };
    assert_eq!(closure, "HP");
    assert_relative_eq!(state.temperature_k, 949.3, max_relative = 0.01);
    assert!(
        state
            .species
            .iter()
            .any(|s| s.condensed && s.name == "C(gr)")
    );
}

#[test]
fn summary_serializes_with_result_tag() {
    let summary = run_case_file(&case_path("kerolox_rich_hp.yaml")).unwrap();
    let json = summary.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["result"]["type"], "Equilibrium");
    assert_eq!(value["case"], "RP-1/LOX fuel-rich gas generator");
}

#[test]
fn unknown_propellant_fails_validation() {
    let tables = builtin_tables().unwrap();
    let mut case = load_case(&case_path("hydrolox_sutton.yaml")).unwrap();
    case.reactants[0].name = "UNOBTAINIUM".to_string();
    assert!(matches!(
        validate_case(&case, &tables),
        Err(AppError::Reactant(_))
    ));
}

#[test]
fn missing_case_file_is_reported() {
    let err = load_case(&case_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, AppError::CaseFileRead { .. }));
}

#[test]
fn saved_case_loads_back() {
    let case = load_case(&case_path("hydrolox_sutton.yaml")).unwrap();
    let path = std::env::temp_dir().join("pe_app_saved_case.yaml");
    save_case(&path, &case).unwrap();
    let back = load_case(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(case, back);
}

#[test]
fn species_listing_filters_by_name() {
    let tables = builtin_tables().unwrap();
    let all = list_species(&tables, None);
    assert_eq!(all.len(), tables.species.len());
    let water = list_species(&tables, Some("h2o"));
    assert!(water.iter().any(|s| s.name == "H2O" && !s.condensed));
    assert!(water.iter().all(|s| s.name.contains("H2O")));
    let props = list_propellants(&tables, Some("oxygen"));
    assert_eq!(props.len(), 2);
}
