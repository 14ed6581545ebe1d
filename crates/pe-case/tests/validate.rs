use pe_case::*;

const BASE: &str = r#"
name: base
reactants:
  - name: HYDROGEN (CRYOGENIC)
    mass: 1 kg
  - name: OXYGEN (LIQUID)
    mass: 6 kg
problem:
  type: Performance
  chamber_pressure: 50 bar
  exits:
    - type: Pressure
      pressure: 1 bar
"#;

fn base() -> CaseFile {
    from_yaml_str(BASE).unwrap()
}

fn validation(case: &CaseFile) -> ValidationError {
    validate_case(case).unwrap_err()
}

#[test]
fn base_case_is_valid() {
    validate_case(&base()).unwrap();
}

#[test]
fn rejects_future_version() {
    let mut case = base();
    case.version = LATEST_VERSION + 1;
    assert!(matches!(
        validation(&case),
        ValidationError::UnsupportedVersion { .. }
    ));
}

#[test]
fn rejects_duplicate_reactants_case_insensitively() {
    let mut case = base();
    case.reactants[1].name = "hydrogen (cryogenic)".to_string();
    assert!(matches!(
        validation(&case),
        ValidationError::DuplicateReactant { .. }
    ));
}

#[test]
fn reactant_needs_exactly_one_amount() {
    let mut case = base();
    case.reactants[0].moles = Some(1.0);
    assert!(matches!(
        validation(&case),
        ValidationError::InvalidValue { .. }
    ));
    case.reactants[0].mass = None;
    case.reactants[0].moles = Some(-1.0);
    assert!(matches!(
        validation(&case),
        ValidationError::InvalidValue { .. }
    ));
}

#[test]
fn rejects_exit_above_chamber() {
    let mut case = base();
    case.problem = ProblemDef::Performance {
        chamber_pressure: "10 bar".to_string(),
        strategy: StrategyDef::Frozen,
        exits: vec![ExitDef::Pressure {
            pressure: "20 bar".to_string(),
        }],
    };
    match validation(&case) {
        ValidationError::InvalidValue { field, .. } => assert_eq!(field, "exits[0]"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn rejects_area_ratio_below_one_and_empty_exits() {
    let mut case = base();
    case.problem = ProblemDef::Performance {
        chamber_pressure: "10 bar".to_string(),
        strategy: StrategyDef::default(),
        exits: vec![ExitDef::SubsonicAreaRatio { ratio: 0.5 }],
    };
    assert!(matches!(
        validation(&case),
        ValidationError::InvalidValue { .. }
    ));
    case.problem = ProblemDef::Performance {
        chamber_pressure: "10 bar".to_string(),
        strategy: StrategyDef::default(),
        exits: Vec::new(),
    };
    assert!(matches!(validation(&case), ValidationError::Missing { .. }));
}

#[test]
fn rejects_bad_units() {
    let mut case = base();
    case.problem = ProblemDef::Equilibrium {
        pressure: "10 furlongs".to_string(),
        closure: ClosureDef::Adiabatic,
    };
    assert!(matches!(
        validation(&case),
        ValidationError::InvalidValue { .. }
    ));
}

#[test]
fn rejects_bad_solver_config() {
    let mut case = base();
    case.solver.max_iterations = 0;
    match validation(&case) {
        ValidationError::InvalidValue { field, .. } => assert_eq!(field, "solver"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn rejects_non_positive_nozzle_tolerances() {
    for bad in [0.0, -1e-6, f64::NAN] {
        let mut case = base();
        case.nozzle.exit_tolerance = bad;
        match validation(&case) {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "nozzle"),
            other => panic!("unexpected error {other}"),
        }
        let mut case = base();
        case.nozzle.throat_tolerance = bad;
        assert!(matches!(
            validation(&case),
            ValidationError::InvalidValue { .. }
        ));
    }
}

#[test]
fn unknown_problem_type_is_a_yaml_error() {
    let text = BASE.replace("type: Performance", "type: Rocket");
    assert!(matches!(from_yaml_str(&text), Err(CaseError::Yaml(_))));
}
