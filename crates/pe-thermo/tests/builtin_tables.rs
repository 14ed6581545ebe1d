//! Sanity checks on the compiled-in data sets.

use approx::assert_relative_eq;
use pe_thermo::{Element, ExtrapolationPolicy, Phase, PropellantTable, SpeciesTable, ThermoEvaluator};
use proptest::prelude::*;

#[test]
fn builtin_species_load() {
    let table = SpeciesTable::builtin().unwrap();
    assert_eq!(table.len(), 23);

    let gr = table.species(table.search("C(gr)").unwrap()).unwrap();
    assert_eq!(gr.phase, Phase::Condensed);
    assert_eq!(gr.range(), Some((200.0, 5000.0)));
}

#[test]
fn heats_of_formation_match_reference_values() {
    let table = SpeciesTable::builtin().unwrap();
    let cases = [
        ("H2O", -241_826.0),
        ("CO2", -393_510.0),
        ("CO", -110_530.0),
        ("CH4", -74_870.0),
    ];
    for (name, hf) in cases {
        let sp = table.species(table.search(name).unwrap()).unwrap();
        assert_relative_eq!(sp.heat_of_formation, hf, max_relative = 0.02);
    }
}

#[test]
fn graphite_is_the_reference_state_of_carbon() {
    let table = SpeciesTable::builtin().unwrap();
    let ev = ThermoEvaluator::default();
    let gr = table.species(table.search("C(gr)").unwrap()).unwrap();
    assert!(ev.enthalpy_0(gr, 298.15).unwrap().abs() < 50.0);
    // JANAF S0(298.15) = 5.74 J/(mol K)
    assert_relative_eq!(ev.entropy_0(gr, 298.15).unwrap(), 5.74, max_relative = 0.05);
}

#[test]
fn enthalpy_is_continuous_at_interval_joins() {
    let table = SpeciesTable::builtin().unwrap();
    for (_, sp) in table.iter() {
        for pair in sp.intervals.windows(2) {
            let t = pair[1].t_low;
            let (_, h_lo, _) = pair[0].evaluate(t);
            let (_, h_hi, _) = pair[1].evaluate(t);
            let dh = (h_lo - h_hi).abs() * 8.314 * t;
            assert!(dh < 60.0, "{}: enthalpy jump {dh} J/mol at {t} K", sp.name);
        }
    }
}

#[test]
fn hydrogen_oxygen_candidates() {
    let table = SpeciesTable::builtin().unwrap();
    let h = Element::from_symbol("H").unwrap();
    let o = Element::from_symbol("O").unwrap();
    let (gas, condensed) = table.candidates(&[h, o]);
    assert_eq!(gas.len(), 8);
    assert!(condensed.is_empty());
}

#[test]
fn builtin_propellants_load() {
    let table = PropellantTable::builtin().unwrap();
    assert!(table.len() >= 3);
    for name in ["HYDROGEN (CRYOGENIC)", "OXYGEN (LIQUID)", "RP-1 (RPL)"] {
        assert!(table.search(name).is_ok(), "{name}");
    }
    let rp1 = table.propellant(table.search("RP-1").unwrap()).unwrap();
    assert_relative_eq!(rp1.molar_mass(), 12.0107 + 1.9423 * 1.00794, epsilon = 1e-9);
}

proptest! {
    #[test]
    fn cp_positive_over_fitted_range(t in 300.0f64..3500.0) {
        let table = SpeciesTable::builtin().unwrap();
        for (_, sp) in table.iter() {
            let p = sp.evaluate(t, ExtrapolationPolicy::Nearest).unwrap();
            prop_assert!(p.cp_r > 0.0, "{} cp/R = {} at {}", sp.name, p.cp_r, t);
        }
    }
}
