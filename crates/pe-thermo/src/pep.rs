//! Reader for PEP-style propellant records.
//!
//! One propellant per line (columns 1-based): id (1-9, ignored), name
//! (10-39), six (count I3, symbol A2) pairs (40-69), heat of formation in
//! cal/g (70-74), density in lb/in^3 (76-80). Lines starting with `*` or
//! `+` are comments.

use crate::element::{Element, Formula};
use crate::error::{ThermoError, ThermoResult};
use crate::fixed::{column, int_field, number};
use crate::propellant::{MAX_PROPELLANT_ELEMENTS, Propellant, PropellantTable};

const CAL_TO_J: f64 = 4.1868;
const LB_PER_IN3_TO_G_PER_CM3: f64 = 27.679_905;

impl PropellantTable {
    /// Parse PEP-style fixed-column propellant records.
    pub fn from_pep_str(text: &str) -> ThermoResult<Self> {
        let mut propellants = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('*') || line.starts_with('+') {
                continue;
            }
            propellants.push(parse_line(line, lineno)?);
        }
        Ok(Self::new(propellants))
    }
}

fn parse_line(line: &str, lineno: usize) -> ThermoResult<Propellant> {
    let name = column(line, 10, 39, lineno)?.trim().to_string();
    if name.is_empty() {
        return Err(ThermoError::format(Some(lineno), "missing propellant name"));
    }

    let mut pairs = Vec::with_capacity(MAX_PROPELLANT_ELEMENTS);
    for k in 0..MAX_PROPELLANT_ELEMENTS {
        let start = 40 + 5 * k;
        let count = int_field(line, start, start + 2, lineno)?;
        let symbol = column(line, start + 3, start + 4, lineno)?.trim();
        if count == 0 || symbol.is_empty() {
            continue;
        }
        let element = Element::from_symbol(symbol).map_err(|_| {
            ThermoError::format(Some(lineno), format!("{name}: unknown element '{symbol}'"))
        })?;
        pairs.push((element, count as f64));
    }
    let formula = Formula::new(pairs)?;

    let heat_cal_per_g = number(line, 70, 74, lineno)?.unwrap_or(0.0);
    let density = number(line, 76, 80, lineno)?.unwrap_or(0.0) * LB_PER_IN3_TO_G_PER_CM3;
    let heat_of_formation = heat_cal_per_g * CAL_TO_J * formula.molar_mass();

    Propellant::new(name.clone(), formula, heat_of_formation, density)
        .map_err(|e| ThermoError::format(Some(lineno), format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(id: u32, name: &str, atoms: &[(u32, &str)], heat: &str, density: &str) -> String {
        let mut line = format!("{id:<9}{name:<30}");
        for k in 0..MAX_PROPELLANT_ELEMENTS {
            match atoms.get(k) {
                Some((n, sym)) => line.push_str(&format!("{n:>3}{sym:<2}")),
                None => line.push_str("     "),
            }
        }
        line.push_str(&format!("{heat:>5} {density:>5}"));
        line
    }

    #[test]
    fn reads_records_and_converts_units() {
        let text = [
            "* PEP propellant list".to_string(),
            record(458, "HYDROGEN (CRYOGENIC)", &[(2, "H")], "-1080", ".0026"),
            "+ continuation comment".to_string(),
            record(686, "OXYGEN (LIQUID)", &[(2, "O")], "-97", ".0414"),
        ]
        .join("\n");
        let table = PropellantTable::from_pep_str(&text).unwrap();
        assert_eq!(table.len(), 2);

        let lox = table.propellant(table.search("OXYGEN (LIQUID)").unwrap()).unwrap();
        assert_relative_eq!(lox.density, 0.0414 * LB_PER_IN3_TO_G_PER_CM3, epsilon = 1e-12);
        assert_relative_eq!(
            lox.heat_of_formation,
            -97.0 * CAL_TO_J * 2.0 * 15.9994,
            epsilon = 1e-9
        );
    }

    #[test]
    fn unknown_symbol_reports_line() {
        let text = record(1, "BOGUS", &[(1, "Qq")], "0", "0");
        let err = PropellantTable::from_pep_str(&text).unwrap_err();
        assert!(matches!(err, ThermoError::FileFormat { line: Some(1), .. }));
    }
}
