//! Reader for NASA CEA `thermo.inp` fixed-column records.
//!
//! Per species (columns 1-based):
//! - line 1: name (first token of cols 1-24)
//! - line 2: interval count (1-2), formula as five (symbol A2, count F6.2)
//!   pairs (11-50), phase flag (51-52, 0 = gas), molar mass (53-65), heat
//!   of formation or assigned enthalpy in J/mol (66-80)
//! - per interval, three lines: range (1-11, 12-22), coefficient count
//!   (23), exponents 8F5.1 (24-63), H(298.15)-H(0) (66-80); five
//!   coefficients 5D16.8; two or three more coefficients (1-48) followed by
//!   b1, b2 (49-80)
//! - zero intervals: a single line holding the assigned-enthalpy temperature
//!
//! `thermo` opens the file and is followed by a global range line; `END
//! PRODUCTS` separates products from reactants; `END REACTANTS` ends it.
//! Species containing symbols outside the periodic table (the electron `E`
//! of ionic species) are skipped.

use crate::element::{Element, Formula};
use crate::error::{ThermoError, ThermoResult};
use crate::fixed::{column, int_field, number, required};
use crate::species::{Interval, Phase, PolyTerm, Species};
use crate::table::SpeciesTable;

impl SpeciesTable {
    /// Parse CEA `thermo.inp` text.
    pub fn from_cea_str(text: &str) -> ThermoResult<Self> {
        let mut reader = LineReader::new(text);
        let mut species = Vec::new();
        let mut skipped = 0usize;

        while let Some((lineno, line)) = reader.next_record() {
            let upper = line.trim().to_ascii_uppercase();
            if upper.starts_with("THERMO") {
                // global temperature-range line
                reader.next_record();
                continue;
            }
            if upper.starts_with("END REACTANTS") {
                break;
            }
            if upper.starts_with("END") {
                continue;
            }
            match parse_species(lineno, line, &mut reader)? {
                Some(sp) => species.push(sp),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "skipped species with unsupported elements");
        }
        Ok(Self::new(species))
    }
}

struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    /// Next non-blank, non-comment line with its 1-based number.
    fn next_record(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .by_ref()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .find(|(_, l)| !l.trim().is_empty() && !l.starts_with('!'))
    }

    fn expect(&mut self, after: usize, what: &str) -> ThermoResult<(usize, &'a str)> {
        self.next_record().ok_or_else(|| {
            ThermoError::format(Some(after), format!("unexpected end of file, expected {what}"))
        })
    }
}

fn parse_species(
    name_line_no: usize,
    name_line: &str,
    reader: &mut LineReader<'_>,
) -> ThermoResult<Option<Species>> {
    let name = column(name_line, 1, 24, name_line_no)?
        .split_whitespace()
        .next()
        .ok_or_else(|| ThermoError::format(Some(name_line_no), "missing species name"))?
        .to_string();

    let (no, line) = reader.expect(name_line_no, "species header")?;
    let n_intervals = int_field(line, 1, 2, no)?;
    let mut pairs = Vec::new();
    let mut unsupported = false;
    for k in 0..5 {
        let start = 11 + 8 * k;
        let symbol = column(line, start, start + 1, no)?.trim();
        let count = number(line, start + 2, start + 7, no)?.unwrap_or(0.0);
        if symbol.is_empty() || count == 0.0 {
            continue;
        }
        match Element::from_symbol(symbol) {
            Ok(e) => pairs.push((e, count)),
            Err(_) => unsupported = true,
        }
    }
    let phase = if int_field(line, 51, 52, no)? == 0 {
        Phase::Gas
    } else {
        Phase::Condensed
    };
    let molar_mass = required(line, 53, 65, no, "molar mass")?;
    let heat_of_formation = required(line, 66, 80, no, "heat of formation")?;

    let mut intervals = Vec::with_capacity(n_intervals);
    let mut h298_offset = 0.0;
    if n_intervals == 0 {
        // assigned-enthalpy temperature line
        reader.expect(no, "assigned enthalpy temperature")?;
    }
    for _ in 0..n_intervals {
        let (l3_no, l3) = reader.expect(no, "interval range")?;
        let t_low = required(l3, 1, 11, l3_no, "interval low temperature")?;
        let t_high = required(l3, 12, 22, l3_no, "interval high temperature")?;
        let n_coef = int_field(l3, 23, 23, l3_no)?;
        if !(1..=8).contains(&n_coef) {
            return Err(ThermoError::format(
                Some(l3_no),
                format!("{name}: coefficient count {n_coef} outside 1..=8"),
            ));
        }
        let exponents = (0..n_coef)
            .map(|k| required(l3, 24 + 5 * k, 28 + 5 * k, l3_no, "exponent"))
            .collect::<ThermoResult<Vec<_>>>()?;
        h298_offset = number(l3, 66, 80, l3_no)?.unwrap_or(0.0);

        let (l4_no, l4) = reader.expect(l3_no, "coefficients")?;
        let (l5_no, l5) = reader.expect(l4_no, "coefficients and integration constants")?;
        let mut coefficients = Vec::with_capacity(8);
        for k in 0..5 {
            coefficients.push(number(l4, 1 + 16 * k, 16 + 16 * k, l4_no)?.unwrap_or(0.0));
        }
        for k in 0..3 {
            coefficients.push(number(l5, 1 + 16 * k, 16 + 16 * k, l5_no)?.unwrap_or(0.0));
        }
        let b1 = required(l5, 49, 64, l5_no, "b1")?;
        let b2 = required(l5, 65, 80, l5_no, "b2")?;

        let terms = exponents
            .into_iter()
            .zip(coefficients)
            .map(|(exponent, coefficient)| PolyTerm {
                exponent,
                coefficient,
            })
            .collect();
        intervals.push(Interval {
            t_low,
            t_high,
            terms,
            b1,
            b2,
        });
    }

    if unsupported {
        return Ok(None);
    }
    let formula = Formula::new(pairs)
        .map_err(|e| ThermoError::format(Some(no), format!("{name}: {e}")))?;
    let species = Species {
        name,
        formula,
        phase,
        molar_mass,
        heat_of_formation,
        h298_offset,
        intervals,
    };
    species
        .validate()
        .map_err(|what| ThermoError::format(Some(name_line_no), what))?;
    Ok(Some(species))
}
