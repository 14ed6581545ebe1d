//! Chemical elements and elemental formulas.
//!
//! Elements are keyed by atomic number everywhere. Symbol lookup is
//! case-insensitive so database spellings such as `AL` and `Al` resolve to
//! the same element and never double count.

use crate::error::{ThermoError, ThermoResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// (symbol, standard atomic weight in g/mol), indexed by atomic number - 1.
const PERIODIC_TABLE: [(&str, f64); 92] = [
    ("H", 1.00794),
    ("He", 4.002602),
    ("Li", 6.941),
    ("Be", 9.012182),
    ("B", 10.811),
    ("C", 12.0107),
    ("N", 14.0067),
    ("O", 15.9994),
    ("F", 18.9984032),
    ("Ne", 20.1797),
    ("Na", 22.98977),
    ("Mg", 24.305),
    ("Al", 26.981538),
    ("Si", 28.0855),
    ("P", 30.973761),
    ("S", 32.065),
    ("Cl", 35.453),
    ("Ar", 39.948),
    ("K", 39.0983),
    ("Ca", 40.078),
    ("Sc", 44.95591),
    ("Ti", 47.867),
    ("V", 50.9415),
    ("Cr", 51.9961),
    ("Mn", 54.938049),
    ("Fe", 55.845),
    ("Co", 58.9332),
    ("Ni", 58.6934),
    ("Cu", 63.546),
    ("Zn", 65.409),
    ("Ga", 69.723),
    ("Ge", 72.64),
    ("As", 74.9216),
    ("Se", 78.96),
    ("Br", 79.904),
    ("Kr", 83.798),
    ("Rb", 85.4678),
    ("Sr", 87.62),
    ("Y", 88.90585),
    ("Zr", 91.224),
    ("Nb", 92.90638),
    ("Mo", 95.94),
    ("Tc", 98.0),
    ("Ru", 101.07),
    ("Rh", 102.9055),
    ("Pd", 106.42),
    ("Ag", 107.8682),
    ("Cd", 112.411),
    ("In", 114.818),
    ("Sn", 118.71),
    ("Sb", 121.76),
    ("Te", 127.6),
    ("I", 126.90447),
    ("Xe", 131.293),
    ("Cs", 132.90545),
    ("Ba", 137.327),
    ("La", 138.9055),
    ("Ce", 140.116),
    ("Pr", 140.90765),
    ("Nd", 144.24),
    ("Pm", 145.0),
    ("Sm", 150.36),
    ("Eu", 151.964),
    ("Gd", 157.25),
    ("Tb", 158.92534),
    ("Dy", 162.5),
    ("Ho", 164.93032),
    ("Er", 167.259),
    ("Tm", 168.93421),
    ("Yb", 173.04),
    ("Lu", 174.967),
    ("Hf", 178.49),
    ("Ta", 180.9479),
    ("W", 183.84),
    ("Re", 186.207),
    ("Os", 190.23),
    ("Ir", 192.217),
    ("Pt", 195.078),
    ("Au", 196.96655),
    ("Hg", 200.59),
    ("Tl", 204.3833),
    ("Pb", 207.2),
    ("Bi", 208.98038),
    ("Po", 209.0),
    ("At", 210.0),
    ("Rn", 222.0),
    ("Fr", 223.0),
    ("Ra", 226.0),
    ("Ac", 227.0),
    ("Th", 232.0381),
    ("Pa", 231.03588),
    ("U", 238.02891),
];

/// A chemical element, identified by atomic number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub fn from_atomic_number(z: u8) -> ThermoResult<Self> {
        if (1..=PERIODIC_TABLE.len()).contains(&(z as usize)) {
            Ok(Self(z))
        } else {
            Err(ThermoError::NotFound {
                kind: "element",
                name: z.to_string(),
            })
        }
    }

    /// Case-insensitive symbol lookup.
    pub fn from_symbol(symbol: &str) -> ThermoResult<Self> {
        atomic_number(symbol).map(Self)
    }

    pub fn atomic_number(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        PERIODIC_TABLE[self.0 as usize - 1].0
    }

    /// Standard atomic weight, g/mol.
    pub fn atomic_mass(self) -> f64 {
        PERIODIC_TABLE[self.0 as usize - 1].1
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Atomic number for an element symbol, ignoring case.
pub fn atomic_number(symbol: &str) -> ThermoResult<u8> {
    let symbol = symbol.trim();
    PERIODIC_TABLE
        .iter()
        .position(|(s, _)| s.eq_ignore_ascii_case(symbol))
        .map(|i| (i + 1) as u8)
        .ok_or_else(|| ThermoError::NotFound {
            kind: "element",
            name: symbol.to_string(),
        })
}

/// Elemental formula: (element, count) pairs sorted by atomic number.
///
/// Counts are real so surrogate fuels (e.g. CH1.9423) are expressible.
/// Repeated elements are merged on construction.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct Formula {
    atoms: Vec<(Element, f64)>,
}

impl Formula {
    pub fn new(pairs: impl IntoIterator<Item = (Element, f64)>) -> ThermoResult<Self> {
        let mut atoms: Vec<(Element, f64)> = Vec::new();
        for (element, count) in pairs {
            if !count.is_finite() || count < 0.0 {
                return Err(ThermoError::InvalidArg {
                    what: "element count must be finite and non-negative",
                });
            }
            if count == 0.0 {
                continue;
            }
            match atoms.iter_mut().find(|(e, _)| *e == element) {
                Some((_, n)) => *n += count,
                None => atoms.push((element, count)),
            }
        }
        atoms.sort_by_key(|(e, _)| *e);
        Ok(Self { atoms })
    }

    /// Parse a compact formula such as `H2O`, `Al2O3` or `CH1.9423`.
    ///
    /// Symbols are case-sensitive here (`CO` is carbon monoxide, `Co` cobalt).
    pub fn parse(text: &str) -> ThermoResult<Self> {
        let not_found = || ThermoError::NotFound {
            kind: "formula",
            name: text.to_string(),
        };
        let chars: Vec<char> = text.trim().chars().collect();
        if chars.is_empty() {
            return Err(not_found());
        }
        let mut pairs = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if !chars[i].is_ascii_uppercase() {
                return Err(not_found());
            }
            let mut symbol = chars[i].to_string();
            i += 1;
            if i < chars.len() && chars[i].is_ascii_lowercase() {
                symbol.push(chars[i]);
                i += 1;
            }
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let count = if start == i {
                1.0
            } else {
                let digits: String = chars[start..i].iter().collect();
                digits.parse::<f64>().map_err(|_| not_found())?
            };
            let element = PERIODIC_TABLE
                .iter()
                .position(|(s, _)| *s == symbol)
                .map(|idx| Element((idx + 1) as u8))
                .ok_or_else(not_found)?;
            pairs.push((element, count));
        }
        Self::new(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.atoms.iter().copied()
    }

    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.atoms.iter().map(|(e, _)| *e)
    }

    /// Count of `element` (0.0 when absent).
    pub fn count(&self, element: Element) -> f64 {
        self.atoms
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, n)| *n)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Molar mass from standard atomic weights, g/mol.
    pub fn molar_mass(&self) -> f64 {
        self.atoms.iter().map(|(e, n)| e.atomic_mass() * n).sum()
    }

    /// True when every element of this formula appears in `available`.
    pub fn is_subset_of(&self, available: &[Element]) -> bool {
        self.atoms.iter().all(|(e, _)| available.contains(e))
    }
}

impl TryFrom<BTreeMap<String, f64>> for Formula {
    type Error = ThermoError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let pairs = map
            .into_iter()
            .map(|(symbol, count)| Element::from_symbol(&symbol).map(|e| (e, count)))
            .collect::<ThermoResult<Vec<_>>>()?;
        Self::new(pairs)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (element, count) in &self.atoms {
            if (*count - 1.0).abs() < 1e-12 {
                write!(f, "{element}")?;
            } else {
                write!(f, "{element}{count}")?;
            }
        }
        Ok(())
    }
}
