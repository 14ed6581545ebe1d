//! Unit-aware quantity parsing for case files.
//!
//! Quantities are written as text with a unit tag (`"53.317 bar"`,
//! `"3000 K"`, `"-1.2 MJ/kg"`) and converted to SI. A bare number is taken
//! in the SI unit of the quantity.

use pe_core::units::{Mass, Pressure, Temperature, kg, k, pa};
use std::fmt;
use thiserror::Error;

/// Dimension/quantity family of a case value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Kelvin
    Temperature,
    /// Pa, absolute
    Pressure,
    /// kg
    Mass,
    /// J/kg
    SpecificEnthalpy,
    /// J/(kg·K)
    SpecificEntropy,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature"),
            Self::Pressure => write!(f, "Absolute Pressure"),
            Self::Mass => write!(f, "Mass"),
            Self::SpecificEnthalpy => write!(f, "Specific Enthalpy"),
            Self::SpecificEntropy => write!(f, "Specific Entropy"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: Quantity },

    #[error("Ambiguous unit '{unit}': {reason}")]
    AmbiguousUnit { unit: String, reason: String },

    #[error("Value {value} out of range: {reason}")]
    OutOfRange { value: f64, reason: String },
}

/// Parse `raw_text` as `quantity`, returning the SI value.
pub fn parse_quantity(raw_text: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let trimmed = raw_text.trim();
    match quantity {
        Quantity::Temperature => parse_temperature(trimmed),
        Quantity::Pressure => parse_pressure(trimmed),
        Quantity::Mass => parse_mass(trimmed),
        Quantity::SpecificEnthalpy => parse_specific_enthalpy(trimmed),
        Quantity::SpecificEntropy => parse_specific_entropy(trimmed),
    }
}

pub fn pressure(text: &str) -> Result<Pressure, UnitError> {
    parse_quantity(text, Quantity::Pressure).map(pa)
}

pub fn temperature(text: &str) -> Result<Temperature, UnitError> {
    parse_quantity(text, Quantity::Temperature).map(k)
}

pub fn mass(text: &str) -> Result<Mass, UnitError> {
    parse_quantity(text, Quantity::Mass).map(kg)
}

/// J/kg
pub fn specific_enthalpy(text: &str) -> Result<f64, UnitError> {
    parse_quantity(text, Quantity::SpecificEnthalpy)
}

/// J/(kg·K)
pub fn specific_entropy(text: &str) -> Result<f64, UnitError> {
    parse_quantity(text, Quantity::SpecificEntropy)
}

fn unknown(unit: &str, quantity: Quantity) -> UnitError {
    UnitError::UnknownUnit {
        unit: unit.to_string(),
        quantity,
    }
}

fn parse_temperature(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let kelvin = match unit.to_lowercase().as_str() {
        "k" | "kelvin" | "" => value,
        "c" | "°c" | "celsius" => value + 273.15,
        "f" | "°f" | "fahrenheit" => (value + 459.67) * 5.0 / 9.0,
        "r" | "°r" | "rankine" => value * 5.0 / 9.0,
        _ => return Err(unknown(&unit, Quantity::Temperature)),
    };
    if kelvin <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: kelvin,
            reason: "Absolute temperature must be > 0 K".to_string(),
        });
    }
    Ok(kelvin)
}

fn parse_pressure(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let pa = match unit.to_lowercase().as_str() {
        "pa" | "pascal" | "" => value,
        "kpa" => value * 1e3,
        "mpa" => value * 1e6,
        "bar" => value * 1e5,
        "mbar" | "millibar" => value * 100.0,
        "atm" => value * 101_325.0,
        "torr" => value * 133.322,
        "psia" => value * 6_894.76,
        "psig" => (value + 14.696) * 6_894.76,
        "barg" => (value + 1.0) * 1e5,
        "psi" => {
            return Err(UnitError::AmbiguousUnit {
                unit: "psi".to_string(),
                reason: "Use 'psia' (absolute) or 'psig' (gauge)".to_string(),
            });
        }
        _ => return Err(unknown(&unit, Quantity::Pressure)),
    };
    if pa <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: pa,
            reason: "Absolute pressure must be positive".to_string(),
        });
    }
    Ok(pa)
}

fn parse_mass(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let kg = match unit.to_lowercase().as_str() {
        "kg" | "" => value,
        "g" => value / 1e3,
        "lbm" => value * 0.453_592,
        "lb" => {
            return Err(UnitError::AmbiguousUnit {
                unit: "lb".to_string(),
                reason: "Use 'lbm' for mass".to_string(),
            });
        }
        _ => return Err(unknown(&unit, Quantity::Mass)),
    };
    if kg <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: kg,
            reason: "Mass must be positive".to_string(),
        });
    }
    Ok(kg)
}

fn parse_specific_enthalpy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    match unit.to_lowercase().as_str() {
        "j/kg" | "" => Ok(value),
        "kj/kg" => Ok(value * 1e3),
        "mj/kg" => Ok(value * 1e6),
        "cal/g" => Ok(value * 4_186.8),
        "kcal/kg" => Ok(value * 4_186.8),
        "btu/lbm" => Ok(value * 2_326.0),
        _ => Err(unknown(&unit, Quantity::SpecificEnthalpy)),
    }
}

fn parse_specific_entropy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    match unit.to_lowercase().as_str() {
        "j/(kg·k)" | "j/(kg k)" | "j/(kg*k)" | "j/kg/k" | "" => Ok(value),
        "kj/(kg·k)" | "kj/(kg k)" | "kj/(kg*k)" | "kj/kg/k" => Ok(value * 1e3),
        "cal/(g·k)" | "cal/(g k)" | "cal/(g*k)" | "cal/g/k" => Ok(value * 4_186.8),
        "btu/(lbm·r)" | "btu/(lbm r)" | "btu/(lbm*r)" => Ok(value * 4_186.8),
        _ => Err(unknown(&unit, Quantity::SpecificEntropy)),
    }
}

/// Split "14.7 psia" into (14.7, "psia").
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();
    let bytes = trimmed.as_bytes();
    let mut split_idx = 0;
    while split_idx < bytes.len() {
        let c = bytes[split_idx] as char;
        let exponent = (c == 'e' || c == 'E')
            && bytes
                .get(split_idx + 1)
                .is_some_and(|n| n.is_ascii_digit() || *n == b'-' || *n == b'+');
        if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || exponent {
            split_idx += 1;
        } else {
            break;
        }
    }

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let value: f64 = num_part.trim().parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{input}'"))
    })?;
    if !value.is_finite() {
        return Err(UnitError::ParseError(format!("Non-finite value in '{input}'")));
    }
    Ok((value, unit_part.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pe_core::units::{to_bar, to_k};
    use proptest::prelude::*;

    #[test]
    fn parse_kelvin_and_celsius() {
        assert_eq!(parse_temperature("3000 K").unwrap(), 3000.0);
        assert_eq!(parse_temperature("3000K").unwrap(), 3000.0);
        assert!((parse_temperature("0C").unwrap() - 273.15).abs() < 1e-12);
        assert!(parse_temperature("-10 K").is_err());
    }

    #[test]
    fn parse_pressures() {
        assert_eq!(parse_pressure("1 bar").unwrap(), 1e5);
        assert_eq!(parse_pressure("1 atm").unwrap(), 101_325.0);
        assert!((to_bar(pressure("1000 psia").unwrap()) - 68.9476).abs() < 1e-9);
        assert!(matches!(
            parse_pressure("300 psi"),
            Err(UnitError::AmbiguousUnit { unit, .. }) if unit == "psi"
        ));
        assert!(parse_pressure("0 bar").is_err());
    }

    #[test]
    fn exponent_is_not_mistaken_for_a_unit() {
        assert_eq!(parse_pressure("5e6 Pa").unwrap(), 5e6);
        assert_eq!(parse_specific_enthalpy("-1.5e3 kJ/kg").unwrap(), -1.5e6);
    }

    #[test]
    fn mass_units() {
        assert_eq!(parse_mass("500 g").unwrap(), 0.5);
        assert!(matches!(parse_mass("2 lb"), Err(UnitError::AmbiguousUnit { .. })));
        assert!(matches!(
            parse_mass("2 stone"),
            Err(UnitError::UnknownUnit {
                quantity: Quantity::Mass,
                ..
            })
        ));
    }

    #[test]
    fn entropy_units() {
        assert_eq!(specific_entropy("10.5 kJ/(kg K)").unwrap(), 10_500.0);
        assert_eq!(to_k(temperature("540 R").unwrap()), 300.0);
    }

    proptest! {
        #[test]
        fn bar_text_round_trips(p in 1e-3f64..1e4) {
            let parsed = to_bar(pressure(&format!("{p} bar")).unwrap());
            prop_assert!((parsed - p).abs() <= 1e-12 * p);
        }
    }
}
