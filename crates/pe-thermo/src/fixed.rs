//! Fixed-column record helpers shared by the legacy table readers.

use crate::error::{ThermoError, ThermoResult};

/// 1-based inclusive column slice; columns past the end read as blank.
pub(crate) fn column(line: &str, start: usize, end: usize, lineno: usize) -> ThermoResult<&str> {
    if !line.is_ascii() {
        return Err(ThermoError::format(Some(lineno), "non-ASCII record"));
    }
    let len = line.len();
    if start > len {
        return Ok("");
    }
    Ok(&line[start - 1..end.min(len)])
}

/// Fortran real (D or E exponent); `None` when the field is blank.
pub(crate) fn number(line: &str, start: usize, end: usize, lineno: usize) -> ThermoResult<Option<f64>> {
    let raw = column(line, start, end, lineno)?.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.replace(['D', 'd'], "E")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ThermoError::format(Some(lineno), format!("bad number '{raw}' in cols {start}-{end}")))
}

pub(crate) fn required(line: &str, start: usize, end: usize, lineno: usize, what: &str) -> ThermoResult<f64> {
    number(line, start, end, lineno)?
        .ok_or_else(|| ThermoError::format(Some(lineno), format!("missing {what}")))
}

pub(crate) fn int_field(line: &str, start: usize, end: usize, lineno: usize) -> ThermoResult<usize> {
    let raw = column(line, start, end, lineno)?.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<usize>()
        .map_err(|_| ThermoError::format(Some(lineno), format!("bad integer '{raw}' in cols {start}-{end}")))
}
