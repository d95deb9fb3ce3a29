//! Lenient text-to-number conversion for CSV fields.
//!
//! Both helpers treat a missing or blank field as `None` and report
//! unparseable input with a warning plus `None`; neither ever fails.

use log::warn;

pub fn to_int_or_none(value: Option<&str>) -> Option<i64> {
    let trimmed = non_blank(value)?;
    match trimmed.parse::<i64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Could not convert '{trimmed}' to integer, storing NULL instead");
            None
        }
    }
}

/// Parses a float, accepting `,` as the decimal separator (`"12,5"` is 12.5).
pub fn to_float_or_none(value: Option<&str>) -> Option<f64> {
    let trimmed = non_blank(value)?;
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Could not convert '{trimmed}' to float, storing NULL instead");
            None
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
