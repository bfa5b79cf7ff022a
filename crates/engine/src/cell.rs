use std::fmt;

use chrono::{NaiveDate, TimeDelta};
use ordered_float::OrderedFloat;

/// A single scalar cell as typed by the loader.
///
/// Type inference happens once, at load time (calamine's cell types for
/// workbooks, numeric sniffing for delimited text). Nothing downstream
/// coerces between variants, so `Text("5")` and `Number(5.0)` are different
/// values. Workbook date cells keep their serial number in `Date` so they
/// are written back as dates.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    /// Excel serial date (1900 system); the fraction is the time of day.
    Date(f64),
    Text(String),
}

impl CellValue {
    /// Infer a cell from raw delimited-text input.
    ///
    /// Empty input is `Empty`. Input that parses as a finite number (after
    /// trimming) is `Number`. Everything else is kept verbatim as `Text`,
    /// surrounding whitespace included.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(num) = raw.trim().parse::<f64>() {
            if num.is_finite() {
                return CellValue::Number(num);
            }
        }

        CellValue::Text(raw.to_string())
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Missing means absent or the empty string. Whitespace-only text is data.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String form of the cell. Integral numbers render without a fraction.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Date(serial) => format_serial_date(*serial),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Hashable identity of the value, or `None` for a missing cell.
    pub fn key(&self) -> Option<CellKey> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.is_empty() => None,
            CellValue::Text(s) => Some(CellKey::Text(s.clone())),
            CellValue::Number(n) => Some(CellKey::Number(OrderedFloat(*n))),
            CellValue::Date(serial) => Some(CellKey::Date(OrderedFloat(*serial))),
            CellValue::Bool(b) => Some(CellKey::Bool(*b)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// `YYYY-MM-DD`, plus `HH:MM:SS` when the serial carries a time of day.
fn format_serial_date(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0));
    let millis = (serial * 86_400_000.0).round();
    let datetime = epoch.and_then(|e| {
        if millis.is_finite() && millis.abs() < i64::MAX as f64 {
            e.checked_add_signed(TimeDelta::milliseconds(millis as i64))
        } else {
            None
        }
    });
    match datetime {
        Some(dt) if millis % 86_400_000.0 == 0.0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_number(serial),
    }
}

/// Join/uniqueness key derived from a non-missing cell.
///
/// Equality is the cell's typed equality: numbers compare by value
/// (`-0.0 == 0.0`), text compares byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Bool(bool),
    Number(OrderedFloat<f64>),
    Date(OrderedFloat<f64>),
    Text(String),
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKey::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellKey::Number(n) => f.write_str(&format_number(n.0)),
            CellKey::Date(serial) => f.write_str(&format_serial_date(serial.0)),
            CellKey::Text(s) => f.write_str(s),
        }
    }
}
