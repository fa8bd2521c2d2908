//! Spreadsheet export driven by a caller-supplied `header -> field` mapping.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::TrackerResult;

/// Ordered column mapping: each entry is (header, field key).
pub type Columns = Vec<(String, String)>;

pub fn record_columns() -> Columns {
    [
        ("Student", "student_id"),
        ("Course", "course_id"),
        ("Date", "date"),
        ("Status", "status"),
        ("Excuse", "excuse_type"),
        ("Excuse Status", "excuse_status"),
        ("Notes", "notes"),
    ]
    .into_iter()
    .map(|(h, k)| (h.to_string(), k.to_string()))
    .collect()
}

pub fn standing_columns() -> Columns {
    [
        ("Student ID", "student_id"),
        ("Name", "student_name"),
        ("Course", "course_id"),
        ("Attendance %", "attendance_rate"),
        ("Absence %", "absence_percentage"),
        ("Deprived", "is_deprived"),
    ]
    .into_iter()
    .map(|(h, k)| (h.to_string(), k.to_string()))
    .collect()
}

/// Parses `Header=field,Header=field`. A bare `field` uses itself as header.
pub fn parse_columns(spec: &str) -> Columns {
    spec.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((header, key)) => (header.trim().to_string(), key.trim().to_string()),
            None => (part.to_string(), part.to_string()),
        })
        .collect()
}

/// Writes one header row and exactly one data row per input row. Missing
/// fields become empty cells.
pub fn write_rows<W, T>(writer: W, rows: &[T], columns: &Columns) -> TrackerResult<()>
where
    W: Write,
    T: Serialize,
{
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(columns.iter().map(|(header, _)| header.as_str()))?;

    for row in rows {
        let value = serde_json::to_value(row)?;
        let cells: Vec<String> = columns.iter().map(|(_, key)| cell(&value, key)).collect();
        out.write_record(&cells)?;
    }

    out.flush()?;
    Ok(())
}

pub fn to_string<T: Serialize>(rows: &[T], columns: &Columns) -> TrackerResult<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows, columns)?;
    Ok(String::from_utf8(buffer)?)
}

fn cell(row: &Value, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.1}", f),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}
