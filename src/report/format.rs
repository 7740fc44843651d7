// src/report/format.rs

//! Display formatters handed to the renderer.

use chrono::Local;
use serde::Serialize;

use crate::diff::{FieldValue, ScanField};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Formatter {
    /// `15.5 MB`
    Bytes,
    /// `8,704,351`
    Count,
    /// `+3`, `-2`, `0`
    Delta,
    /// Local time, `2024-01-31 17:04:05`
    Timestamp,
    Text,
}

impl Formatter {
    pub fn for_field(field: ScanField) -> Self {
        match field {
            ScanField::DataScanned | ScanField::DataRead => Formatter::Bytes,
            ScanField::EngineVersion => Formatter::Text,
            _ => Formatter::Count,
        }
    }

    /// Values of a kind the formatter does not handle are shown as text.
    pub fn apply(self, value: &FieldValue) -> String {
        match (self, value) {
            (Formatter::Bytes, FieldValue::Bytes(b)) => human_size(*b),
            (Formatter::Bytes, FieldValue::Count(n)) => human_size(*n as f64),
            (Formatter::Count, FieldValue::Count(n)) => group_thousands(*n),
            (Formatter::Delta, FieldValue::Count(n)) if *n > 0 => format!("+{}", group_thousands(*n)),
            (Formatter::Delta, FieldValue::Count(n)) => group_thousands(*n),
            (Formatter::Timestamp, FieldValue::Time(t)) => {
                t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
            }
            (_, other) => other.to_string(),
        }
    }
}

fn human_size(bytes: f64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", value.round() as i64, SIZE_UNITS[0])
    } else {
        format!("{:.1} {}", value, SIZE_UNITS[unit])
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_human_readable() {
        assert_eq!(Formatter::Bytes.apply(&FieldValue::Bytes(512.0)), "512 B");
        assert_eq!(Formatter::Bytes.apply(&FieldValue::Bytes(15.5 * 1_048_576.0)), "15.5 MB");
        assert_eq!(Formatter::Bytes.apply(&FieldValue::Bytes(3.0 * 1024.0 * 1024.0 * 1024.0)), "3.0 GB");
    }

    #[test]
    fn counts_and_deltas() {
        assert_eq!(Formatter::Count.apply(&FieldValue::Count(8_704_351)), "8,704,351");
        assert_eq!(Formatter::Count.apply(&FieldValue::Count(999)), "999");
        assert_eq!(Formatter::Delta.apply(&FieldValue::Count(1_500)), "+1,500");
        assert_eq!(Formatter::Delta.apply(&FieldValue::Count(-2)), "-2");
        assert_eq!(Formatter::Delta.apply(&FieldValue::Count(0)), "0");
    }

    #[test]
    fn mismatched_kind_falls_back_to_text() {
        assert_eq!(Formatter::Count.apply(&FieldValue::Text("0.103.8".into())), "0.103.8");
    }
}
