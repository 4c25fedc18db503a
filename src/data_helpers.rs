use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::error::AnalyticsError;

/// Date formats seen in the legacy exports, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Largest serial day number a spreadsheet can hold (9999-12-31).
const MAX_SPREADSHEET_SERIAL: f64 = 2_958_465.0;

/// Read a JSON export and return its row objects.
///
/// The top level must be an array. Entries that are not objects are skipped.
pub(crate) async fn read_rows_file(path: &Path) -> Result<Vec<Value>, AnalyticsError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AnalyticsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let parsed: Value = serde_json::from_str(&raw).map_err(|source| AnalyticsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = match parsed {
        Value::Array(rows) => rows,
        other => {
            return Err(AnalyticsError::Shape {
                path: path.to_path_buf(),
                detail: format!("expected an array of rows, found {}", json_kind(&other)),
            })
        }
    };

    let total = rows.len();
    let objects: Vec<Value> = rows.into_iter().filter(Value::is_object).collect();
    if objects.len() != total {
        debug!(
            path = %path.display(),
            skipped = total - objects.len(),
            "Skipped non-object rows in export"
        );
    }
    Ok(objects)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Interpret a cell as a number. Accepts JSON numbers and numeric strings
/// with thousands separators or surrounding whitespace.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// Render a numeric cell as a label: `15` rather than `15.0`, `1.4` as is.
pub(crate) fn number_label(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Interpret a cell as a calendar date.
pub(crate) fn date_from_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n.as_f64().and_then(date_from_spreadsheet_serial),
        Value::String(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn date_from_spreadsheet_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_SPREADSHEET_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    // Numeric text from exports that stringify every cell
    if let Ok(serial) = text.parse::<f64>() {
        return date_from_spreadsheet_serial(serial);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_from_value_accepts_strings_with_separators() {
        assert_eq!(number_from_value(&json!(12.5)), Some(12.5));
        assert_eq!(number_from_value(&json!(" 1,250.75 ")), Some(1250.75));
        assert_eq!(number_from_value(&json!("")), None);
        assert_eq!(number_from_value(&json!("n/a")), None);
        assert_eq!(number_from_value(&json!("NaN")), None);
        assert_eq!(number_from_value(&json!(null)), None);
    }

    #[test]
    fn number_label_drops_trailing_zero_fraction() {
        assert_eq!(number_label(15.0), "15");
        assert_eq!(number_label(1.4), "1.4");
    }

    #[test]
    fn date_from_value_supports_export_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(date_from_value(&json!("2024-03-15")), Some(expected));
        assert_eq!(date_from_value(&json!("15/03/2024")), Some(expected));
        assert_eq!(date_from_value(&json!("15-03-2024")), Some(expected));
        assert_eq!(date_from_value(&json!("15.03.2024")), Some(expected));
        assert_eq!(
            date_from_value(&json!("2024-03-15T10:30:00Z")),
            Some(expected)
        );
        assert_eq!(
            date_from_value(&json!("2024-03-15 08:00:00")),
            Some(expected)
        );
        assert_eq!(date_from_value(&json!("soon")), None);
    }

    #[test]
    fn date_from_value_supports_spreadsheet_serials() {
        // 45366 is 2024-03-15 in the 1900 date system
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(date_from_value(&json!(45366)), Some(expected));
        assert_eq!(date_from_value(&json!(45366.75)), Some(expected));
        assert_eq!(date_from_value(&json!("45366")), Some(expected));
        assert_eq!(date_from_value(&json!(-3)), None);
    }

    #[tokio::test]
    async fn read_rows_file_skips_non_object_rows() {
        let dir = std::env::temp_dir().join(format!("erp_rows_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rows.json");
        std::fs::write(&path, r#"[{"Qty": 1}, 7, "x", {"Qty": 2}]"#).unwrap();

        let rows = read_rows_file(&path).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Qty"], json!(2));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn read_rows_file_classifies_failures() {
        let dir = std::env::temp_dir().join(format!("erp_rows_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = read_rows_file(&dir.join("absent.json")).await.unwrap_err();
        assert_eq!(missing.kind(), "read");

        let broken = dir.join("broken.json");
        std::fs::write(&broken, "[{").unwrap();
        assert_eq!(read_rows_file(&broken).await.unwrap_err().kind(), "parse");

        let object = dir.join("object.json");
        std::fs::write(&object, r#"{"rows": []}"#).unwrap();
        assert_eq!(read_rows_file(&object).await.unwrap_err().kind(), "shape");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
