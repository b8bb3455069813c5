use std::collections::BTreeMap;

use calamine::Data;
use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::parse_date_text;

/// The value a spreadsheet cell naturally yields, before any
/// schema-driven interpretation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the cell. Number-like text is accepted because
    /// CSV sources yield every cell as text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Textual view of the cell. Numbers that carry no fraction render
    /// without a decimal point, so identifier columns stored as numeric
    /// cells (a RUC, for instance) keep their digits intact.
    pub fn into_text(self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s),
            CellValue::Number(n) => Some(render_number(n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Convert a calamine cell into the value it naturally represents.
    pub fn from_excel(cell: &Data) -> CellValue {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            Data::Float(f) => {
                if f.is_nan() || f.is_infinite() {
                    CellValue::Empty
                } else {
                    CellValue::Number(*f)
                }
            }
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Date(excel_datetime_to_date(dt)),
            Data::DateTimeIso(s) => match parse_date_text(s) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Text(s.clone()),
            },
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    /// Convert a CSV field, where everything arrives as text. Numbers
    /// and booleans are recovered; date-like text stays text until the
    /// summary step coerces the date column.
    pub fn from_csv_field(field: &str) -> CellValue {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return CellValue::Number(number);
            }
        }
        match trimmed.to_lowercase().as_str() {
            "true" => CellValue::Bool(true),
            "false" => CellValue::Bool(false),
            "null" | "nil" | "none" => CellValue::Empty,
            _ => CellValue::Text(trimmed.to_string()),
        }
    }
}

fn render_number(n: f64) -> String {
    if n.fract().abs() < f64::EPSILON && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

fn excel_datetime_to_date(dt: &calamine::ExcelDateTime) -> NaiveDate {
    use chrono::Duration;
    // Excel serial day 0 is 1899-12-30
    let excel_base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let value = dt.as_f64();
    excel_base + Duration::days(value as i64)
}

/// One row of the source table. The eight known columns land in typed
/// fields; anything else the sheet carries ends up in `extras` keyed by
/// header name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Record {
    /// Kept as raw [`CellValue`] so the summary step can coerce
    /// date-like text exactly once.
    pub date: CellValue,
    pub client_name: Option<String>,
    pub client_tax_id: Option<String>,
    pub concept: Option<String>,
    pub amount: Option<f64>,
    pub tax: Option<f64>,
    pub total: Option<f64>,
    pub client_email: Option<String>,
    pub extras: BTreeMap<String, CellValue>,
    /// Headers whose cell was empty in this row, any column.
    pub empty_columns: Vec<String>,
}

impl Record {
    /// Build a record from a header list and the row's cells. Rows
    /// shorter than the header are padded with empty cells.
    pub(crate) fn from_row(headers: &[String], cells: Vec<CellValue>) -> Record {
        let mut record = Record::default();
        let mut cells = cells;
        cells.resize(headers.len(), CellValue::Empty);

        for (header, cell) in headers.iter().zip(cells) {
            if cell.is_empty() {
                record.empty_columns.push(header.clone());
            }
            match header.as_str() {
                "date" => record.date = cell,
                "client_name" => record.client_name = cell.into_text(),
                "client_tax_id" => record.client_tax_id = cell.into_text(),
                "concept" => record.concept = cell.into_text(),
                "amount" => record.amount = cell.as_number(),
                "tax" => record.tax = cell.as_number(),
                "total" => record.total = cell.as_number(),
                "client_email" => record.client_email = cell.into_text(),
                _ => {
                    record.extras.insert(header.clone(), cell);
                }
            }
        }

        record
    }

    /// Calendar date of the record, when already in (or coerced to)
    /// date form.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        match self.date {
            CellValue::Date(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_csv_field_recovers_numbers_and_booleans() {
        assert_eq!(CellValue::from_csv_field("118.00"), CellValue::Number(118.0));
        assert_eq!(CellValue::from_csv_field(" 42 "), CellValue::Number(42.0));
        assert_eq!(CellValue::from_csv_field("true"), CellValue::Bool(true));
        assert_eq!(CellValue::from_csv_field("FALSE"), CellValue::Bool(false));
        assert_eq!(CellValue::from_csv_field(""), CellValue::Empty);
        assert_eq!(CellValue::from_csv_field("   "), CellValue::Empty);
        assert_eq!(CellValue::from_csv_field("null"), CellValue::Empty);
        assert_eq!(
            CellValue::from_csv_field("Consultoria legal"),
            CellValue::Text("Consultoria legal".to_string())
        );
    }

    #[test]
    fn test_date_like_csv_text_stays_text_until_summary() {
        assert_eq!(
            CellValue::from_csv_field("2024-01-15"),
            CellValue::Text("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_excel_cells_keep_their_natural_types() {
        assert_eq!(
            CellValue::from_excel(&Data::String("  hola  ".to_string())),
            CellValue::Text("hola".to_string())
        );
        assert_eq!(CellValue::from_excel(&Data::Float(118.0)), CellValue::Number(118.0));
        assert_eq!(CellValue::from_excel(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from_excel(&Data::Empty), CellValue::Empty);
        assert_eq!(CellValue::from_excel(&Data::Float(f64::NAN)), CellValue::Empty);
        assert_eq!(
            CellValue::from_excel(&Data::String("   ".to_string())),
            CellValue::Empty
        );
    }

    #[test]
    fn test_tax_id_from_numeric_cell_keeps_all_digits() {
        let record = Record::from_row(
            &headers(&["client_tax_id"]),
            vec![CellValue::Number(20123456789.0)],
        );
        assert_eq!(record.client_tax_id.as_deref(), Some("20123456789"));
    }

    #[test]
    fn test_unknown_columns_land_in_extras() {
        let record = Record::from_row(
            &headers(&["client_name", "sucursal"]),
            vec![
                CellValue::Text("Estudio Lopez".to_string()),
                CellValue::Text("Lima".to_string()),
            ],
        );
        assert_eq!(record.client_name.as_deref(), Some("Estudio Lopez"));
        assert_eq!(
            record.extras.get("sucursal"),
            Some(&CellValue::Text("Lima".to_string()))
        );
    }

    #[test]
    fn test_short_rows_count_trailing_columns_as_empty() {
        let record = Record::from_row(
            &headers(&["client_name", "amount", "total"]),
            vec![CellValue::Text("Estudio Lopez".to_string())],
        );
        assert_eq!(record.empty_columns, vec!["amount", "total"]);
        assert_eq!(record.amount, None);
        assert_eq!(record.total, None);
    }

    #[test]
    fn test_amount_accepts_number_like_text() {
        let record = Record::from_row(
            &headers(&["amount"]),
            vec![CellValue::Text("100.50".to_string())],
        );
        assert_eq!(record.amount, Some(100.5));
    }
}
