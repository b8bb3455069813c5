use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::logging::EventLog;
use crate::model::{CellValue, Dataset, Record};
use crate::utils::{looks_like_email, normalize_header, parse_date_text, write_error_to_log};
use crate::ERRORS_LOG_FILE;

/// Tolerance when checking `total == amount + tax`, half a cent.
const TOTAL_EPSILON: f64 = 0.005;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not read {} as tabular data: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    fn parse(path: &Path, message: impl Into<String>) -> LoadError {
        LoadError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Outcome of the schema check. Problems are reported, never thrown:
/// the source tolerates partial schemas and the run proceeds with
/// whatever columns are available.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Expected columns absent from the source, in expected order.
    pub columns_missing: Vec<String>,
    /// Rows with at least one empty cell, in any column.
    pub rows_with_nulls: usize,
    /// 1-based rows where `total` differs from `amount + tax`.
    pub total_mismatches: Vec<usize>,
    /// 1-based rows whose `client_email` does not look like an address.
    pub invalid_emails: Vec<usize>,
}

/// Aggregate statistics over one loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub record_count: usize,
    /// Present iff the source carries a `total` column.
    pub totals: Option<TotalsSummary>,
    pub date_range: DateRangeOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsSummary {
    pub sum: f64,
    pub mean: f64,
    /// Rows that actually carried a total value.
    pub count: usize,
}

/// Date-range result, distinguishing "no date column" from "date column
/// present but not uniformly parseable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeOutcome {
    Range { min: NaiveDate, max: NaiveDate },
    ColumnAbsent,
    /// Column present but every cell empty.
    NoDates,
    /// Some date cells could not be coerced; soft failure, the run
    /// continues without a date range.
    CoercionFailed,
}

/// Loads a tabular source, checks its shape against the expected
/// receipt schema and exposes records plus aggregate statistics.
///
/// All reporting goes through the injected [`EventLog`].
pub struct RecordLoader<'a> {
    log: &'a dyn EventLog,
}

impl<'a> RecordLoader<'a> {
    pub fn new(log: &'a dyn EventLog) -> Self {
        RecordLoader { log }
    }

    /// Whether a readable source exists at `path`. Never fails.
    pub fn locate(&self, path: &Path) -> bool {
        if path.is_file() {
            self.log
                .info(&format!("input file found: {}", path.display()));
            true
        } else {
            self.log
                .error(&format!("input file does not exist: {}", path.display()));
            false
        }
    }

    /// Parse the source at `path` into a [`Dataset`]. XLSX sources may
    /// name a sheet; the first sheet is used otherwise. CSV sources are
    /// accepted as well. Anything else is not tabular data.
    pub fn load(&self, path: &Path, sheet_name: Option<&str>) -> Result<Dataset, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let (headers, rows) = match extension.as_str() {
            "xlsx" | "xlsm" => self.read_workbook(path, sheet_name)?,
            "csv" => self.read_csv(path)?,
            other => {
                return Err(LoadError::parse(
                    path,
                    format!("unsupported extension '{other}', expected .xlsx or .csv"),
                ));
            }
        };

        if headers.iter().all(|h| h.is_empty()) {
            return Err(LoadError::parse(path, "missing header row"));
        }
        check_header_duplicates(&headers).map_err(|message| LoadError::parse(path, message))?;

        let records: Vec<Record> = rows
            .into_iter()
            .map(|cells| Record::from_row(&headers, cells))
            .collect();

        self.log.info(&format!(
            "loaded {} records from {}",
            records.len(),
            path.display()
        ));
        self.log.info(&format!("columns found: {headers:?}"));

        Ok(Dataset::new(path.to_path_buf(), headers, records))
    }

    /// Check the dataset shape against `expected_columns`. Reports
    /// missing columns, rows with empty cells, `total != amount + tax`
    /// rows and malformed email addresses. Never fails.
    pub fn validate(&self, dataset: &Dataset, expected_columns: &[&str]) -> ValidationReport {
        let columns_missing = dataset.missing_from(expected_columns);
        let rows_with_nulls = dataset
            .records()
            .iter()
            .filter(|r| !r.empty_columns.is_empty())
            .count();

        let mut total_mismatches = Vec::new();
        let mut invalid_emails = Vec::new();
        for (row_number, record) in dataset.numbered() {
            if let (Some(amount), Some(tax), Some(total)) =
                (record.amount, record.tax, record.total)
            {
                if (amount + tax - total).abs() > TOTAL_EPSILON {
                    total_mismatches.push(row_number);
                }
            }
            if let Some(email) = &record.client_email {
                if !looks_like_email(email) {
                    invalid_emails.push(row_number);
                }
            }
        }

        if columns_missing.is_empty() {
            self.log.info("all expected columns are present");
        } else {
            self.log
                .warn(&format!("missing columns: {columns_missing:?}"));
            self.log.info(&format!(
                "columns available in the source: {:?}",
                dataset.columns_present()
            ));
        }
        if rows_with_nulls > 0 {
            self.log
                .warn(&format!("{rows_with_nulls} rows have empty cells"));
        }
        if !total_mismatches.is_empty() {
            self.log.warn(&format!(
                "total differs from amount + tax in rows {total_mismatches:?}"
            ));
        }
        if !invalid_emails.is_empty() {
            self.log.warn(&format!(
                "client_email does not look like an address in rows {invalid_emails:?}"
            ));
        }

        let report = ValidationReport {
            is_valid: columns_missing.is_empty(),
            columns_missing,
            rows_with_nulls,
            total_mismatches,
            invalid_emails,
        };

        if !report.is_valid || report.rows_with_nulls > 0 || !report.total_mismatches.is_empty() {
            write_error_to_log(
                "Schema Validation Report",
                &format_validation_report(dataset, &report),
            );
            self.log
                .info(&format!("validation details written to {ERRORS_LOG_FILE}"));
        }

        report
    }

    /// Compute aggregate statistics. Mutates the dataset only through
    /// the one-time coercion of date-like text; repeated calls yield
    /// identical results.
    pub fn summarize(&self, dataset: &mut Dataset) -> Summary {
        let record_count = dataset.len();

        let totals = if dataset.has_column("total") {
            let values: Vec<f64> = dataset.records().iter().filter_map(|r| r.total).collect();
            let count = values.len();
            let sum: f64 = values.iter().sum();
            let mean = if count > 0 { sum / count as f64 } else { 0.0 };
            Some(TotalsSummary { sum, mean, count })
        } else {
            None
        };

        let date_range = self.resolve_date_range(dataset);

        match &totals {
            Some(stats) => self.log.info(&format!(
                "summary: {record_count} records, total S/ {:.2}, mean S/ {:.2}",
                stats.sum, stats.mean
            )),
            None => self
                .log
                .info(&format!("summary: {record_count} records, no total column")),
        }
        match &date_range {
            DateRangeOutcome::Range { min, max } => self
                .log
                .info(&format!("date range: {min} - {max}")),
            DateRangeOutcome::CoercionFailed => self
                .log
                .warn("date range unavailable: date column is not uniformly parseable"),
            DateRangeOutcome::ColumnAbsent | DateRangeOutcome::NoDates => {}
        }

        Summary {
            record_count,
            totals,
            date_range,
        }
    }

    /// Lazy, restartable walk over the records with 1-based positions.
    /// This is the hand-off point for the submission collaborator.
    pub fn iterate<'d>(&self, dataset: &'d Dataset) -> impl Iterator<Item = (usize, &'d Record)> {
        dataset.numbered()
    }

    /// Walk every record, reporting client and total as a progress
    /// signal. Submission to the external system plugs in here.
    pub fn process_all(&self, dataset: &Dataset) {
        self.log.info("starting record processing");
        let record_count = dataset.len();
        for (position, record) in self.iterate(dataset) {
            self.log
                .info(&format!("processing receipt {position}/{record_count}"));
            self.log.info(&format!(
                "  client: {}",
                record.client_name.as_deref().unwrap_or("<unknown>")
            ));
            match record.total {
                Some(total) => self.log.info(&format!("  total: S/ {total:.2}")),
                None => self.log.info("  total: <missing>"),
            }
        }
        self.log.info("record processing completed");
    }

    fn read_workbook(
        &self,
        path: &Path,
        sheet_name: Option<&str>,
    ) -> Result<(Vec<String>, Vec<Vec<CellValue>>), LoadError> {
        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| LoadError::parse(path, format!("could not open workbook: {e}")))?;

        let range: Range<Data> = match sheet_name {
            Some(name) => workbook
                .worksheet_range(name)
                .map_err(|e| LoadError::parse(path, format!("error reading sheet '{name}': {e}")))?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| LoadError::parse(path, "workbook has no sheets"))?
                .map_err(|e| LoadError::parse(path, format!("error reading first sheet: {e}")))?,
        };

        let mut row_iter = range.rows();
        let mut headers: Vec<String> = match row_iter.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| normalize_header(&cell.to_string()))
                .collect(),
            None => return Err(LoadError::parse(path, "sheet is empty")),
        };
        // calamine pads header rows with trailing empty cells
        while headers.last().is_some_and(|h| h.is_empty()) {
            headers.pop();
        }

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for row in row_iter {
            let cells: Vec<CellValue> = row
                .iter()
                .take(headers.len())
                .map(CellValue::from_excel)
                .collect();
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            rows.push(cells);
        }

        Ok((headers, rows))
    }

    fn read_csv(&self, path: &Path) -> Result<(Vec<String>, Vec<Vec<CellValue>>), LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| LoadError::parse(path, format!("could not open CSV: {e}")))?;

        let mut headers: Vec<String> = reader
            .headers()
            .map_err(|e| LoadError::parse(path, format!("unreadable header row: {e}")))?
            .iter()
            .map(normalize_header)
            .collect();
        while headers.last().is_some_and(|h| h.is_empty()) {
            headers.pop();
        }
        if headers.is_empty() {
            return Err(LoadError::parse(path, "missing header row"));
        }

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for result in reader.records() {
            let record =
                result.map_err(|e| LoadError::parse(path, format!("malformed CSV row: {e}")))?;
            let cells: Vec<CellValue> = record
                .iter()
                .take(headers.len())
                .map(CellValue::from_csv_field)
                .collect();
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            rows.push(cells);
        }

        Ok((headers, rows))
    }

    /// Coerce the date column once, then derive the min/max range.
    fn resolve_date_range(&self, dataset: &mut Dataset) -> DateRangeOutcome {
        if !dataset.has_column("date") {
            return DateRangeOutcome::ColumnAbsent;
        }

        if !dataset.dates_coerced() {
            for record in dataset.records_mut() {
                if let CellValue::Text(raw) = &record.date {
                    if let Some(date) = parse_date_text(raw) {
                        record.date = CellValue::Date(date);
                    }
                }
            }
            dataset.mark_dates_coerced();
        }

        // Cells the coercion pass left behind mark the column as not
        // uniformly parseable; empty cells are simply skipped.
        let mut dates: Vec<NaiveDate> = Vec::new();
        for record in dataset.records() {
            match &record.date {
                CellValue::Date(d) => dates.push(*d),
                CellValue::Empty => {}
                _ => return DateRangeOutcome::CoercionFailed,
            }
        }

        match (dates.iter().min(), dates.iter().max()) {
            (Some(&min), Some(&max)) => DateRangeOutcome::Range { min, max },
            _ => DateRangeOutcome::NoDates,
        }
    }
}

/// Duplicate column headers make row lookup ambiguous, so they fail the
/// load instead of silently overwriting cells.
fn check_header_duplicates(headers: &[String]) -> Result<(), String> {
    let mut header_positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        header_positions
            .entry(header.as_str())
            .or_default()
            .push(index);
    }

    let mut duplicates: Vec<String> = header_positions
        .iter()
        .filter(|(_, positions)| positions.len() > 1)
        .map(|(header, positions)| {
            let columns = positions
                .iter()
                .map(|p| format!("column {}", p + 1))
                .collect::<Vec<_>>()
                .join(", ");
            format!("header '{header}' appears in: {columns}")
        })
        .collect();
    duplicates.sort();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "duplicate column headers: {}",
            duplicates.join("; ")
        ))
    }
}

/// Structured text report appended to the errors log when validation
/// finds problems.
fn format_validation_report(dataset: &Dataset, report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str("=============================\n");
    out.push_str(&format!("Source: {}\n", dataset.source().display()));

    if !report.columns_missing.is_empty() {
        out.push_str(&format!("Missing columns: {:?}\n", report.columns_missing));
    }
    out.push_str(&format!("Rows with empty cells: {}\n", report.rows_with_nulls));
    if !report.total_mismatches.is_empty() {
        out.push_str(&format!(
            "Rows where total != amount + tax: {:?}\n",
            report.total_mismatches
        ));
    }
    if !report.invalid_emails.is_empty() {
        out.push_str(&format!(
            "Rows with malformed client_email: {:?}\n",
            report.invalid_emails
        ));
    }

    out.push_str("Offending rows:\n");
    for (row_number, record) in dataset.numbered() {
        let offending = !record.empty_columns.is_empty()
            || report.total_mismatches.contains(&row_number)
            || report.invalid_emails.contains(&row_number);
        if !offending {
            continue;
        }
        match serde_json::to_string(record) {
            Ok(json_data) => out.push_str(&format!("  row {row_number}: {json_data}\n")),
            Err(_) => out.push_str(&format!("  row {row_number}: [error serializing row]\n")),
        }
    }

    out
}
