// Test utilities available to both unit and integration tests
// Only compiled when testing

use std::path::PathBuf;
use std::sync::Mutex;

use crate::logging::EventLog;
use crate::model::{CellValue, Dataset, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Capturing logger stub: records every emitted line so tests can
/// assert on the loader's reporting side effects.
#[derive(Debug, Default)]
pub struct CapturingLog {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl CapturingLog {
    pub fn new() -> Self {
        CapturingLog::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(entry_level, message)| *entry_level == level && message.contains(needle))
    }
}

impl EventLog for CapturingLog {
    fn info(&self, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((LogLevel::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((LogLevel::Warn, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((LogLevel::Error, message.to_string()));
    }
}

/// Shorthand constructors for cell values in test fixtures.
#[allow(dead_code)]
pub fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

#[allow(dead_code)]
pub fn num(value: f64) -> CellValue {
    CellValue::Number(value)
}

/// Build an in-memory dataset the same way `load` would, bypassing the
/// file system.
#[allow(dead_code)]
pub fn dataset_from_rows(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Dataset {
    let headers: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let records: Vec<Record> = rows
        .into_iter()
        .map(|cells| Record::from_row(&headers, cells))
        .collect();
    Dataset::new(PathBuf::from("<in-memory>"), headers, records)
}

/// Three well-formed receipt rows covering the full expected schema.
#[allow(dead_code)]
pub fn sample_dataset() -> Dataset {
    dataset_from_rows(
        &crate::EXPECTED_COLUMNS,
        vec![
            vec![
                text("2024-01-15"),
                text("Estudio Lopez"),
                text("20123456789"),
                text("Consultoria legal"),
                num(100.0),
                num(18.0),
                num(118.0),
                text("lopez@example.com"),
            ],
            vec![
                text("2024-03-20"),
                text("Comercial Andina"),
                text("20456789012"),
                text("Asesoria contable"),
                num(200.0),
                num(36.0),
                num(236.0),
                text("andina@example.com"),
            ],
            vec![
                text("2024-02-01"),
                text("Servicios Chavez"),
                text("10789012345"),
                text("Desarrollo de software"),
                num(300.0),
                num(54.0),
                num(354.0),
                text("chavez@example.com"),
            ],
        ],
    )
}
