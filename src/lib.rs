pub mod logging;
pub mod model;
pub mod utils;

// Test utilities - only compiled when testing or with test feature
// #[cfg(test)] alone doesn't work for integration tests (they're external crates)
// The feature flag makes it available to integration tests via dev-dependencies
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use model::{
    CellValue, Dataset, DateRangeOutcome, LoadError, Record, RecordLoader, Summary, TotalsSummary,
    ValidationReport,
};

pub const ERRORS_LOG_FILE: &str = "errors.log";

/// Column names a complete receipts spreadsheet carries, in reporting order.
pub const EXPECTED_COLUMNS: [&str; 8] = [
    "date",
    "client_name",
    "client_tax_id",
    "concept",
    "amount",
    "tax",
    "total",
    "client_email",
];
