mod dataset;
mod loader;
mod record;

pub use dataset::Dataset;
pub use loader::{
    DateRangeOutcome, LoadError, RecordLoader, Summary, TotalsSummary, ValidationReport,
};
pub use record::{CellValue, Record};
