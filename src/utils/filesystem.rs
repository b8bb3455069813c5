use std::fs::OpenOptions;
use std::io::Write;

use crate::ERRORS_LOG_FILE;

/// Centralized appender for the errors log file. Each section carries a
/// UTC timestamp and a report type so runs can be told apart. A failure
/// to write is swallowed: the report is advisory and must not take the
/// run down.
pub fn write_error_to_log(report_type: &str, report_body: &str) {
    let timestamp = chrono::Utc::now().to_rfc3339();

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(ERRORS_LOG_FILE)
    {
        let _ = writeln!(file, "\n[{timestamp}] {report_type}:\n{report_body}");
    }
}
