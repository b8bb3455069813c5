use tracing::{error, info, warn};

/// Logging collaborator injected into [`RecordLoader`](crate::RecordLoader).
///
/// Keeps the loader free of process-wide logger state and lets tests
/// capture every emitted line.
pub trait EventLog {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Production logger that forwards to the `tracing` macros. The binary
/// installs a `tracing_subscriber` fmt layer, so each line reaches
/// stdout timestamped and leveled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn warn(&self, message: &str) {
        warn!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}
