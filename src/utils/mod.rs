mod filesystem;
mod string;

pub use filesystem::write_error_to_log;
pub use string::{looks_like_email, normalize_header, parse_date_text};
