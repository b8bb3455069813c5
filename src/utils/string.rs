use chrono::NaiveDate;

/// Formats accepted when coercing date-like text into calendar dates.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Normalize a header cell: control characters become spaces, runs of
/// whitespace collapse to one space, surrounding whitespace goes away.
pub fn normalize_header(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Best-effort parse of date-like text. ISO datetime text keeps only
/// its date part.
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let candidate = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
}

/// Minimal shape check for email addresses: one `@`, a non-empty local
/// part and a dotted domain.
pub fn looks_like_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_collapses_whitespace_and_controls() {
        assert_eq!(normalize_header("  client_name  "), "client_name");
        assert_eq!(normalize_header("client\nname"), "client name");
        assert_eq!(normalize_header("client\t\tname"), "client name");
        assert_eq!(normalize_header(""), "");
    }

    #[test]
    fn test_parse_date_text_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date_text("2024-01-15"), Some(expected));
        assert_eq!(parse_date_text("15/01/2024"), Some(expected));
        assert_eq!(parse_date_text("2024/01/15"), Some(expected));
        assert_eq!(parse_date_text("15-01-2024"), Some(expected));
        assert_eq!(parse_date_text("2024-01-15T00:00:00"), Some(expected));
        assert_eq!(parse_date_text(" 2024-01-15 "), Some(expected));
    }

    #[test]
    fn test_parse_date_text_rejects_garbage() {
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text("2024-13-40"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("lopez@example.com"));
        assert!(looks_like_email("  lopez@example.com  "));
        assert!(!looks_like_email("lopez.example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("lopez@example"));
        assert!(!looks_like_email("lopez@.com"));
        assert!(!looks_like_email("lopez@example.com@twice"));
    }
}
