//! ID formatting for sequence counters.

/// Format a sequence number into an ID string.
///
/// Replaces the `{num}` placeholder in `pattern` with `n` zero-padded to a
/// minimum of two digits, growing naturally for larger numbers:
/// `format_id("P-{num}", 7)` is `"P-07"`, `format_id("P-{num}", 123)` is
/// `"P-123"`. A pattern without `{num}` is returned unchanged.
#[must_use]
pub fn format_id(pattern: &str, n: u64) -> String {
    pattern.replace("{num}", &format!("{n:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_two_digits() {
        assert_eq!(format_id("P-{num}", 1), "P-01");
        assert_eq!(format_id("P-{num}", 7), "P-07");
    }

    #[test]
    fn test_grows_past_two_digits() {
        assert_eq!(format_id("P-{num}", 42), "P-42");
        assert_eq!(format_id("P-{num}", 123), "P-123");
    }

    #[test]
    fn test_pattern_without_placeholder() {
        assert_eq!(format_id("PLAN", 3), "PLAN");
    }

    #[test]
    fn test_placeholder_anywhere() {
        assert_eq!(format_id("{num}-inv", 9), "09-inv");
    }
}
