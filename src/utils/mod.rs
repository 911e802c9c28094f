// Tue Jan 13 2026 - Alex

pub mod logging;

pub use logging::LoggingUtils;

use std::time::Duration;

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();

    if total_secs < 0.001 {
        format!("{}µs", duration.as_micros())
    } else if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", total_secs)
    }
}

/// Accepts `64`, `0x40` and `0X40`.
pub fn parse_offset(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| format!("Invalid offset '{}', expected decimal or 0x-prefixed hex", s))
}

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("64"), Ok(64));
        assert_eq!(parse_offset("0x40"), Ok(64));
        assert_eq!(parse_offset(" 0XfF "), Ok(255));
        assert!(parse_offset("0x").is_err());
        assert!(parse_offset("-4").is_err());
        assert!(parse_offset("ten").is_err());
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "field", "fields"), "1 field");
        assert_eq!(pluralize(3, "field", "fields"), "3 fields");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(12)), "12ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
    }
}
