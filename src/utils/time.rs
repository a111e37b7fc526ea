//! Subtitle timestamp formatting and parsing

/// Whole milliseconds in `seconds`, truncated toward zero.
///
/// Truncation works on the shortest decimal form of the value (what `{}`
/// prints), so 1.001 s stays 1001 ms and 1.9999999995 s stays 1999 ms.
/// Negative and non-finite inputs map to zero.
pub fn truncate_to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }

    let decimal = seconds.to_string();
    let (whole, fraction) = decimal.split_once('.').unwrap_or((decimal.as_str(), ""));
    let whole: u64 = whole.parse().unwrap_or(u64::MAX);
    let millis = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0u64, |acc, digit| acc * 10 + u64::from(digit - b'0'));

    whole.saturating_mul(1000).saturating_add(millis)
}

/// Format seconds as `HH:MM:SS,mmm`
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = truncate_to_millis(seconds);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Convert timestamp components back to seconds
pub fn srt_components_to_seconds(hours: u64, minutes: u64, seconds: u64, millis: u64) -> f64 {
    let total_ms = hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis;
    total_ms as f64 / 1000.0
}

/// Parse a single `HH:MM:SS,mmm` timestamp
pub fn parse_srt_timestamp(value: &str) -> Option<f64> {
    let (hms, millis) = value.trim().split_once(',')?;
    let mut parts = hms.split(':');
    let hours = parts.next()?.parse().ok()?;
    let minutes = parts.next()?.parse().ok()?;
    let seconds = parts.next()?.parse().ok()?;
    if parts.next().is_some() || millis.len() != 3 {
        return None;
    }
    let millis = millis.parse().ok()?;
    Some(srt_components_to_seconds(hours, minutes, seconds, millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero_padded() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(5.25), "00:00:05,250");
        assert_eq!(format_srt_timestamp(3723.456), "01:02:03,456");
    }

    #[test]
    fn test_format_truncates_not_rounds() {
        assert_eq!(format_srt_timestamp(2.3456), "00:00:02,345");
        assert_eq!(format_srt_timestamp(59.9999), "00:00:59,999");
    }

    #[test]
    fn test_format_survives_float_representation() {
        assert_eq!(format_srt_timestamp(1.001), "00:00:01,001");
        assert_eq!(format_srt_timestamp(0.29), "00:00:00,290");
    }

    #[test]
    fn test_format_truncates_just_below_boundary() {
        assert_eq!(format_srt_timestamp(1.9999999995), "00:00:01,999");
        assert_eq!(format_srt_timestamp(0.0009999), "00:00:00,000");
        assert_eq!(truncate_to_millis(1e-7), 0);
        assert_eq!(truncate_to_millis(1e20), u64::MAX);
    }

    #[test]
    fn test_format_clamps_negative() {
        assert_eq!(format_srt_timestamp(-4.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(f64::NAN), "00:00:00,000");
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_srt_timestamp("01:02:03,456"), Some(3723.456));
        assert_eq!(parse_srt_timestamp("00:00:00,000"), Some(0.0));
        assert_eq!(parse_srt_timestamp("00:00:03.456"), None);
        assert_eq!(parse_srt_timestamp("00:03,456"), None);
        assert_eq!(parse_srt_timestamp("aa:00:03,456"), None);
    }

    #[test]
    fn test_format_then_parse() {
        for seconds in [0.0, 0.5, 12.999, 19.04, 3600.001] {
            let parsed = parse_srt_timestamp(&format_srt_timestamp(seconds)).unwrap();
            assert_eq!(parsed, seconds);
        }
    }
}
