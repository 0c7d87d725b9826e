//! `lines` parameter validation

use crate::error::LogsError;

/// Lines returned when the caller gives none
pub const DEFAULT_LINES: u32 = 50;
/// Smallest accepted `lines`
pub const MIN_LINES: u32 = 1;
/// Largest accepted `lines`
pub const MAX_LINES: u32 = 500;

/// Smallest window scanned for kernel messages
const MIN_LOOKBACK: u32 = 200;

/// Parse an optional `lines` argument
///
/// Absent or blank input yields [`DEFAULT_LINES`].
///
/// # Errors
/// Returns `LogsError::LinesNotInteger` for non-numeric input and
/// `LogsError::LinesOutOfRange` outside `MIN_LINES..=MAX_LINES`
pub fn parse_lines(raw: Option<&str>) -> Result<u32, LogsError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_LINES);
    };

    // Parse as i64 so "-5" is out of range rather than not-an-integer
    let parsed: i64 = raw.parse().map_err(|_| LogsError::LinesNotInteger)?;
    if parsed < i64::from(MIN_LINES) || parsed > i64::from(MAX_LINES) {
        return Err(LogsError::LinesOutOfRange {
            min: MIN_LINES,
            max: MAX_LINES,
        });
    }

    Ok(u32::try_from(parsed).unwrap_or(DEFAULT_LINES))
}

/// How many trailing lines of `/var/log/messages` to scan for `lines` hits
#[must_use]
pub fn lookback(lines: u32) -> u32 {
    lines.saturating_mul(4).clamp(MIN_LOOKBACK, MAX_LINES * 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_when_absent_or_blank() {
        assert_eq!(parse_lines(None).unwrap(), 50);
        assert_eq!(parse_lines(Some("")).unwrap(), 50);
        assert_eq!(parse_lines(Some("   ")).unwrap(), 50);
    }

    #[test]
    fn test_accepts_bounds() {
        assert_eq!(parse_lines(Some("1")).unwrap(), 1);
        assert_eq!(parse_lines(Some("50")).unwrap(), 50);
        assert_eq!(parse_lines(Some(" 500 ")).unwrap(), 500);
    }

    #[test]
    fn test_rejects_out_of_range() {
        for raw in ["0", "501", "-5", "99999999999"] {
            let err = parse_lines(Some(raw)).unwrap_err();
            assert!(
                matches!(err, LogsError::LinesOutOfRange { min: 1, max: 500 }),
                "{raw}: {err}"
            );
        }
        assert_eq!(
            parse_lines(Some("0")).unwrap_err().to_string(),
            "lines must be between 1 and 500"
        );
    }

    #[test]
    fn test_rejects_non_integer() {
        for raw in ["abc", "1.5", "10 lines"] {
            let err = parse_lines(Some(raw)).unwrap_err();
            assert!(matches!(err, LogsError::LinesNotInteger), "{raw}");
        }
        assert_eq!(
            parse_lines(Some("abc")).unwrap_err().to_string(),
            "lines must be an integer"
        );
    }

    #[test]
    fn test_lookback_clamped() {
        assert_eq!(lookback(1), 200);
        assert_eq!(lookback(50), 200);
        assert_eq!(lookback(100), 400);
        assert_eq!(lookback(500), 2000);
        assert_eq!(lookback(u32::MAX), 2000);
    }
}
