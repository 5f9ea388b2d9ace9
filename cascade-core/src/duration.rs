//! Timeout expression parsing.
//!
//! The CLI accepts free-form duration syntax ("45s", "2m", "1h30m") while the
//! conductor's blocking get consumes a budget in whole seconds. Conversion
//! truncates sub-second remainders toward zero, except that a positive
//! sub-second duration is rounded up to one second so a well-formed timeout
//! never degenerates to an instant poll.

use crate::error::{CascadeError, CascadeResult};

/// Blocking budget used when the caller supplies no --timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parse an optional duration expression into whole seconds.
pub fn parse_timeout(input: Option<&str>) -> CascadeResult<u64> {
    let Some(raw) = input else {
        return Ok(DEFAULT_TIMEOUT_SECS);
    };

    let parsed = humantime::parse_duration(raw.trim()).map_err(|e| {
        CascadeError::InvalidDuration {
            input: raw.to_string(),
            message: e.to_string(),
        }
    })?;

    if parsed.is_zero() {
        return Err(CascadeError::InvalidDuration {
            input: raw.to_string(),
            message: "timeout must be positive".to_string(),
        });
    }

    let secs = parsed.as_secs();
    if secs == 0 {
        // e.g. "250ms": truncation would yield zero
        Ok(1)
    } else {
        Ok(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_input_defaults_to_thirty() {
        assert_eq!(parse_timeout(None).unwrap(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout(None).unwrap(), 30);
    }

    #[test]
    fn test_whole_second_expressions() {
        assert_eq!(parse_timeout(Some("45s")).unwrap(), 45);
        assert_eq!(parse_timeout(Some("2m")).unwrap(), 120);
        assert_eq!(parse_timeout(Some("1h30m")).unwrap(), 5400);
    }

    #[test]
    fn test_seconds_track_milliseconds() {
        // output x 1000 matches the parsed millisecond value for whole-second input
        for (expr, expected_ms) in [("45s", 45_000u128), ("2m", 120_000), ("90s", 90_000)] {
            let secs = parse_timeout(Some(expr)).unwrap();
            assert_eq!(u128::from(secs) * 1000, expected_ms);
        }
    }

    #[test]
    fn test_truncation_is_documented_behavior() {
        assert_eq!(parse_timeout(Some("90500ms")).unwrap(), 90);
    }

    #[test]
    fn test_subsecond_rounds_up_to_one() {
        assert_eq!(parse_timeout(Some("250ms")).unwrap(), 1);
        assert_eq!(parse_timeout(Some("999ms")).unwrap(), 1);
    }

    #[test]
    fn test_zero_rejected() {
        let err = parse_timeout(Some("0s")).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidDuration { .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = parse_timeout(Some("soon")).unwrap_err();
        match err {
            CascadeError::InvalidDuration { input, .. } => assert_eq!(input, "soon"),
            other => panic!("expected InvalidDuration, got {other:?}"),
        }
    }
}
