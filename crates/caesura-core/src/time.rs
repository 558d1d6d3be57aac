//! Microsecond time base shared by the schedule and both insertion modes.
//!
//! All stored positions and durations are `i64` microseconds in content
//! time. Ad SDKs report cue points as rounded floating-point seconds, so
//! conversions and epsilon matching live here.

/// Reserved position meaning "at the end of content" (postroll).
pub const TIME_END_OF_SOURCE: i64 = i64::MIN;

pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Tolerance when matching an SDK cue (rounded seconds) against a stored
/// microsecond time.
pub const CUE_MATCH_EPSILON_US: i64 = 1_000;

/// Convert an SDK cue point to microseconds.
///
/// SDKs use `-1.0` seconds for "end of content"; that maps to
/// [`TIME_END_OF_SOURCE`].
#[allow(clippy::cast_possible_truncation)]
pub fn cue_us_from_secs(secs: f64) -> i64 {
    if secs == -1.0 {
        TIME_END_OF_SOURCE
    } else {
        (secs * MICROS_PER_SECOND as f64).round() as i64
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn secs_from_us(us: i64) -> f64 {
    if us == TIME_END_OF_SOURCE {
        -1.0
    } else {
        us as f64 / MICROS_PER_SECOND as f64
    }
}

/// True when `a` and `b` are within `epsilon_us` of each other.
/// The postroll sentinel only matches itself.
pub fn us_within_epsilon(a: i64, b: i64, epsilon_us: i64) -> bool {
    if a == TIME_END_OF_SOURCE || b == TIME_END_OF_SOURCE {
        return a == b;
    }
    a.abs_diff(b) <= epsilon_us.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.5, 1_500_000)]
    #[case(100.0, 100_000_000)]
    #[case(-1.0, TIME_END_OF_SOURCE)]
    fn cue_conversion(#[case] secs: f64, #[case] expected_us: i64) {
        assert_eq!(cue_us_from_secs(secs), expected_us);
    }

    #[test]
    fn cue_conversion_rounds() {
        // 10.000001 s is representable; 10.0000004 s rounds down.
        assert_eq!(cue_us_from_secs(10.000_001), 10_000_001);
        assert_eq!(cue_us_from_secs(10.000_000_4), 10_000_000);
    }

    #[test]
    fn secs_round_trip_preserves_sentinel() {
        assert_eq!(cue_us_from_secs(secs_from_us(TIME_END_OF_SOURCE)), TIME_END_OF_SOURCE);
    }

    #[rstest]
    #[case(10_000_000, 10_000_500, 1_000, false)]
    #[case(10_000_000, 10_000_999, 1_000, false)]
    #[case(10_000_000, 10_001_001, 1_000, true)]
    fn epsilon_matching(
        #[case] a: i64,
        #[case] b: i64,
        #[case] epsilon: i64,
        #[case] outside: bool,
    ) {
        assert_eq!(us_within_epsilon(a, b, epsilon), !outside);
    }

    #[test]
    fn sentinel_only_matches_itself() {
        assert!(us_within_epsilon(TIME_END_OF_SOURCE, TIME_END_OF_SOURCE, 1_000));
        assert!(!us_within_epsilon(TIME_END_OF_SOURCE, i64::MIN + 1, 1_000));
        assert!(!us_within_epsilon(0, TIME_END_OF_SOURCE, i64::MAX));
    }
}
