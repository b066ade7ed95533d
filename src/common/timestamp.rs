// SPDX-License-Identifier: MIT

//! Timestamp normalization utilities.
//!
//! Rows carry timestamps as `i64` microseconds since Unix epoch, so time
//! comparisons inside guards are plain integer arithmetic. This module also
//! resolves the textual `M/D/YYYY H:MM` datetime form the sample datasets
//! use into that representation — the engine itself never sees text.

/// Microseconds per second.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Microseconds per minute.
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;

/// Microseconds per hour.
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// Microseconds per day (`24 * 60 * 60 * 1_000_000`).
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// Parses a `M/D/YYYY H:MM` datetime into microseconds since Unix epoch.
///
/// Returns `None` for anything malformed: wrong field counts, non-numeric
/// components, or out-of-range month/day/hour/minute values. The format has
/// no timezone; timestamps are interpreted as UTC, which is consistent as
/// long as the whole dataset uses one zone (guards only compare gaps).
#[must_use]
pub fn parse_datetime(text: &str) -> Option<i64> {
    let (date, time) = text.trim().split_once(' ')?;

    let mut date_parts = date.splitn(3, '/');
    let month: u32 = date_parts.next()?.parse().ok()?;
    let day: u32 = date_parts.next()?.parse().ok()?;
    let year: i64 = date_parts.next()?.parse().ok()?;

    let (hour_s, minute_s) = time.trim().split_once(':')?;
    let hour: i64 = hour_s.parse().ok()?;
    let minute: i64 = minute_s.parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
        return None;
    }

    let days = days_from_civil(year, month, day);
    days.checked_mul(MICROS_PER_DAY)?
        .checked_add(hour * MICROS_PER_HOUR)?
        .checked_add(minute * MICROS_PER_MINUTE)
}

/// Days from 1970-01-01 to the given proleptic Gregorian date.
///
/// Standard civil-calendar conversion over 400-year eras; handles the
/// 4/100/400 leap rules without table lookups.
const fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (month as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_origin() {
        assert_eq!(parse_datetime("1/1/1970 0:00"), Some(0));
    }

    #[test]
    fn test_known_instant() {
        // 2018-01-01T00:00:00Z = 1_514_764_800 s; plus one day and 5h30m.
        assert_eq!(
            parse_datetime("1/2/2018 5:30"),
            Some(1_514_871_000 * MICROS_PER_SECOND)
        );
    }

    #[test]
    fn test_minute_granularity() {
        let t0 = parse_datetime("1/2/2018 5:30").unwrap();
        let t1 = parse_datetime("1/2/2018 5:35").unwrap();
        assert_eq!(t1 - t0, 5 * MICROS_PER_MINUTE);
    }

    #[test]
    fn test_leap_day() {
        let feb28 = parse_datetime("2/28/2016 0:00").unwrap();
        let feb29 = parse_datetime("2/29/2016 0:00").unwrap();
        let mar01 = parse_datetime("3/1/2016 0:00").unwrap();
        assert_eq!(feb29 - feb28, MICROS_PER_DAY);
        assert_eq!(mar01 - feb29, MICROS_PER_DAY);
    }

    #[test]
    fn test_century_boundary() {
        // 2000 is a leap year (divisible by 400).
        let feb28 = parse_datetime("2/28/2000 0:00").unwrap();
        let mar01 = parse_datetime("3/1/2000 0:00").unwrap();
        assert_eq!(mar01 - feb28, 2 * MICROS_PER_DAY);
    }

    #[test]
    fn test_pre_epoch() {
        assert_eq!(parse_datetime("12/31/1969 23:59"), Some(-MICROS_PER_MINUTE));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("1/2/2018"), None); // missing time
        assert_eq!(parse_datetime("1/2 5:30"), None); // missing year
        assert_eq!(parse_datetime("abc def"), None);
        assert_eq!(parse_datetime("1/2/2018 5"), None); // missing minutes
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(parse_datetime("13/1/2018 5:30"), None); // month
        assert_eq!(parse_datetime("0/1/2018 5:30"), None);
        assert_eq!(parse_datetime("1/32/2018 5:30"), None); // day
        assert_eq!(parse_datetime("1/0/2018 5:30"), None);
        assert_eq!(parse_datetime("1/2/2018 24:00"), None); // hour
        assert_eq!(parse_datetime("1/2/2018 5:60"), None); // minute
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        assert_eq!(parse_datetime(" 1/1/1970 0:00 "), Some(0));
    }

    #[test]
    fn test_constants_consistent() {
        assert_eq!(MICROS_PER_MINUTE, 60_000_000);
        assert_eq!(MICROS_PER_HOUR, 3_600_000_000);
        assert_eq!(MICROS_PER_DAY, 86_400_000_000);
    }
}
