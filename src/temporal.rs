//! Temporal text validation and calendar arithmetic.
//!
//! Every temporal shape is validated byte-by-byte before any value is
//! built; a cell that fails its shape check falls back (substitute value,
//! original text, or NaT) instead of raising. Digit arithmetic assumes
//! ASCII, which Rust guarantees for `u8` literals.

/// Components of a validated `YYYY-MM-DD hh:mm:ss[.fff[fff]]` string.
pub(crate) struct DateTimeParts {
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) day: u32,
    pub(crate) hour: u32,
    pub(crate) minute: u32,
    pub(crate) second: u32,
    pub(crate) microsecond: u32,
}

/// Components of a validated duration string. Hours may exceed 24; this is
/// a span of time, not a clock time.
pub(crate) struct TimeParts {
    pub(crate) negative: bool,
    pub(crate) hours: u32,
    pub(crate) minutes: u32,
    pub(crate) seconds: u32,
    pub(crate) microseconds: u32,
}

fn digits(s: &[u8]) -> bool {
    s.iter().all(u8::is_ascii_digit)
}

fn int_from(s: &[u8]) -> u32 {
    s.iter().fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}

/// `YYYY-MM-DD` with the zero year, zero month, and zero day rejected.
pub(crate) fn check_date(s: &[u8]) -> bool {
    s.len() == 10
        && digits(&s[..4])
        && s[4] == b'-'
        && matches!((s[5], s[6]), (b'0', b'1'..=b'9') | (b'1', b'0'..=b'2'))
        && s[7] == b'-'
        && matches!((s[8], s[9]), (b'0'..=b'2', b'0'..=b'9') | (b'3', b'0'..=b'1'))
        && s[..4] != *b"0000"
        && !(s[8] == b'0' && s[9] == b'0')
}

/// `hh:mm:ss` clock time, hours 00-23.
fn check_clock(s: &[u8]) -> bool {
    s.len() == 8
        && matches!((s[0], s[1]), (b'0'..=b'1', b'0'..=b'9') | (b'2', b'0'..=b'3'))
        && s[2] == b':'
        && matches!((s[3], s[4]), (b'0'..=b'5', b'0'..=b'9'))
        && s[5] == b':'
        && matches!((s[6], s[7]), (b'0'..=b'5', b'0'..=b'9'))
}

fn check_milliseconds(s: &[u8]) -> bool {
    s.len() == 4 && s[0] == b'.' && digits(&s[1..])
}

fn check_microseconds(s: &[u8]) -> bool {
    s.len() == 7 && s[0] == b'.' && digits(&s[1..])
}

/// Validate and split one of the three datetime shapes: 19 bytes bare,
/// 23 bytes with a `.mmm` millisecond suffix, or 26 bytes with a `.uuuuuu`
/// microsecond suffix. The date and time halves may be separated by a space
/// or `T`.
pub(crate) fn parse_datetime(s: &[u8]) -> Option<DateTimeParts> {
    if !matches!(s.len(), 19 | 23 | 26) {
        return None;
    }

    if !(check_date(&s[..10]) && matches!(s[10], b' ' | b'T') && check_clock(&s[11..19])) {
        return None;
    }

    // the fractional suffix is validated at its own width
    let microsecond = match s.len() {
        23 if check_milliseconds(&s[19..]) => int_from(&s[20..23]) * 1_000,
        26 if check_microseconds(&s[19..]) => int_from(&s[20..26]),
        19 => 0,
        _ => return None,
    };

    Some(DateTimeParts {
        year: int_from(&s[..4]) as i32,
        month: int_from(&s[5..7]),
        day: int_from(&s[8..10]),
        hour: int_from(&s[11..13]),
        minute: int_from(&s[14..16]),
        second: int_from(&s[17..19]),
        microsecond,
    })
}

pub(crate) fn parse_date(s: &[u8]) -> Option<(i32, u32, u32)> {
    if !check_date(s) {
        return None;
    }

    Some((
        int_from(&s[..4]) as i32,
        int_from(&s[5..7]),
        int_from(&s[8..10]),
    ))
}

// 0:00:00 / 0:00:00.000 / 0:00:00.000000
// 00:00:00 / 00:00:00.000 / 00:00:00.000000
// 000:00:00 / 000:00:00.000 / 000:00:00.000000
//
/// Validate and split a duration: an optional leading `-`, one to three
/// hour digits, and an optional millisecond or microsecond suffix.
pub(crate) fn parse_duration(s: &[u8]) -> Option<TimeParts> {
    let negative = s.first() == Some(&b'-');
    let m = if negative { &s[1..] } else { s };

    let hour_digits = match m.len() {
        7 | 11 | 14 => 1,
        8 | 12 | 15 => 2,
        9 | 13 | 16 => 3,
        _ => return None,
    };

    let (hours, rest) = m.split_at(hour_digits);

    if !digits(hours) {
        return None;
    }

    if !(rest[0] == b':'
        && matches!((rest[1], rest[2]), (b'0'..=b'5', b'0'..=b'9'))
        && rest[3] == b':'
        && matches!((rest[4], rest[5]), (b'0'..=b'5', b'0'..=b'9')))
    {
        return None;
    }

    let microseconds = match rest.len() {
        6 => 0,
        10 if check_milliseconds(&rest[6..]) => int_from(&rest[7..10]) * 1_000,
        13 if check_microseconds(&rest[6..]) => int_from(&rest[7..13]),
        _ => return None,
    };

    Some(TimeParts {
        negative,
        hours: int_from(hours),
        minutes: int_from(&rest[1..3]),
        seconds: int_from(&rest[4..6]),
        microseconds,
    })
}

/// Days from the calendar origin to 1970-01-01.
pub(crate) const EPOCH_TO_DAYS: i64 = 719_528;

pub(crate) const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// mysql, for whatever reason, treats 0 as an actual year, but not a leap
// year; years > 0 follow the proleptic Gregorian rule
fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && year != 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_previous_months(month: u32, year: i32) -> i64 {
    const PREVIOUS_DAYS: [i64; 13] = [
        -31, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334,
    ];

    PREVIOUS_DAYS[month as usize] + i64::from(month > 2 && is_leap_year(year))
}

fn leap_years_before(year: i32) -> i64 {
    let y = i64::from(year);

    (y - 1) / 4 - (y - 1) / 100 + (y - 1) / 400
}

fn days_in_previous_years(year: i32) -> i64 {
    365 * i64::from(year) + leap_years_before(year)
}

pub(crate) fn to_days(year: i32, month: u32, day: u32) -> i64 {
    days_in_previous_years(year) + days_in_previous_months(month, year) + i64::from(day)
}

// The i64 nanosecond representation covers roughly years 1677-2262; values
// outside that window wrap rather than panic, as the descriptor consumer
// has no wider representation to offer anyway.

pub(crate) fn datetime_nanos(p: &DateTimeParts) -> i64 {
    let days = to_days(p.year, p.month, p.day) - EPOCH_TO_DAYS;
    let seconds = days
        .wrapping_mul(SECONDS_PER_DAY)
        .wrapping_add(i64::from(p.hour) * 3600 + i64::from(p.minute) * 60 + i64::from(p.second));

    seconds
        .wrapping_mul(1_000_000_000)
        .wrapping_add(i64::from(p.microsecond) * 1_000)
}

pub(crate) fn date_nanos(year: i32, month: u32, day: u32) -> i64 {
    (to_days(year, month, day) - EPOCH_TO_DAYS)
        .wrapping_mul(SECONDS_PER_DAY)
        .wrapping_mul(1_000_000_000)
}

pub(crate) fn duration_nanos(t: &TimeParts) -> i64 {
    let seconds =
        i64::from(t.hours) * 3600 + i64::from(t.minutes) * 60 + i64::from(t.seconds);
    let nanos = seconds * 1_000_000_000 + i64::from(t.microseconds) * 1_000;

    if t.negative {
        -nanos
    } else {
        nanos
    }
}
