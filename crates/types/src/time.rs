//! Epoch-nanosecond timestamp helpers.
//!
//! The core represents every instant as `i64` UTC epoch nanoseconds and
//! derives the civil day by integer division; the settlement roll only needs
//! day identity, never a calendar object.

use crate::error::CoreError;

/// Nanoseconds per civil day.
pub const NS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// Civil day number (days since the Unix epoch) for a timestamp.
///
/// Uses euclidean division so pre-epoch timestamps still group correctly.
#[must_use]
pub fn day_of(timestamp_ns: i64) -> i64 {
    timestamp_ns.div_euclid(NS_PER_DAY)
}

/// Which end of the day a date-only string resolves to.
#[derive(Debug, Clone, Copy)]
pub enum DateBoundary {
    /// 00:00:00
    Start,
    /// 23:59:59.999999999
    End,
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DDTHH:MM:SS[Z]`
/// into UTC epoch nanoseconds.
///
/// Date-only inputs snap to the requested [`DateBoundary`].
///
/// # Errors
/// Returns [`CoreError::DateParse`] for empty or malformed input.
pub fn parse_datetime_ns(value: &str, boundary: DateBoundary) -> Result<i64, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::DateParse("empty datetime".to_string()));
    }

    let (date_part, time_part) = match value.split_once(['T', ' ']) {
        Some((date, time)) => (date, Some(time.trim_end_matches('Z'))),
        None => (value, None),
    };

    let (year, month, day) = parse_date(date_part)?;
    let (hour, minute, second) = match time_part {
        Some(time) => parse_time(time)?,
        None => match boundary {
            DateBoundary::Start => (0, 0, 0),
            DateBoundary::End => (23, 59, 59),
        },
    };

    let seconds = days_from_civil(year, month, day) * 86_400
        + i64::from(hour) * 3_600
        + i64::from(minute) * 60
        + i64::from(second);

    let mut ns = seconds
        .checked_mul(1_000_000_000)
        .ok_or_else(|| CoreError::DateParse(format!("datetime out of range: {value}")))?;
    if time_part.is_none() {
        if let DateBoundary::End = boundary {
            ns += 999_999_999;
        }
    }
    Ok(ns)
}

fn parse_date(date: &str) -> Result<(i32, u32, u32), CoreError> {
    let mut parts = date.splitn(3, '-');
    let year: i32 = parse_field(parts.next(), date, "year")?;
    let month: u32 = parse_field(parts.next(), date, "month")?;
    let day: u32 = parse_field(parts.next(), date, "day")?;

    if !(1..=12).contains(&month) {
        return Err(CoreError::DateParse(format!("invalid month in '{date}'")));
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(CoreError::DateParse(format!("invalid day in '{date}'")));
    }
    Ok((year, month, day))
}

fn parse_time(time: &str) -> Result<(u32, u32, u32), CoreError> {
    let mut parts = time.splitn(3, ':');
    let hour: u32 = parse_field(parts.next(), time, "hour")?;
    let minute: u32 = parse_field(parts.next(), time, "minute")?;
    let second: u32 = match parts.next() {
        Some(sec) => parse_field(Some(sec), time, "second")?,
        None => 0,
    };

    if hour > 23 || minute > 59 || second > 59 {
        return Err(CoreError::DateParse(format!("invalid time '{time}'")));
    }
    Ok((hour, minute, second))
}

fn parse_field<T: std::str::FromStr>(
    part: Option<&str>,
    input: &str,
    what: &str,
) -> Result<T, CoreError> {
    part.and_then(|p| p.parse().ok())
        .ok_or_else(|| CoreError::DateParse(format!("invalid {what} in '{input}'")))
}

// Howard Hinnant's civil-from-days algorithm, inverted.
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let m = i64::from(month);
    let d = i64::from(day);
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
