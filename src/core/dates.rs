use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::warn;

use crate::core::{AppError, Result};

/// How wire dates that fail RFC3339 parsing are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateParsing {
    /// Unparseable or empty input becomes the zero date
    #[default]
    Lenient,
    /// Unparseable or empty input is a validation error
    Strict,
}

impl FromStr for DateParsing {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(AppError::Configuration(format!(
                "Unknown date parsing policy: {}",
                other
            ))),
        }
    }
}

/// 0001-01-01T00:00:00Z, the value stored for dates that were never supplied
pub fn zero_date() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse an RFC3339 wire date for `field` according to `policy`
///
/// An empty string is an absent field and yields the zero date under both
/// policies.
pub fn parse_wire_date(field: &str, raw: &str, policy: DateParsing) -> Result<DateTime<Utc>> {
    if raw.is_empty() {
        return Ok(zero_date());
    }

    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(e) => match policy {
            DateParsing::Lenient => {
                warn!(field, value = raw, "Unparseable date, storing zero date");
                Ok(zero_date())
            }
            DateParsing::Strict => Err(AppError::validation(format!(
                "Field '{}' is not a valid RFC3339 date ({}): {}",
                field, raw, e
            ))),
        },
    }
}

/// Add calendar months keeping day of month and time of day.
///
/// Days past the end of the target month roll over into the next one,
/// so Jan 31 + 1 month is Mar 2 in a leap year.
pub fn add_months(date: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12))
        .map_err(|_| AppError::validation("Due date out of range"))?;
    let month = (total.rem_euclid(12) + 1) as u32;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation("Due date out of range"))?;
    let day = first_of_month
        .checked_add_signed(Duration::days(i64::from(date.day()) - 1))
        .ok_or_else(|| AppError::validation("Due date out of range"))?;

    Ok(day.and_time(date.time()).and_utc())
}

/// Month count between two instants, counting both ends.
///
/// Same month yields 1, January to March yields 3.
pub fn inclusive_month_span(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32) + 1
}
