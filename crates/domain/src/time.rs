//! Time and timestamp helpers.

use chrono::{DateTime, NaiveTime, Timelike, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for event times.
pub type Timestamp = DateTime<Utc>;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds elapsed since midnight for a wall-clock time.
#[must_use]
pub fn millis_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * 1000 + i64::from(time.nanosecond() / 1_000_000)
}

/// Build a wall-clock time from milliseconds since midnight.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimeOfDay`] when `millis` is negative or
/// not smaller than one day.
pub fn time_from_millis(millis: i64) -> Result<NaiveTime, ValidationError> {
    if !(0..MILLIS_PER_DAY).contains(&millis) {
        return Err(ValidationError::InvalidTimeOfDay(millis));
    }
    let secs = u32::try_from(millis / 1000).map_err(|_| ValidationError::InvalidTimeOfDay(millis))?;
    let nanos = u32::try_from(millis % 1000).map_err(|_| ValidationError::InvalidTimeOfDay(millis))?
        * 1_000_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .ok_or(ValidationError::InvalidTimeOfDay(millis))
}
