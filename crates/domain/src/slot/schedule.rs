//! Recurrence — which days and which hours a slot may fire.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{millis_of_day, time_from_millis};

const ALL_DAYS: &str = "ALL";

/// Days of the week on which a slot is active.
///
/// Text form is `"ALL"` or a comma-joined list of three-letter weekday codes
/// (`"MON,WED"`), which is also the persisted and serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActiveDays {
    #[default]
    All,
    Only(HashSet<Weekday>),
}

impl ActiveDays {
    /// Active on exactly the given weekdays.
    #[must_use]
    pub fn only(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self::Only(days.into_iter().collect())
    }

    /// Whether the slot is active on `date`.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Only(days) => days.contains(&date.weekday()),
        }
    }

    /// Check that an explicit day set is not empty.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoActiveDays`] for an empty explicit set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Only(days) if days.is_empty() => Err(ValidationError::NoActiveDays),
            _ => Ok(()),
        }
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

fn parse_weekday_code(code: &str) -> Result<Weekday, ValidationError> {
    match code.to_ascii_uppercase().as_str() {
        "MON" => Ok(Weekday::Mon),
        "TUE" => Ok(Weekday::Tue),
        "WED" => Ok(Weekday::Wed),
        "THU" => Ok(Weekday::Thu),
        "FRI" => Ok(Weekday::Fri),
        "SAT" => Ok(Weekday::Sat),
        "SUN" => Ok(Weekday::Sun),
        _ => Err(ValidationError::UnknownWeekday(code.to_string())),
    }
}

impl std::fmt::Display for ActiveDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL_DAYS),
            Self::Only(days) => {
                // Set iteration order is arbitrary; render Monday-first.
                let mut ordered: Vec<_> = days.iter().copied().collect();
                ordered.sort_by_key(Weekday::num_days_from_monday);
                let codes: Vec<_> = ordered.into_iter().map(weekday_code).collect();
                f.write_str(&codes.join(","))
            }
        }
    }
}

impl FromStr for ActiveDays {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_DAYS) {
            return Ok(Self::All);
        }
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(parse_weekday_code)
            .collect::<Result<HashSet<_>, _>>()?;
        if days.is_empty() {
            return Err(ValidationError::NoActiveDays);
        }
        Ok(Self::Only(days))
    }
}

impl TryFrom<String> for ActiveDays {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActiveDays> for String {
    fn from(value: ActiveDays) -> Self {
        value.to_string()
    }
}

/// A daily wall-clock window during which a slot may fire.
///
/// Both bounds are inclusive. Windows never cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window from two wall-clock times.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeWindow`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Build a window from milliseconds since midnight, the persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if either bound is not a time of day or
    /// the bounds are not ordered.
    pub fn from_millis(start_millis: i64, end_millis: i64) -> Result<Self, ValidationError> {
        Self::new(time_from_millis(start_millis)?, time_from_millis(end_millis)?)
    }

    #[must_use]
    pub fn start_millis(&self) -> i64 {
        millis_of_day(self.start)
    }

    #[must_use]
    pub fn end_millis(&self) -> i64 {
        millis_of_day(self.end)
    }

    /// Check that the window starts before it ends.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeWindow`] unless `start < end`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start >= self.end {
            return Err(ValidationError::InvalidTimeWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Whether `time` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }

    /// When a reminder `minutes_before` the start should go off.
    ///
    /// Returns `None` for a zero offset. Offsets reaching past midnight are
    /// clamped to midnight of the same day.
    #[must_use]
    pub fn reminder_time(&self, minutes_before: u32) -> Option<NaiveTime> {
        if minutes_before == 0 {
            return None;
        }
        let offset = TimeDelta::minutes(i64::from(minutes_before));
        let since_midnight = self.start - NaiveTime::MIN;
        if offset >= since_midnight {
            Some(NaiveTime::MIN)
        } else {
            Some(self.start - offset)
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2026-01-13 is a Tuesday.
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
    }

    #[test]
    fn should_be_active_every_day_when_all() {
        for offset in 0..7 {
            let date = tuesday() + TimeDelta::days(offset);
            assert!(ActiveDays::All.is_active_on(date));
        }
    }

    #[test]
    fn should_not_be_active_on_tuesday_when_only_mon_wed() {
        let days = ActiveDays::only([Weekday::Mon, Weekday::Wed]);
        assert!(!days.is_active_on(tuesday()));
        assert!(days.is_active_on(tuesday() + TimeDelta::days(1)));
        assert!(days.is_active_on(tuesday() - TimeDelta::days(1)));
    }

    #[test]
    fn should_parse_all_sentinel_case_insensitively() {
        assert_eq!("all".parse::<ActiveDays>().unwrap(), ActiveDays::All);
        assert_eq!(" ALL ".parse::<ActiveDays>().unwrap(), ActiveDays::All);
    }

    #[test]
    fn should_parse_comma_joined_codes() {
        let days: ActiveDays = "mon, WED,fri".parse().unwrap();
        assert_eq!(
            days,
            ActiveDays::only([Weekday::Mon, Weekday::Wed, Weekday::Fri])
        );
    }

    #[test]
    fn should_reject_unknown_weekday_code() {
        assert_eq!(
            "MON,FUN".parse::<ActiveDays>(),
            Err(ValidationError::UnknownWeekday("FUN".to_string()))
        );
    }

    #[test]
    fn should_reject_empty_day_list() {
        assert_eq!("".parse::<ActiveDays>(), Err(ValidationError::NoActiveDays));
        assert_eq!(
            ActiveDays::Only(HashSet::new()).validate(),
            Err(ValidationError::NoActiveDays)
        );
    }

    #[test]
    fn should_render_days_monday_first() {
        let days = ActiveDays::only([Weekday::Sun, Weekday::Wed, Weekday::Mon]);
        assert_eq!(days.to_string(), "MON,WED,SUN");
        assert_eq!(ActiveDays::All.to_string(), "ALL");
    }

    #[test]
    fn should_serialize_days_as_string() {
        let days = ActiveDays::only([Weekday::Tue, Weekday::Thu]);
        assert_eq!(serde_json::to_string(&days).unwrap(), "\"TUE,THU\"");
        let parsed: ActiveDays = serde_json::from_str("\"ALL\"").unwrap();
        assert_eq!(parsed, ActiveDays::All);
    }

    #[test]
    fn should_reject_window_that_does_not_start_before_end() {
        assert!(TimeWindow::new(hm(10, 0), hm(9, 0)).is_err());
        assert!(TimeWindow::new(hm(9, 0), hm(9, 0)).is_err());
    }

    #[test]
    fn should_include_both_window_bounds() {
        let w = TimeWindow::new(hm(9, 0), hm(10, 0)).unwrap();
        assert!(w.contains(hm(9, 0)));
        assert!(w.contains(hm(9, 15)));
        assert!(w.contains(hm(10, 0)));
        assert!(!w.contains(hm(8, 59)));
        assert!(!w.contains(hm(11, 0)));
    }

    #[test]
    fn should_build_window_from_millis() {
        let w = TimeWindow::from_millis(9 * 3_600_000, 10 * 3_600_000).unwrap();
        assert_eq!(w.start, hm(9, 0));
        assert_eq!(w.end_millis(), 10 * 3_600_000);
    }

    #[test]
    fn should_compute_reminder_before_start() {
        let w = TimeWindow::new(hm(9, 0), hm(10, 0)).unwrap();
        assert_eq!(w.reminder_time(0), None);
        assert_eq!(w.reminder_time(15), Some(hm(8, 45)));
    }

    #[test]
    fn should_clamp_reminder_at_midnight() {
        let w = TimeWindow::new(hm(0, 10), hm(1, 0)).unwrap();
        assert_eq!(w.reminder_time(30), Some(NaiveTime::MIN));
    }

    #[test]
    fn should_display_window_as_hours_and_minutes() {
        let w = TimeWindow::new(hm(9, 0), hm(10, 30)).unwrap();
        assert_eq!(w.to_string(), "09:00-10:30");
    }
}
