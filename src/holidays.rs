//! US federal public holiday calendar.
//!
//! Fixed-date holidays that fall on a weekend are also observed on the
//! nearest weekday (Saturday → Friday before, Sunday → Monday after); both
//! the actual and the observed date count as holidays.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Years covered by [`HolidayCalendar::default`].
pub const DEFAULT_YEARS: RangeInclusive<i32> = 1971..=2100;

#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::us_federal(DEFAULT_YEARS)
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    let mut day = next_month.pred_opt()?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => Some(date - Duration::days(1)),
        Weekday::Sun => Some(date + Duration::days(1)),
        _ => None,
    }
}

fn federal_holidays(year: i32) -> Vec<NaiveDate> {
    let mut fixed = vec![ymd(year, 1, 1), ymd(year, 7, 4), ymd(year, 12, 25)];
    if year >= 2021 {
        fixed.push(ymd(year, 6, 19));
    }
    // Veterans Day moved to the 4th Monday of October for 1971 through 1977
    let veterans_day = if (1971..=1977).contains(&year) {
        nth_weekday(year, 10, Weekday::Mon, 4)
    } else {
        fixed.push(ymd(year, 11, 11));
        None
    };

    let mut floating = vec![
        nth_weekday(year, 2, Weekday::Mon, 3),
        last_weekday(year, 5, Weekday::Mon),
        nth_weekday(year, 9, Weekday::Mon, 1),
        nth_weekday(year, 10, Weekday::Mon, 2),
        nth_weekday(year, 11, Weekday::Thu, 4),
    ];
    if year >= 1986 {
        floating.push(nth_weekday(year, 1, Weekday::Mon, 3));
    }
    floating.push(veterans_day);

    let fixed: Vec<NaiveDate> = fixed.into_iter().flatten().collect();
    let observed_days = fixed.iter().filter_map(|d| observed(*d));

    fixed
        .iter()
        .copied()
        .chain(observed_days)
        .chain(floating.into_iter().flatten())
        .collect()
}

impl HolidayCalendar {
    pub fn us_federal(years: RangeInclusive<i32>) -> Self {
        let dates = years.flat_map(federal_holidays).collect();
        Self { dates }
    }

    /// Adds agency-specific dates on top of the federal calendar.
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.dates.extend(extra);
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_holidays_2024() {
        let cal = HolidayCalendar::default();
        assert!(cal.is_holiday(date(2024, 1, 1)));
        assert!(cal.is_holiday(date(2024, 6, 19)));
        assert!(cal.is_holiday(date(2024, 7, 4)));
        assert!(cal.is_holiday(date(2024, 11, 11)));
        assert!(cal.is_holiday(date(2024, 12, 25)));
        assert!(!cal.is_holiday(date(2024, 7, 5)));
    }

    #[test]
    fn test_floating_holidays_2024() {
        let cal = HolidayCalendar::default();
        assert!(cal.is_holiday(date(2024, 1, 15))); // MLK
        assert!(cal.is_holiday(date(2024, 2, 19))); // Washington's Birthday
        assert!(cal.is_holiday(date(2024, 5, 27))); // Memorial Day
        assert!(cal.is_holiday(date(2024, 9, 2))); // Labor Day
        assert!(cal.is_holiday(date(2024, 10, 14))); // Columbus Day
        assert!(cal.is_holiday(date(2024, 11, 28))); // Thanksgiving
        assert!(!cal.is_holiday(date(2024, 11, 21)));
    }

    #[test]
    fn test_observed_dates() {
        let cal = HolidayCalendar::default();
        // 2021-07-04 was a Sunday
        assert!(cal.is_holiday(date(2021, 7, 5)));
        // 2022-01-01 was a Saturday, observed on 2021-12-31
        assert!(cal.is_holiday(date(2021, 12, 31)));
        // 2026-07-04 is a Saturday
        assert!(cal.is_holiday(date(2026, 7, 3)));
    }

    #[test]
    fn test_juneteenth_starts_2021() {
        let cal = HolidayCalendar::default();
        assert!(!cal.is_holiday(date(2020, 6, 19)));
        assert!(cal.is_holiday(date(2021, 6, 18))); // Saturday, observed Friday
    }

    #[test]
    fn test_veterans_day_monday_years() {
        let cal = HolidayCalendar::default();
        // 1975: 4th Monday of October, no November holiday
        assert!(cal.is_holiday(date(1975, 10, 27)));
        assert!(!cal.is_holiday(date(1975, 11, 11)));
        assert!(cal.is_holiday(date(1978, 11, 11)));
        // 2023-11-11 was a Saturday, observed Friday
        assert!(cal.is_holiday(date(2023, 11, 10)));
    }

    #[test]
    fn test_outside_range_is_not_holiday() {
        let cal = HolidayCalendar::us_federal(2024..=2024);
        assert!(!cal.is_holiday(date(2025, 1, 1)));
        assert!(cal.is_holiday(date(2024, 1, 1)));
    }

    #[test]
    fn test_with_extra() {
        let cal = HolidayCalendar::us_federal(2024..=2024).with_extra([date(2024, 12, 24)]);
        assert!(cal.is_holiday(date(2024, 12, 24)));
    }
}
