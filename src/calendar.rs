//! Business-day resolution over weekends and public holidays.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Forward search window before a calendar is declared unusable.
pub const DEFAULT_HORIZON_DAYS: u32 = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default = "default_holiday_kind")]
    pub kind: String,
}

fn default_holiday_kind() -> String {
    "General".to_string()
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            kind: default_holiday_kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub holidays: Vec<Holiday>,
    pub skip_weekends: bool,
    pub skip_holidays: bool,
    pub horizon_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            holidays: hong_kong_holidays_2025_2026(),
            skip_weekends: true,
            skip_holidays: true,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl CalendarConfig {
    /// Weekends skipped, no holidays.
    pub fn weekdays_only() -> Self {
        Self {
            holidays: Vec::new(),
            ..Self::default()
        }
    }
}

/// Immutable per-run view of a [`CalendarConfig`].
#[derive(Debug, Clone)]
pub struct CalendarResolver {
    holidays: BTreeMap<NaiveDate, Holiday>,
    skip_weekends: bool,
    skip_holidays: bool,
    horizon_days: u32,
}

impl CalendarResolver {
    pub fn new(config: &CalendarConfig) -> Self {
        let holidays = config
            .holidays
            .iter()
            .map(|holiday| (holiday.date, holiday.clone()))
            .collect();
        Self {
            holidays,
            skip_weekends: config.skip_weekends,
            skip_holidays: config.skip_holidays,
            horizon_days: config.horizon_days.max(1),
        }
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn holiday(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.get(&date)
    }

    pub fn is_eligible(&self, date: NaiveDate) -> bool {
        if self.skip_weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        if self.skip_holidays && self.holidays.contains_key(&date) {
            return false;
        }
        true
    }

    /// First eligible date on or after `date`.
    pub fn next_eligible_date(&self, date: NaiveDate) -> Result<NaiveDate, ConfigurationError> {
        let mut candidate = date;
        for _ in 0..=self.horizon_days {
            if self.is_eligible(candidate) {
                return Ok(candidate);
            }
            candidate = next_day(candidate)?;
        }
        Err(ConfigurationError::new(format!(
            "no eligible date within {} days of {}",
            self.horizon_days, date
        )))
    }

    /// Fail early if nothing can be scheduled from `start`.
    pub fn validate_from(&self, start: NaiveDate) -> Result<(), ConfigurationError> {
        self.next_eligible_date(start).map(|_| ())
    }

    /// Eligible days in `start..=end`.
    pub fn count_eligible_days(&self, start: NaiveDate, end: NaiveDate) -> usize {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_eligible(*day))
            .count()
    }

    /// Date of the `required_days`-th eligible day counting from `start`.
    pub fn estimate_finish_date(
        &self,
        start: NaiveDate,
        required_days: usize,
    ) -> Result<NaiveDate, ConfigurationError> {
        let mut date = self.next_eligible_date(start)?;
        for _ in 1..required_days {
            date = self.next_eligible_date(next_day(date)?)?;
        }
        Ok(date)
    }
}

pub(crate) fn next_day(date: NaiveDate) -> Result<NaiveDate, ConfigurationError> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| ConfigurationError::new(format!("date overflow after {}", date)))
}

/// Days needed to visit `total_shops` at `shops_per_day`.
pub fn estimate_required_business_days(total_shops: usize, shops_per_day: usize) -> usize {
    if shops_per_day == 0 {
        return 0;
    }
    total_shops.div_ceil(shops_per_day)
}

/// Hong Kong general holidays for 2025 and New Year 2026.
pub fn hong_kong_holidays_2025_2026() -> Vec<Holiday> {
    const DAYS: [(i32, u32, u32, &str); 18] = [
        (2025, 1, 1, "New Year's Day"),
        (2025, 1, 29, "Lunar New Year's Day"),
        (2025, 1, 30, "Second day of Lunar New Year"),
        (2025, 1, 31, "Third day of Lunar New Year"),
        (2025, 4, 4, "Ching Ming Festival"),
        (2025, 4, 18, "Good Friday"),
        (2025, 4, 19, "Day following Good Friday"),
        (2025, 4, 21, "Easter Monday"),
        (2025, 5, 1, "Labour Day"),
        (2025, 5, 5, "Buddha's Birthday"),
        (2025, 5, 31, "Tuen Ng Festival"),
        (2025, 7, 1, "HKSAR Establishment Day"),
        (2025, 10, 1, "National Day"),
        (2025, 10, 7, "Day following Mid-Autumn Festival"),
        (2025, 10, 29, "Chung Yeung Festival"),
        (2025, 12, 25, "Christmas Day"),
        (2025, 12, 26, "First weekday after Christmas Day"),
        (2026, 1, 1, "New Year's Day"),
    ];

    DAYS.iter()
        .filter_map(|&(y, m, d, name)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| Holiday {
                date,
                name: name.to_string(),
                kind: "Statutory".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver(holidays: &[NaiveDate]) -> CalendarResolver {
        CalendarResolver::new(&CalendarConfig {
            holidays: holidays.iter().map(|d| Holiday::new(*d, "test")).collect(),
            ..CalendarConfig::weekdays_only()
        })
    }

    #[test]
    fn test_eligible_date_is_returned_unchanged() {
        let monday = date(2025, 3, 3);
        assert_eq!(resolver(&[]).next_eligible_date(monday).unwrap(), monday);
    }

    #[test]
    fn test_weekend_is_skipped() {
        let saturday = date(2025, 3, 1);
        assert_eq!(resolver(&[]).next_eligible_date(saturday).unwrap(), date(2025, 3, 3));
    }

    #[test]
    fn test_holiday_after_weekend_is_skipped() {
        let cal = resolver(&[date(2025, 3, 3)]);
        assert_eq!(cal.next_eligible_date(date(2025, 3, 1)).unwrap(), date(2025, 3, 4));
    }

    #[test]
    fn test_weekends_allowed_when_not_skipped() {
        let cal = CalendarResolver::new(&CalendarConfig {
            skip_weekends: false,
            ..CalendarConfig::weekdays_only()
        });
        assert!(cal.is_eligible(date(2025, 3, 1)));
    }

    #[test]
    fn test_holidays_ignored_when_not_skipped() {
        let cal = CalendarResolver::new(&CalendarConfig {
            skip_holidays: false,
            ..CalendarConfig::default()
        });
        assert!(cal.is_eligible(date(2025, 5, 1)));
        assert!(cal.holiday(date(2025, 5, 1)).is_some());
    }

    #[test]
    fn test_exhausted_horizon_is_configuration_error() {
        let start = date(2025, 3, 3);
        let all_days: Vec<NaiveDate> = start.iter_days().take(20).collect();
        let cal = CalendarResolver::new(&CalendarConfig {
            holidays: all_days.iter().map(|d| Holiday::new(*d, "closed")).collect(),
            horizon_days: 10,
            ..CalendarConfig::weekdays_only()
        });
        assert!(cal.next_eligible_date(start).is_err());
        assert!(cal.validate_from(start).is_err());
    }

    #[test]
    fn test_count_eligible_days_in_week() {
        let cal = resolver(&[date(2025, 3, 5)]);
        // Mon 3 Mar .. Sun 9 Mar, one holiday on Wednesday
        assert_eq!(cal.count_eligible_days(date(2025, 3, 3), date(2025, 3, 9)), 4);
        assert_eq!(cal.count_eligible_days(date(2025, 3, 9), date(2025, 3, 3)), 0);
    }

    #[test]
    fn test_estimate_finish_date() {
        let cal = resolver(&[]);
        // Five business days from Monday ends Friday; six lands on next Monday.
        assert_eq!(cal.estimate_finish_date(date(2025, 3, 3), 5).unwrap(), date(2025, 3, 7));
        assert_eq!(cal.estimate_finish_date(date(2025, 3, 3), 6).unwrap(), date(2025, 3, 10));
        assert_eq!(cal.estimate_finish_date(date(2025, 3, 1), 0).unwrap(), date(2025, 3, 3));
    }

    #[test]
    fn test_required_business_days() {
        assert_eq!(estimate_required_business_days(41, 20), 3);
        assert_eq!(estimate_required_business_days(40, 20), 2);
        assert_eq!(estimate_required_business_days(10, 0), 0);
    }

    #[test]
    fn test_default_holidays_are_blackout() {
        let cal = CalendarResolver::new(&CalendarConfig::default());
        // Labour Day 2025 was a Thursday.
        assert!(!cal.is_eligible(date(2025, 5, 1)));
        assert_eq!(cal.next_eligible_date(date(2025, 5, 1)).unwrap(), date(2025, 5, 2));
    }
}
