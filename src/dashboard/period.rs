//! Reporting periods and canonical bucket keys.
//!
//! Preset periods are trailing windows ending at the reference date: 30 days
//! for `month`, 90 for `quarter`, 365 for `year`, all inclusive. Custom
//! ranges are validated (`start <= end`) at resolution, so a malformed
//! request fails before any query runs.
//!
//! Bucket keys are the only temporal forms the output carries: `%Y-%m` for
//! months and ISO-8601 `YYYY-W##` for weeks. Week keys use the ISO
//! week-based year, so a late-December date can key into week 01 of the
//! following year.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

const MONTH_DAYS: i64 = 30;
const QUARTER_DAYS: i64 = 90;
const YEAR_DAYS: i64 = 365;

/// Reporting period selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month,
    Quarter,
    Year,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Resolve to the inclusive day range this period covers, ending at
    /// `today` for the presets.
    pub fn resolve(&self, today: NaiveDate) -> Result<PeriodRange, DashboardError> {
        match *self {
            Self::Month => Ok(PeriodRange::trailing(today, MONTH_DAYS)),
            Self::Quarter => Ok(PeriodRange::trailing(today, QUARTER_DAYS)),
            Self::Year => Ok(PeriodRange::trailing(today, YEAR_DAYS)),
            Self::Custom { start, end } => {
                if start > end {
                    return Err(DashboardError::InvalidPeriod { start, end });
                }
                Ok(PeriodRange { start, end })
            }
        }
    }
}

/// Inclusive day range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    /// Window of `days` days ending at `end`, inclusive of both bounds.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days - 1),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Smallest range covering both `self` and `other`. Used to stretch the
    /// event query window over the upcoming-deadline horizon when the
    /// reporting period does not already contain it.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Canonical month bucket key, e.g. `2026-08`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Canonical ISO-8601 week bucket key, e.g. `2026-W34`.
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn presets_resolve_to_trailing_windows() {
        let today = date(2026, 8, 22);

        let month = Period::Month.resolve(today).expect("month resolves");
        assert_eq!(month.end, today);
        assert_eq!(month.start, date(2026, 7, 24));

        let quarter = Period::Quarter.resolve(today).expect("quarter resolves");
        assert_eq!(quarter.start, date(2026, 5, 25));

        let year = Period::Year.resolve(today).expect("year resolves");
        assert_eq!(year.start, date(2025, 8, 23));
    }

    #[test]
    fn custom_range_keeps_exact_bounds() {
        let range = Period::Custom {
            start: date(2026, 1, 1),
            end: date(2026, 3, 31),
        }
        .resolve(date(2026, 8, 22))
        .expect("valid custom range resolves");
        assert_eq!(range.start, date(2026, 1, 1));
        assert_eq!(range.end, date(2026, 3, 31));
    }

    #[test]
    fn inverted_custom_range_is_rejected() {
        let err = Period::Custom {
            start: date(2026, 5, 2),
            end: date(2026, 5, 1),
        }
        .resolve(date(2026, 8, 22))
        .expect_err("inverted range must fail");
        let DashboardError::InvalidPeriod { start, end } = err else {
            panic!("expected InvalidPeriod, got {err:?}");
        };
        assert_eq!(start, date(2026, 5, 2));
        assert_eq!(end, date(2026, 5, 1));
    }

    #[test]
    fn single_day_custom_range_is_valid() {
        let day = date(2026, 5, 1);
        let range = Period::Custom {
            start: day,
            end: day,
        }
        .resolve(date(2026, 8, 22))
        .expect("single-day range resolves");
        assert!(range.contains(day));
        assert!(!range.contains(date(2026, 5, 2)));
    }

    #[test]
    fn contains_is_inclusive_at_both_bounds() {
        let range = PeriodRange {
            start: date(2026, 7, 1),
            end: date(2026, 7, 31),
        };
        assert!(range.contains(date(2026, 7, 1)));
        assert!(range.contains(date(2026, 7, 31)));
        assert!(!range.contains(date(2026, 6, 30)));
        assert!(!range.contains(date(2026, 8, 1)));
    }

    #[test]
    fn union_takes_the_outer_bounds() {
        let july = PeriodRange {
            start: date(2026, 7, 1),
            end: date(2026, 7, 31),
        };
        let horizon = PeriodRange {
            start: date(2026, 8, 22),
            end: date(2026, 9, 5),
        };

        let window = july.union(&horizon);
        assert_eq!(window.start, date(2026, 7, 1));
        assert_eq!(window.end, date(2026, 9, 5));

        // A period entirely after the horizon widens the start instead.
        let september = PeriodRange {
            start: date(2026, 9, 1),
            end: date(2026, 9, 30),
        };
        let window = september.union(&horizon);
        assert_eq!(window.start, date(2026, 8, 22));
        assert_eq!(window.end, date(2026, 9, 30));
    }

    #[test]
    fn month_keys_use_zero_padded_calendar_months() {
        assert_eq!(month_key(date(2026, 8, 22)), "2026-08");
        assert_eq!(month_key(date(2026, 11, 3)), "2026-11");
    }

    #[test]
    fn week_keys_follow_iso_week_based_year() {
        assert_eq!(week_key(date(2026, 8, 22)), "2026-W34");
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025.
        assert_eq!(week_key(date(2024, 12, 30)), "2025-W01");
        // 2021-01-01 falls in ISO week 53 of 2020.
        assert_eq!(week_key(date(2021, 1, 1)), "2020-W53");
    }
}
