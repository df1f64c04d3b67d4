use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RentalFinanceError;
use crate::RentalFinanceResult;

/// Four-digit calendar years accepted in dates and periods.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse a calendar date, truncating any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM:SS` and RFC 3339 timestamps.
/// Timestamps are reduced to their own calendar date (no timezone shifting),
/// so two instants on the same day always compare equal.
pub fn parse_date(field: &str, value: &str) -> RentalFinanceResult<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RentalFinanceError::invalid(field, "Date is required"));
    }

    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
                .into_iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        });

    match parsed {
        Some(date) if YEARS.contains(&date.year()) => Ok(date),
        Some(date) => Err(RentalFinanceError::DateError(format!(
            "Invalid {field} '{value}', year {} outside {}-{}",
            date.year(),
            YEARS.start(),
            YEARS.end()
        ))),
        None => Err(RentalFinanceError::DateError(format!(
            "Invalid {field} '{value}', expected YYYY-MM-DD"
        ))),
    }
}

/// A calendar month, serialised as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> RentalFinanceResult<Self> {
        if !YEARS.contains(&year) {
            return Err(RentalFinanceError::DateError(format!(
                "Year {year} out of range {}-{}",
                YEARS.start(),
                YEARS.end()
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(RentalFinanceError::DateError(format!(
                "Month {month} out of range 1-12"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM` (a full date is also accepted and reduced to its month).
    pub fn parse(field: &str, value: &str) -> RentalFinanceResult<Self> {
        let trimmed = value.trim();
        if let Some((y, m)) = trimmed.split_once('-') {
            if let (Ok(year), Ok(month)) = (y.parse::<i32>(), m.parse::<u32>()) {
                if y.len() == 4 && m.len() == 2 {
                    return Self::new(year, month).map_err(|_| {
                        RentalFinanceError::DateError(format!(
                            "Invalid {field} '{value}', expected year 0001-9999 and month 01-12"
                        ))
                    });
                }
            }
        }
        parse_date(field, trimmed)
            .map(Self::of)
            .map_err(|_| {
                RentalFinanceError::DateError(format!(
                    "Invalid {field} '{value}', expected YYYY-MM"
                ))
            })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // years are bounded on construction and forecasts add at most a decade,
        // so day 1 is always inside chrono's range
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Period::parse("period", &raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let d = parse_date("due_date", "2024-01-11").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    }

    #[test]
    fn test_parse_timestamp_truncates_to_date() {
        let late_evening = parse_date("paid_date", "2024-01-11T23:59:59Z").unwrap();
        let early = parse_date("paid_date", "2024-01-11T00:00:01").unwrap();
        assert_eq!(late_evening, early);
        assert_eq!(
            parse_date("d", "2024-01-11T10:30:00-03:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_is_date_error() {
        let err = parse_date("due_date", "11/01/2024").unwrap_err();
        assert!(matches!(err, RentalFinanceError::DateError(_)));
        let err = parse_date("due_date", "2024-02-30").unwrap_err();
        assert!(matches!(err, RentalFinanceError::DateError(_)));
    }

    #[test]
    fn test_empty_date_is_invalid_input() {
        let err = parse_date("due_date", "  ").unwrap_err();
        match err {
            RentalFinanceError::InvalidInput { field, .. } => assert_eq!(field, "due_date"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_period_parse_and_display() {
        let p = Period::parse("period", "2024-03").unwrap();
        assert_eq!(p.year(), 2024);
        assert_eq!(p.month(), 3);
        assert_eq!(p.to_string(), "2024-03");
        assert_eq!(Period::parse("period", "2024-03-17").unwrap(), p);
    }

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(Period::parse("period", "2024-13").is_err());
        assert!(Period::parse("period", "March").is_err());
    }

    #[test]
    fn test_period_rejects_years_outside_four_digits() {
        assert!(matches!(Period::new(0, 1), Err(RentalFinanceError::DateError(_))));
        assert!(matches!(Period::new(10_000, 1), Err(RentalFinanceError::DateError(_))));
        assert!(matches!(Period::new(300_000, 6), Err(RentalFinanceError::DateError(_))));
        assert!(Period::parse("period", "0000-05").is_err());

        let last = Period::new(9999, 12).unwrap();
        assert_eq!(last.next().first_day(), NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap());
    }

    #[test]
    fn test_dates_beyond_year_9999_rejected() {
        let err = parse_date("due_date", "+12345-01-01").unwrap_err();
        assert!(matches!(err, RentalFinanceError::DateError(_)));
    }

    #[test]
    fn test_period_next_rolls_year() {
        let dec = Period::new(2024, 12).unwrap();
        assert_eq!(dec.next(), Period::new(2025, 1).unwrap());
        assert_eq!(Period::new(2024, 5).unwrap().next().to_string(), "2024-06");
    }

    #[test]
    fn test_period_serde_roundtrip_as_string() {
        let p = Period::new(2024, 7).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"2024-07\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
