use crate::error::CoreError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named look-back window, counted back from "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl Period {
    pub fn years(&self) -> u32 {
        match self {
            Period::OneYear => 1,
            Period::TwoYears => 2,
            Period::FiveYears => 5,
            Period::TenYears => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::TwoYears
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "10y" => Ok(Period::TenYears),
            other => Err(CoreError::InvalidInput(
                "period".to_string(),
                format!("'{}' is not one of 1y, 2y, 5y, 10y", other),
            )),
        }
    }
}

/// The window of history a report covers: either a named period or explicit dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Named(Period),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Horizon {
    /// Builds an explicit range. `start` must fall strictly before `end`.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::InvalidInput(
                "start/end".to_string(),
                format!("start {} must be before end {}", start, end),
            ));
        }
        Ok(Horizon::Range { start, end })
    }

    /// Resolves the horizon into an inclusive `(start, end)` date pair.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            Horizon::Named(period) => {
                let start = today
                    .checked_sub_months(Months::new(12 * period.years()))
                    .unwrap_or(NaiveDate::MIN);
                (start, today)
            }
            Horizon::Range { start, end } => (start, end),
        }
    }

    /// The label echoed back in reports, e.g. `2y` or `2023-01-02..2024-01-02`.
    pub fn label(&self) -> String {
        match self {
            Horizon::Named(period) => period.to_string(),
            Horizon::Range { start, end } => format!("{}..{}", start, end),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("5Y".parse::<Period>().unwrap(), Period::FiveYears);
        assert_eq!(" 10y ".parse::<Period>().unwrap(), Period::TenYears);
        assert!("3y".parse::<Period>().is_err());
    }

    #[test]
    fn period_serializes_as_short_label() {
        let json = serde_json::to_string(&Period::OneYear).unwrap();
        assert_eq!(json, "\"1y\"");
        let back: Period = serde_json::from_str("\"2y\"").unwrap();
        assert_eq!(back, Period::TwoYears);
    }

    #[test]
    fn named_horizon_counts_back_whole_years() {
        let today = date(2024, 2, 29);
        let (start, end) = Horizon::Named(Period::OneYear).date_range(today);
        assert_eq!(start, date(2023, 2, 28));
        assert_eq!(end, today);
    }

    #[test]
    fn explicit_range_must_be_ordered() {
        assert!(Horizon::range(date(2024, 1, 2), date(2024, 1, 2)).is_err());
        let horizon = Horizon::range(date(2023, 1, 2), date(2024, 1, 2)).unwrap();
        assert_eq!(horizon.label(), "2023-01-02..2024-01-02");
        assert_eq!(horizon.date_range(date(2030, 1, 1)), (date(2023, 1, 2), date(2024, 1, 2)));
    }
}
