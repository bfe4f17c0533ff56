use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single reporting period: a calendar year and a quarter in 1..=4.
///
/// Periods order chronologically (`2024-Q4 < 2025-Q1`), which the derived
/// `Ord` gives us for free from the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    pub fn new(year: i32, quarter: u8) -> Result<Self, CoreError> {
        if !(1..=4).contains(&quarter) {
            return Err(CoreError::InvalidPeriodFormat(format!("{year}-Q{quarter}")));
        }
        Ok(Self { year, quarter })
    }

    /// The canonical `YYYY-QN` label used in the ratio store and in logs.
    pub fn label(&self) -> String {
        format!("{}-Q{}", self.year, self.quarter)
    }

    /// The same quarter one calendar year earlier, used for YoY growth.
    pub fn prior_year_same_quarter(&self) -> Period {
        Period {
            year: self.year - 1,
            quarter: self.quarter,
        }
    }

    /// Q4 of the prior calendar year, the reference point for average balances.
    pub fn prior_year_q4(&self) -> Period {
        Period {
            year: self.year - 1,
            quarter: 4,
        }
    }

    /// The chronologically next period, wrapping Q4 into Q1 of the next year.
    pub fn next(&self) -> Period {
        if self.quarter == 4 {
            Period {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Period {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    /// Expands an inclusive range into an ascending list of periods.
    /// Returns an empty list when `start > end`.
    pub fn range_inclusive(start: Period, end: Period) -> Vec<Period> {
        let mut periods = Vec::new();
        let mut current = start;
        while current <= end {
            periods.push(current);
            current = current.next();
        }
        periods
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidPeriodFormat(s.to_string());

        let (year_part, quarter_part) = s.split_once("-Q").ok_or_else(invalid)?;
        if year_part.len() != 4 || quarter_part.len() != 1 {
            return Err(invalid());
        }
        // Digits only: `i32::parse` would otherwise admit a leading sign,
        // letting "+025" slip through as year 25.
        if !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let quarter: u8 = quarter_part.parse().map_err(|_| invalid())?;

        Period::new(year, quarter).map_err(|_| invalid())
    }
}
