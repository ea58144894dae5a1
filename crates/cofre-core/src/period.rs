//! Calendar month periods

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};

/// A validated calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    month: u32,
    year: i32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidData(format!("Invalid period {:02}/{}", month, year)))?;

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last_day = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| Error::InvalidData(format!("Invalid period {:02}/{}", month, year)))?;

        Ok(Self {
            month,
            year,
            first_day,
            last_day,
        })
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        // Any valid date yields a valid month
        Self::new(date.month(), date.year()).unwrap_or(Self {
            month: date.month(),
            year: date.year(),
            first_day: date,
            last_day: date,
        })
    }

    /// Use the given month/year, defaulting either part to `today`'s
    pub fn or_current(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<Self> {
        Self::new(
            month.unwrap_or_else(|| today.month()),
            year.unwrap_or_else(|| today.year()),
        )
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day.day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }

    /// Date of the given day of this month
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// "MM/YYYY"
    pub fn label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
