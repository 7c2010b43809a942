use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::cache_key::ParamValue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Window start {start} is not before end {end}")]
    Empty { start: NaiveDate, end: NaiveDate },

    #[error("Lookback of {days} days is not one of {allowed:?}")]
    LookbackNotAllowed { days: u32, allowed: Vec<u32> },

    #[error("Date out of range computing a {0}-day window")]
    OutOfRange(i64),
}

/// A half-open `[start, end)` range of calendar days.
///
/// Adjacent windows built with [`TimeWindow::preceding`] share a boundary
/// without overlapping: the previous window's `end` is this window's `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days immediately before `end`.
    pub fn trailing(end: NaiveDate, days: u32) -> Result<Self, WindowError> {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or(WindowError::OutOfRange(i64::from(days)))?;
        Self::new(start, end)
    }

    /// `today` and the `days` calendar days before it, ending tomorrow.
    pub fn through(today: NaiveDate, days: u32) -> Result<Self, WindowError> {
        let end = today.succ_opt().ok_or(WindowError::OutOfRange(1))?;
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or(WindowError::OutOfRange(i64::from(days)))?;
        Self::new(start, end)
    }

    /// The window of equal length that ends where this one starts.
    pub fn preceding(&self) -> Result<Self, WindowError> {
        let len = self.len_days();
        let start = self
            .start
            .checked_sub_signed(Duration::days(len))
            .ok_or(WindowError::OutOfRange(len))?;
        Self::new(start, self.start)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Bound parameters for `>= ?start AND < ?end` filters, in that order.
    pub fn params(&self) -> [ParamValue; 2] {
        [ParamValue::Date(self.start), ParamValue::Date(self.end)]
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A lookback selection, validated against the day counts a view offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lookback(u32);

impl Lookback {
    pub fn select(days: u32, allowed: &[u32]) -> Result<Self, WindowError> {
        if allowed.contains(&days) {
            Ok(Self(days))
        } else {
            Err(WindowError::LookbackNotAllowed {
                days,
                allowed: allowed.to_vec(),
            })
        }
    }

    pub fn days(&self) -> u32 {
        self.0
    }

    /// The lookback window ending (exclusive) at `today`.
    pub fn window_ending(&self, today: NaiveDate) -> Result<TimeWindow, WindowError> {
        TimeWindow::trailing(today, self.0)
    }
}
