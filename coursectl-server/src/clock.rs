//! Calendar source for deadline checks
//!
//! Drop eligibility compares "today" against a course deadline. The date is
//! read through [`Clock`] so tests can pin it without touching wall time.

use chrono::{Local, NaiveDate};

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date in the server's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Build from year/month/day, returning `None` for impossible dates.
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
