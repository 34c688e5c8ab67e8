//! Calendar version derivation.
//!
//! Versions read `{year}.{month}{day:02}.{increment}`, e.g. `2024.115.3` for
//! the fourth release on January 15th 2024. The increment restarts at zero
//! on a new day.

use crate::error::{Result, VersionError};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A date-based release version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarVersion {
    /// Release date
    pub date: NaiveDate,
    /// Release number within the day
    pub increment: u32,
}

impl CalendarVersion {
    /// Next version for `today` given the name of the last published release
    pub fn next(today: NaiveDate, last_release: Option<&str>) -> Result<Self> {
        let prefix = date_prefix(today);

        let increment = match last_release.and_then(|name| name.strip_prefix(prefix.as_str())) {
            Some(rest) => {
                let last = rest.parse::<u32>().map_err(|_| VersionError::InvalidIncrement {
                    last: format!("{prefix}{rest}"),
                    increment: rest.to_string(),
                })?;
                last + 1
            }
            None => 0,
        };

        Ok(Self {
            date: today,
            increment,
        })
    }

    /// Date prefix shared by every version released on this date
    pub fn prefix(&self) -> String {
        date_prefix(self.date)
    }
}

impl fmt::Display for CalendarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.increment)
    }
}

/// `{year}.{month}{day:02}.` for a date
pub fn date_prefix(date: NaiveDate) -> String {
    format!("{}.{}{:02}.", date.year(), date.month(), date.day())
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
