// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fiscal week calendar.
//!
//! A fiscal year is 52 consecutive seven-day weeks beginning on a fixed
//! start date. Week `n` covers `start + 7(n-1)` through `start + 7(n-1) + 6`.
//!
//! ## Invariants
//!
//! - The current week is computed from the calendar date in the declared timezone
//! - Dates before the fiscal start map to week 1
//! - Dates after the last week yield week numbers above 52; callers decide
//!   whether to roll the calendar forward

use crate::error::DomainError;
use crate::types::WeekNumber;
use chrono::Datelike;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime};

/// Days in one fiscal year.
const DAYS_PER_YEAR: i64 = 364;

/// Where an instant falls relative to a fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiscalPosition {
    /// Before the first day of week 1.
    BeforeStart,
    /// Inside the fiscal year.
    InYear(WeekNumber),
    /// After the last day of week 52; carries the unclamped week number.
    AfterEnd(u32),
}

/// The fiscal year definition used to label and order weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalCalendar {
    /// The fiscal year identifier (e.g., 2026).
    year: u16,
    /// The first day of week 1.
    start_date: Date,
    /// IANA timezone used to decide the current calendar date.
    timezone: String,
}

impl FiscalCalendar {
    /// Creates a new `FiscalCalendar`.
    ///
    /// # Arguments
    ///
    /// * `year` - The fiscal year identifier
    /// * `start_date` - The first day of week 1
    /// * `timezone` - An IANA timezone name
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The year is outside 2000-2100
    /// - The timezone is not a known IANA zone
    pub fn new(year: u16, start_date: Date, timezone: &str) -> Result<Self, DomainError> {
        if !(2000..=2100).contains(&year) {
            return Err(DomainError::InvalidFiscalYear(format!(
                "year {year} is outside 2000-2100"
            )));
        }
        parse_timezone(timezone)?;

        Ok(Self {
            year,
            start_date,
            timezone: timezone.to_string(),
        })
    }

    /// The 2026 fiscal year, beginning Monday February 2, 2026, in UTC.
    #[must_use]
    pub fn fiscal_2026() -> Self {
        Self {
            year: 2026,
            start_date: time::macros::date!(2026 - 02 - 02),
            timezone: "UTC".to_string(),
        }
    }

    /// Returns the fiscal year identifier.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Returns the first day of week 1.
    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.start_date
    }

    /// Returns the declared timezone.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Returns the first day of the given week.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows.
    pub fn week_start(&self, week: WeekNumber) -> Result<Date, DomainError> {
        let offset: i64 = 7 * (i64::from(week.value()) - 1);
        self.add_days(offset, "calculating week start date")
    }

    /// Returns the last day of the given week.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows.
    pub fn week_end(&self, week: WeekNumber) -> Result<Date, DomainError> {
        let offset: i64 = 7 * (i64::from(week.value()) - 1) + 6;
        self.add_days(offset, "calculating week end date")
    }

    /// Returns the last day of the fiscal year.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows.
    pub fn end_date(&self) -> Result<Date, DomainError> {
        self.week_end(WeekNumber::LAST)
    }

    /// Formats the date range of a week as `M/D-M/D` without zero padding.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows.
    pub fn week_date_range(&self, week: WeekNumber) -> Result<String, DomainError> {
        let start: Date = self.week_start(week)?;
        let end: Date = self.week_end(week)?;
        Ok(format!(
            "{}/{}-{}/{}",
            u8::from(start.month()),
            start.day(),
            u8::from(end.month()),
            end.day()
        ))
    }

    /// Converts an instant to the calendar date in the declared timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is invalid or the date cannot be represented.
    pub fn local_date(&self, now: OffsetDateTime) -> Result<Date, DomainError> {
        let tz: Tz = parse_timezone(&self.timezone)?;
        let utc: chrono::DateTime<chrono::Utc> =
            chrono::DateTime::from_timestamp(now.unix_timestamp(), now.nanosecond())
                .ok_or_else(|| DomainError::DateArithmeticOverflow {
                    operation: format!("converting {now} to a calendar date"),
                })?;
        let local: chrono::NaiveDate = utc.with_timezone(&tz).date_naive();

        let month: Month = u8::try_from(local.month())
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("converting month of {local}"),
            })?;
        let day: u8 =
            u8::try_from(local.day()).map_err(|_| DomainError::DateArithmeticOverflow {
                operation: format!("converting day of {local}"),
            })?;

        Date::from_calendar_date(local.year(), month, day).map_err(|_| {
            DomainError::DateArithmeticOverflow {
                operation: format!("converting {local} to a calendar date"),
            }
        })
    }

    /// Computes the fiscal week number containing `now`.
    ///
    /// Dates before the fiscal start yield 1. Dates after week 52 are not
    /// clamped and yield values above 52.
    ///
    /// # Errors
    ///
    /// Returns an error if the local date cannot be determined.
    pub fn current_week_number(&self, now: OffsetDateTime) -> Result<u32, DomainError> {
        let today: Date = self.local_date(now)?;
        let days: i64 = (today - self.start_date).whole_days();
        if days < 0 {
            return Ok(1);
        }
        u32::try_from(days / 7 + 1).map_err(|_| DomainError::DateArithmeticOverflow {
            operation: format!("computing week number for {today}"),
        })
    }

    /// Classifies `now` relative to this fiscal year.
    ///
    /// # Errors
    ///
    /// Returns an error if the local date cannot be determined.
    pub fn position(&self, now: OffsetDateTime) -> Result<FiscalPosition, DomainError> {
        let today: Date = self.local_date(now)?;
        if today < self.start_date {
            return Ok(FiscalPosition::BeforeStart);
        }
        let week: u32 = self.current_week_number(now)?;
        match u8::try_from(week).ok().map(WeekNumber::new) {
            Some(Ok(week)) => Ok(FiscalPosition::InYear(week)),
            _ => Ok(FiscalPosition::AfterEnd(week)),
        }
    }

    /// Returns the fiscal year immediately following this one.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows or the year is out of range.
    pub fn following_year(&self) -> Result<Self, DomainError> {
        let start_date: Date = self.add_days(DAYS_PER_YEAR, "rolling the fiscal year forward")?;
        Self::new(self.year.saturating_add(1), start_date, &self.timezone)
    }

    /// Rolls this calendar forward until `now` is no longer past its end.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic overflows or the year is out of range.
    pub fn rolled_forward_to(&self, now: OffsetDateTime) -> Result<Self, DomainError> {
        let mut calendar: Self = self.clone();
        while matches!(calendar.position(now)?, FiscalPosition::AfterEnd(_)) {
            calendar = calendar.following_year()?;
        }
        Ok(calendar)
    }

    fn add_days(&self, days: i64, operation: &str) -> Result<Date, DomainError> {
        self.start_date
            .checked_add(Duration::days(days))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: operation.to_string(),
            })
    }
}

fn parse_timezone(timezone: &str) -> Result<Tz, DomainError> {
    timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
