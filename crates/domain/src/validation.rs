// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{CapacityEntry, EntryKey, SubDepartment, SubDeptMode, VendorProfile, WeekNumber};
use num_traits::ToPrimitive;
use std::collections::HashSet;

/// Parses a week number from text.
///
/// # Arguments
///
/// * `raw` - The value as supplied (surrounding whitespace is ignored)
///
/// # Errors
///
/// Returns an error if the value is not an integer in 1-52.
pub fn parse_week_number(raw: &str) -> Result<WeekNumber, DomainError> {
    let trimmed: &str = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| DomainError::InvalidWeekNumber {
            value: trimmed.to_string(),
        })
        .and_then(WeekNumber::from_i64)
}

/// Validates that a week has not already passed.
///
/// The current week itself is still open for submission.
///
/// # Errors
///
/// Returns `DomainError::PastWeek` if `week` is before `current_week`.
pub fn validate_not_past_week(week: WeekNumber, current_week: u32) -> Result<(), DomainError> {
    if u32::from(week.value()) < current_week {
        return Err(DomainError::PastWeek {
            week: week.value(),
            current_week,
        });
    }
    Ok(())
}

/// Validates that a range of weeks is not inverted.
///
/// # Errors
///
/// Returns `DomainError::InvalidWeekRange` if `start` is after `end`.
pub fn validate_week_range(start: WeekNumber, end: WeekNumber) -> Result<(), DomainError> {
    if start > end {
        return Err(DomainError::InvalidWeekRange {
            start: start.value(),
            end: end.value(),
        });
    }
    Ok(())
}

/// Parses a capacity value from text.
///
/// Accepts any finite number that is positive and whole, so `1500` and
/// `1500.0` are both accepted.
///
/// # Errors
///
/// Returns `DomainError::InvalidCapacityValue` if the value is not a
/// finite whole number greater than zero.
pub fn parse_capacity_value(raw: &str) -> Result<u32, DomainError> {
    let trimmed: &str = raw.trim();
    let invalid = || DomainError::InvalidCapacityValue {
        value: trimmed.to_string(),
    };

    let number: f64 = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if !number.is_finite() || number <= 0.0 || number.fract() > 0.0 {
        return Err(invalid());
    }
    number.to_u32().ok_or_else(invalid)
}

/// Validates an already-typed capacity value.
///
/// # Errors
///
/// Returns `DomainError::InvalidCapacityValue` if the value is zero.
pub fn validate_capacity_value(value: u32) -> Result<(), DomainError> {
    if value == 0 {
        return Err(DomainError::InvalidCapacityValue {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Parses a dollar limit from text, rounded to whole dollars.
///
/// # Errors
///
/// Returns `DomainError::InvalidDollarLimit` if the value is not a finite
/// number that rounds to at least one dollar.
pub fn parse_dollar_limit(raw: &str) -> Result<u64, DomainError> {
    let trimmed: &str = raw.trim();
    let invalid = || DomainError::InvalidDollarLimit {
        value: trimmed.to_string(),
    };

    let number: f64 = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if !number.is_finite() || number <= 0.0 {
        return Err(invalid());
    }
    match number.round().to_u64() {
        Some(dollars) if dollars > 0 => Ok(dollars),
        _ => Err(invalid()),
    }
}

/// Validates that an entry's sub-department matches the vendor's mode.
///
/// # Errors
///
/// Returns an error if:
/// - The vendor tracks by sub-department and `sub_dept` is `None`
/// - The vendor tracks at vendor level and `sub_dept` is set
pub fn validate_sub_dept_for_profile(
    profile: &VendorProfile,
    week: WeekNumber,
    sub_dept: Option<SubDepartment>,
) -> Result<(), DomainError> {
    match (profile.sub_dept_mode, sub_dept) {
        (SubDeptMode::BySubDept, None) => Err(DomainError::SubDepartmentRequired {
            week: week.value(),
        }),
        (SubDeptMode::VendorLevel, Some(sub_dept)) => {
            Err(DomainError::SubDepartmentNotAllowed { sub_dept })
        }
        _ => Ok(()),
    }
}

/// Validates that no two entries share a `(week, sub-department)` key.
///
/// # Errors
///
/// Returns `DomainError::DuplicateEntry` naming the first repeated key.
pub fn validate_entries_unique(entries: &[CapacityEntry]) -> Result<(), DomainError> {
    let mut seen: HashSet<EntryKey> = HashSet::with_capacity(entries.len());
    for entry in entries {
        let key: EntryKey = entry.key();
        if !seen.insert(key) {
            return Err(DomainError::DuplicateEntry { key });
        }
    }
    Ok(())
}
