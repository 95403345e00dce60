// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{EntryKey, SubDepartment};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A week number is outside the fiscal year (1-52) or not an integer.
    InvalidWeekNumber {
        /// The offending value as supplied.
        value: String,
    },
    /// A week range has its start after its end.
    InvalidWeekRange {
        /// The first week of the range.
        start: u8,
        /// The last week of the range.
        end: u8,
    },
    /// Capacity cannot be recorded for a week that has already started passing.
    PastWeek {
        /// The requested week.
        week: u8,
        /// The current fiscal week.
        current_week: u32,
    },
    /// A capacity value is not a positive whole number.
    InvalidCapacityValue {
        /// The offending value as supplied.
        value: String,
    },
    /// A dollar limit is not a positive number.
    InvalidDollarLimit {
        /// The offending value as supplied.
        value: String,
    },
    /// A sub-department name is not one of the fixed set.
    InvalidSubDepartment(String),
    /// The vendor tracks by sub-department but none was supplied.
    SubDepartmentRequired {
        /// The week the entry or override targets.
        week: u8,
    },
    /// The vendor tracks at vendor level but a sub-department was supplied.
    SubDepartmentNotAllowed {
        /// The supplied sub-department.
        sub_dept: SubDepartment,
    },
    /// A sub-department has no default capacity configured.
    MissingSubDepartmentCapacity {
        /// The sub-department lacking a capacity.
        sub_dept: SubDepartment,
    },
    /// Two entries share the same `(week, sub-department)` key.
    DuplicateEntry {
        /// The duplicated key.
        key: EntryKey,
    },
    /// Tracking type string was not recognized.
    InvalidTrackingType(String),
    /// Vendor status string was not recognized.
    InvalidVendorStatus(String),
    /// Submission status string was not recognized.
    InvalidSubmissionStatus {
        /// The unrecognized status.
        status: String,
    },
    /// Submission type string was not recognized.
    InvalidSubmissionType(String),
    /// A submission status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The fiscal calendar timezone is not a known IANA zone.
    InvalidTimezone(String),
    /// The fiscal year definition is invalid.
    InvalidFiscalYear(String),
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWeekNumber { value } => {
                write!(f, "Invalid week number '{value}'. Must be 1-52")
            }
            Self::InvalidWeekRange { start, end } => {
                write!(
                    f,
                    "Invalid week range {start}-{end}: start week must not be after end week"
                )
            }
            Self::PastWeek { week, current_week } => {
                write!(
                    f,
                    "Week {week} is in the past. Current week is {current_week}"
                )
            }
            Self::InvalidCapacityValue { value } => {
                write!(
                    f,
                    "Invalid capacity value '{value}'. Must be a whole number > 0"
                )
            }
            Self::InvalidDollarLimit { value } => {
                write!(f, "Invalid dollar limit '{value}'. Must be > 0")
            }
            Self::InvalidSubDepartment(value) => {
                write!(
                    f,
                    "Invalid sub-department '{value}'. Must be one of: {}",
                    SubDepartment::valid_names()
                )
            }
            Self::SubDepartmentRequired { week } => {
                write!(f, "A sub-department is required for week {week}")
            }
            Self::SubDepartmentNotAllowed { sub_dept } => {
                write!(
                    f,
                    "Sub-department '{sub_dept}' given for a vendor tracked at vendor level"
                )
            }
            Self::MissingSubDepartmentCapacity { sub_dept } => {
                write!(f, "No default capacity configured for sub-department '{sub_dept}'")
            }
            Self::DuplicateEntry { key } => {
                write!(f, "Duplicate entry found for {}", key.describe())
            }
            Self::InvalidTrackingType(value) => write!(f, "Invalid tracking type: {value}"),
            Self::InvalidVendorStatus(value) => write!(f, "Invalid vendor status: {value}"),
            Self::InvalidSubmissionStatus { status } => {
                write!(f, "Invalid submission status: {status}")
            }
            Self::InvalidSubmissionType(value) => write!(f, "Invalid submission type: {value}"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(
                    f,
                    "Cannot transition submission from '{from}' to '{to}': {reason}"
                )
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::InvalidFiscalYear(msg) => write!(f, "Invalid fiscal year: {msg}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
