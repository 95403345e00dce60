// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calendar;
mod error;
mod identity;
mod submission;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use calendar::{Clock, FiscalCalendar, FiscalPosition, FixedClock, SystemClock};
pub use error::DomainError;
pub use identity::{
    UNKNOWN_VENDOR_NAME, classify_sub_dept_mode, compact_key, keys_match, looks_like_email,
    normalize_key, resolve_vendor_from_list, vendor_display_name,
};
pub use submission::{SubmissionStatus, SubmissionType};

// Re-export public types
pub use types::{
    CapacityEntry, EntryKey, ProductionUser, SubDepartment, SubDeptMode, TrackingType, Vendor,
    VendorProfile, VendorStatus, WEEKS_PER_YEAR, WeekNumber,
};
pub use validation::{
    parse_capacity_value, parse_dollar_limit, parse_week_number, validate_capacity_value,
    validate_entries_unique, validate_not_past_week, validate_sub_dept_for_profile,
    validate_week_range,
};
