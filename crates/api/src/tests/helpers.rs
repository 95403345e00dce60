// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AuthenticatedActor, PortalSession, RefreshPolicy};
use capacity_portal::{SnapshotPayload, Submission};
use capacity_portal_domain::{
    CapacityEntry, FiscalCalendar, ProductionUser, SubDeptMode, SubmissionStatus, SubmissionType,
    TrackingType, Vendor, VendorProfile, VendorStatus, WeekNumber,
};
use capacity_portal_persistence::InMemoryStore;
use time::{Duration, OffsetDateTime};

pub const VENDOR_PASSWORD: &str = "vendor-pass";
pub const REVIEWER_EMAIL: &str = "lead@example.com";
pub const REVIEWER_PASSWORD: &str = "review-pass";

pub fn week(value: u8) -> WeekNumber {
    WeekNumber::new(value).unwrap()
}

pub fn calendar() -> FiscalCalendar {
    FiscalCalendar::fiscal_2026()
}

/// Midday on the first day of the given fiscal week.
pub fn now_in_week(value: u8) -> OffsetDateTime {
    calendar()
        .week_start(week(value))
        .unwrap()
        .midnight()
        .assume_utc()
        + Duration::hours(12)
}

pub fn create_test_vendor(
    id: &str,
    tracking: TrackingType,
    sub_dept_mode: SubDeptMode,
    status: VendorStatus,
) -> Vendor {
    Vendor {
        id: id.to_string(),
        name: format!("Vendor {id}"),
        profile: VendorProfile::new(tracking, sub_dept_mode),
        status,
        login_email: format!("{}@vendor.com", id.to_lowercase()),
        login_password_hash: String::from(VENDOR_PASSWORD),
    }
}

pub fn create_test_user(email: &str, active: bool) -> ProductionUser {
    ProductionUser {
        email: email.to_string(),
        name: String::from("Pat Reviewer"),
        active,
        password_hash: String::from(REVIEWER_PASSWORD),
    }
}

pub fn flat_capacity(value: u32) -> Vec<CapacityEntry> {
    WeekNumber::all()
        .map(|w| CapacityEntry::new(w, None, value, false))
        .collect()
}

/// A store with:
/// - `V-01`: unit tracking, vendor-level, 52 weeks of 1000 live
/// - `V-02`: unit and value tracking, by sub-department, no live data
/// - `V-03`: value tracking, inactive
/// - `lead@example.com`: active reviewer
/// - `away@example.com`: inactive reviewer
pub fn create_test_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_vendor(create_test_vendor(
            "V-01",
            TrackingType::Unit,
            SubDeptMode::VendorLevel,
            VendorStatus::Active,
        ))
        .with_vendor(create_test_vendor(
            "V-02",
            TrackingType::Both,
            SubDeptMode::BySubDept,
            VendorStatus::Active,
        ))
        .with_vendor(create_test_vendor(
            "V-03",
            TrackingType::Value,
            SubDeptMode::VendorLevel,
            VendorStatus::Inactive,
        ))
        .with_user(create_test_user(REVIEWER_EMAIL, true))
        .with_user(create_test_user("away@example.com", false))
        .with_capacity("V-01", 2026, flat_capacity(1000))
}

pub fn create_test_session() -> PortalSession {
    PortalSession::new(RefreshPolicy::default())
}

pub fn vendor_actor(id: &str) -> AuthenticatedActor {
    AuthenticatedActor::vendor(&create_test_vendor(
        id,
        TrackingType::Unit,
        SubDeptMode::VendorLevel,
        VendorStatus::Active,
    ))
}

pub fn reviewer() -> AuthenticatedActor {
    AuthenticatedActor::production(&create_test_user(REVIEWER_EMAIL, true))
}

pub fn create_test_submission(
    submission_id: &str,
    vendor_id: &str,
    submitted_date: &str,
    snapshot: SnapshotPayload,
) -> Submission {
    Submission {
        submission_id: submission_id.to_string(),
        vendor_id: vendor_id.to_string(),
        submitted_by: format!("{}@vendor.com", vendor_id.to_lowercase()),
        submitted_date: submitted_date.to_string(),
        submission_type: SubmissionType::Manual,
        status: SubmissionStatus::Pending,
        comments: String::new(),
        snapshot: Some(snapshot),
        approved_by: None,
        approval_date: None,
    }
}

pub fn live_value(entries: &[CapacityEntry], value: u8) -> Option<u32> {
    entries
        .iter()
        .find(|e| e.week == week(value) && e.sub_dept.is_none())
        .map(|e| e.capacity_value)
}
