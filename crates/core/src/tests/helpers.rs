// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CapacitySnapshot, Command, SnapshotPayload, Submission};
use capacity_portal_audit::{Actor, Cause};
use capacity_portal_domain::{
    CapacityEntry, SubDeptMode, SubmissionStatus, SubmissionType, TrackingType, VendorProfile,
    WeekNumber,
};

pub fn week(value: u8) -> WeekNumber {
    WeekNumber::new(value).unwrap()
}

pub fn create_test_actor() -> Actor {
    Actor::production("lead@example.com")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("review"), String::from("Weekly review"))
}

pub fn vendor_level_profile() -> VendorProfile {
    VendorProfile::new(TrackingType::Both, SubDeptMode::VendorLevel)
}

pub fn by_sub_dept_profile() -> VendorProfile {
    VendorProfile::new(TrackingType::Unit, SubDeptMode::BySubDept)
}

pub fn create_test_snapshot(entries: Vec<CapacityEntry>, dollar_limit: Option<u64>) -> CapacitySnapshot {
    CapacitySnapshot {
        entries,
        dollar_limit,
        year: 2026,
        legacy: crate::LegacyFields::default(),
        csv_content: None,
        csv_filename: None,
    }
}

pub fn create_test_submission(snapshot: Option<SnapshotPayload>) -> Submission {
    Submission {
        submission_id: String::from("SUB-1"),
        vendor_id: String::from("V-01"),
        submitted_by: String::from("ops@vendor.com"),
        submitted_date: String::from("2026-03-01T10:00:00Z"),
        submission_type: SubmissionType::Manual,
        status: SubmissionStatus::Pending,
        comments: String::from("Peak season uplift"),
        snapshot,
        approved_by: None,
        approval_date: None,
    }
}

pub fn approve_command() -> Command {
    Command::Approve {
        approved_by: String::from("lead@example.com"),
        reviewed_at: String::from("2026-03-02T09:00:00Z"),
        comments: None,
    }
}

pub fn reject_command(comments: &str) -> Command {
    Command::Reject {
        rejected_by: String::from("lead@example.com"),
        reviewed_at: String::from("2026-03-02T09:00:00Z"),
        comments: Some(comments.to_string()),
    }
}
