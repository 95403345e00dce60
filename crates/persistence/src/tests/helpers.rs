// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::NewSubmission;
use capacity_portal::{CapacitySnapshot, LegacyFields};
use capacity_portal_domain::{
    CapacityEntry, ProductionUser, SubDeptMode, SubmissionType, TrackingType, Vendor,
    VendorProfile, VendorStatus, WeekNumber,
};

pub fn week(value: u8) -> WeekNumber {
    WeekNumber::new(value).unwrap()
}

pub fn create_test_vendor(id: &str, sub_dept_mode: SubDeptMode) -> Vendor {
    Vendor {
        id: id.to_string(),
        name: format!("Vendor {id}"),
        profile: VendorProfile::new(TrackingType::Both, sub_dept_mode),
        status: VendorStatus::Active,
        login_email: format!("{}@vendor.com", id.to_lowercase()),
        login_password_hash: String::from("vendor-pass"),
    }
}

pub fn create_test_user(email: &str) -> ProductionUser {
    ProductionUser {
        email: email.to_string(),
        name: String::from("Pat Reviewer"),
        active: true,
        password_hash: String::from("review-pass"),
    }
}

pub fn create_test_snapshot(entries: Vec<CapacityEntry>, dollar_limit: Option<u64>) -> CapacitySnapshot {
    CapacitySnapshot {
        entries,
        dollar_limit,
        year: 2026,
        legacy: LegacyFields::default(),
        csv_content: None,
        csv_filename: None,
    }
}

pub fn create_test_new_submission(vendor_id: &str, snapshot: CapacitySnapshot) -> NewSubmission {
    NewSubmission {
        vendor_id: vendor_id.to_string(),
        submitted_by: String::from("ops@vendor.com"),
        submitted_date: String::from("2026-03-01"),
        submission_type: SubmissionType::Manual,
        comments: String::new(),
        snapshot,
    }
}
