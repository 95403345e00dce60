// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use std::collections::BTreeMap;

use capacity_portal::{PendingChange, ReviewOutcome, SnapshotView};
use capacity_portal_domain::{
    SubDepartment, SubDeptMode, SubmissionStatus, SubmissionType, TrackingType, VendorStatus,
};
use serde::Serialize;

use crate::auth::{AuthenticatedActor, Role};

/// API request to sign in through one of the portals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// The login email.
    pub email: String,
    /// The password.
    pub password: String,
    /// The portal being signed in through.
    pub portal: Role,
}

/// API response for a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    /// The signed-in actor.
    pub actor: AuthenticatedActor,
    /// A success message.
    pub message: String,
}

/// The fiscal week for an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekInfoResponse {
    /// The fiscal year of the configured calendar.
    pub fiscal_year: u16,
    /// The current week number. May exceed 52 once the year has ended.
    pub current_week: u32,
    /// Date span of the current week (`M/D-M/D`), while inside the year.
    pub date_range: Option<String>,
    /// The fiscal year `now` falls in, when past the configured year.
    pub rolled_forward_year: Option<u16>,
}

/// One row of the capacity grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    /// The week number.
    pub week: u8,
    /// Date span of the week (`M/D-M/D`).
    pub date_range: String,
    /// The sub-department, for sub-department vendors.
    pub sub_dept: Option<SubDepartment>,
    /// Effective capacity.
    pub capacity_value: u32,
    /// Whether the value is an override.
    pub is_override: bool,
    /// Whether the week may still be edited.
    pub editable: bool,
}

/// The vendor capacity editor's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceResponse {
    pub vendor_id: String,
    pub vendor_name: String,
    pub tracking: TrackingType,
    pub sub_dept_mode: SubDeptMode,
    pub year: u16,
    pub current_week: u32,
    pub default_capacity: u32,
    /// Present only when the vendor tracks value.
    pub dollar_limit: Option<u64>,
    /// Empty for vendor-level vendors.
    pub sub_dept_capacities: BTreeMap<SubDepartment, u32>,
    pub override_count: usize,
    pub weeks: Vec<WeekRow>,
}

/// API response for a newly queued submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionCreatedResponse {
    /// The id assigned by the store, when it reports one.
    pub submission_id: Option<String>,
    pub vendor_id: String,
    pub submission_type: SubmissionType,
    /// Number of entries submitted.
    pub entry_count: usize,
    /// Proposed dollar limit.
    pub dollar_limit: Option<u64>,
    /// A success message.
    pub message: String,
}

/// A submission header for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionSummary {
    pub submission_id: String,
    pub vendor_id: String,
    /// The resolved vendor name, or "Unknown Vendor".
    pub vendor_name: String,
    pub submitted_by: String,
    pub submitted_date: String,
    pub submission_type: SubmissionType,
    pub status: SubmissionStatus,
    pub comments: String,
    pub approved_by: Option<String>,
    pub approval_date: Option<String>,
}

/// API response for listing submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSubmissionsResponse {
    /// The submissions, newest first.
    pub submissions: Vec<SubmissionSummary>,
}

/// A submission with its reconciled data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionDetailResponse {
    pub summary: SubmissionSummary,
    /// The data to show.
    pub snapshot: SnapshotView,
    /// Keys whose pending value differs from live capacity.
    ///
    /// Empty once the submission has been reviewed, and for fallback data.
    pub changes: Vec<PendingChange>,
    /// True when the data shown is live capacity, not what was submitted.
    pub is_fallback: bool,
}

/// API request to approve or reject a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// The submission to review.
    pub submission_id: String,
    /// Optional reviewer comments.
    pub comments: Option<String>,
}

/// API response for a completed review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewResponse {
    pub submission_id: String,
    pub vendor_id: String,
    pub status: SubmissionStatus,
    /// What the review did to live capacity.
    pub outcome: ReviewOutcome,
    /// A human-readable result.
    pub message: String,
    /// Summary of the recorded audit event.
    pub audit: String,
}

/// Vendor information for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorInfo {
    pub vendor_id: String,
    pub name: String,
    pub tracking: TrackingType,
    pub sub_dept_mode: SubDeptMode,
    pub status: VendorStatus,
    pub login_email: String,
}

/// API response for listing vendors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListVendorsResponse {
    pub vendors: Vec<VendorInfo>,
}

/// API request to change a vendor's configuration.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateVendorSettingsRequest {
    /// The vendor to update.
    pub vendor_id: String,
    /// New tracking type (`unit`, `value`, `both`).
    pub tracking: Option<String>,
    /// New sub-department mode (`vendor` or `subdept`).
    pub sub_dept_mode: Option<String>,
    /// New status (`active`, `inactive`).
    pub status: Option<String>,
}

/// API response for a vendor configuration change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateVendorSettingsResponse {
    /// The vendor after the change.
    pub vendor: VendorInfo,
    /// A success message.
    pub message: String,
    /// Summary of the recorded audit event.
    pub audit: String,
}

/// Production team member information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMemberInfo {
    pub email: String,
    pub name: String,
    pub active: bool,
}

/// API response for listing the review team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListTeamResponse {
    pub members: Vec<TeamMemberInfo>,
}

/// API request to add a member to the review team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTeamMemberRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// API request to remove a member from the review team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveTeamMemberRequest {
    pub email: String,
}

/// API response for a roster change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamChangeResponse {
    /// The member added or removed.
    pub email: String,
    /// A success message.
    pub message: String,
}
