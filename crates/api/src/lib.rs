// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Use-case layer for the Vendor Capacity Portal.
//!
//! Handlers authenticate and authorize the actor, validate input, and
//! drive the external store through `CapacityStore`. Domain and core
//! errors are translated to `ApiError` before they leave this crate.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod export;
mod handlers;
mod request_response;
mod session;
mod upload;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, Role, diagnose_against,
};
pub use error::{
    ApiError, AuthError, AuthFailure, CONNECTION_ERROR_MESSAGE, CsvExportError,
    translate_core_error, translate_domain_error,
};
pub use export::{TEMPLATE_FILENAME, capacity_template, export_entries_csv};
pub use handlers::{
    BULK_UPLOAD_COMMENTS, DEFAULT_REJECTION_COMMENTS, VendorWorkspace, add_team_member,
    approve_submission, current_week_info, export_submission_csv, list_pending, list_team,
    list_vendor_submissions, list_vendors, load_vendor_workspace, login, reject_submission,
    remove_team_member, submit_bulk_upload, submit_manual, update_vendor_settings,
    view_submission, workspace_response,
};
pub use request_response::{
    AddTeamMemberRequest, ListSubmissionsResponse, ListTeamResponse, ListVendorsResponse,
    LoginRequest, LoginResponse, RemoveTeamMemberRequest, ReviewRequest, ReviewResponse,
    SubmissionCreatedResponse, SubmissionDetailResponse, SubmissionSummary, TeamChangeResponse,
    TeamMemberInfo, UpdateVendorSettingsRequest, UpdateVendorSettingsResponse, VendorInfo,
    WeekInfoResponse, WeekRow, WorkspaceResponse,
};
pub use session::{DirectorySnapshot, PortalSession, RefreshPolicy};
pub use upload::{UploadedCapacity, parse_capacity_upload};
