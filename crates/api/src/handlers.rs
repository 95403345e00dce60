// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler talks to the store through `CapacityStore` and issues its
//! calls one at a time. Validation happens before the first write.

use capacity_portal::{
    CapacitySnapshot, CapacityState, Command, LegacyOverrides, PendingChange, PendingChanges,
    ReconciledSnapshot, ReviewOutcome, SnapshotPayload, SnapshotView, Submission,
    TransitionResult, apply,
};
use capacity_portal_audit::{Action, AuditEvent, AuditScope, Cause, StateSnapshot};
use capacity_portal_domain::{
    CapacityEntry, DomainError, FiscalCalendar, FiscalPosition, ProductionUser, SubDepartment,
    SubDeptMode, SubmissionStatus, SubmissionType, TrackingType, Vendor, VendorProfile,
    VendorStatus, classify_sub_dept_mode, keys_match, looks_like_email, normalize_key,
    validate_capacity_value, validate_not_past_week, vendor_display_name,
};
use capacity_portal_persistence::{
    CapacityStore, NewSubmission, NewTeamMember, PersistenceError, StatusUpdate, StoreAction,
    VendorSettings,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info, warn};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::export::export_entries_csv;
use crate::request_response::{
    AddTeamMemberRequest, ListSubmissionsResponse, ListTeamResponse, ListVendorsResponse,
    LoginRequest, LoginResponse, RemoveTeamMemberRequest, ReviewRequest, ReviewResponse,
    SubmissionCreatedResponse, SubmissionDetailResponse, SubmissionSummary, TeamChangeResponse,
    TeamMemberInfo, UpdateVendorSettingsRequest, UpdateVendorSettingsResponse, VendorInfo,
    WeekInfoResponse, WeekRow, WorkspaceResponse,
};
use crate::session::{DirectorySnapshot, PortalSession};
use crate::upload::{UploadedCapacity, parse_capacity_upload};

/// Comments attached to every bulk upload submission.
pub const BULK_UPLOAD_COMMENTS: &str = "Bulk upload via CSV";

/// Comments recorded on a rejection when the reviewer gives none.
pub const DEFAULT_REJECTION_COMMENTS: &str = "Rejected";

/// Tokens accepted as "vendor-level" when configuring a vendor.
const VENDOR_LEVEL_TOKENS: [&str; 6] = [
    "vendor",
    "vendor_level",
    "vendor-level",
    "vendorlevel",
    "vendor level",
    "none",
];

/// A vendor's editable capacity as loaded from live data.
///
/// `state` starts as the live data and is edited in place before
/// `submit_manual`. The live rows are kept to tell edited overrides from
/// ones already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorWorkspace {
    /// The vendor being edited.
    pub vendor: Vendor,
    /// The fiscal year being edited.
    pub year: u16,
    /// The current fiscal week when the workspace was loaded.
    pub current_week: u32,
    /// The editable working state.
    pub state: CapacityState,
    /// Live capacity rows at load time.
    pub live_entries: Vec<CapacityEntry>,
    /// Live dollar limit at load time.
    pub live_dollar_limit: Option<u64>,
}

/// A submission together with the vendor data needed to interpret it.
struct LoadedSubmission {
    submission: Submission,
    vendor_id: String,
    vendor_name: String,
    profile: VendorProfile,
    year: u16,
}

fn resolve_vendor(directory: &DirectorySnapshot, reference: &str) -> Result<Vendor, ApiError> {
    directory
        .resolve_vendor(reference)
        .cloned()
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Vendor"),
            message: format!("No vendor matches '{reference}'"),
        })
}

fn timestamp(now: OffsetDateTime) -> Result<String, ApiError> {
    now.format(&Rfc3339).map_err(|e| ApiError::Internal {
        message: format!("Failed to format timestamp: {e}"),
    })
}

fn summarize(submission: &Submission, vendor_name: String) -> SubmissionSummary {
    SubmissionSummary {
        submission_id: submission.submission_id.clone(),
        vendor_id: submission.vendor_id.clone(),
        vendor_name,
        submitted_by: submission.submitted_by.clone(),
        submitted_date: submission.submitted_date.clone(),
        submission_type: submission.submission_type,
        status: submission.status,
        comments: submission.comments.clone(),
        approved_by: submission.approved_by.clone(),
        approval_date: submission.approval_date.clone(),
    }
}

fn vendor_info(vendor: &Vendor) -> VendorInfo {
    VendorInfo {
        vendor_id: vendor.id.clone(),
        name: vendor.name.clone(),
        tracking: vendor.profile.tracking,
        sub_dept_mode: vendor.profile.sub_dept_mode,
        status: vendor.status,
        login_email: vendor.login_email.clone(),
    }
}

/// Guesses a profile from the snapshot's shape when the vendor is unknown.
fn fallback_profile(payload: Option<&SnapshotPayload>) -> VendorProfile {
    let by_sub_dept: bool = match payload {
        Some(SnapshotPayload::Current(snapshot)) => {
            snapshot.entries.iter().any(|e| e.sub_dept.is_some())
        }
        Some(SnapshotPayload::Legacy(legacy)) => {
            !legacy.fields.sub_dept_capacities.is_empty()
                || matches!(legacy.fields.week_overrides, LegacyOverrides::BySubDept(_))
        }
        Some(SnapshotPayload::Empty) | None => false,
    };
    let mode: SubDeptMode = if by_sub_dept {
        SubDeptMode::BySubDept
    } else {
        SubDeptMode::VendorLevel
    };
    VendorProfile::new(TrackingType::Both, mode)
}

fn snapshot_year(payload: Option<&SnapshotPayload>, default_year: u16) -> u16 {
    match payload {
        Some(SnapshotPayload::Current(snapshot)) => snapshot.year,
        Some(SnapshotPayload::Legacy(legacy)) => legacy.year.unwrap_or(default_year),
        Some(SnapshotPayload::Empty) | None => default_year,
    }
}

fn sort_newest_first(summaries: &mut [SubmissionSummary]) {
    summaries.sort_by(|a, b| {
        b.submitted_date
            .cmp(&a.submitted_date)
            .then_with(|| b.submission_id.cmp(&a.submission_id))
    });
}

/// Signs in through the vendor or production portal.
///
/// # Errors
///
/// Returns an error if the credentials are blank or refused, or the store
/// cannot be reached.
pub async fn login(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let actor: AuthenticatedActor = AuthenticationService::authenticate(
        store,
        session,
        request.portal,
        &request.email,
        &request.password,
        now,
    )
    .await?;
    let message: String = format!("Signed in as {} ({})", actor.name, actor.role.label());
    Ok(LoginResponse { actor, message })
}

/// Reports the fiscal week containing `now`.
///
/// # Errors
///
/// Returns an error if the calendar cannot place `now`.
pub fn current_week_info(
    calendar: &FiscalCalendar,
    now: OffsetDateTime,
) -> Result<WeekInfoResponse, ApiError> {
    let current_week: u32 = calendar
        .current_week_number(now)
        .map_err(translate_domain_error)?;
    let position: FiscalPosition = calendar.position(now).map_err(translate_domain_error)?;

    let (date_range, rolled_forward_year): (Option<String>, Option<u16>) = match position {
        FiscalPosition::InYear(week) => (
            Some(
                calendar
                    .week_date_range(week)
                    .map_err(translate_domain_error)?,
            ),
            None,
        ),
        FiscalPosition::BeforeStart => (None, None),
        FiscalPosition::AfterEnd(_) => {
            let rolled: FiscalCalendar = calendar
                .rolled_forward_to(now)
                .map_err(translate_domain_error)?;
            (None, Some(rolled.year()))
        }
    };

    Ok(WeekInfoResponse {
        fiscal_year: calendar.year(),
        current_week,
        date_range,
        rolled_forward_year,
    })
}

/// Loads a vendor's live capacity into an editable working state.
///
/// Non-override rows set the baseline values; override rows become
/// overrides. Without live data the standard defaults apply.
///
/// # Arguments
///
/// * `store` - The external store
/// * `session` - The session holding the vendor directory
/// * `actor` - The signed-in actor
/// * `calendar` - The fiscal calendar
/// * `vendor_ref` - The vendor id or name
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The vendor cannot be resolved
/// - The actor may not view the vendor
/// - The store cannot be reached
pub async fn load_vendor_workspace(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    calendar: &FiscalCalendar,
    vendor_ref: &str,
    now: OffsetDateTime,
) -> Result<VendorWorkspace, ApiError> {
    let vendor: Vendor = resolve_vendor(session.directory(store, now).await?, vendor_ref)?;
    AuthorizationService::authorize_view_vendor(actor, &vendor.id)?;

    let year: u16 = calendar.year();
    let current_week: u32 = calendar
        .current_week_number(now)
        .map_err(translate_domain_error)?;

    let live_entries: Vec<CapacityEntry> = store.get_capacity(&vendor.id, year).await?;
    let live_dollar_limit: Option<u64> = if vendor.profile.tracking.tracks_value() {
        store.get_dollar_limit(&vendor.id).await?
    } else {
        None
    };

    let state: CapacityState =
        CapacityState::from_live_entries(vendor.profile, &live_entries, live_dollar_limit);

    Ok(VendorWorkspace {
        vendor,
        year,
        current_week,
        state,
        live_entries,
        live_dollar_limit,
    })
}

/// Renders a workspace as the capacity grid.
///
/// # Errors
///
/// Returns an error if a week's date range cannot be computed.
pub fn workspace_response(
    workspace: &VendorWorkspace,
    calendar: &FiscalCalendar,
) -> Result<WorkspaceResponse, ApiError> {
    let mut weeks: Vec<WeekRow> = Vec::new();
    for entry in workspace.state.materialize_entries() {
        weeks.push(WeekRow {
            week: entry.week.value(),
            date_range: calendar
                .week_date_range(entry.week)
                .map_err(translate_domain_error)?,
            sub_dept: entry.sub_dept,
            capacity_value: entry.capacity_value,
            is_override: entry.is_override,
            editable: u32::from(entry.week.value()) >= workspace.current_week,
        });
    }

    let profile: &VendorProfile = workspace.state.profile();
    let sub_dept_capacities: BTreeMap<SubDepartment, u32> = match profile.sub_dept_mode {
        SubDeptMode::VendorLevel => BTreeMap::new(),
        SubDeptMode::BySubDept => workspace.state.sub_dept_capacities().clone(),
    };

    Ok(WorkspaceResponse {
        vendor_id: workspace.vendor.id.clone(),
        vendor_name: workspace.vendor.name.clone(),
        tracking: profile.tracking,
        sub_dept_mode: profile.sub_dept_mode,
        year: workspace.year,
        current_week: workspace.current_week,
        default_capacity: workspace.state.default_capacity(),
        dollar_limit: profile
            .tracking
            .tracks_value()
            .then_some(workspace.state.dollar_limit()),
        sub_dept_capacities,
        override_count: workspace.state.override_count(),
        weeks,
    })
}

fn validate_working_state(workspace: &VendorWorkspace) -> Result<(), DomainError> {
    let state: &CapacityState = &workspace.state;
    let profile: &VendorProfile = state.profile();

    validate_capacity_value(state.default_capacity())?;
    if profile.sub_dept_mode == SubDeptMode::BySubDept {
        for dept in SubDepartment::ALL {
            let value: u32 = state
                .sub_dept_capacity(dept)
                .ok_or(DomainError::MissingSubDepartmentCapacity { sub_dept: dept })?;
            validate_capacity_value(value)?;
        }
    }
    if profile.tracking.tracks_value() && state.dollar_limit() == 0 {
        return Err(DomainError::InvalidDollarLimit {
            value: state.dollar_limit().to_string(),
        });
    }

    // Overrides already live for past weeks are carried unchanged.
    for entry in state.materialize_entries() {
        if !entry.is_override {
            continue;
        }
        let already_live: bool = workspace.live_entries.iter().any(|live| {
            live.is_override
                && live.key() == entry.key()
                && live.capacity_value == entry.capacity_value
        });
        if !already_live {
            validate_not_past_week(entry.week, workspace.current_week)?;
        }
    }
    Ok(())
}

/// Submits an edited workspace for review.
///
/// The snapshot carries every week (52, or 208 by sub-department) plus
/// the baseline-plus-overrides fields. Live capacity is not written.
///
/// # Arguments
///
/// * `store` - The external store
/// * `actor` - The signed-in vendor
/// * `workspace` - The loaded and edited workspace
/// * `comments` - Free-text comments for the reviewers
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not the workspace's vendor
/// - A baseline is zero or a sub-department baseline is missing
/// - The dollar limit is zero for a vendor tracking value
/// - A newly set override falls on a past week
/// - The store cannot be reached or refuses the submission
pub async fn submit_manual(
    store: &dyn CapacityStore,
    actor: &AuthenticatedActor,
    workspace: &VendorWorkspace,
    comments: &str,
    now: OffsetDateTime,
) -> Result<SubmissionCreatedResponse, ApiError> {
    AuthorizationService::authorize_submit(actor, &workspace.vendor.id)?;
    if *workspace.state.profile() != workspace.vendor.profile {
        return Err(ApiError::InvalidInput {
            field: String::from("workspace"),
            message: String::from("Vendor configuration changed. Reload the workspace"),
        });
    }
    validate_working_state(workspace).map_err(translate_domain_error)?;

    let snapshot: CapacitySnapshot = CapacitySnapshot::from_state(&workspace.state, workspace.year);
    let entry_count: usize = snapshot.entries.len();
    let dollar_limit: Option<u64> = snapshot.dollar_limit;

    let submission: NewSubmission = NewSubmission {
        vendor_id: workspace.vendor.id.clone(),
        submitted_by: actor.email.clone(),
        submitted_date: now.date().to_string(),
        submission_type: SubmissionType::Manual,
        comments: comments.trim().to_string(),
        snapshot,
    };
    let submission_id: Option<String> = store.submit_for_approval(&submission).await?;

    info!(
        vendor_id = %submission.vendor_id,
        submission_id = submission_id.as_deref().unwrap_or("unassigned"),
        entry_count,
        "Manual capacity submitted"
    );

    Ok(SubmissionCreatedResponse {
        submission_id,
        vendor_id: submission.vendor_id,
        submission_type: SubmissionType::Manual,
        entry_count,
        dollar_limit,
        message: String::from("Capacity submitted for approval"),
    })
}

/// Validates a bulk upload and submits it for review.
///
/// The whole file is validated first; nothing is submitted if any row
/// fails. Only the rows in the file are submitted.
///
/// # Arguments
///
/// * `store` - The external store
/// * `session` - The session holding the vendor directory
/// * `actor` - The signed-in vendor
/// * `calendar` - The fiscal calendar
/// * `vendor_ref` - The vendor id or name
/// * `content` - The CSV text
/// * `filename` - The uploaded file's name
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The vendor cannot be resolved or the actor is not that vendor
/// - Any row fails validation, naming the first failing row
/// - The store cannot be reached or refuses the submission
#[allow(clippy::too_many_arguments)]
pub async fn submit_bulk_upload(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    calendar: &FiscalCalendar,
    vendor_ref: &str,
    content: &str,
    filename: &str,
    now: OffsetDateTime,
) -> Result<SubmissionCreatedResponse, ApiError> {
    let vendor: Vendor = resolve_vendor(session.directory(store, now).await?, vendor_ref)?;
    AuthorizationService::authorize_submit(actor, &vendor.id)?;

    let current_week: u32 = calendar
        .current_week_number(now)
        .map_err(translate_domain_error)?;
    let uploaded: UploadedCapacity = parse_capacity_upload(content, &vendor.profile, current_week)
        .inspect_err(|err| warn!(vendor_id = %vendor.id, filename, error = %err, "Upload rejected"))?;

    let entry_count: usize = uploaded.entries.len();
    let dollar_limit: Option<u64> = uploaded.dollar_limit;
    let snapshot: CapacitySnapshot = CapacitySnapshot::from_upload(
        uploaded.entries,
        uploaded.dollar_limit,
        calendar.year(),
        content.to_string(),
        filename.to_string(),
    );

    let submission: NewSubmission = NewSubmission {
        vendor_id: vendor.id.clone(),
        submitted_by: actor.email.clone(),
        submitted_date: now.date().to_string(),
        submission_type: SubmissionType::BulkUpload,
        comments: String::from(BULK_UPLOAD_COMMENTS),
        snapshot,
    };
    let submission_id: Option<String> = store.submit_for_approval(&submission).await?;

    info!(
        vendor_id = %vendor.id,
        submission_id = submission_id.as_deref().unwrap_or("unassigned"),
        entry_count,
        filename,
        "Bulk upload submitted"
    );

    Ok(SubmissionCreatedResponse {
        submission_id,
        vendor_id: vendor.id,
        submission_type: SubmissionType::BulkUpload,
        entry_count,
        dollar_limit,
        message: format!("{entry_count} entries submitted for approval"),
    })
}

/// Lists one vendor's submissions, newest first.
///
/// Submissions whose vendor reference drifted from the vendor id are
/// matched through vendor resolution.
///
/// # Errors
///
/// Returns an error if the vendor cannot be resolved, the actor may not
/// view it, or the store cannot be reached.
pub async fn list_vendor_submissions(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    vendor_ref: &str,
    now: OffsetDateTime,
) -> Result<ListSubmissionsResponse, ApiError> {
    let directory: &DirectorySnapshot = session.directory(store, now).await?;
    let vendor: Vendor = resolve_vendor(directory, vendor_ref)?;
    AuthorizationService::authorize_view_vendor(actor, &vendor.id)?;

    let all: Vec<Submission> = store.get_submissions(None).await?;
    let mut submissions: Vec<SubmissionSummary> = all
        .iter()
        .filter(|s| {
            keys_match(&s.vendor_id, &vendor.id)
                || directory
                    .resolve_vendor(&s.vendor_id)
                    .is_some_and(|v| v.id == vendor.id)
        })
        .map(|s| summarize(s, vendor.name.clone()))
        .collect();
    sort_newest_first(&mut submissions);

    Ok(ListSubmissionsResponse { submissions })
}

/// Lists submissions awaiting review, newest first.
///
/// Unresolvable vendors are shown as "Unknown Vendor".
///
/// # Errors
///
/// Returns an error if the actor is not on the production team or the
/// store cannot be reached.
pub async fn list_pending(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ListSubmissionsResponse, ApiError> {
    AuthorizationService::authorize_review(actor)?;
    let directory: &DirectorySnapshot = session.directory(store, now).await?;

    let pending: Vec<Submission> = store
        .get_submissions(Some(SubmissionStatus::Pending))
        .await?;
    let mut submissions: Vec<SubmissionSummary> = pending
        .iter()
        .map(|s| summarize(s, vendor_display_name(directory.vendors(), &s.vendor_id)))
        .collect();
    sort_newest_first(&mut submissions);

    Ok(ListSubmissionsResponse { submissions })
}

async fn load_submission(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    calendar: &FiscalCalendar,
    submission_id: &str,
    now: OffsetDateTime,
) -> Result<LoadedSubmission, ApiError> {
    let mut submission: Submission = store.get_submission_details(submission_id).await?;
    if !submission.has_snapshot() {
        submission = submission.with_snapshot(SnapshotPayload::Empty);
    }

    // Stored references may have drifted from the directory id, so ownership
    // is checked against the resolved vendor.
    let directory: &DirectorySnapshot = session.directory(store, now).await?;
    let (vendor_id, vendor_name, profile): (String, String, VendorProfile) = directory
        .resolve_vendor(&submission.vendor_id)
        .map_or_else(
            || {
                warn!(
                    submission_id,
                    vendor_ref = %submission.vendor_id,
                    "Submission vendor not in directory; inferring profile from snapshot"
                );
                (
                    submission.vendor_id.clone(),
                    vendor_display_name(directory.vendors(), &submission.vendor_id),
                    fallback_profile(submission.snapshot.as_ref()),
                )
            },
            |vendor| (vendor.id.clone(), vendor.name.clone(), vendor.profile),
        );
    AuthorizationService::authorize_view_vendor(actor, &vendor_id)?;

    let year: u16 = snapshot_year(submission.snapshot.as_ref(), calendar.year());
    Ok(LoadedSubmission {
        submission,
        vendor_id,
        vendor_name,
        profile,
        year,
    })
}

async fn reconcile_loaded(
    store: &dyn CapacityStore,
    loaded: &LoadedSubmission,
) -> Result<(SnapshotView, Vec<PendingChange>), ApiError> {
    let submitted: Option<ReconciledSnapshot> = loaded
        .submission
        .snapshot
        .as_ref()
        .and_then(|payload| ReconciledSnapshot::from_payload(payload, &loaded.profile));

    let mut live: Option<Vec<CapacityEntry>> = None;
    let mut reconciled: Option<ReconciledSnapshot> = submitted;
    if reconciled.is_none() {
        let entries: Vec<CapacityEntry> =
            store.get_capacity(&loaded.vendor_id, loaded.year).await?;
        let dollar_limit: Option<u64> = if loaded.profile.tracking.tracks_value() {
            store.get_dollar_limit(&loaded.vendor_id).await?
        } else {
            None
        };
        live = Some(entries.clone());
        reconciled = ReconciledSnapshot::from_live(entries, dollar_limit);
    }

    let Some(reconciled) = reconciled else {
        return Ok((SnapshotView::NoDataAvailable, Vec::new()));
    };

    let mut changes: Vec<PendingChange> = Vec::new();
    if loaded.submission.is_pending() && !reconciled.is_fallback() {
        if live.is_none() {
            live = Some(store.get_capacity(&loaded.vendor_id, loaded.year).await?);
        }
        let live_entries: Vec<CapacityEntry> = live.unwrap_or_default();
        changes = PendingChanges::new(&live_entries, &reconciled.entries).changes();
    }

    Ok((SnapshotView::Available(reconciled), changes))
}

/// Shows a submission with its data normalized to an entry list.
///
/// Older snapshots are reconstructed. A submission without data shows the
/// vendor's live capacity, flagged as a fallback. While pending, the keys
/// whose value differs from live capacity are listed.
///
/// # Errors
///
/// Returns an error if the submission does not exist, the actor may not
/// view it, or the store cannot be reached.
pub async fn view_submission(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    calendar: &FiscalCalendar,
    submission_id: &str,
    now: OffsetDateTime,
) -> Result<SubmissionDetailResponse, ApiError> {
    let loaded: LoadedSubmission =
        load_submission(store, session, actor, calendar, submission_id, now).await?;
    let (snapshot, changes): (SnapshotView, Vec<PendingChange>) =
        reconcile_loaded(store, &loaded).await?;
    let is_fallback: bool =
        matches!(&snapshot, SnapshotView::Available(reconciled) if reconciled.is_fallback());

    Ok(SubmissionDetailResponse {
        summary: summarize(&loaded.submission, loaded.vendor_name.clone()),
        snapshot,
        changes,
        is_fallback,
    })
}

/// Exports a submission's data in the upload CSV format.
///
/// # Errors
///
/// Returns an error if the submission cannot be viewed or has no data.
pub async fn export_submission_csv(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    calendar: &FiscalCalendar,
    submission_id: &str,
    now: OffsetDateTime,
) -> Result<String, ApiError> {
    let loaded: LoadedSubmission =
        load_submission(store, session, actor, calendar, submission_id, now).await?;
    let (snapshot, _): (SnapshotView, Vec<PendingChange>) =
        reconcile_loaded(store, &loaded).await?;

    match snapshot {
        SnapshotView::Available(reconciled) => Ok(export_entries_csv(
            &reconciled.entries,
            &loaded.profile,
            reconciled.dollar_limit,
        )?),
        SnapshotView::NoDataAvailable => Err(ApiError::ResourceNotFound {
            resource_type: String::from("Capacity data"),
            message: format!("Submission {submission_id} has no capacity data"),
        }),
    }
}

fn step_failure(completed: &[String], step: StoreAction, err: PersistenceError) -> ApiError {
    if completed.is_empty() {
        return ApiError::from(err);
    }
    error!(
        failed_step = %step,
        completed = %completed.join(","),
        error = %err,
        "Approval partially applied"
    );
    ApiError::PartialApplication {
        completed: completed.to_vec(),
        failed_step: step.to_string(),
        message: err.to_string(),
    }
}

/// Approves a pending submission and applies its data to live capacity.
///
/// Calls are made one after another: capacity rows (merged by key), then
/// the dollar limit, then the status. A failure after an earlier write
/// leaves that write in place and is reported as a partial application.
/// A submission without data is still approved and nothing is applied.
///
/// # Arguments
///
/// * `store` - The external store
/// * `session` - The session holding the vendor directory
/// * `actor` - The reviewing production team member
/// * `calendar` - The fiscal calendar, for snapshots without a year
/// * `request` - The submission id and optional comments
/// * `now` - The review instant
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not on the production team
/// - The submission does not exist or was already reviewed
/// - A store call fails
#[allow(clippy::too_many_lines)]
pub async fn approve_submission(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    calendar: &FiscalCalendar,
    request: &ReviewRequest,
    now: OffsetDateTime,
) -> Result<ReviewResponse, ApiError> {
    AuthorizationService::authorize_review(actor)?;
    let loaded: LoadedSubmission =
        load_submission(store, session, actor, calendar, &request.submission_id, now).await?;
    let reviewed_at: String = timestamp(now)?;

    let result: TransitionResult = apply(
        &loaded.submission,
        &loaded.profile,
        Command::Approve {
            approved_by: actor.email.clone(),
            reviewed_at: reviewed_at.clone(),
            comments: request.comments.clone(),
        },
        actor.to_audit_actor(),
        Cause::new(
            request.submission_id.clone(),
            String::from("Production review"),
        ),
    )
    .map_err(translate_core_error)?;

    let mut completed: Vec<String> = Vec::new();
    if !result.patch.entries.is_empty() {
        store
            .save_capacity(&loaded.vendor_id, loaded.year, &result.patch.entries)
            .await
            .map_err(|err| step_failure(&completed, StoreAction::SaveCapacity, err))?;
        completed.push(StoreAction::SaveCapacity.to_string());
    }
    if let Some(dollar_limit) = result.patch.dollar_limit {
        store
            .save_dollar_limit(&loaded.vendor_id, dollar_limit)
            .await
            .map_err(|err| step_failure(&completed, StoreAction::SaveDollarLimit, err))?;
        completed.push(StoreAction::SaveDollarLimit.to_string());
    }

    let update: StatusUpdate = StatusUpdate {
        submission_id: loaded.submission.submission_id.clone(),
        status: SubmissionStatus::Approved,
        approved_by: actor.email.clone(),
        approval_date: reviewed_at,
        comments: request.comments.clone().unwrap_or_default(),
    };
    store
        .update_submission_status(&update)
        .await
        .map_err(|err| step_failure(&completed, StoreAction::UpdateSubmissionStatus, err))?;

    let message: String = match result.outcome {
        ReviewOutcome::Applied {
            entries_applied,
            dollar_limit_applied: true,
        } => format!("Submission approved. {entries_applied} entries and the dollar limit applied"),
        ReviewOutcome::Applied {
            entries_applied, ..
        } => format!("Submission approved. {entries_applied} entries applied"),
        ReviewOutcome::ApprovedWithoutChanges | ReviewOutcome::Rejected => String::from(
            "Submission approved, but it carried no capacity data. Live capacity is unchanged",
        ),
    };

    info!(
        submission_id = %update.submission_id,
        vendor_id = %loaded.vendor_id,
        approved_by = %actor.email,
        year = loaded.year,
        "Submission approved"
    );

    Ok(ReviewResponse {
        submission_id: update.submission_id,
        vendor_id: loaded.vendor_id,
        status: result.submission.status,
        outcome: result.outcome,
        message,
        audit: result.audit_event.summary(),
    })
}

/// Rejects a pending submission. Live capacity is never touched.
///
/// # Errors
///
/// Returns an error if the actor is not on the production team, the
/// submission does not exist or was already reviewed, or a store call
/// fails.
pub async fn reject_submission(
    store: &dyn CapacityStore,
    actor: &AuthenticatedActor,
    request: &ReviewRequest,
    now: OffsetDateTime,
) -> Result<ReviewResponse, ApiError> {
    AuthorizationService::authorize_review(actor)?;
    let submission: Submission = store.get_submission_details(&request.submission_id).await?;
    let reviewed_at: String = timestamp(now)?;
    let comments: String = request
        .comments
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_REJECTION_COMMENTS));

    let result: TransitionResult = apply(
        &submission,
        &fallback_profile(submission.snapshot.as_ref()),
        Command::Reject {
            rejected_by: actor.email.clone(),
            reviewed_at: reviewed_at.clone(),
            comments: Some(comments.clone()),
        },
        actor.to_audit_actor(),
        Cause::new(
            request.submission_id.clone(),
            String::from("Production review"),
        ),
    )
    .map_err(translate_core_error)?;

    let update: StatusUpdate = StatusUpdate {
        submission_id: submission.submission_id.clone(),
        status: SubmissionStatus::Rejected,
        approved_by: actor.email.clone(),
        approval_date: reviewed_at,
        comments,
    };
    store.update_submission_status(&update).await?;

    info!(
        submission_id = %update.submission_id,
        vendor_id = %submission.vendor_id,
        rejected_by = %actor.email,
        "Submission rejected"
    );

    Ok(ReviewResponse {
        submission_id: update.submission_id,
        vendor_id: submission.vendor_id,
        status: result.submission.status,
        outcome: result.outcome,
        message: String::from("Submission rejected"),
        audit: result.audit_event.summary(),
    })
}

/// Lists vendors, optionally only those with one tracking type.
///
/// # Errors
///
/// Returns an error if the actor is not on the production team, the
/// filter is not a tracking type, or the store cannot be reached.
pub async fn list_vendors(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    tracking: Option<&str>,
    now: OffsetDateTime,
) -> Result<ListVendorsResponse, ApiError> {
    AuthorizationService::authorize_manage_vendors(actor)?;
    let wanted: Option<TrackingType> = tracking
        .map(TrackingType::parse)
        .transpose()
        .map_err(translate_domain_error)?;

    let directory: &DirectorySnapshot = session.directory(store, now).await?;
    let vendors: Vec<VendorInfo> = directory
        .vendors()
        .iter()
        .filter(|v| wanted.is_none_or(|t| v.profile.tracking == t))
        .map(vendor_info)
        .collect();

    Ok(ListVendorsResponse { vendors })
}

fn parse_sub_dept_mode(raw: &str) -> Result<SubDeptMode, ApiError> {
    let normalized: String = normalize_key(raw);
    if VENDOR_LEVEL_TOKENS.contains(&normalized.as_str()) {
        return Ok(SubDeptMode::VendorLevel);
    }
    match classify_sub_dept_mode(raw) {
        SubDeptMode::BySubDept => Ok(SubDeptMode::BySubDept),
        SubDeptMode::VendorLevel => Err(ApiError::InvalidInput {
            field: String::from("sub_dept_mode"),
            message: format!("Unknown sub-department mode '{raw}'. Use 'vendor' or 'subdept'"),
        }),
    }
}

fn settings_snapshot(vendor: &Vendor) -> StateSnapshot {
    StateSnapshot::new(format!(
        "tracking={},sub_dept_mode={},status={}",
        vendor.profile.tracking.as_str(),
        vendor.profile.sub_dept_mode.as_str(),
        vendor.status.as_str()
    ))
}

/// Changes a vendor's tracking type, sub-department mode, or status.
///
/// Fields not given keep their current value. The session directory is
/// dropped afterwards so the next use sees the change.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not on the production team
/// - The vendor cannot be resolved
/// - A field value is not recognized
/// - The store cannot be reached or refuses the update
pub async fn update_vendor_settings(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    request: &UpdateVendorSettingsRequest,
    now: OffsetDateTime,
) -> Result<UpdateVendorSettingsResponse, ApiError> {
    AuthorizationService::authorize_manage_vendors(actor)?;
    let mut vendor: Vendor =
        resolve_vendor(session.directory(store, now).await?, &request.vendor_id)?;

    let tracking: TrackingType = request
        .tracking
        .as_deref()
        .map(TrackingType::parse)
        .transpose()
        .map_err(translate_domain_error)?
        .unwrap_or(vendor.profile.tracking);
    let sub_dept_mode: SubDeptMode = request
        .sub_dept_mode
        .as_deref()
        .map(parse_sub_dept_mode)
        .transpose()?
        .unwrap_or(vendor.profile.sub_dept_mode);
    let status: VendorStatus = request
        .status
        .as_deref()
        .map(VendorStatus::parse)
        .transpose()
        .map_err(translate_domain_error)?
        .unwrap_or(vendor.status);

    let settings: VendorSettings = VendorSettings {
        tracking,
        sub_dept_mode,
        status,
    };
    store.update_vendor_settings(&vendor.id, settings).await?;
    session.invalidate();

    let before: StateSnapshot = settings_snapshot(&vendor);
    vendor.profile = VendorProfile::new(tracking, sub_dept_mode);
    vendor.status = status;
    let event: AuditEvent = AuditEvent::new(
        AuditScope::vendor(&vendor.id),
        actor.to_audit_actor(),
        Cause::new(
            String::from("updateVendorSettings"),
            String::from("Vendor settings changed"),
        ),
        Action::new(String::from("UpdateVendorSettings"), None),
        before,
        settings_snapshot(&vendor),
    );
    info!(
        vendor_id = %vendor.id,
        tracking = tracking.as_str(),
        sub_dept_mode = sub_dept_mode.as_str(),
        status = status.as_str(),
        updated_by = %actor.email,
        "Vendor settings updated"
    );

    Ok(UpdateVendorSettingsResponse {
        message: format!("Vendor {} updated", vendor.name),
        vendor: vendor_info(&vendor),
        audit: event.summary(),
    })
}

/// Lists the production review team.
///
/// # Errors
///
/// Returns an error if the actor is not on the production team or the
/// store cannot be reached.
pub async fn list_team(
    store: &dyn CapacityStore,
    actor: &AuthenticatedActor,
) -> Result<ListTeamResponse, ApiError> {
    AuthorizationService::authorize_manage_team(actor)?;
    let team: Vec<ProductionUser> = store.get_production_team().await?;
    Ok(ListTeamResponse {
        members: team
            .into_iter()
            .map(|u| TeamMemberInfo {
                email: u.email,
                name: u.name,
                active: u.active,
            })
            .collect(),
    })
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("{field} is required"),
        });
    }
    Ok(())
}

/// Adds a member to the production review team.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not on the production team
/// - The email, name or password is blank, or the email is malformed
/// - The store cannot be reached or refuses the member
pub async fn add_team_member(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    request: &AddTeamMemberRequest,
) -> Result<TeamChangeResponse, ApiError> {
    AuthorizationService::authorize_manage_team(actor)?;
    require("email", &request.email)?;
    require("name", &request.name)?;
    require("password", &request.password)?;
    if !looks_like_email(&request.email) {
        return Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("'{}' is not a valid email address", request.email.trim()),
        });
    }

    let member: NewTeamMember = NewTeamMember {
        email: request.email.trim().to_string(),
        name: request.name.trim().to_string(),
        password: request.password.clone(),
    };
    store.add_production_user(&member).await?;
    session.invalidate();

    info!(email = %member.email, added_by = %actor.email, "Team member added");
    Ok(TeamChangeResponse {
        message: format!("{} added to the production team", member.name),
        email: member.email,
    })
}

/// Removes a member from the production review team.
///
/// # Errors
///
/// Returns an error if the actor is not on the production team, the email
/// is blank, or the store cannot be reached or refuses the removal.
pub async fn remove_team_member(
    store: &dyn CapacityStore,
    session: &mut PortalSession,
    actor: &AuthenticatedActor,
    request: &RemoveTeamMemberRequest,
) -> Result<TeamChangeResponse, ApiError> {
    AuthorizationService::authorize_manage_team(actor)?;
    require("email", &request.email)?;

    let email: String = request.email.trim().to_string();
    store.delete_production_user(&email).await?;
    session.invalidate();

    info!(email = %email, removed_by = %actor.email, "Team member removed");
    Ok(TeamChangeResponse {
        message: format!("{email} removed from the production team"),
        email,
    })
}
