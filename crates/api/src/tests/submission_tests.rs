// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    calendar, create_test_session, create_test_store, create_test_submission, live_value,
    now_in_week, reviewer, vendor_actor, week,
};
use crate::{
    ApiError, BULK_UPLOAD_COMMENTS, ListSubmissionsResponse, PortalSession,
    SubmissionCreatedResponse, VendorWorkspace, WorkspaceResponse, list_vendor_submissions,
    load_vendor_workspace, submit_bulk_upload, submit_manual, workspace_response,
};
use capacity_portal::{OverrideTarget, SnapshotPayload, Submission};
use capacity_portal_domain::{
    CapacityEntry, SubDepartment, SubmissionStatus, SubmissionType, WeekNumber,
};
use capacity_portal_persistence::{InMemoryStore, StoreAction};

async fn workspace(
    store: &InMemoryStore,
    session: &mut PortalSession,
    vendor_id: &str,
    week_now: u8,
) -> VendorWorkspace {
    load_vendor_workspace(
        store,
        session,
        &vendor_actor(vendor_id),
        &calendar(),
        vendor_id,
        now_in_week(week_now),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_workspace_rebuilds_state_from_live_rows() {
    let store: InMemoryStore = create_test_store().with_capacity(
        "V-01",
        2026,
        vec![
            CapacityEntry::new(week(1), None, 1200, false),
            CapacityEntry::new(week(20), None, 1800, true),
        ],
    );
    let mut session: PortalSession = create_test_session();

    let loaded: VendorWorkspace = workspace(&store, &mut session, "V-01", 5).await;
    assert_eq!(loaded.current_week, 5);
    assert_eq!(loaded.state.default_capacity(), 1200);
    assert_eq!(loaded.state.override_count(), 1);
    assert_eq!(loaded.live_dollar_limit, None);

    let response: WorkspaceResponse = workspace_response(&loaded, &calendar()).unwrap();
    assert_eq!(response.weeks.len(), 52);
    assert_eq!(response.weeks[0].date_range, "2/2-2/8");
    assert!(!response.weeks[3].editable);
    assert!(response.weeks[4].editable);
    assert_eq!(response.weeks[19].capacity_value, 1800);
    assert!(response.weeks[19].is_override);
    assert_eq!(response.dollar_limit, None);
}

#[tokio::test]
async fn test_workspace_without_live_data_uses_standard_defaults() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let loaded: VendorWorkspace = workspace(&store, &mut session, "V-02", 5).await;
    let response: WorkspaceResponse = workspace_response(&loaded, &calendar()).unwrap();

    assert_eq!(response.default_capacity, 1000);
    assert_eq!(response.dollar_limit, Some(500_000));
    assert_eq!(response.sub_dept_capacities[&SubDepartment::Tops], 400);
    assert_eq!(response.sub_dept_capacities[&SubDepartment::Bottoms], 300);
    assert_eq!(response.sub_dept_capacities[&SubDepartment::Outerwear], 200);
    assert_eq!(response.sub_dept_capacities[&SubDepartment::Accessories], 100);
    assert_eq!(response.weeks.len(), 208);
}

#[tokio::test]
async fn test_vendor_cannot_load_another_vendors_workspace() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = load_vendor_workspace(
        &store,
        &mut session,
        &vendor_actor("V-01"),
        &calendar(),
        "V-02",
        now_in_week(5),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_manual_submission_carries_every_week_and_leaves_live_alone() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();
    let mut loaded: VendorWorkspace = workspace(&store, &mut session, "V-01", 5).await;
    loaded
        .state
        .apply_override(OverrideTarget::Single(week(10)), None, 1500)
        .unwrap();

    let response: SubmissionCreatedResponse = submit_manual(
        &store,
        &vendor_actor("V-01"),
        &loaded,
        "Peak season",
        now_in_week(5),
    )
    .await
    .unwrap();
    assert_eq!(response.submission_id.as_deref(), Some("SUB-0001"));
    assert_eq!(response.entry_count, 52);
    assert_eq!(response.submission_type, SubmissionType::Manual);

    let stored: Submission = store.submission("SUB-0001").await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Pending);
    assert_eq!(stored.comments, "Peak season");
    assert_eq!(stored.submitted_by, "v-01@vendor.com");
    let Some(SnapshotPayload::Current(snapshot)) = stored.snapshot else {
        panic!("expected a current snapshot");
    };
    let week_10: &CapacityEntry = snapshot
        .entries
        .iter()
        .find(|e| e.week == week(10))
        .unwrap();
    assert_eq!(week_10.capacity_value, 1500);
    assert!(week_10.is_override);
    assert_eq!(snapshot.legacy.default_capacity, Some(1000));

    let live: Vec<CapacityEntry> = store.live_capacity("V-01", 2026).await;
    assert_eq!(live_value(&live, 10), Some(1000));
}

#[tokio::test]
async fn test_manual_override_on_past_week_is_rejected_before_submitting() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();
    let mut loaded: VendorWorkspace = workspace(&store, &mut session, "V-01", 12).await;
    loaded
        .state
        .apply_override(OverrideTarget::Single(week(10)), None, 1500)
        .unwrap();

    let err: ApiError = submit_manual(
        &store,
        &vendor_actor("V-01"),
        &loaded,
        "",
        now_in_week(12),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { rule, .. } if rule == "no_past_weeks"));
    assert!(!store.calls().await.contains(&StoreAction::SubmitForApproval));
}

#[tokio::test]
async fn test_live_override_on_past_week_does_not_block_resubmission() {
    let store: InMemoryStore = create_test_store().with_capacity(
        "V-01",
        2026,
        vec![
            CapacityEntry::new(week(1), None, 1000, false),
            CapacityEntry::new(week(3), None, 1400, true),
        ],
    );
    let mut session: PortalSession = create_test_session();
    let mut loaded: VendorWorkspace = workspace(&store, &mut session, "V-01", 12).await;
    loaded
        .state
        .apply_override(OverrideTarget::Single(week(30)), None, 900)
        .unwrap();

    let response: SubmissionCreatedResponse =
        submit_manual(&store, &vendor_actor("V-01"), &loaded, "", now_in_week(12))
            .await
            .unwrap();
    assert_eq!(response.entry_count, 52);
}

#[tokio::test]
async fn test_bulk_upload_duplicate_creates_no_submission() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = submit_bulk_upload(
        &store,
        &mut session,
        &vendor_actor("V-01"),
        &calendar(),
        "V-01",
        "week_number,capacity_value\n1,1000\n1,2000",
        "capacity.csv",
        now_in_week(1),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::InvalidUpload {
            row: 3,
            message: String::from("Duplicate entry found for week 1 at row 3."),
        }
    );
    assert!(!store.calls().await.contains(&StoreAction::SubmitForApproval));
    assert!(store.submission("SUB-0001").await.is_none());
}

#[tokio::test]
async fn test_bulk_upload_submits_only_rows_in_file() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();
    let content: &str = "week_number,subdept,capacity_value,dollar_limit\n\
                         8,Tops,450,90000\n\
                         8,Bottoms,320,\n\
                         9,Tops,460,120000";

    let response: SubmissionCreatedResponse = submit_bulk_upload(
        &store,
        &mut session,
        &vendor_actor("V-02"),
        &calendar(),
        "V-02",
        content,
        "week8.csv",
        now_in_week(6),
    )
    .await
    .unwrap();
    assert_eq!(response.entry_count, 3);
    assert_eq!(response.dollar_limit, Some(90_000));
    assert_eq!(response.submission_type, SubmissionType::BulkUpload);

    let stored: Submission = store.submission("SUB-0001").await.unwrap();
    assert_eq!(stored.comments, BULK_UPLOAD_COMMENTS);
    let Some(SnapshotPayload::Current(snapshot)) = stored.snapshot else {
        panic!("expected a current snapshot");
    };
    assert_eq!(snapshot.entries.len(), 3);
    assert_eq!(snapshot.csv_filename.as_deref(), Some("week8.csv"));
    assert_eq!(snapshot.year, 2026);
}

#[tokio::test]
async fn test_bulk_upload_rejects_past_week() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = submit_bulk_upload(
        &store,
        &mut session,
        &vendor_actor("V-01"),
        &calendar(),
        "V-01",
        "week_number,capacity_value\n9,1000\n10,1000",
        "capacity.csv",
        now_in_week(10),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Week 9 at row 2 is in the past. Current week is 10."
    );
}

#[tokio::test]
async fn test_production_cannot_submit_for_a_vendor() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = submit_bulk_upload(
        &store,
        &mut session,
        &reviewer(),
        &calendar(),
        "V-01",
        "week_number,capacity_value\n20,1000",
        "capacity.csv",
        now_in_week(1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_vendor_history_matches_drifted_references_newest_first() {
    let store: InMemoryStore = create_test_store()
        .with_submission(create_test_submission(
            "SUB-0101",
            "V-01",
            "2026-02-10",
            SnapshotPayload::Empty,
        ))
        .with_submission(create_test_submission(
            "SUB-0102",
            "v 01",
            "2026-03-15",
            SnapshotPayload::Empty,
        ))
        .with_submission(create_test_submission(
            "SUB-0103",
            "V-02",
            "2026-03-20",
            SnapshotPayload::Empty,
        ));
    let mut session: PortalSession = create_test_session();

    let history: ListSubmissionsResponse = list_vendor_submissions(
        &store,
        &mut session,
        &vendor_actor("V-01"),
        "V-01",
        now_in_week(8),
    )
    .await
    .unwrap();

    let ids: Vec<&str> = history
        .submissions
        .iter()
        .map(|s| s.submission_id.as_str())
        .collect();
    assert_eq!(ids, vec!["SUB-0102", "SUB-0101"]);
    assert!(history.submissions.iter().all(|s| s.vendor_name == "Vendor V-01"));
}

#[test]
fn test_week_helper_matches_calendar() {
    assert_eq!(
        calendar().current_week_number(now_in_week(10)).unwrap(),
        u32::from(WeekNumber::new(10).unwrap().value())
    );
}
