// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    create_test_new_submission, create_test_snapshot, create_test_user, create_test_vendor, week,
};
use crate::{
    CapacityStore, InMemoryStore, NewTeamMember, PersistenceError, StatusUpdate, StoreAction,
    VendorSettings, is_bcrypt_hash,
};
use capacity_portal::{SnapshotPayload, Submission};
use capacity_portal_domain::{
    CapacityEntry, ProductionUser, SubDeptMode, SubmissionStatus, TrackingType, Vendor,
    VendorStatus,
};

fn create_test_store() -> InMemoryStore {
    let live: Vec<CapacityEntry> = (1..=52)
        .map(|w| CapacityEntry::new(week(w), None, 1000, false))
        .collect();
    InMemoryStore::new()
        .with_vendor(create_test_vendor("V-01", SubDeptMode::VendorLevel))
        .with_user(create_test_user("lead@example.com"))
        .with_capacity("V-01", 2026, live)
        .with_dollar_limit("V-01", 500_000)
}

#[tokio::test]
async fn test_vendor_authentication_matches_email_loosely() {
    let store: InMemoryStore = create_test_store();

    let vendor: Vendor = store
        .authenticate_vendor("  V-01@Vendor.com ", "vendor-pass")
        .await
        .unwrap();
    assert_eq!(vendor.id, "V-01");

    let err: PersistenceError = store
        .authenticate_vendor("v-01@vendor.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "authenticateVendor was rejected: Invalid credentials"
    );
}

#[tokio::test]
async fn test_inactive_vendor_cannot_authenticate() {
    let mut vendor: Vendor = create_test_vendor("V-02", SubDeptMode::VendorLevel);
    vendor.status = VendorStatus::Inactive;
    let store: InMemoryStore = InMemoryStore::new().with_vendor(vendor);

    let err: PersistenceError = store
        .authenticate_vendor("v-02@vendor.com", "vendor-pass")
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Rejected { message, .. } if message == "Account is inactive"));
}

#[tokio::test]
async fn test_save_capacity_merges_by_key() {
    let store: InMemoryStore = create_test_store();

    let written: usize = store
        .save_capacity(
            "v-01",
            2026,
            &[CapacityEntry::new(week(5), None, 800, true)],
        )
        .await
        .unwrap();
    assert_eq!(written, 1);

    let live: Vec<CapacityEntry> = store.live_capacity("V-01", 2026).await;
    assert_eq!(live.len(), 52);
    for entry in &live {
        let expected: u32 = if entry.week == week(5) { 800 } else { 1000 };
        assert_eq!(entry.capacity_value, expected, "week {}", entry.week);
    }
}

#[tokio::test]
async fn test_capacity_is_kept_per_year() {
    let store: InMemoryStore = create_test_store();
    assert!(store.get_capacity("V-01", 2027).await.unwrap().is_empty());
    assert_eq!(store.get_capacity("V-01", 2026).await.unwrap().len(), 52);
}

#[tokio::test]
async fn test_submissions_list_headers_and_details_carry_snapshot() {
    let store: InMemoryStore = create_test_store();
    let snapshot = create_test_snapshot(vec![CapacityEntry::new(week(5), None, 800, true)], None);
    let submission_id: String = store
        .submit_for_approval(&create_test_new_submission("V-01", snapshot.clone()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submission_id, "SUB-0001");

    let pending: Vec<Submission> = store
        .get_submissions(Some(SubmissionStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].snapshot.is_none());
    assert!(
        store
            .get_submissions(Some(SubmissionStatus::Approved))
            .await
            .unwrap()
            .is_empty()
    );

    let details: Submission = store.get_submission_details(&submission_id).await.unwrap();
    assert_eq!(details.snapshot, Some(SnapshotPayload::Current(snapshot)));
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let store: InMemoryStore = create_test_store();
    assert!(matches!(
        store.get_submission_details("SUB-404").await,
        Err(PersistenceError::NotFound { kind: "submission", .. })
    ));
}

#[tokio::test]
async fn test_status_update_records_reviewer() {
    let store: InMemoryStore = create_test_store();
    let submission_id: String = store
        .submit_for_approval(&create_test_new_submission(
            "V-01",
            create_test_snapshot(Vec::new(), Some(100)),
        ))
        .await
        .unwrap()
        .unwrap();

    store
        .update_submission_status(&StatusUpdate {
            submission_id: submission_id.clone(),
            status: SubmissionStatus::Rejected,
            approved_by: String::from("lead@example.com"),
            approval_date: String::from("2026-03-02"),
            comments: String::from("Too optimistic"),
        })
        .await
        .unwrap();

    let stored: Submission = store.submission(&submission_id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Rejected);
    assert_eq!(stored.approved_by.as_deref(), Some("lead@example.com"));
    assert_eq!(stored.comments, "Too optimistic");
}

#[tokio::test]
async fn test_injected_failure_is_recorded_and_recoverable() {
    let store: InMemoryStore = create_test_store();
    store.fail_on(StoreAction::SaveDollarLimit).await;

    let err: PersistenceError = store.save_dollar_limit("V-01", 1).await.unwrap_err();
    assert!(err.is_connectivity());
    assert_eq!(store.live_dollar_limit("V-01").await, Some(500_000));

    store.recover(StoreAction::SaveDollarLimit).await;
    store.save_dollar_limit("V-01", 1).await.unwrap();
    assert_eq!(store.live_dollar_limit("V-01").await, Some(1));
    assert_eq!(
        store.calls().await,
        vec![StoreAction::SaveDollarLimit, StoreAction::SaveDollarLimit]
    );
}

#[tokio::test]
async fn test_vendor_settings_update() {
    let store: InMemoryStore = create_test_store();
    store
        .update_vendor_settings(
            "V-01",
            VendorSettings {
                tracking: TrackingType::Unit,
                sub_dept_mode: SubDeptMode::BySubDept,
                status: VendorStatus::Inactive,
            },
        )
        .await
        .unwrap();

    let vendors: Vec<Vendor> = store.get_all_vendors().await.unwrap();
    assert_eq!(vendors[0].profile.sub_dept_mode, SubDeptMode::BySubDept);
    assert_eq!(vendors[0].status, VendorStatus::Inactive);

    assert!(matches!(
        store
            .update_vendor_settings(
                "V-99",
                VendorSettings {
                    tracking: TrackingType::Unit,
                    sub_dept_mode: SubDeptMode::VendorLevel,
                    status: VendorStatus::Active,
                },
            )
            .await,
        Err(PersistenceError::NotFound { kind: "vendor", .. })
    ));
}

#[tokio::test]
async fn test_team_roster_add_and_remove() {
    let store: InMemoryStore = create_test_store();
    store
        .add_production_user(&NewTeamMember {
            email: String::from("new@example.com"),
            name: String::from("New Reviewer"),
            password: String::from("first-day"),
        })
        .await
        .unwrap();

    let team: Vec<ProductionUser> = store.get_production_team().await.unwrap();
    assert_eq!(team.len(), 2);
    assert!(is_bcrypt_hash(&team[1].password_hash));

    let user: ProductionUser = store
        .authenticate_production("NEW@example.com", "first-day")
        .await
        .unwrap();
    assert_eq!(user.name, "New Reviewer");

    let duplicate: PersistenceError = store
        .add_production_user(&NewTeamMember {
            email: String::from("new@example.com"),
            name: String::from("Again"),
            password: String::from("x"),
        })
        .await
        .unwrap_err();
    assert!(matches!(duplicate, PersistenceError::Rejected { .. }));

    store.delete_production_user("new@example.com").await.unwrap();
    assert_eq!(store.get_users().await.unwrap().len(), 1);
    assert!(matches!(
        store.delete_production_user("new@example.com").await,
        Err(PersistenceError::NotFound { .. })
    ));
}
