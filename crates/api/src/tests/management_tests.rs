// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    REVIEWER_EMAIL, calendar, create_test_session, create_test_store, now_in_week, reviewer,
    vendor_actor,
};
use crate::{
    AddTeamMemberRequest, ApiError, ListTeamResponse, ListVendorsResponse, PortalSession,
    RemoveTeamMemberRequest, TeamChangeResponse, UpdateVendorSettingsRequest,
    UpdateVendorSettingsResponse, WeekInfoResponse, add_team_member, current_week_info, list_team,
    list_vendors, remove_team_member, update_vendor_settings,
};
use capacity_portal_domain::{SubDeptMode, TrackingType, VendorStatus};
use capacity_portal_persistence::{InMemoryStore, StoreAction};
use time::macros::datetime;

fn settings(vendor_id: &str) -> UpdateVendorSettingsRequest {
    UpdateVendorSettingsRequest {
        vendor_id: vendor_id.to_string(),
        ..UpdateVendorSettingsRequest::default()
    }
}

async fn vendor_fetches(store: &InMemoryStore) -> usize {
    store
        .calls()
        .await
        .iter()
        .filter(|action| **action == StoreAction::GetAllVendors)
        .count()
}

fn new_member(email: &str, name: &str, password: &str) -> AddTeamMemberRequest {
    AddTeamMemberRequest {
        email: email.to_string(),
        name: name.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_vendor_filter_matches_tracking_exactly() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let all: ListVendorsResponse =
        list_vendors(&store, &mut session, &reviewer(), None, now_in_week(3))
            .await
            .unwrap();
    assert_eq!(all.vendors.len(), 3);

    let unit: ListVendorsResponse =
        list_vendors(&store, &mut session, &reviewer(), Some("unit"), now_in_week(3))
            .await
            .unwrap();
    let ids: Vec<&str> = unit.vendors.iter().map(|v| v.vendor_id.as_str()).collect();
    assert_eq!(ids, vec!["V-01"]);

    let err: ApiError =
        list_vendors(&store, &mut session, &reviewer(), Some("weekly"), now_in_week(3))
            .await
            .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { field, .. } if field == "tracking_type"));
}

#[tokio::test]
async fn test_vendor_settings_update_is_visible_on_next_listing() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let response: UpdateVendorSettingsResponse = update_vendor_settings(
        &store,
        &mut session,
        &reviewer(),
        &UpdateVendorSettingsRequest {
            tracking: Some(String::from("both")),
            sub_dept_mode: Some(String::from("Sub-Dept")),
            ..settings("V-01")
        },
        now_in_week(3),
    )
    .await
    .unwrap();
    assert_eq!(response.vendor.tracking, TrackingType::Both);
    assert_eq!(response.vendor.sub_dept_mode, SubDeptMode::BySubDept);
    assert_eq!(response.vendor.status, VendorStatus::Active);
    assert_eq!(
        response.audit,
        "production lead@example.com (UpdateVendorSettings) on vendor V-01: \
         tracking=unit,sub_dept_mode=vendor,status=active -> \
         tracking=both,sub_dept_mode=subdept,status=active"
    );

    let fetches_before: usize = vendor_fetches(&store).await;
    let listed: ListVendorsResponse =
        list_vendors(&store, &mut session, &reviewer(), Some("both"), now_in_week(3))
            .await
            .unwrap();
    assert!(
        listed
            .vendors
            .iter()
            .any(|v| v.vendor_id == "V-01" && v.sub_dept_mode == SubDeptMode::BySubDept)
    );
    assert_eq!(vendor_fetches(&store).await, fetches_before + 1);
}

#[tokio::test]
async fn test_sub_dept_mode_typos_are_recovered_and_unknowns_refused() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let typo: UpdateVendorSettingsResponse = update_vendor_settings(
        &store,
        &mut session,
        &reviewer(),
        &UpdateVendorSettingsRequest {
            sub_dept_mode: Some(String::from("seb dept")),
            ..settings("V-01")
        },
        now_in_week(3),
    )
    .await
    .unwrap();
    assert_eq!(typo.vendor.sub_dept_mode, SubDeptMode::BySubDept);

    let back: UpdateVendorSettingsResponse = update_vendor_settings(
        &store,
        &mut session,
        &reviewer(),
        &UpdateVendorSettingsRequest {
            sub_dept_mode: Some(String::from("vendor")),
            status: Some(String::from("inactive")),
            ..settings("V-01")
        },
        now_in_week(3),
    )
    .await
    .unwrap();
    assert_eq!(back.vendor.sub_dept_mode, SubDeptMode::VendorLevel);
    assert_eq!(back.vendor.status, VendorStatus::Inactive);

    let calls_before: usize = store.calls().await.len();
    let err: ApiError = update_vendor_settings(
        &store,
        &mut session,
        &reviewer(),
        &UpdateVendorSettingsRequest {
            sub_dept_mode: Some(String::from("weekly")),
            ..settings("V-01")
        },
        now_in_week(3),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { field, .. } if field == "sub_dept_mode"));
    assert!(!store.calls().await[calls_before..].contains(&StoreAction::UpdateVendorSettings));
}

#[tokio::test]
async fn test_vendor_cannot_configure_vendors() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = update_vendor_settings(
        &store,
        &mut session,
        &vendor_actor("V-01"),
        &UpdateVendorSettingsRequest {
            status: Some(String::from("inactive")),
            ..settings("V-01")
        },
        now_in_week(3),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_team_member_added_listed_and_removed() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let added: TeamChangeResponse = add_team_member(
        &store,
        &mut session,
        &reviewer(),
        &new_member(" sam@example.com ", "Sam Planner", "s3cret"),
    )
    .await
    .unwrap();
    assert_eq!(added.email, "sam@example.com");

    let team: ListTeamResponse = list_team(&store, &reviewer()).await.unwrap();
    assert!(team.members.iter().any(|m| m.email == "sam@example.com" && m.active));
    assert!(team.members.iter().any(|m| m.email == REVIEWER_EMAIL));

    remove_team_member(
        &store,
        &mut session,
        &reviewer(),
        &RemoveTeamMemberRequest {
            email: String::from("SAM@example.com"),
        },
    )
    .await
    .unwrap();
    let team: ListTeamResponse = list_team(&store, &reviewer()).await.unwrap();
    assert!(!team.members.iter().any(|m| m.email == "sam@example.com"));
}

#[tokio::test]
async fn test_team_member_input_is_validated_before_store_call() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let missing_name: ApiError = add_team_member(
        &store,
        &mut session,
        &reviewer(),
        &new_member("sam@example.com", " ", "s3cret"),
    )
    .await
    .unwrap_err();
    assert!(matches!(missing_name, ApiError::InvalidInput { field, .. } if field == "name"));

    let bad_email: ApiError = add_team_member(
        &store,
        &mut session,
        &reviewer(),
        &new_member("sam-at-example", "Sam", "s3cret"),
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_email, ApiError::InvalidInput { field, .. } if field == "email"));
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_team_member_is_refused_by_store() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = add_team_member(
        &store,
        &mut session,
        &reviewer(),
        &new_member(REVIEWER_EMAIL, "Pat Again", "x"),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::DomainRuleViolation {
            rule: String::from("addProductionUser"),
            message: String::from("User already exists"),
        }
    );
}

#[tokio::test]
async fn test_vendor_cannot_see_team() {
    let store: InMemoryStore = create_test_store();
    let err: ApiError = list_team(&store, &vendor_actor("V-01")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_week_info_inside_year() {
    let info: WeekInfoResponse = current_week_info(&calendar(), now_in_week(10)).unwrap();
    assert_eq!(info.fiscal_year, 2026);
    assert_eq!(info.current_week, 10);
    assert_eq!(info.date_range.as_deref(), Some("4/6-4/12"));
    assert_eq!(info.rolled_forward_year, None);
}

#[test]
fn test_week_info_before_start_is_week_one() {
    let info: WeekInfoResponse =
        current_week_info(&calendar(), datetime!(2026-01-15 09:00 UTC)).unwrap();
    assert_eq!(info.current_week, 1);
    assert_eq!(info.date_range, None);
}

#[test]
fn test_week_info_after_year_end_names_following_year() {
    let info: WeekInfoResponse =
        current_week_info(&calendar(), datetime!(2027-02-10 09:00 UTC)).unwrap();
    assert!(info.current_week > 52);
    assert_eq!(info.date_range, None);
    assert_eq!(info.rolled_forward_year, Some(2027));
}
