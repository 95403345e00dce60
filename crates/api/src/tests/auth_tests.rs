// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    REVIEWER_EMAIL, REVIEWER_PASSWORD, VENDOR_PASSWORD, create_test_session, create_test_store,
    create_test_user, create_test_vendor, now_in_week, reviewer, vendor_actor,
};
use crate::{
    ApiError, AuthError, AuthFailure, AuthenticatedActor, AuthorizationService, DirectorySnapshot,
    LoginRequest, LoginResponse, PortalSession, RefreshPolicy, Role, diagnose_against, login,
};
use capacity_portal_domain::{SubDeptMode, TrackingType, VendorStatus};
use capacity_portal_persistence::{InMemoryStore, StoreAction};

fn request(email: &str, password: &str, portal: Role) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        portal,
    }
}

async fn failure(store: &InMemoryStore, email: &str, password: &str, portal: Role) -> AuthFailure {
    let mut session: PortalSession = create_test_session();
    match login(store, &mut session, &request(email, password, portal), now_in_week(5)).await {
        Err(ApiError::AuthenticationFailed { failure }) => failure,
        other => panic!("expected an authentication failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_vendor_signs_in_with_loose_email() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let response: LoginResponse = login(
        &store,
        &mut session,
        &request("  V-01@Vendor.com ", VENDOR_PASSWORD, Role::Vendor),
        now_in_week(5),
    )
    .await
    .unwrap();

    assert_eq!(response.actor.role, Role::Vendor);
    assert_eq!(response.actor.vendor_id.as_deref(), Some("V-01"));
}

#[tokio::test]
async fn test_reviewer_signs_in_through_production_portal() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let response: LoginResponse = login(
        &store,
        &mut session,
        &request(REVIEWER_EMAIL, REVIEWER_PASSWORD, Role::Production),
        now_in_week(5),
    )
    .await
    .unwrap();

    assert_eq!(response.actor.role, Role::Production);
    assert_eq!(response.actor.vendor_id, None);
}

#[tokio::test]
async fn test_password_case_and_padding_are_ignored() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let vendor: LoginResponse = login(
        &store,
        &mut session,
        &request("v-01@vendor.com", "VENDOR-PASS", Role::Vendor),
        now_in_week(5),
    )
    .await
    .unwrap();
    assert_eq!(vendor.actor.vendor_id.as_deref(), Some("V-01"));

    let production: LoginResponse = login(
        &store,
        &mut session,
        &request(REVIEWER_EMAIL, " Review-Pass ", Role::Production),
        now_in_week(5),
    )
    .await
    .unwrap();
    assert_eq!(production.actor.role, Role::Production);
}

#[test]
fn test_case_different_password_is_not_diagnosed_as_wrong() {
    let directory: DirectorySnapshot = DirectorySnapshot::new(
        vec![create_test_vendor(
            "V-01",
            TrackingType::Unit,
            SubDeptMode::VendorLevel,
            VendorStatus::Active,
        )],
        vec![create_test_user(REVIEWER_EMAIL, true)],
        now_in_week(5),
    );

    let vendor: AuthFailure = diagnose_against(
        &directory,
        Role::Vendor,
        "v-01@vendor.com",
        "Vendor-Pass",
        String::from("Invalid credentials"),
    );
    assert_eq!(vendor, AuthFailure::Rejected(String::from("Invalid credentials")));

    let production: AuthFailure = diagnose_against(
        &directory,
        Role::Production,
        REVIEWER_EMAIL,
        "REVIEW-PASS",
        String::from("Invalid credentials"),
    );
    assert_eq!(production, AuthFailure::Rejected(String::from("Invalid credentials")));

    let wrong: AuthFailure = diagnose_against(
        &directory,
        Role::Vendor,
        "v-01@vendor.com",
        "vendor-pass-2",
        String::from("Invalid credentials"),
    );
    assert_eq!(wrong, AuthFailure::WrongPassword);
}

#[tokio::test]
async fn test_wrong_password_is_diagnosed() {
    let store: InMemoryStore = create_test_store();
    let failure: AuthFailure = failure(&store, "v-01@vendor.com", "nope", Role::Vendor).await;
    assert_eq!(failure, AuthFailure::WrongPassword);
    assert_eq!(failure.to_string(), "Incorrect password");
}

#[tokio::test]
async fn test_unknown_email_is_diagnosed() {
    let store: InMemoryStore = create_test_store();
    let failure: AuthFailure =
        failure(&store, "nobody@vendor.com", VENDOR_PASSWORD, Role::Vendor).await;
    assert_eq!(failure, AuthFailure::UnknownEmail);
}

#[tokio::test]
async fn test_inactive_account_is_diagnosed() {
    let store: InMemoryStore = create_test_store();
    let vendor: AuthFailure =
        failure(&store, "v-03@vendor.com", VENDOR_PASSWORD, Role::Vendor).await;
    assert_eq!(vendor, AuthFailure::InactiveAccount);

    let reviewer: AuthFailure =
        failure(&store, "away@example.com", REVIEWER_PASSWORD, Role::Production).await;
    assert_eq!(reviewer, AuthFailure::InactiveAccount);
}

#[tokio::test]
async fn test_email_from_other_portal_is_diagnosed() {
    let store: InMemoryStore = create_test_store();

    let failure_on_vendor: AuthFailure =
        failure(&store, REVIEWER_EMAIL, REVIEWER_PASSWORD, Role::Vendor).await;
    assert_eq!(
        failure_on_vendor,
        AuthFailure::WrongPortal {
            belongs_to: Role::Production
        }
    );
    assert_eq!(
        failure_on_vendor.to_string(),
        "This email belongs to a Production account. Use the Production login"
    );

    let failure_on_production: AuthFailure =
        failure(&store, "v-01@vendor.com", VENDOR_PASSWORD, Role::Production).await;
    assert_eq!(
        failure_on_production,
        AuthFailure::WrongPortal {
            belongs_to: Role::Vendor
        }
    );
}

#[tokio::test]
async fn test_unreachable_store_is_connection_error() {
    let store: InMemoryStore = create_test_store();
    store.fail_on(StoreAction::AuthenticateVendor).await;
    let mut session: PortalSession = create_test_session();

    let err: ApiError = login(
        &store,
        &mut session,
        &request("v-01@vendor.com", VENDOR_PASSWORD, Role::Vendor),
        now_in_week(5),
    )
    .await
    .unwrap_err();

    assert_eq!(err, ApiError::ConnectionError);
    assert_eq!(
        err.to_string(),
        "Connection error. Please check API URL configuration."
    );
}

#[tokio::test]
async fn test_directory_failure_falls_back_to_store_reason() {
    let store: InMemoryStore = create_test_store();
    store.fail_on(StoreAction::GetAllVendors).await;

    let failure: AuthFailure = failure(&store, "v-01@vendor.com", "nope", Role::Vendor).await;
    assert_eq!(
        failure,
        AuthFailure::Rejected(String::from("Invalid credentials"))
    );
}

#[tokio::test]
async fn test_blank_credentials_make_no_store_call() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    let err: ApiError = login(
        &store,
        &mut session,
        &request("   ", VENDOR_PASSWORD, Role::Vendor),
        now_in_week(5),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { field, .. } if field == "email"));
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn test_directory_is_reused_until_stale() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = create_test_session();

    for _ in 0..2 {
        let _ = login(
            &store,
            &mut session,
            &request("v-01@vendor.com", "nope", Role::Vendor),
            now_in_week(5),
        )
        .await;
    }
    let fetches: usize = store
        .calls()
        .await
        .iter()
        .filter(|a| **a == StoreAction::GetAllVendors)
        .count();
    assert_eq!(fetches, 1);
}

#[tokio::test]
async fn test_always_refresh_fetches_every_time() {
    let store: InMemoryStore = create_test_store();
    let mut session: PortalSession = PortalSession::new(RefreshPolicy::always_refresh());

    for _ in 0..2 {
        let _ = login(
            &store,
            &mut session,
            &request("v-01@vendor.com", "nope", Role::Vendor),
            now_in_week(5),
        )
        .await;
    }
    let fetches: usize = store
        .calls()
        .await
        .iter()
        .filter(|a| **a == StoreAction::GetAllVendors)
        .count();
    assert_eq!(fetches, 2);
}

#[test]
fn test_vendor_may_only_submit_for_itself() {
    let actor: AuthenticatedActor = vendor_actor("V-01");
    assert!(AuthorizationService::authorize_submit(&actor, "V-01").is_ok());
    assert!(AuthorizationService::authorize_submit(&actor, "v-01").is_ok());

    let err: AuthError = AuthorizationService::authorize_submit(&actor, "V-02").unwrap_err();
    assert_eq!(
        err,
        AuthError::Unauthorized {
            action: String::from("submit_capacity"),
            required_role: String::from("Vendor V-02"),
        }
    );
    assert!(AuthorizationService::authorize_submit(&reviewer(), "V-01").is_err());
}

#[test]
fn test_review_and_management_require_production() {
    let vendor: AuthenticatedActor = vendor_actor("V-01");
    assert!(AuthorizationService::authorize_review(&vendor).is_err());
    assert!(AuthorizationService::authorize_manage_vendors(&vendor).is_err());
    assert!(AuthorizationService::authorize_manage_team(&vendor).is_err());

    let production: AuthenticatedActor = reviewer();
    assert!(AuthorizationService::authorize_review(&production).is_ok());
    assert!(AuthorizationService::authorize_manage_vendors(&production).is_ok());
    assert!(AuthorizationService::authorize_manage_team(&production).is_ok());
}

#[test]
fn test_vendor_views_only_its_own_data() {
    let vendor: AuthenticatedActor = vendor_actor("V-01");
    assert!(AuthorizationService::authorize_view_vendor(&vendor, "V-01").is_ok());
    assert!(AuthorizationService::authorize_view_vendor(&vendor, "V-02").is_err());
    assert!(AuthorizationService::authorize_view_vendor(&reviewer(), "V-02").is_ok());
}
