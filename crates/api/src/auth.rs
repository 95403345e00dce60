// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use capacity_portal_audit::Actor;
use capacity_portal_domain::{ProductionUser, Vendor, keys_match};
use capacity_portal_persistence::{CapacityStore, PersistenceError, verify_password};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::{ApiError, AuthError, AuthFailure};
use crate::session::{DirectorySnapshot, PortalSession};

/// Actor roles for authorization.
///
/// The role is fixed by the portal the actor signed in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Vendor role: may view and submit capacity for its own vendor only.
    Vendor,
    /// Production role: reviews submissions and manages vendors and the team.
    ///
    /// Production users may:
    /// - approve or reject any submission
    /// - view any vendor's capacity and history
    /// - configure vendor tracking and status
    /// - manage the review team roster
    Production,
}

impl Role {
    /// Returns the human-readable name of the role.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Vendor => "Vendor",
            Self::Production => "Production",
        }
    }

    /// Returns the other portal's role.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            Self::Vendor => Self::Production,
            Self::Production => Self::Vendor,
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedActor {
    /// The login email of this actor.
    pub email: String,
    /// Display name.
    pub name: String,
    /// The role assigned to this actor.
    pub role: Role,
    /// The vendor this actor belongs to; set only for vendor actors.
    pub vendor_id: Option<String>,
}

impl AuthenticatedActor {
    /// Creates an actor for a signed-in vendor.
    #[must_use]
    pub fn vendor(vendor: &Vendor) -> Self {
        Self {
            email: vendor.login_email.clone(),
            name: vendor.name.clone(),
            role: Role::Vendor,
            vendor_id: Some(vendor.id.clone()),
        }
    }

    /// Creates an actor for a signed-in production team member.
    #[must_use]
    pub fn production(user: &ProductionUser) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            role: Role::Production,
            vendor_id: None,
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the signed-in user.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        match self.role {
            Role::Vendor => Actor::vendor(&self.email),
            Role::Production => Actor::production(&self.email),
        }
    }

    fn owns_vendor(&self, vendor_id: &str) -> bool {
        self.vendor_id
            .as_deref()
            .is_some_and(|own| keys_match(own, vendor_id))
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_production(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Production => Ok(()),
            Role::Vendor => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Production"),
            }),
        }
    }

    /// Checks if an actor may submit capacity for a vendor.
    ///
    /// Only the vendor itself may submit.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a vendor actor for `vendor_id`.
    pub fn authorize_submit(actor: &AuthenticatedActor, vendor_id: &str) -> Result<(), AuthError> {
        if actor.role == Role::Vendor && actor.owns_vendor(vendor_id) {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: String::from("submit_capacity"),
            required_role: format!("Vendor {vendor_id}"),
        })
    }

    /// Checks if an actor may view a vendor's capacity and submissions.
    ///
    /// Production actors may view any vendor; vendor actors only their own.
    ///
    /// # Errors
    ///
    /// Returns an error if a vendor actor asks for another vendor.
    pub fn authorize_view_vendor(
        actor: &AuthenticatedActor,
        vendor_id: &str,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Production => Ok(()),
            Role::Vendor if actor.owns_vendor(vendor_id) => Ok(()),
            Role::Vendor => Err(AuthError::Unauthorized {
                action: String::from("view_vendor"),
                required_role: format!("Production or Vendor {vendor_id}"),
            }),
        }
    }

    /// Checks if an actor may approve or reject submissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Production role.
    pub fn authorize_review(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_production(actor, "review_submission")
    }

    /// Checks if an actor may list and configure vendors.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Production role.
    pub fn authorize_manage_vendors(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_production(actor, "manage_vendors")
    }

    /// Checks if an actor may view or change the review team roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Production role.
    pub fn authorize_manage_team(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_production(actor, "manage_team")
    }
}

/// Authentication service for signing in through either portal.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Signs in through the vendor or production portal.
    ///
    /// The store checks the credentials. When it refuses them, the
    /// session's directory is consulted to explain why.
    ///
    /// # Arguments
    ///
    /// * `store` - The external store
    /// * `session` - The session holding the cached directory
    /// * `portal` - The portal being signed in through
    /// * `email` - The login email
    /// * `password` - The password
    /// * `now` - The current instant, for the directory refresh policy
    ///
    /// # Returns
    ///
    /// The authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email or password is blank
    /// - The store cannot be reached
    /// - The credentials are refused, with the diagnosed reason
    pub async fn authenticate(
        store: &dyn CapacityStore,
        session: &mut PortalSession,
        portal: Role,
        email: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("email"),
                message: String::from("Email is required"),
            });
        }
        if password.is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("password"),
                message: String::from("Password is required"),
            });
        }

        let attempt: Result<AuthenticatedActor, PersistenceError> = match portal {
            Role::Vendor => store
                .authenticate_vendor(email, password)
                .await
                .map(|vendor| AuthenticatedActor::vendor(&vendor)),
            Role::Production => store
                .authenticate_production(email, password)
                .await
                .map(|user| AuthenticatedActor::production(&user)),
        };

        match attempt {
            Ok(actor) => {
                info!(email = %actor.email, role = actor.role.label(), "Signed in");
                Ok(actor)
            }
            Err(PersistenceError::Rejected { message, .. }) => {
                let failure: AuthFailure =
                    Self::diagnose(store, session, portal, email, password, message, now).await;
                warn!(email, role = portal.label(), reason = %failure, "Sign-in refused");
                Err(AuthError::AuthenticationFailed { failure }.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn diagnose(
        store: &dyn CapacityStore,
        session: &mut PortalSession,
        portal: Role,
        email: &str,
        password: &str,
        store_message: String,
        now: OffsetDateTime,
    ) -> AuthFailure {
        let directory: &DirectorySnapshot = match session.directory(store, now).await {
            Ok(directory) => directory,
            Err(err) => {
                warn!(error = %err, "Directory unavailable; cannot diagnose sign-in failure");
                return AuthFailure::Rejected(store_message);
            }
        };
        diagnose_against(directory, portal, email, password, store_message)
    }
}

/// Explains a refused sign-in using the vendor and user directories.
///
/// # Returns
///
/// - `UnknownEmail` if neither directory has the email
/// - `WrongPortal` if only the other portal's directory has it
/// - `InactiveAccount` if the account is not active
/// - `WrongPassword` if the stored credential does not match
/// - `Rejected` with the store's message otherwise
#[must_use]
pub fn diagnose_against(
    directory: &DirectorySnapshot,
    portal: Role,
    email: &str,
    password: &str,
    store_message: String,
) -> AuthFailure {
    let account: Option<(bool, &str)> = match portal {
        Role::Vendor => directory
            .vendor_by_email(email)
            .map(|v| (v.is_active(), v.login_password_hash.as_str())),
        Role::Production => directory
            .user_by_email(email)
            .map(|u| (u.active, u.password_hash.as_str())),
    };

    let Some((active, stored)) = account else {
        let in_other_portal: bool = match portal {
            Role::Vendor => directory.user_by_email(email).is_some(),
            Role::Production => directory.vendor_by_email(email).is_some(),
        };
        if in_other_portal {
            return AuthFailure::WrongPortal {
                belongs_to: portal.other(),
            };
        }
        return AuthFailure::UnknownEmail;
    };

    if !active {
        return AuthFailure::InactiveAccount;
    }
    if !verify_password(password, stored) {
        return AuthFailure::WrongPassword;
    }
    AuthFailure::Rejected(store_message)
}
