// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use serde::Serialize;

/// Represents the entity performing an action.
///
/// An actor is a signed-in vendor or production team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// The identifier for this actor (login email).
    pub id: String,
    /// The type of actor (`"vendor"` or `"production"`).
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates an actor for a signed-in vendor.
    #[must_use]
    pub fn vendor(email: &str) -> Self {
        Self::new(email.to_string(), String::from("vendor"))
    }

    /// Creates an actor for a production team member.
    #[must_use]
    pub fn production(email: &str) -> Self {
        Self::new(email.to_string(), String::from("production"))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// An identifier for this cause (e.g., the operation name).
    pub id: String,
    /// A description of the cause, such as reviewer comments.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// The name of the action (e.g., "`ApproveSubmission`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A rendering of the relevant state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// Identifies what an audit event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditScope {
    /// The vendor whose data was affected.
    pub vendor_id: String,
    /// The submission involved, if any.
    pub submission_id: Option<String>,
}

impl AuditScope {
    /// Creates a scope for a vendor-level change.
    #[must_use]
    pub fn vendor(vendor_id: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            submission_id: None,
        }
    }

    /// Creates a scope for a change to one submission.
    #[must_use]
    pub fn submission(vendor_id: &str, submission_id: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            submission_id: Some(submission_id.to_string()),
        }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful transition produces exactly one audit event capturing:
/// - What it was about (scope)
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// The vendor and submission affected.
    pub scope: AuditScope,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `scope` - The vendor and submission affected
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        scope: AuditScope,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            scope,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns a one-line description suitable for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        let target: String = self.scope.submission_id.as_ref().map_or_else(
            || format!("vendor {}", self.scope.vendor_id),
            |id| format!("submission {id} of vendor {}", self.scope.vendor_id),
        );
        format!(
            "{} {} ({}) on {target}: {} -> {}",
            self.actor.actor_type,
            self.actor.id,
            self.action.name,
            self.before.data,
            self.after.data
        )
    }
}
