// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::auth::Role;
use capacity_portal::CoreError;
use capacity_portal_domain::DomainError;
use capacity_portal_persistence::PersistenceError;
use thiserror::Error;
use tracing::warn;

/// Message shown whenever the store cannot be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please check API URL configuration.";

/// Why a sign-in attempt was refused.
///
/// Derived by checking which directory holds the email after the store
/// refuses the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No vendor or production account uses this email.
    UnknownEmail,
    /// The account exists but the password does not match.
    WrongPassword,
    /// The account exists but is not active.
    InactiveAccount,
    /// The email belongs to an account of the other portal.
    WrongPortal {
        /// The portal the account belongs to.
        belongs_to: Role,
    },
    /// The store refused the credentials and no better reason was found.
    Rejected(String),
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEmail => write!(f, "No account found for this email"),
            Self::WrongPassword => write!(f, "Incorrect password"),
            Self::InactiveAccount => {
                write!(f, "Account is inactive. Contact the production team")
            }
            Self::WrongPortal { belongs_to } => write!(
                f,
                "This email belongs to a {} account. Use the {} login",
                belongs_to.label(),
                belongs_to.label()
            ),
            Self::Rejected(reason) => write!(f, "{reason}"),
        }
    }
}

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// Why authentication failed.
        failure: AuthFailure,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { failure } => {
                write!(f, "Authentication failed: {failure}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain, core and store errors and represent
/// the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The store could not be reached. Nothing was changed.
    ConnectionError,
    /// Authentication failed.
    AuthenticationFailed {
        /// Why authentication failed.
        failure: AuthFailure,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A bulk upload row failed validation. Nothing was submitted.
    InvalidUpload {
        /// The 1-based file row (the header is row 1).
        row: usize,
        /// A human-readable description of the failure.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A multi-step operation failed after earlier steps took effect.
    ///
    /// Earlier steps are not undone.
    PartialApplication {
        /// Store actions that completed.
        completed: Vec<String>,
        /// The store action that failed.
        failed_step: String,
        /// The failure reported by that step.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError => write!(f, "{CONNECTION_ERROR_MESSAGE}"),
            Self::AuthenticationFailed { failure } => {
                write!(f, "Authentication failed: {failure}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidUpload { message, .. } => write!(f, "{message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::PartialApplication {
                completed,
                failed_step,
                message,
            } => {
                write!(
                    f,
                    "{failed_step} failed after {} completed; earlier changes remain applied: {message}",
                    completed.join(", ")
                )
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { failure } => Self::AuthenticationFailed { failure },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        if err.is_connectivity() {
            warn!(error = %err, "Store unreachable");
            return Self::ConnectionError;
        }
        match err {
            PersistenceError::NotFound { kind, id } => Self::ResourceNotFound {
                resource_type: capitalize(kind),
                message: format!("No {kind} with id '{id}'"),
            },
            PersistenceError::Rejected { action, message } => Self::DomainRuleViolation {
                rule: action,
                message,
            },
            PersistenceError::InvalidEndpoint { url, reason } => Self::InvalidInput {
                field: String::from("api_url"),
                message: format!("'{url}': {reason}"),
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars: std::str::Chars<'_> = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Failures writing CSV output.
#[derive(Debug, Error)]
pub enum CsvExportError {
    /// The CSV writer failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// The writer could not be flushed.
    #[error("CSV flush failed: {0}")]
    Flush(String),

    /// The output was not valid UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl From<CsvExportError> for ApiError {
    fn from(err: CsvExportError) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidWeekNumber { .. } | DomainError::InvalidWeekRange { .. } => {
            ApiError::InvalidInput {
                field: String::from("week_number"),
                message,
            }
        }
        DomainError::PastWeek { .. } => ApiError::DomainRuleViolation {
            rule: String::from("no_past_weeks"),
            message,
        },
        DomainError::InvalidCapacityValue { .. } => ApiError::InvalidInput {
            field: String::from("capacity_value"),
            message,
        },
        DomainError::InvalidDollarLimit { .. } => ApiError::InvalidInput {
            field: String::from("dollar_limit"),
            message,
        },
        DomainError::InvalidSubDepartment(_)
        | DomainError::SubDepartmentRequired { .. }
        | DomainError::SubDepartmentNotAllowed { .. } => ApiError::InvalidInput {
            field: String::from("subdept"),
            message,
        },
        DomainError::MissingSubDepartmentCapacity { .. } => ApiError::DomainRuleViolation {
            rule: String::from("complete_sub_departments"),
            message,
        },
        DomainError::DuplicateEntry { .. } => ApiError::DomainRuleViolation {
            rule: String::from("unique_entries"),
            message,
        },
        DomainError::InvalidTrackingType(_) => ApiError::InvalidInput {
            field: String::from("tracking_type"),
            message,
        },
        DomainError::InvalidVendorStatus(_) => ApiError::InvalidInput {
            field: String::from("status"),
            message,
        },
        DomainError::InvalidSubmissionStatus { .. } | DomainError::InvalidSubmissionType(_) => {
            ApiError::InvalidInput {
                field: String::from("submission"),
                message,
            }
        }
        DomainError::InvalidStatusTransition { .. } => ApiError::DomainRuleViolation {
            rule: String::from("review_once"),
            message,
        },
        DomainError::InvalidTimezone(_)
        | DomainError::InvalidFiscalYear(_)
        | DomainError::DateArithmeticOverflow { .. } => ApiError::InvalidInput {
            field: String::from("calendar"),
            message,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::SnapshotNotLoaded { submission_id } => ApiError::Internal {
            message: format!("Snapshot for submission {submission_id} was not loaded"),
        },
    }
}
