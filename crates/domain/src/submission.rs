// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Submission status tracking and transition logic.
//!
//! A submission is created `pending` and moves exactly once to either
//! `approved` or `rejected`. Both outcomes are terminal.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a capacity submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Awaiting review by the production team
    Pending,
    /// Accepted; its snapshot has been applied to live capacity
    Approved,
    /// Declined; live capacity was never touched
    Rejected,
}

impl SubmissionStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// Case and surrounding whitespace are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSubmissionStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidSubmissionStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal (cannot transition to another state).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "submission has already been reviewed".to_string(),
            });
        }

        if new_status.is_terminal() {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "a pending submission can only be approved or rejected".to_string(),
            })
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a submission was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    /// Entered through the workspace editor
    Manual,
    /// Entered through a CSV upload
    BulkUpload,
}

impl SubmissionType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::BulkUpload => "bulk",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::BulkUpload => "Bulk Upload",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "bulk" | "bulk_upload" | "upload" => Ok(Self::BulkUpload),
            _ => Err(DomainError::InvalidSubmissionType(s.to_string())),
        }
    }
}

impl std::fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            let s: &str = status.as_str();
            match SubmissionStatus::parse_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_status_parse_tolerates_case() {
        assert_eq!(
            "  Approved ".parse::<SubmissionStatus>().ok(),
            Some(SubmissionStatus::Approved)
        );
    }

    #[test]
    fn test_invalid_status_string() {
        assert!(SubmissionStatus::parse_str("withdrawn").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_pending_can_be_approved_or_rejected() {
        let current: SubmissionStatus = SubmissionStatus::Pending;
        assert!(
            current
                .validate_transition(SubmissionStatus::Approved)
                .is_ok()
        );
        assert!(
            current
                .validate_transition(SubmissionStatus::Rejected)
                .is_ok()
        );
        assert!(current.validate_transition(SubmissionStatus::Pending).is_err());
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for terminal in [SubmissionStatus::Approved, SubmissionStatus::Rejected] {
            for target in [
                SubmissionStatus::Pending,
                SubmissionStatus::Approved,
                SubmissionStatus::Rejected,
            ] {
                assert!(terminal.validate_transition(target).is_err());
            }
        }
    }

    #[test]
    fn test_submission_type_accepts_wire_aliases() {
        assert_eq!(
            "bulk".parse::<SubmissionType>().ok(),
            Some(SubmissionType::BulkUpload)
        );
        assert_eq!(
            "MANUAL".parse::<SubmissionType>().ok(),
            Some(SubmissionType::Manual)
        );
        assert!("fax".parse::<SubmissionType>().is_err());
    }
}
