// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::snapshot::{ReconciledSnapshot, SnapshotPayload};
use crate::state::{CapacityPatch, ReviewOutcome, TransitionResult};
use crate::submission::Submission;
use capacity_portal_audit::{Action, Actor, AuditEvent, AuditScope, Cause, StateSnapshot};
use capacity_portal_domain::{SubmissionStatus, VendorProfile};

/// Applies a review command to a submission.
///
/// Approval reconciles the submission's snapshot and returns the patch
/// to merge into live capacity. Rejection never produces a patch. The
/// submission passed in is not modified.
///
/// # Arguments
///
/// * `submission` - The submission under review
/// * `profile` - The owning vendor's tracking configuration
/// * `command` - The review decision
/// * `actor` - The reviewer
/// * `cause` - The reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the reviewed submission, the patch and an audit event
/// * `Err(CoreError)` if the review is not permitted
///
/// # Errors
///
/// Returns an error if:
/// - The submission has already been reviewed
/// - An approval is attempted before the snapshot has been loaded
pub fn apply(
    submission: &Submission,
    profile: &VendorProfile,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let action_name: &'static str = command.action_name();
    let before: StateSnapshot = submission.to_audit_snapshot();

    let (reviewed, patch, outcome): (Submission, CapacityPatch, ReviewOutcome) = match command {
        Command::Approve {
            approved_by,
            reviewed_at,
            comments,
        } => {
            submission
                .status
                .validate_transition(SubmissionStatus::Approved)?;

            let payload: &SnapshotPayload =
                submission
                    .snapshot
                    .as_ref()
                    .ok_or_else(|| CoreError::SnapshotNotLoaded {
                        submission_id: submission.submission_id.clone(),
                    })?;

            let patch: CapacityPatch = ReconciledSnapshot::from_payload(payload, profile)
                .map(|reconciled| reconciled.to_patch())
                .unwrap_or_default();
            let outcome: ReviewOutcome = if patch.is_empty() {
                ReviewOutcome::ApprovedWithoutChanges
            } else {
                ReviewOutcome::Applied {
                    entries_applied: patch.entries.len(),
                    dollar_limit_applied: patch.dollar_limit.is_some(),
                }
            };

            let reviewed: Submission = reviewed_submission(
                submission,
                SubmissionStatus::Approved,
                approved_by,
                reviewed_at,
                comments,
            );
            (reviewed, patch, outcome)
        }
        Command::Reject {
            rejected_by,
            reviewed_at,
            comments,
        } => {
            submission
                .status
                .validate_transition(SubmissionStatus::Rejected)?;

            let reviewed: Submission = reviewed_submission(
                submission,
                SubmissionStatus::Rejected,
                rejected_by,
                reviewed_at,
                comments,
            );
            (reviewed, CapacityPatch::default(), ReviewOutcome::Rejected)
        }
    };

    let after: StateSnapshot = reviewed.to_audit_snapshot();
    let details: String = match outcome {
        ReviewOutcome::Applied {
            entries_applied,
            dollar_limit_applied,
        } => format!(
            "Applied {entries_applied} entries{}",
            if dollar_limit_applied {
                " and dollar limit"
            } else {
                ""
            }
        ),
        ReviewOutcome::ApprovedWithoutChanges => {
            String::from("Approved with no capacity data to apply")
        }
        ReviewOutcome::Rejected => String::from("Rejected; live capacity untouched"),
    };
    let audit_event: AuditEvent = AuditEvent::new(
        AuditScope::submission(&submission.vendor_id, &submission.submission_id),
        actor,
        cause,
        Action::new(String::from(action_name), Some(details)),
        before,
        after,
    );

    Ok(TransitionResult {
        submission: reviewed,
        patch,
        outcome,
        audit_event,
    })
}

fn reviewed_submission(
    submission: &Submission,
    status: SubmissionStatus,
    reviewer: String,
    reviewed_at: String,
    comments: Option<String>,
) -> Submission {
    let mut reviewed: Submission = submission.clone();
    reviewed.status = status;
    reviewed.approved_by = Some(reviewer);
    reviewed.approval_date = Some(reviewed_at);
    if let Some(comments) = comments.filter(|c| !c.trim().is_empty()) {
        reviewed.comments = comments;
    }
    reviewed
}
