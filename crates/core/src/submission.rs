// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::snapshot::SnapshotPayload;
use capacity_portal_domain::{SubmissionStatus, SubmissionType};
use serde::Serialize;

/// A vendor's proposed capacity change awaiting or past review.
///
/// Created `Pending` by a vendor action and changed exactly once by a
/// review. The snapshot is never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// The submission identifier assigned by the store.
    pub submission_id: String,
    /// The vendor the submission belongs to.
    pub vendor_id: String,
    /// Email of the vendor user who submitted.
    pub submitted_by: String,
    /// When the submission was created, as recorded by the store.
    pub submitted_date: String,
    /// How the submission was entered.
    pub submission_type: SubmissionType,
    /// Current lifecycle state.
    pub status: SubmissionStatus,
    /// Vendor or reviewer comments.
    pub comments: String,
    /// The proposed data. `None` when only the header has been fetched.
    pub snapshot: Option<SnapshotPayload>,
    /// Email of the reviewer, once reviewed.
    pub approved_by: Option<String>,
    /// When the review happened, once reviewed.
    pub approval_date: Option<String>,
}

impl Submission {
    /// Returns true if the submission is still awaiting review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }

    /// Returns true if the snapshot has been fetched.
    #[must_use]
    pub const fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Attaches a fetched snapshot, replacing any previous one.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotPayload) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}
