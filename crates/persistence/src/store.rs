// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::PersistenceError;
use async_trait::async_trait;
use capacity_portal::{CapacitySnapshot, Submission};
use capacity_portal_domain::{
    CapacityEntry, ProductionUser, SubDeptMode, SubmissionStatus, SubmissionType, TrackingType,
    Vendor, VendorStatus,
};

/// A new submission to be queued for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    /// The vendor the submission belongs to.
    pub vendor_id: String,
    /// Login email of the submitting vendor.
    pub submitted_by: String,
    /// When the submission was made (`YYYY-MM-DD`).
    pub submitted_date: String,
    /// How the data was entered.
    pub submission_type: SubmissionType,
    /// Free-text comments from the vendor.
    pub comments: String,
    /// The proposed data.
    pub snapshot: CapacitySnapshot,
}

/// A review decision to record against a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub submission_id: String,
    pub status: SubmissionStatus,
    /// The reviewer, for approvals and rejections alike.
    pub approved_by: String,
    pub approval_date: String,
    pub comments: String,
}

/// A vendor's tracking configuration and account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorSettings {
    pub tracking: TrackingType,
    pub sub_dept_mode: SubDeptMode,
    pub status: VendorStatus,
}

/// A production team member to add to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeamMember {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// The external store holding vendors, users, live capacity and submissions.
///
/// There is one method per store action. Implementations perform exactly
/// one request per call; callers sequence multi-step operations.
#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// Checks vendor credentials and returns the vendor record.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the store refuses the credentials.
    async fn authenticate_vendor(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Vendor, PersistenceError>;

    /// Checks production credentials and returns the user record.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Rejected` if the store refuses the credentials.
    async fn authenticate_production(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProductionUser, PersistenceError>;

    /// Fetches the full vendor directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or answers unexpectedly.
    async fn get_all_vendors(&self) -> Result<Vec<Vendor>, PersistenceError>;

    /// Fetches the full user directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or answers unexpectedly.
    async fn get_users(&self) -> Result<Vec<ProductionUser>, PersistenceError>;

    /// Fetches a vendor's live capacity rows for a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or answers unexpectedly.
    async fn get_capacity(
        &self,
        vendor_id: &str,
        year: u16,
    ) -> Result<Vec<CapacityEntry>, PersistenceError>;

    /// Fetches a vendor's live dollar limit, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or answers unexpectedly.
    async fn get_dollar_limit(&self, vendor_id: &str) -> Result<Option<u64>, PersistenceError>;

    /// Lists submission headers, optionally filtered by status.
    ///
    /// Headers do not carry snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or answers unexpectedly.
    async fn get_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>, PersistenceError>;

    /// Fetches one submission including its snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no such submission exists.
    async fn get_submission_details(
        &self,
        submission_id: &str,
    ) -> Result<Submission, PersistenceError>;

    /// Creates a new pending submission.
    ///
    /// # Returns
    ///
    /// The new submission id, when the store reports one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the submission.
    async fn submit_for_approval(
        &self,
        submission: &NewSubmission,
    ) -> Result<Option<String>, PersistenceError>;

    /// Writes live capacity rows, replacing rows that share a key.
    ///
    /// # Returns
    ///
    /// The number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the write.
    async fn save_capacity(
        &self,
        vendor_id: &str,
        year: u16,
        entries: &[CapacityEntry],
    ) -> Result<usize, PersistenceError>;

    /// Writes a vendor's live dollar limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the write.
    async fn save_dollar_limit(
        &self,
        vendor_id: &str,
        dollar_limit: u64,
    ) -> Result<(), PersistenceError>;

    /// Records a review decision against a submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the update.
    async fn update_submission_status(&self, update: &StatusUpdate)
    -> Result<(), PersistenceError>;

    /// Changes a vendor's tracking configuration and status.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the update.
    async fn update_vendor_settings(
        &self,
        vendor_id: &str,
        settings: VendorSettings,
    ) -> Result<(), PersistenceError>;

    /// Lists the production review team.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or answers unexpectedly.
    async fn get_production_team(&self) -> Result<Vec<ProductionUser>, PersistenceError>;

    /// Adds a member to the production review team.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the member.
    async fn add_production_user(&self, member: &NewTeamMember) -> Result<(), PersistenceError>;

    /// Removes a member from the production review team.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the removal.
    async fn delete_production_user(&self, email: &str) -> Result<(), PersistenceError>;
}
