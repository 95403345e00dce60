// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory store for tests and local runs.
//!
//! Behaves like the remote store for every action, records the order in
//! which actions were called, and can be told to fail specific actions.

use crate::action::StoreAction;
use crate::credentials::{hash_password, verify_password};
use crate::error::PersistenceError;
use crate::store::{CapacityStore, NewSubmission, NewTeamMember, StatusUpdate, VendorSettings};
use async_trait::async_trait;
use capacity_portal::{CapacityPatch, LiveCapacity, SnapshotPayload, Submission};
use capacity_portal_domain::{
    CapacityEntry, ProductionUser, SubmissionStatus, Vendor, keys_match, normalize_key,
};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct MemoryState {
    vendors: Vec<Vendor>,
    users: Vec<ProductionUser>,
    capacity: BTreeMap<(String, u16), LiveCapacity>,
    dollar_limits: BTreeMap<String, u64>,
    submissions: Vec<Submission>,
    next_submission: u32,
    failing: BTreeSet<StoreAction>,
    calls: Vec<StoreAction>,
}

impl MemoryState {
    fn vendor_mut(&mut self, vendor_id: &str) -> Option<&mut Vendor> {
        self.vendors.iter_mut().find(|v| keys_match(&v.id, vendor_id))
    }

    fn submission(&self, submission_id: &str) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|s| keys_match(&s.submission_id, submission_id))
    }

    fn submission_mut(&mut self, submission_id: &str) -> Option<&mut Submission> {
        self.submissions
            .iter_mut()
            .find(|s| keys_match(&s.submission_id, submission_id))
    }
}

/// A `CapacityStore` held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vendor to the directory.
    #[must_use]
    pub fn with_vendor(mut self, vendor: Vendor) -> Self {
        self.state.get_mut().vendors.push(vendor);
        self
    }

    /// Adds a production user to the directory and roster.
    #[must_use]
    pub fn with_user(mut self, user: ProductionUser) -> Self {
        self.state.get_mut().users.push(user);
        self
    }

    /// Seeds live capacity for a vendor and year.
    #[must_use]
    pub fn with_capacity(mut self, vendor_id: &str, year: u16, entries: Vec<CapacityEntry>) -> Self {
        self.state.get_mut().capacity.insert(
            (normalize_key(vendor_id), year),
            LiveCapacity::from_entries(entries, None),
        );
        self
    }

    /// Seeds a vendor's live dollar limit.
    #[must_use]
    pub fn with_dollar_limit(mut self, vendor_id: &str, dollar_limit: u64) -> Self {
        self.state
            .get_mut()
            .dollar_limits
            .insert(normalize_key(vendor_id), dollar_limit);
        self
    }

    /// Seeds an existing submission.
    #[must_use]
    pub fn with_submission(mut self, submission: Submission) -> Self {
        self.state.get_mut().submissions.push(submission);
        self
    }

    /// Makes every later call of `action` fail as if the store were unreachable.
    pub async fn fail_on(&self, action: StoreAction) {
        self.state.lock().await.failing.insert(action);
    }

    /// Undoes `fail_on`.
    pub async fn recover(&self, action: StoreAction) {
        self.state.lock().await.failing.remove(&action);
    }

    /// Returns the actions called so far, in order.
    pub async fn calls(&self) -> Vec<StoreAction> {
        self.state.lock().await.calls.clone()
    }

    /// Returns the live capacity rows for a vendor and year.
    pub async fn live_capacity(&self, vendor_id: &str, year: u16) -> Vec<CapacityEntry> {
        self.state
            .lock()
            .await
            .capacity
            .get(&(normalize_key(vendor_id), year))
            .map(LiveCapacity::entries)
            .unwrap_or_default()
    }

    /// Returns a vendor's live dollar limit.
    pub async fn live_dollar_limit(&self, vendor_id: &str) -> Option<u64> {
        self.state
            .lock()
            .await
            .dollar_limits
            .get(&normalize_key(vendor_id))
            .copied()
    }

    /// Returns a stored submission with its snapshot.
    pub async fn submission(&self, submission_id: &str) -> Option<Submission> {
        self.state.lock().await.submission(submission_id).cloned()
    }

    /// Locks the state and records the call, failing if `action` is set to fail.
    async fn begin(
        &self,
        action: StoreAction,
    ) -> Result<MutexGuard<'_, MemoryState>, PersistenceError> {
        let mut state: MutexGuard<'_, MemoryState> = self.state.lock().await;
        state.calls.push(action);
        debug!(action = %action, "In-memory store call");
        if state.failing.contains(&action) {
            return Err(PersistenceError::Unavailable {
                action: action.as_str().to_string(),
            });
        }
        Ok(state)
    }
}

fn rejected(action: StoreAction, message: &str) -> PersistenceError {
    PersistenceError::Rejected {
        action: action.as_str().to_string(),
        message: message.to_string(),
    }
}

fn header(submission: &Submission) -> Submission {
    let mut header: Submission = submission.clone();
    header.snapshot = None;
    header
}

#[async_trait]
impl CapacityStore for InMemoryStore {
    async fn authenticate_vendor(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Vendor, PersistenceError> {
        let action: StoreAction = StoreAction::AuthenticateVendor;
        let state: MutexGuard<'_, MemoryState> = self.begin(action).await?;
        let vendor: &Vendor = state
            .vendors
            .iter()
            .find(|v| keys_match(&v.login_email, email))
            .filter(|v| verify_password(password, &v.login_password_hash))
            .ok_or_else(|| rejected(action, "Invalid credentials"))?;
        if !vendor.is_active() {
            return Err(rejected(action, "Account is inactive"));
        }
        Ok(vendor.clone())
    }

    async fn authenticate_production(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProductionUser, PersistenceError> {
        let action: StoreAction = StoreAction::AuthenticateProduction;
        let state: MutexGuard<'_, MemoryState> = self.begin(action).await?;
        let user: &ProductionUser = state
            .users
            .iter()
            .find(|u| keys_match(&u.email, email))
            .filter(|u| verify_password(password, &u.password_hash))
            .ok_or_else(|| rejected(action, "Invalid credentials"))?;
        if !user.active {
            return Err(rejected(action, "Account is inactive"));
        }
        Ok(user.clone())
    }

    async fn get_all_vendors(&self) -> Result<Vec<Vendor>, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> = self.begin(StoreAction::GetAllVendors).await?;
        Ok(state.vendors.clone())
    }

    async fn get_users(&self) -> Result<Vec<ProductionUser>, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> = self.begin(StoreAction::GetUsers).await?;
        Ok(state.users.clone())
    }

    async fn get_capacity(
        &self,
        vendor_id: &str,
        year: u16,
    ) -> Result<Vec<CapacityEntry>, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> = self.begin(StoreAction::GetCapacity).await?;
        Ok(state
            .capacity
            .get(&(normalize_key(vendor_id), year))
            .map(LiveCapacity::entries)
            .unwrap_or_default())
    }

    async fn get_dollar_limit(&self, vendor_id: &str) -> Result<Option<u64>, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> = self.begin(StoreAction::GetDollarLimit).await?;
        Ok(state.dollar_limits.get(&normalize_key(vendor_id)).copied())
    }

    async fn get_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> = self.begin(StoreAction::GetSubmissions).await?;
        Ok(state
            .submissions
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .map(header)
            .collect())
    }

    async fn get_submission_details(
        &self,
        submission_id: &str,
    ) -> Result<Submission, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> =
            self.begin(StoreAction::GetSubmissionDetails).await?;
        state
            .submission(submission_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound {
                kind: "submission",
                id: submission_id.to_string(),
            })
    }

    async fn submit_for_approval(
        &self,
        submission: &NewSubmission,
    ) -> Result<Option<String>, PersistenceError> {
        let mut state: MutexGuard<'_, MemoryState> =
            self.begin(StoreAction::SubmitForApproval).await?;
        state.next_submission += 1;
        let submission_id: String = format!("SUB-{:04}", state.next_submission);

        state.submissions.push(Submission {
            submission_id: submission_id.clone(),
            vendor_id: submission.vendor_id.clone(),
            submitted_by: submission.submitted_by.clone(),
            submitted_date: submission.submitted_date.clone(),
            submission_type: submission.submission_type,
            status: SubmissionStatus::Pending,
            comments: submission.comments.clone(),
            snapshot: Some(SnapshotPayload::classify(submission.snapshot.clone(), true)),
            approved_by: None,
            approval_date: None,
        });
        drop(state);
        info!(
            submission_id = %submission_id,
            vendor_id = %submission.vendor_id,
            "Submission queued for approval"
        );
        Ok(Some(submission_id))
    }

    async fn save_capacity(
        &self,
        vendor_id: &str,
        year: u16,
        entries: &[CapacityEntry],
    ) -> Result<usize, PersistenceError> {
        let patch: CapacityPatch = CapacityPatch {
            entries: entries.to_vec(),
            dollar_limit: None,
        };
        let written: usize = self
            .begin(StoreAction::SaveCapacity)
            .await?
            .capacity
            .entry((normalize_key(vendor_id), year))
            .or_default()
            .apply_patch(&patch);
        info!(vendor_id, year, written, "Live capacity saved");
        Ok(written)
    }

    async fn save_dollar_limit(
        &self,
        vendor_id: &str,
        dollar_limit: u64,
    ) -> Result<(), PersistenceError> {
        self.begin(StoreAction::SaveDollarLimit)
            .await?
            .dollar_limits
            .insert(normalize_key(vendor_id), dollar_limit);
        info!(vendor_id, dollar_limit, "Live dollar limit saved");
        Ok(())
    }

    async fn update_submission_status(
        &self,
        update: &StatusUpdate,
    ) -> Result<(), PersistenceError> {
        let mut state: MutexGuard<'_, MemoryState> =
            self.begin(StoreAction::UpdateSubmissionStatus).await?;
        let submission: &mut Submission = state
            .submission_mut(&update.submission_id)
            .ok_or_else(|| PersistenceError::NotFound {
                kind: "submission",
                id: update.submission_id.clone(),
            })?;
        submission.status = update.status;
        submission.approved_by = Some(update.approved_by.clone());
        submission.approval_date = Some(update.approval_date.clone());
        if !update.comments.trim().is_empty() {
            submission.comments.clone_from(&update.comments);
        }
        drop(state);
        info!(
            submission_id = %update.submission_id,
            status = update.status.as_str(),
            "Submission status updated"
        );
        Ok(())
    }

    async fn update_vendor_settings(
        &self,
        vendor_id: &str,
        settings: VendorSettings,
    ) -> Result<(), PersistenceError> {
        let mut state: MutexGuard<'_, MemoryState> =
            self.begin(StoreAction::UpdateVendorSettings).await?;
        let vendor: &mut Vendor =
            state
                .vendor_mut(vendor_id)
                .ok_or_else(|| PersistenceError::NotFound {
                    kind: "vendor",
                    id: vendor_id.to_string(),
                })?;
        vendor.profile.tracking = settings.tracking;
        vendor.profile.sub_dept_mode = settings.sub_dept_mode;
        vendor.status = settings.status;
        Ok(())
    }

    async fn get_production_team(&self) -> Result<Vec<ProductionUser>, PersistenceError> {
        let state: MutexGuard<'_, MemoryState> =
            self.begin(StoreAction::GetProductionTeam).await?;
        Ok(state.users.clone())
    }

    async fn add_production_user(&self, member: &NewTeamMember) -> Result<(), PersistenceError> {
        let action: StoreAction = StoreAction::AddProductionUser;
        let mut state: MutexGuard<'_, MemoryState> = self.begin(action).await?;
        if state.users.iter().any(|u| keys_match(&u.email, &member.email)) {
            return Err(rejected(action, "User already exists"));
        }
        state.users.push(ProductionUser {
            email: member.email.trim().to_string(),
            name: member.name.trim().to_string(),
            active: true,
            password_hash: hash_password(&member.password)?,
        });
        Ok(())
    }

    async fn delete_production_user(&self, email: &str) -> Result<(), PersistenceError> {
        let mut state: MutexGuard<'_, MemoryState> =
            self.begin(StoreAction::DeleteProductionUser).await?;
        let before: usize = state.users.len();
        state.users.retain(|u| !keys_match(&u.email, email));
        if state.users.len() == before {
            return Err(PersistenceError::NotFound {
                kind: "production user",
                id: email.to_string(),
            });
        }
        Ok(())
    }
}
