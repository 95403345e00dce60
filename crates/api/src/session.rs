// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session context holding the fetched vendor and user directories.
//!
//! The directories are fetched once and reused until the refresh policy
//! says they are stale. Nothing is re-fetched implicitly; callers that
//! change a vendor call `invalidate`.

use capacity_portal_domain::{ProductionUser, Vendor, keys_match, resolve_vendor_from_list};
use capacity_portal_persistence::{CapacityStore, PersistenceError};
use num_traits::ToPrimitive;
use time::{Duration, OffsetDateTime};
use tracing::info;

/// How long a fetched directory may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    max_age: Duration,
}

impl RefreshPolicy {
    /// Reuses a directory for up to `max_age`.
    #[must_use]
    pub const fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// Reuses a directory for up to `seconds` seconds.
    #[must_use]
    pub fn from_secs(seconds: u64) -> Self {
        Self::new(Duration::seconds(seconds.to_i64().unwrap_or(i64::MAX)))
    }

    /// Never reuses a directory.
    #[must_use]
    pub const fn always_refresh() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns the maximum age.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns true if a directory fetched at `fetched_at` must be re-fetched.
    #[must_use]
    pub fn is_stale(&self, fetched_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        now - fetched_at >= self.max_age
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::from_secs(300)
    }
}

/// The vendor and user directories as of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    vendors: Vec<Vendor>,
    users: Vec<ProductionUser>,
    fetched_at: OffsetDateTime,
}

impl DirectorySnapshot {
    /// Wraps already-fetched directories.
    #[must_use]
    pub const fn new(
        vendors: Vec<Vendor>,
        users: Vec<ProductionUser>,
        fetched_at: OffsetDateTime,
    ) -> Self {
        Self {
            vendors,
            users,
            fetched_at,
        }
    }

    /// Fetches both directories, vendors first.
    ///
    /// # Errors
    ///
    /// Returns an error if either fetch fails.
    pub async fn fetch(
        store: &dyn CapacityStore,
        now: OffsetDateTime,
    ) -> Result<Self, PersistenceError> {
        let vendors: Vec<Vendor> = store.get_all_vendors().await?;
        let users: Vec<ProductionUser> = store.get_users().await?;
        info!(
            vendors = vendors.len(),
            users = users.len(),
            "Directory refreshed"
        );
        Ok(Self::new(vendors, users, now))
    }

    #[must_use]
    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    #[must_use]
    pub fn users(&self) -> &[ProductionUser] {
        &self.users
    }

    #[must_use]
    pub const fn fetched_at(&self) -> OffsetDateTime {
        self.fetched_at
    }

    /// Resolves a vendor reference (id, name, or drifted id).
    #[must_use]
    pub fn resolve_vendor(&self, reference: &str) -> Option<&Vendor> {
        resolve_vendor_from_list(&self.vendors, reference)
    }

    /// Finds the vendor whose login email matches.
    #[must_use]
    pub fn vendor_by_email(&self, email: &str) -> Option<&Vendor> {
        self.vendors
            .iter()
            .find(|v| !v.login_email.is_empty() && keys_match(&v.login_email, email))
    }

    /// Finds the production user whose email matches.
    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<&ProductionUser> {
        self.users
            .iter()
            .find(|u| !u.email.is_empty() && keys_match(&u.email, email))
    }
}

/// Per-session context passed to authentication and handlers.
#[derive(Debug, Clone, Default)]
pub struct PortalSession {
    policy: RefreshPolicy,
    directory: Option<DirectorySnapshot>,
}

impl PortalSession {
    /// Creates a session with no directory fetched yet.
    #[must_use]
    pub const fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            directory: None,
        }
    }

    /// Returns the directory, fetching it if absent or stale.
    ///
    /// A failed fetch leaves any previous directory in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch was needed and failed.
    pub async fn directory(
        &mut self,
        store: &dyn CapacityStore,
        now: OffsetDateTime,
    ) -> Result<&DirectorySnapshot, PersistenceError> {
        let policy: RefreshPolicy = self.policy;
        if let Some(current) = self
            .directory
            .take_if(|d| !policy.is_stale(d.fetched_at, now))
        {
            let current: &DirectorySnapshot = self.directory.insert(current);
            return Ok(current);
        }
        self.refresh(store, now).await
    }

    /// Fetches the directory regardless of age.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn refresh(
        &mut self,
        store: &dyn CapacityStore,
        now: OffsetDateTime,
    ) -> Result<&DirectorySnapshot, PersistenceError> {
        let fresh: DirectorySnapshot = DirectorySnapshot::fetch(store, now).await?;
        let fresh: &DirectorySnapshot = self.directory.insert(fresh);
        Ok(fresh)
    }

    /// Drops the cached directory so the next use re-fetches.
    pub fn invalidate(&mut self) {
        self.directory = None;
    }
}
