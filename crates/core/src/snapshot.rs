// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Submission snapshots and their reconciliation.
//!
//! Two snapshot generations exist. Current snapshots carry an explicit
//! entry list; older snapshots carry only a default capacity, sparse
//! overrides and sub-department baselines. Both are decoded into a
//! `SnapshotPayload` before any business logic runs, and both reconcile
//! to the same dense entry list.

use crate::state::{CapacityPatch, CapacityState};
use capacity_portal_domain::{
    CapacityEntry, EntryKey, SubDepartment, SubDeptMode, VendorProfile, WeekNumber,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Sparse per-week overrides as stored by older snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum LegacyOverrides {
    /// No overrides recorded.
    #[default]
    None,
    /// `week -> value`.
    VendorLevel(BTreeMap<WeekNumber, u32>),
    /// `sub-department -> week -> value`.
    BySubDept(BTreeMap<SubDepartment, BTreeMap<WeekNumber, u32>>),
}

impl LegacyOverrides {
    /// Returns true if no override is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::VendorLevel(weeks) => weeks.is_empty(),
            Self::BySubDept(depts) => depts.values().all(BTreeMap::is_empty),
        }
    }
}

/// The baseline-plus-overrides fields carried by older snapshots.
///
/// Current snapshots written by the manual editor carry these as well.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LegacyFields {
    /// Vendor-level default capacity.
    pub default_capacity: Option<u32>,
    /// Sparse overrides.
    pub week_overrides: LegacyOverrides,
    /// Per-sub-department baselines.
    pub sub_dept_capacities: BTreeMap<SubDepartment, u32>,
}

impl LegacyFields {
    /// Returns true if none of the fields carry data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_capacity.is_none()
            && self.week_overrides.is_empty()
            && self.sub_dept_capacities.is_empty()
    }
}

/// A submission's proposed data in its current form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacitySnapshot {
    /// Explicit entries.
    pub entries: Vec<CapacityEntry>,
    /// Proposed dollar limit.
    pub dollar_limit: Option<u64>,
    /// Fiscal year the snapshot applies to.
    pub year: u16,
    /// Baseline-plus-overrides form of the same data, when available.
    pub legacy: LegacyFields,
    /// Uploaded file content, for bulk uploads.
    pub csv_content: Option<String>,
    /// Uploaded file name, for bulk uploads.
    pub csv_filename: Option<String>,
}

impl CapacitySnapshot {
    /// Builds a snapshot from an edited working state.
    ///
    /// Carries the full 52 or 208 entry list plus the baseline-plus-overrides
    /// fields. The dollar limit is included only for vendors tracking value.
    #[must_use]
    pub fn from_state(state: &CapacityState, year: u16) -> Self {
        let profile: &VendorProfile = state.profile();
        let sub_dept_capacities: BTreeMap<SubDepartment, u32> = match profile.sub_dept_mode {
            SubDeptMode::VendorLevel => BTreeMap::new(),
            SubDeptMode::BySubDept => state.sub_dept_capacities().clone(),
        };

        Self {
            entries: state.materialize_entries(),
            dollar_limit: profile
                .tracking
                .tracks_value()
                .then_some(state.dollar_limit()),
            year,
            legacy: LegacyFields {
                default_capacity: Some(state.default_capacity()),
                week_overrides: state.legacy_overrides(),
                sub_dept_capacities,
            },
            csv_content: None,
            csv_filename: None,
        }
    }

    /// Builds a snapshot from validated upload rows.
    ///
    /// Only the rows present in the file are carried.
    #[must_use]
    pub fn from_upload(
        entries: Vec<CapacityEntry>,
        dollar_limit: Option<u64>,
        year: u16,
        csv_content: String,
        csv_filename: String,
    ) -> Self {
        Self {
            entries,
            dollar_limit,
            year,
            legacy: LegacyFields::default(),
            csv_content: Some(csv_content),
            csv_filename: Some(csv_filename),
        }
    }
}

/// A snapshot without explicit entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacySnapshot {
    /// The baseline-plus-overrides fields.
    pub fields: LegacyFields,
    /// Proposed dollar limit.
    pub dollar_limit: Option<u64>,
    /// Fiscal year, when recorded.
    pub year: Option<u16>,
}

/// A decoded snapshot, classified by schema generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum SnapshotPayload {
    /// Carries explicit entries.
    Current(CapacitySnapshot),
    /// Carries only baseline-plus-overrides fields and/or a dollar limit.
    Legacy(LegacySnapshot),
    /// Carries nothing usable.
    Empty,
}

impl SnapshotPayload {
    /// Classifies decoded snapshot fields by which of them are present.
    ///
    /// - Non-empty `entries` make a current snapshot
    /// - Otherwise any legacy field or a dollar limit makes a legacy snapshot
    /// - Otherwise the snapshot is empty
    #[must_use]
    pub fn classify(snapshot: CapacitySnapshot, year_recorded: bool) -> Self {
        if !snapshot.entries.is_empty() {
            return Self::Current(snapshot);
        }
        if !snapshot.legacy.is_empty() || snapshot.dollar_limit.is_some() {
            return Self::Legacy(LegacySnapshot {
                fields: snapshot.legacy,
                dollar_limit: snapshot.dollar_limit,
                year: year_recorded.then_some(snapshot.year),
            });
        }
        Self::Empty
    }
}

/// Rebuilds the dense entry list from baseline-plus-overrides fields.
///
/// For each slot the profile requires and each week, the value is the
/// override if present, else the baseline. Slots with neither are skipped.
/// Overrides recorded in the shape of the other mode are ignored.
#[must_use]
pub fn reconstruct_entries(fields: &LegacyFields, profile: &VendorProfile) -> Vec<CapacityEntry> {
    let empty: BTreeMap<WeekNumber, u32> = BTreeMap::new();
    let mut entries: Vec<CapacityEntry> = Vec::with_capacity(profile.expected_entry_count());

    for sub_dept in profile.entry_slots() {
        let (overrides, baseline): (&BTreeMap<WeekNumber, u32>, Option<u32>) =
            match (sub_dept, &fields.week_overrides) {
                (None, LegacyOverrides::VendorLevel(weeks)) => (weeks, fields.default_capacity),
                (None, _) => (&empty, fields.default_capacity),
                (Some(dept), LegacyOverrides::BySubDept(depts)) => (
                    depts.get(&dept).unwrap_or(&empty),
                    fields.sub_dept_capacities.get(&dept).copied(),
                ),
                (Some(dept), _) => (&empty, fields.sub_dept_capacities.get(&dept).copied()),
            };

        for week in WeekNumber::all() {
            let override_value: Option<u32> = overrides.get(&week).copied();
            if let Some(value) = override_value.or(baseline).filter(|v| *v > 0) {
                entries.push(CapacityEntry::new(
                    week,
                    sub_dept,
                    value,
                    override_value.is_some(),
                ));
            }
        }
    }

    entries
}

/// Where reconciled entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// The submission's explicit entries.
    Submitted,
    /// Rebuilt from an older snapshot's baseline-plus-overrides fields.
    LegacyReconstructed,
    /// The vendor's live capacity, shown because the submission carried
    /// nothing. Not what was actually submitted.
    LiveFallback,
}

/// A submission's data normalized to a single entry list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledSnapshot {
    /// The normalized entries.
    pub entries: Vec<CapacityEntry>,
    /// The dollar limit.
    pub dollar_limit: Option<u64>,
    /// Where the data came from.
    pub source: SnapshotSource,
}

impl ReconciledSnapshot {
    /// Reconciles a decoded payload.
    ///
    /// # Returns
    ///
    /// `None` when the payload carries no entries and no dollar limit.
    #[must_use]
    pub fn from_payload(payload: &SnapshotPayload, profile: &VendorProfile) -> Option<Self> {
        let reconciled: Self = match payload {
            SnapshotPayload::Current(snapshot) => Self {
                entries: snapshot.entries.clone(),
                dollar_limit: snapshot.dollar_limit,
                source: SnapshotSource::Submitted,
            },
            SnapshotPayload::Legacy(legacy) => Self {
                entries: reconstruct_entries(&legacy.fields, profile),
                dollar_limit: legacy.dollar_limit,
                source: SnapshotSource::LegacyReconstructed,
            },
            SnapshotPayload::Empty => return None,
        };
        reconciled.has_data().then_some(reconciled)
    }

    /// Wraps live capacity as a display substitute.
    ///
    /// # Returns
    ///
    /// `None` when there is no live data either.
    #[must_use]
    pub fn from_live(entries: Vec<CapacityEntry>, dollar_limit: Option<u64>) -> Option<Self> {
        let reconciled: Self = Self {
            entries,
            dollar_limit,
            source: SnapshotSource::LiveFallback,
        };
        reconciled.has_data().then_some(reconciled)
    }

    fn has_data(&self) -> bool {
        !self.entries.is_empty() || self.dollar_limit.is_some()
    }

    /// Returns true if the data is not what was actually submitted.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == SnapshotSource::LiveFallback
    }

    /// Returns the patch approval would apply.
    ///
    /// Live fallback data is never applied.
    #[must_use]
    pub fn to_patch(&self) -> CapacityPatch {
        if self.is_fallback() {
            return CapacityPatch::default();
        }
        CapacityPatch {
            entries: self.entries.clone(),
            dollar_limit: self.dollar_limit,
        }
    }
}

/// What to show for a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SnapshotView {
    /// Data is available.
    Available(ReconciledSnapshot),
    /// Neither the submission nor live capacity had any data.
    NoDataAvailable,
}

/// One key whose pending value differs from live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    /// The entry key.
    pub key: EntryKey,
    /// The live value, 0 if absent.
    pub live: u32,
    /// The pending value.
    pub pending: u32,
}

/// Compares a pending snapshot against live capacity.
///
/// Lookups are by precomputed key maps, so each cell check is O(1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingChanges {
    live: HashMap<EntryKey, u32>,
    pending: HashMap<EntryKey, u32>,
}

impl PendingChanges {
    /// Builds the comparison maps.
    #[must_use]
    pub fn new(live: &[CapacityEntry], pending: &[CapacityEntry]) -> Self {
        Self {
            live: live.iter().map(|e| (e.key(), e.capacity_value)).collect(),
            pending: pending
                .iter()
                .map(|e| (e.key(), e.capacity_value))
                .collect(),
        }
    }

    /// Returns the live value for a key, 0 if absent.
    #[must_use]
    pub fn live_value(&self, key: &EntryKey) -> u32 {
        self.live.get(key).copied().unwrap_or(0)
    }

    /// Returns the pending value for a key.
    #[must_use]
    pub fn pending_value(&self, key: &EntryKey) -> Option<u32> {
        self.pending.get(key).copied()
    }

    /// Returns true if the key is in the pending snapshot with a different value.
    #[must_use]
    pub fn differs(&self, key: &EntryKey) -> bool {
        self.pending_value(key)
            .is_some_and(|pending| pending != self.live_value(key))
    }

    /// Returns every differing key, ordered by key.
    #[must_use]
    pub fn changes(&self) -> Vec<PendingChange> {
        let mut changes: Vec<PendingChange> = self
            .pending
            .iter()
            .filter(|(key, _)| self.differs(key))
            .map(|(key, pending)| PendingChange {
                key: *key,
                live: self.live_value(key),
                pending: *pending,
            })
            .collect();
        changes.sort_by_key(|change| change.key);
        changes
    }
}
