// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::snapshot::LegacyOverrides;
use crate::submission::Submission;
use capacity_portal_audit::{AuditEvent, StateSnapshot};
use capacity_portal_domain::{
    CapacityEntry, DomainError, EntryKey, SubDepartment, SubDeptMode, VendorProfile, WeekNumber,
    validate_capacity_value, validate_sub_dept_for_profile, validate_week_range,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Weekly capacity assumed for a vendor with no live data.
pub const DEFAULT_CAPACITY: u32 = 1000;

/// Dollar limit assumed for a vendor with no live data.
pub const DEFAULT_DOLLAR_LIMIT: u64 = 500_000;

/// Baseline capacity for a sub-department with no live data.
#[must_use]
pub const fn default_sub_dept_capacity(sub_dept: SubDepartment) -> u32 {
    match sub_dept {
        SubDepartment::Tops => 400,
        SubDepartment::Bottoms => 300,
        SubDepartment::Outerwear => 200,
        SubDepartment::Accessories => 100,
    }
}

/// Which weeks an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTarget {
    /// Exactly one week.
    Single(WeekNumber),
    /// Every week from `start` to `end` inclusive.
    Range {
        /// First week of the range.
        start: WeekNumber,
        /// Last week of the range.
        end: WeekNumber,
    },
}

/// A vendor's editable capacity working state.
///
/// Overrides are sparse and keyed by `(week, sub-department)`. The dense
/// 52 or 208 entry list is produced on demand by `materialize_entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityState {
    profile: VendorProfile,
    default_capacity: u32,
    dollar_limit: u64,
    sub_dept_capacities: BTreeMap<SubDepartment, u32>,
    overrides: BTreeMap<EntryKey, u32>,
}

impl CapacityState {
    /// Creates a working state with baseline values and no overrides.
    #[must_use]
    pub fn with_defaults(profile: VendorProfile) -> Self {
        Self {
            profile,
            default_capacity: DEFAULT_CAPACITY,
            dollar_limit: DEFAULT_DOLLAR_LIMIT,
            sub_dept_capacities: SubDepartment::ALL
                .into_iter()
                .map(|dept| (dept, default_sub_dept_capacity(dept)))
                .collect(),
            overrides: BTreeMap::new(),
        }
    }

    /// Builds a working state from explicit parts, validating every value.
    ///
    /// # Arguments
    ///
    /// * `profile` - The vendor's tracking configuration
    /// * `default_capacity` - Vendor-level weekly capacity
    /// * `sub_dept_capacities` - Per-sub-department weekly capacity
    /// * `overrides` - Per-week deviations
    /// * `dollar_limit` - Dollar exposure limit
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any capacity value is zero
    /// - The vendor tracks by sub-department and a sub-department has no capacity
    /// - An override's sub-department does not match the vendor's mode
    pub fn from_parts(
        profile: VendorProfile,
        default_capacity: u32,
        sub_dept_capacities: &BTreeMap<SubDepartment, u32>,
        overrides: &[(EntryKey, u32)],
        dollar_limit: u64,
    ) -> Result<Self, DomainError> {
        let mut state: Self = Self::with_defaults(profile);
        state.set_default_capacity(default_capacity)?;
        state.set_dollar_limit(dollar_limit)?;

        if profile.sub_dept_mode == SubDeptMode::BySubDept {
            for dept in SubDepartment::ALL {
                let value: u32 = sub_dept_capacities
                    .get(&dept)
                    .copied()
                    .ok_or(DomainError::MissingSubDepartmentCapacity { sub_dept: dept })?;
                state.set_sub_dept_capacity(dept, value)?;
            }
        }

        for (key, value) in overrides {
            state.apply_override(OverrideTarget::Single(key.week), key.sub_dept, *value)?;
        }

        Ok(state)
    }

    /// Rebuilds a working state from live capacity rows.
    ///
    /// Rows not marked as overrides set the baseline; override rows become
    /// overrides. Rows whose shape does not match the profile are skipped.
    #[must_use]
    pub fn from_live_entries(
        profile: VendorProfile,
        entries: &[CapacityEntry],
        dollar_limit: Option<u64>,
    ) -> Self {
        let mut state: Self = Self::with_defaults(profile);
        if let Some(limit) = dollar_limit.filter(|limit| *limit > 0) {
            state.dollar_limit = limit;
        }

        for entry in entries {
            if entry.capacity_value == 0
                || validate_sub_dept_for_profile(&profile, entry.week, entry.sub_dept).is_err()
            {
                continue;
            }
            if entry.is_override {
                state.overrides.insert(entry.key(), entry.capacity_value);
                continue;
            }
            match entry.sub_dept {
                Some(dept) => {
                    state.sub_dept_capacities.insert(dept, entry.capacity_value);
                }
                None => state.default_capacity = entry.capacity_value,
            }
        }

        state
    }

    /// Returns the vendor profile this state was built for.
    #[must_use]
    pub const fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    /// Returns the vendor-level default capacity.
    #[must_use]
    pub const fn default_capacity(&self) -> u32 {
        self.default_capacity
    }

    /// Returns the dollar limit.
    #[must_use]
    pub const fn dollar_limit(&self) -> u64 {
        self.dollar_limit
    }

    /// Returns the baseline capacity of a sub-department.
    #[must_use]
    pub fn sub_dept_capacity(&self, sub_dept: SubDepartment) -> Option<u32> {
        self.sub_dept_capacities.get(&sub_dept).copied()
    }

    /// Returns all sub-department baselines.
    #[must_use]
    pub const fn sub_dept_capacities(&self) -> &BTreeMap<SubDepartment, u32> {
        &self.sub_dept_capacities
    }

    /// Returns the override for a key, if set.
    #[must_use]
    pub fn override_value(&self, key: &EntryKey) -> Option<u32> {
        self.overrides.get(key).copied()
    }

    /// Returns the number of overrides currently set.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Sets the vendor-level default capacity.
    ///
    /// Existing overrides are unaffected.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is zero.
    pub fn set_default_capacity(&mut self, value: u32) -> Result<(), DomainError> {
        validate_capacity_value(value)?;
        self.default_capacity = value;
        Ok(())
    }

    /// Sets the baseline capacity of one sub-department.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is zero.
    pub fn set_sub_dept_capacity(
        &mut self,
        sub_dept: SubDepartment,
        value: u32,
    ) -> Result<(), DomainError> {
        validate_capacity_value(value)?;
        self.sub_dept_capacities.insert(sub_dept, value);
        Ok(())
    }

    /// Sets the dollar limit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDollarLimit` if `value` is zero.
    pub fn set_dollar_limit(&mut self, value: u64) -> Result<(), DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidDollarLimit {
                value: value.to_string(),
            });
        }
        self.dollar_limit = value;
        Ok(())
    }

    /// Sets an override for one week or a range of weeks.
    ///
    /// Re-setting a week replaces its previous override.
    ///
    /// # Arguments
    ///
    /// * `target` - The week or weeks to override
    /// * `sub_dept` - The sub-department, required exactly when tracking by sub-department
    /// * `value` - The override capacity
    ///
    /// # Returns
    ///
    /// The number of weeks written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `value` is zero
    /// - A range has its start after its end
    /// - `sub_dept` does not match the vendor's mode
    pub fn apply_override(
        &mut self,
        target: OverrideTarget,
        sub_dept: Option<SubDepartment>,
        value: u32,
    ) -> Result<usize, DomainError> {
        validate_capacity_value(value)?;
        let (start, end): (WeekNumber, WeekNumber) = match target {
            OverrideTarget::Single(week) => (week, week),
            OverrideTarget::Range { start, end } => {
                validate_week_range(start, end)?;
                (start, end)
            }
        };
        validate_sub_dept_for_profile(&self.profile, start, sub_dept)?;

        let mut written: usize = 0;
        for week in WeekNumber::range_inclusive(start, end) {
            self.overrides.insert(EntryKey::new(week, sub_dept), value);
            written += 1;
        }
        Ok(written)
    }

    /// Removes the override for a key.
    ///
    /// # Returns
    ///
    /// `true` if an override was removed.
    pub fn clear_override(&mut self, key: &EntryKey) -> bool {
        self.overrides.remove(key).is_some()
    }

    /// Returns the effective capacity for a key: its override, else its baseline.
    #[must_use]
    pub fn capacity_for(&self, key: &EntryKey) -> u32 {
        self.override_value(key).unwrap_or_else(|| self.baseline(key.sub_dept))
    }

    fn baseline(&self, sub_dept: Option<SubDepartment>) -> u32 {
        sub_dept.map_or(self.default_capacity, |dept| {
            self.sub_dept_capacity(dept)
                .unwrap_or_else(|| default_sub_dept_capacity(dept))
        })
    }

    /// Produces the dense entry list for a full year.
    ///
    /// Emits one entry per week per slot required by the profile: 52
    /// entries for vendor-level tracking, 208 when tracking by sub-department.
    #[must_use]
    pub fn materialize_entries(&self) -> Vec<CapacityEntry> {
        let slots: Vec<Option<SubDepartment>> = self.profile.entry_slots();
        let mut entries: Vec<CapacityEntry> =
            Vec::with_capacity(self.profile.expected_entry_count());

        for sub_dept in slots {
            for week in WeekNumber::all() {
                let key: EntryKey = EntryKey::new(week, sub_dept);
                let override_value: Option<u32> = self.override_value(&key);
                entries.push(CapacityEntry::new(
                    week,
                    sub_dept,
                    override_value.unwrap_or_else(|| self.baseline(sub_dept)),
                    override_value.is_some(),
                ));
            }
        }

        entries
    }

    /// Returns the overrides in the shape used by older snapshots.
    #[must_use]
    pub fn legacy_overrides(&self) -> LegacyOverrides {
        match self.profile.sub_dept_mode {
            SubDeptMode::VendorLevel => LegacyOverrides::VendorLevel(
                self.overrides
                    .iter()
                    .filter(|(key, _)| key.sub_dept.is_none())
                    .map(|(key, value)| (key.week, *value))
                    .collect(),
            ),
            SubDeptMode::BySubDept => {
                let mut by_dept: BTreeMap<SubDepartment, BTreeMap<WeekNumber, u32>> =
                    BTreeMap::new();
                for (key, value) in &self.overrides {
                    if let Some(dept) = key.sub_dept {
                        by_dept.entry(dept).or_default().insert(key.week, *value);
                    }
                }
                LegacyOverrides::BySubDept(by_dept)
            }
        }
    }
}

/// Entries and dollar limit to merge into live capacity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CapacityPatch {
    /// Entries to write, replacing any live entry with the same key.
    pub entries: Vec<CapacityEntry>,
    /// Dollar limit to set, if any.
    pub dollar_limit: Option<u64>,
}

impl CapacityPatch {
    /// Returns true if applying this patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.dollar_limit.is_none()
    }
}

/// The applied capacity of one vendor for one fiscal year.
///
/// Holds at most one entry per `(week, sub-department)` key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveCapacity {
    entries: BTreeMap<EntryKey, CapacityEntry>,
    dollar_limit: Option<u64>,
}

impl LiveCapacity {
    /// Builds live capacity from rows; later rows win on shared keys.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CapacityEntry>,
        dollar_limit: Option<u64>,
    ) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.key(), e)).collect(),
            dollar_limit,
        }
    }

    /// Returns all entries ordered by key.
    #[must_use]
    pub fn entries(&self) -> Vec<CapacityEntry> {
        self.entries.values().copied().collect()
    }

    /// Returns the entry for a key.
    #[must_use]
    pub fn get(&self, key: &EntryKey) -> Option<&CapacityEntry> {
        self.entries.get(key)
    }

    /// Returns the live dollar limit.
    #[must_use]
    pub const fn dollar_limit(&self) -> Option<u64> {
        self.dollar_limit
    }

    /// Merges a patch by key. Keys absent from the patch are left untouched.
    ///
    /// # Returns
    ///
    /// The number of entries written.
    pub fn apply_patch(&mut self, patch: &CapacityPatch) -> usize {
        for entry in &patch.entries {
            self.entries.insert(entry.key(), *entry);
        }
        if let Some(limit) = patch.dollar_limit {
            self.dollar_limit = Some(limit);
        }
        patch.entries.len()
    }
}

/// What a review did to live capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// Approved and the snapshot was applied.
    Applied {
        /// Number of capacity entries written.
        entries_applied: usize,
        /// Whether the dollar limit was set.
        dollar_limit_applied: bool,
    },
    /// Approved, but the submission carried no capacity data.
    ApprovedWithoutChanges,
    /// Rejected; live capacity untouched.
    Rejected,
}

/// The result of a successful review transition.
///
/// Transitions are pure: live capacity is changed only by applying `patch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The submission after the transition.
    pub submission: Submission,
    /// Changes to merge into live capacity.
    pub patch: CapacityPatch,
    /// What the review did.
    pub outcome: ReviewOutcome,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

impl Submission {
    /// Converts the submission to a snapshot for audit purposes.
    #[must_use]
    pub fn to_audit_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "submission={},vendor={},status={}",
            self.submission_id,
            self.vendor_id,
            self.status.as_str()
        ))
    }
}
