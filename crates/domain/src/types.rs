// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of weeks in a fiscal year.
pub const WEEKS_PER_YEAR: u8 = 52;

/// A fiscal week number.
///
/// Week numbers are always within 1 through 52 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekNumber(u8);

impl WeekNumber {
    /// The first week of the fiscal year.
    pub const FIRST: Self = Self(1);
    /// The last week of the fiscal year.
    pub const LAST: Self = Self(WEEKS_PER_YEAR);

    /// Creates a new `WeekNumber`.
    ///
    /// # Arguments
    ///
    /// * `value` - The week number (must be between 1 and 52 inclusive)
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-52.
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (1..=WEEKS_PER_YEAR).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidWeekNumber {
                value: value.to_string(),
            })
        }
    }

    /// Creates a `WeekNumber` from a wider integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-52.
    pub fn from_i64(value: i64) -> Result<Self, DomainError> {
        u8::try_from(value)
            .map_err(|_| DomainError::InvalidWeekNumber {
                value: value.to_string(),
            })
            .and_then(Self::new)
    }

    /// Returns the week number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Iterates every week of the fiscal year in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=WEEKS_PER_YEAR).map(Self)
    }

    /// Iterates the weeks from `start` to `end` inclusive.
    ///
    /// Yields nothing when `start` is after `end`.
    pub fn range_inclusive(start: Self, end: Self) -> impl Iterator<Item = Self> {
        (start.0..=end.0).map(Self)
    }
}

impl TryFrom<u8> for WeekNumber {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeekNumber> for u8 {
    fn from(week: WeekNumber) -> Self {
        week.0
    }
}

impl std::fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the fixed production categories a vendor may track independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubDepartment {
    Tops,
    Bottoms,
    Outerwear,
    Accessories,
}

impl SubDepartment {
    /// Every sub-department, in display order.
    pub const ALL: [Self; 4] = [Self::Tops, Self::Bottoms, Self::Outerwear, Self::Accessories];

    /// Returns the canonical name of the sub-department.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tops => "Tops",
            Self::Bottoms => "Bottoms",
            Self::Outerwear => "Outerwear",
            Self::Accessories => "Accessories",
        }
    }

    /// Parses a sub-department name.
    ///
    /// Matching is exact and case-sensitive; surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not one of the fixed set.
    pub fn parse_exact(s: &str) -> Result<Self, DomainError> {
        let trimmed: &str = s.trim();
        Self::ALL
            .into_iter()
            .find(|dept| dept.as_str() == trimmed)
            .ok_or_else(|| DomainError::InvalidSubDepartment(trimmed.to_string()))
    }

    /// Returns the valid names joined for use in messages.
    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

impl FromStr for SubDepartment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_exact(s)
    }
}

impl std::fmt::Display for SubDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a vendor's capacity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackingType {
    /// Unit capacity only.
    #[default]
    Unit,
    /// Dollar value only.
    Value,
    /// Unit capacity plus a dollar limit.
    Both,
}

impl TrackingType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Value => "value",
            Self::Both => "both",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unit => "Unit Capacity",
            Self::Value => "$ Value Only",
            Self::Both => "Unit + $ Value",
        }
    }

    /// Returns whether this vendor carries a dollar exposure limit.
    #[must_use]
    pub const fn tracks_value(&self) -> bool {
        matches!(self, Self::Value | Self::Both)
    }

    /// Parses a tracking type, tolerating case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a recognized tracking type.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "unit" | "units" | "unit_capacity" => Ok(Self::Unit),
            "value" | "dollar" | "dollars" | "$" => Ok(Self::Value),
            "both" | "unit+value" | "unit_and_value" => Ok(Self::Both),
            _ => Err(DomainError::InvalidTrackingType(s.to_string())),
        }
    }
}

impl FromStr for TrackingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TrackingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a vendor's capacity is tracked as one number or per sub-department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubDeptMode {
    /// A single capacity figure per week.
    #[default]
    VendorLevel,
    /// An independent capacity figure per sub-department per week.
    BySubDept,
}

impl SubDeptMode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VendorLevel => "vendor",
            Self::BySubDept => "subdept",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VendorLevel => "Vendor Level",
            Self::BySubDept => "By Sub-Department",
        }
    }
}

impl std::fmt::Display for SubDeptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full tracking configuration of a vendor.
///
/// All materialization and validation logic branches on this pair
/// rather than on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct VendorProfile {
    /// What capacity is measured in.
    pub tracking: TrackingType,
    /// How capacity is broken down.
    pub sub_dept_mode: SubDeptMode,
}

impl VendorProfile {
    /// Creates a new `VendorProfile`.
    #[must_use]
    pub const fn new(tracking: TrackingType, sub_dept_mode: SubDeptMode) -> Self {
        Self {
            tracking,
            sub_dept_mode,
        }
    }

    /// Returns the sub-department slot of every entry required per week.
    ///
    /// Vendor-level profiles have a single slot with no sub-department.
    #[must_use]
    pub fn entry_slots(&self) -> Vec<Option<SubDepartment>> {
        match self.sub_dept_mode {
            SubDeptMode::VendorLevel => vec![None],
            SubDeptMode::BySubDept => SubDepartment::ALL.into_iter().map(Some).collect(),
        }
    }

    /// Returns the number of entries a complete year requires.
    #[must_use]
    pub fn expected_entry_count(&self) -> usize {
        let slots: usize = match self.sub_dept_mode {
            SubDeptMode::VendorLevel => 1,
            SubDeptMode::BySubDept => SubDepartment::ALL.len(),
        };
        slots * usize::from(WEEKS_PER_YEAR)
    }
}

/// Whether a vendor account may sign in and submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    #[default]
    Active,
    Inactive,
}

impl VendorStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parses a vendor status, tolerating case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a recognized status.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "active" | "enabled" | "true" | "yes" => Ok(Self::Active),
            "inactive" | "disabled" | "false" | "no" => Ok(Self::Inactive),
            _ => Err(DomainError::InvalidVendorStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An external manufacturing partner who submits capacity data.
///
/// `id` is the identity key. `name` and `login_email` are fallback
/// matching keys only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    /// The vendor identifier.
    pub id: String,
    /// The vendor display name.
    pub name: String,
    /// Tracking configuration.
    pub profile: VendorProfile,
    /// Account status.
    pub status: VendorStatus,
    /// Login email address.
    pub login_email: String,
    /// Stored credential, as held by the external store.
    #[serde(skip_serializing)]
    pub login_password_hash: String,
}

impl Vendor {
    /// Returns whether this vendor may sign in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, VendorStatus::Active)
    }
}

/// A member of the production review team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionUser {
    /// Login email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Whether the account may sign in.
    pub active: bool,
    /// Stored credential, as held by the external store.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// The uniqueness key of a capacity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    /// The fiscal week.
    pub week: WeekNumber,
    /// The sub-department, or `None` for vendor-level entries.
    pub sub_dept: Option<SubDepartment>,
}

impl EntryKey {
    /// Creates a new `EntryKey`.
    #[must_use]
    pub const fn new(week: WeekNumber, sub_dept: Option<SubDepartment>) -> Self {
        Self { week, sub_dept }
    }

    /// Describes the key for use in messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.sub_dept {
            Some(dept) => format!("week {}, subdept {dept}", self.week),
            None => format!("week {}", self.week),
        }
    }
}

/// Lookup form: `week` for vendor-level, `week|SubDept` otherwise.
impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sub_dept {
            Some(dept) => write!(f, "{}|{dept}", self.week),
            None => write!(f, "{}", self.week),
        }
    }
}

/// A single week's capacity for a vendor (and optionally a sub-department).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapacityEntry {
    /// The fiscal week.
    #[serde(rename = "week_number")]
    pub week: WeekNumber,
    /// The sub-department, or `None` for vendor-level entries.
    #[serde(rename = "subdept")]
    pub sub_dept: Option<SubDepartment>,
    /// The committed capacity, always positive.
    pub capacity_value: u32,
    /// Whether the value is an explicit per-week deviation from the default.
    pub is_override: bool,
}

impl CapacityEntry {
    /// Creates a new `CapacityEntry`.
    #[must_use]
    pub const fn new(
        week: WeekNumber,
        sub_dept: Option<SubDepartment>,
        capacity_value: u32,
        is_override: bool,
    ) -> Self {
        Self {
            week,
            sub_dept,
            capacity_value,
            is_override,
        }
    }

    /// Returns the uniqueness key of this entry.
    #[must_use]
    pub const fn key(&self) -> EntryKey {
        EntryKey::new(self.week, self.sub_dept)
    }
}
