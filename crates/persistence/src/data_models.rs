// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::store::{NewSubmission, NewTeamMember, StatusUpdate, VendorSettings};
use capacity_portal::{CapacitySnapshot, LegacyOverrides};
use capacity_portal_domain::CapacityEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Wire representation of a capacity row.
///
/// Vendor-level rows carry an empty `subdept`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityEntryData {
    pub week_number: u8,
    pub capacity_value: u32,
    pub subdept: String,
    pub is_override: bool,
}

impl From<&CapacityEntry> for CapacityEntryData {
    fn from(entry: &CapacityEntry) -> Self {
        Self {
            week_number: entry.week.value(),
            capacity_value: entry.capacity_value,
            subdept: entry
                .sub_dept
                .map_or_else(String::new, |dept| dept.as_str().to_string()),
            is_override: entry.is_override,
        }
    }
}

/// Body of a `saveCapacity` request.
#[derive(Debug, Clone, Serialize)]
pub struct SaveCapacityRequest {
    pub vendor_id: String,
    pub year: u16,
    pub entries: Vec<CapacityEntryData>,
}

/// Body of a `saveDollarLimit` request.
#[derive(Debug, Clone, Serialize)]
pub struct SaveDollarLimitRequest {
    pub vendor_id: String,
    pub dollar_limit: u64,
}

/// Body of a `submitForApproval` request.
///
/// Carries the explicit entries plus the baseline-plus-overrides fields
/// read by older clients. Absent numbers are sent as `0`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitForApprovalRequest {
    pub vendor_id: String,
    pub submitted_by: String,
    pub submitted_date: String,
    pub submission_type: String,
    pub comments: String,
    pub year: u16,
    pub entries: Vec<CapacityEntryData>,
    pub dollar_limit: u64,
    pub default_capacity: u32,
    pub week_overrides: Value,
    pub subdept_capacities: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_filename: Option<String>,
}

impl From<&NewSubmission> for SubmitForApprovalRequest {
    fn from(submission: &NewSubmission) -> Self {
        let snapshot: &CapacitySnapshot = &submission.snapshot;
        Self {
            vendor_id: submission.vendor_id.clone(),
            submitted_by: submission.submitted_by.clone(),
            submitted_date: submission.submitted_date.clone(),
            submission_type: submission.submission_type.as_str().to_string(),
            comments: submission.comments.clone(),
            year: snapshot.year,
            entries: snapshot.entries.iter().map(CapacityEntryData::from).collect(),
            dollar_limit: snapshot.dollar_limit.unwrap_or(0),
            default_capacity: snapshot.legacy.default_capacity.unwrap_or(0),
            week_overrides: week_overrides_value(&snapshot.legacy.week_overrides),
            subdept_capacities: snapshot
                .legacy
                .sub_dept_capacities
                .iter()
                .map(|(dept, value)| (dept.as_str().to_string(), *value))
                .collect(),
            csv_content: snapshot.csv_content.clone(),
            csv_filename: snapshot.csv_filename.clone(),
        }
    }
}

/// Renders sparse overrides as `{week: value}` or `{subdept: {week: value}}`.
#[must_use]
pub fn week_overrides_value(overrides: &LegacyOverrides) -> Value {
    let mut map: Map<String, Value> = Map::new();
    match overrides {
        LegacyOverrides::None => {}
        LegacyOverrides::VendorLevel(weeks) => {
            for (week, value) in weeks {
                map.insert(week.to_string(), Value::from(*value));
            }
        }
        LegacyOverrides::BySubDept(depts) => {
            for (dept, weeks) in depts {
                let mut inner: Map<String, Value> = Map::new();
                for (week, value) in weeks {
                    inner.insert(week.to_string(), Value::from(*value));
                }
                map.insert(dept.as_str().to_string(), Value::Object(inner));
            }
        }
    }
    Value::Object(map)
}

/// Body of an `updateSubmissionStatus` request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateSubmissionStatusRequest {
    pub submission_id: String,
    pub status: String,
    pub approved_by: String,
    pub approval_date: String,
    pub comments: String,
}

impl From<&StatusUpdate> for UpdateSubmissionStatusRequest {
    fn from(update: &StatusUpdate) -> Self {
        Self {
            submission_id: update.submission_id.clone(),
            status: update.status.as_str().to_string(),
            approved_by: update.approved_by.clone(),
            approval_date: update.approval_date.clone(),
            comments: update.comments.clone(),
        }
    }
}

/// Body of an `updateVendorSettings` request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateVendorSettingsRequest {
    pub vendor_id: String,
    pub tracking_type: String,
    pub subdept_mode: String,
    pub status: String,
}

impl UpdateVendorSettingsRequest {
    /// Creates the request body for a vendor.
    #[must_use]
    pub fn new(vendor_id: &str, settings: VendorSettings) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            tracking_type: settings.tracking.as_str().to_string(),
            subdept_mode: settings.sub_dept_mode.as_str().to_string(),
            status: settings.status.as_str().to_string(),
        }
    }
}

/// Body of an `addProductionUser` request.
#[derive(Debug, Clone, Serialize)]
pub struct AddProductionUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl From<&NewTeamMember> for AddProductionUserRequest {
    fn from(member: &NewTeamMember) -> Self {
        Self {
            email: member.email.clone(),
            password: member.password.clone(),
            name: member.name.clone(),
        }
    }
}

/// Body of a `deleteProductionUser` request.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteProductionUserRequest {
    pub email: String,
}

/// The acknowledgement returned by write actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub submission_id: Option<String>,
}

/// The answer to an authentication action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub vendor: Option<Value>,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}
