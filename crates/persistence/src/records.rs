// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Decoding of loosely-shaped store records into domain types.
//!
//! The external store is a spreadsheet and its column names drift. Each
//! logical field is read from an ordered list of known aliases, matched
//! after compacting case, whitespace, underscores and dashes. Decoding
//! never fails: missing or malformed fields fall back to defaults and are
//! reported as `RecordIssue`s, which callers log at `warn`.

use capacity_portal::{CapacitySnapshot, LegacyFields, LegacyOverrides, SnapshotPayload, Submission};
use capacity_portal_domain::{
    CapacityEntry, ProductionUser, SubDepartment, SubDeptMode, SubmissionStatus, SubmissionType, TrackingType,
    Vendor, VendorProfile, VendorStatus, WeekNumber, classify_sub_dept_mode, compact_key,
    looks_like_email, parse_capacity_value, parse_dollar_limit, parse_week_number,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

const VENDOR_ID_ALIASES: &[&str] = &["vendor_id", "id", "vendor_code", "code"];
const VENDOR_NAME_ALIASES: &[&str] = &["vendor_name", "name", "company_name", "company"];
const VENDOR_EMAIL_ALIASES: &[&str] = &[
    "login_email",
    "email",
    "gmail_id",
    "vendor_email",
    "email_id",
];
const VENDOR_PASSWORD_ALIASES: &[&str] = &[
    "login_password_hash",
    "login_password",
    "password_hash",
    "password",
];
const TRACKING_ALIASES: &[&str] = &["tracking_type", "type", "tracking"];
const SUB_DEPT_MODE_ALIASES: &[&str] = &["subdept_mode", "sub_dept_mode", "mode"];
const STATUS_ALIASES: &[&str] = &["status", "vendor_status"];

const USER_EMAIL_ALIASES: &[&str] = &["email", "login_email", "gmail_id", "user_email", "email_id"];
const USER_NAME_ALIASES: &[&str] = &["name", "user_name", "full_name", "display_name"];
const USER_PASSWORD_ALIASES: &[&str] = &["password_hash", "password", "login_password"];
const USER_ACTIVE_ALIASES: &[&str] = &["active", "is_active", "status"];

const WEEK_ALIASES: &[&str] = &["week_number", "week"];
const CAPACITY_ALIASES: &[&str] = &["capacity_value", "capacity", "value"];
const SUB_DEPT_ALIASES: &[&str] = &["subdept", "sub_dept", "sub_department"];
const OVERRIDE_ALIASES: &[&str] = &["is_override", "override"];

const DOLLAR_LIMIT_ALIASES: &[&str] = &["dollar_limit", "limit"];
const SNAPSHOT_ALIASES: &[&str] = &["data_snapshot", "snapshot"];
const ENTRIES_ALIASES: &[&str] = &["entries", "capacity_entries"];
const YEAR_ALIASES: &[&str] = &["year", "fiscal_year"];
const DEFAULT_CAPACITY_ALIASES: &[&str] = &["default_capacity"];
const WEEK_OVERRIDES_ALIASES: &[&str] = &["week_overrides", "overrides"];
const SUB_DEPT_CAPACITIES_ALIASES: &[&str] = &[
    "subdept_capacities",
    "sub_dept_capacities",
    "subdepartment_capacities",
];

/// A field that could not be read cleanly from a store record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    /// The kind of record (`vendor`, `user`, `capacity`, `submission`, `snapshot`).
    pub record: &'static str,
    /// The logical field.
    pub field: &'static str,
    /// What was wrong and what was used instead.
    pub detail: String,
}

impl std::fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.record, self.field, self.detail)
    }
}

/// A decoded value together with the issues met while decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub value: T,
    pub issues: Vec<RecordIssue>,
}

impl<T> Decoded<T> {
    /// Returns whether the record decoded without any issue.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Logs every issue at `warn` and returns the value.
    pub fn into_logged(self) -> T {
        for issue in &self.issues {
            warn!(
                record = issue.record,
                field = issue.field,
                detail = %issue.detail,
                "Store record normalized"
            );
        }
        self.value
    }
}

/// Field access over one raw record.
struct Record<'a> {
    kind: &'static str,
    fields: Option<&'a Map<String, Value>>,
    issues: Vec<RecordIssue>,
}

impl<'a> Record<'a> {
    fn new(kind: &'static str, raw: &'a Value) -> Self {
        let mut record: Self = Self {
            kind,
            fields: raw.as_object(),
            issues: Vec::new(),
        };
        if record.fields.is_none() {
            record.issue("record", format!("expected an object, found {}", type_name(raw)));
        }
        record
    }

    fn issue(&mut self, field: &'static str, detail: String) {
        self.issues.push(RecordIssue {
            record: self.kind,
            field,
            detail,
        });
    }

    /// Returns the first non-null value stored under any alias.
    fn lookup(&self, aliases: &[&str]) -> Option<&'a Value> {
        let fields: &'a Map<String, Value> = self.fields?;
        aliases.iter().find_map(|alias| {
            let wanted: String = compact_key(alias);
            fields
                .iter()
                .find(|(key, value)| !value.is_null() && compact_key(key) == wanted)
                .map(|(_, value)| value)
        })
    }

    /// Returns the trimmed text under the first alias, or an empty string.
    fn text(&self, aliases: &[&str]) -> String {
        self.lookup(aliases).map(value_text).unwrap_or_default()
    }

    /// Like `text`, but records an issue when the field is missing.
    fn required_text(&mut self, field: &'static str, aliases: &[&str]) -> String {
        let text: String = self.text(aliases);
        if text.is_empty() {
            self.issue(field, String::from("missing; using an empty value"));
        }
        text
    }

    /// Reads an email address, scanning all values when no alias matches.
    fn email(&mut self, aliases: &[&str]) -> String {
        let text: String = self.text(aliases);
        if !text.is_empty() {
            return text;
        }

        let found: Option<(String, String)> = self.fields.and_then(|fields| {
            fields.iter().find_map(|(key, value)| {
                value
                    .as_str()
                    .map(str::trim)
                    .filter(|candidate| looks_like_email(candidate))
                    .map(|candidate| (key.clone(), candidate.to_string()))
            })
        });
        if let Some((key, email)) = found {
            self.issue("email", format!("no known column; recovered from '{key}'"));
            return email;
        }
        self.issue("email", String::from("missing; using an empty value"));
        String::new()
    }

    fn finish<T>(self, value: T) -> Decoded<T> {
        Decoded {
            value,
            issues: self.issues,
        }
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Renders a scalar as trimmed text. Arrays and objects render empty.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn value_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "active" => Some(true),
            "false" | "no" | "n" | "0" | "inactive" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses an optional dollar limit. Blank and zero mean no limit.
fn optional_limit(text: &str) -> Result<Option<u64>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    match parse_dollar_limit(text) {
        Ok(limit) => Ok(Some(limit)),
        Err(_) if text.parse::<f64>().is_ok_and(|n| n.abs() < f64::EPSILON) => Ok(None),
        Err(err) => Err(err.to_string()),
    }
}

/// Parses an optional capacity. Blank and zero mean absent.
fn optional_capacity(text: &str) -> Result<Option<u32>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    match parse_capacity_value(text) {
        Ok(value) => Ok(Some(value)),
        Err(_) if text.parse::<f64>().is_ok_and(|n| n.abs() < f64::EPSILON) => Ok(None),
        Err(err) => Err(err.to_string()),
    }
}

/// Decodes a vendor directory record.
#[must_use]
pub fn decode_vendor(raw: &Value) -> Decoded<Vendor> {
    let mut record: Record<'_> = Record::new("vendor", raw);

    let id: String = record.required_text("id", VENDOR_ID_ALIASES);
    let name: String = record.required_text("name", VENDOR_NAME_ALIASES);
    let login_email: String = record.email(VENDOR_EMAIL_ALIASES);
    let login_password_hash: String = record.text(VENDOR_PASSWORD_ALIASES);

    let tracking_text: String = record.text(TRACKING_ALIASES);
    let tracking: TrackingType = if tracking_text.is_empty() {
        record.issue("tracking_type", String::from("missing; using unit"));
        TrackingType::default()
    } else {
        TrackingType::parse(&tracking_text).unwrap_or_else(|err| {
            record.issue("tracking_type", format!("{err}; using unit"));
            TrackingType::default()
        })
    };

    let sub_dept_mode: SubDeptMode = classify_sub_dept_mode(&record.text(SUB_DEPT_MODE_ALIASES));

    let status_text: String = record.text(STATUS_ALIASES);
    let status: VendorStatus = if status_text.is_empty() {
        VendorStatus::default()
    } else {
        VendorStatus::parse(&status_text).unwrap_or_else(|err| {
            record.issue("status", format!("{err}; treating as inactive"));
            VendorStatus::Inactive
        })
    };

    record.finish(Vendor {
        id,
        name,
        profile: VendorProfile::new(tracking, sub_dept_mode),
        status,
        login_email,
        login_password_hash,
    })
}

/// Decodes a production user record.
#[must_use]
pub fn decode_production_user(raw: &Value) -> Decoded<ProductionUser> {
    let mut record: Record<'_> = Record::new("user", raw);

    let email: String = record.email(USER_EMAIL_ALIASES);
    let name: String = record.text(USER_NAME_ALIASES);
    let password_hash: String = record.text(USER_PASSWORD_ALIASES);
    let active: bool = user_active(&mut record);

    record.finish(ProductionUser {
        email,
        name,
        active,
        password_hash,
    })
}

/// Missing or blank means active.
fn user_active(record: &mut Record<'_>) -> bool {
    let Some(value) = record.lookup(USER_ACTIVE_ALIASES) else {
        return true;
    };
    if value_text(value).is_empty() {
        return true;
    }
    value_flag(value).unwrap_or_else(|| {
        record.issue(
            "active",
            format!("unrecognized value '{}'; treating as inactive", value_text(value)),
        );
        false
    })
}

/// Decodes a capacity row. Rows that cannot be used decode to `None`.
#[must_use]
pub fn decode_capacity_entry(raw: &Value) -> Decoded<Option<CapacityEntry>> {
    let mut record: Record<'_> = Record::new("capacity", raw);

    let week: Option<WeekNumber> = parse_week_number(&record.text(WEEK_ALIASES))
        .map_err(|err| record.issue("week_number", format!("{err}; row skipped")))
        .ok();
    let capacity: Option<u32> = parse_capacity_value(&record.text(CAPACITY_ALIASES))
        .map_err(|err| record.issue("capacity_value", format!("{err}; row skipped")))
        .ok();

    let sub_dept_text: String = record.text(SUB_DEPT_ALIASES);
    let sub_dept: Result<Option<SubDepartment>, ()> = if sub_dept_text.is_empty() {
        Ok(None)
    } else {
        SubDepartment::parse_exact(&sub_dept_text).map(Some).map_err(|err| {
            record.issue("subdept", format!("{err}; row skipped"));
        })
    };

    let is_override: bool = record
        .lookup(OVERRIDE_ALIASES)
        .and_then(value_flag)
        .unwrap_or(false);

    let entry: Option<CapacityEntry> = match (week, capacity, sub_dept) {
        (Some(week), Some(capacity), Ok(sub_dept)) => {
            Some(CapacityEntry::new(week, sub_dept, capacity, is_override))
        }
        _ => None,
    };
    record.finish(entry)
}

/// Decodes a list of capacity rows, dropping unusable rows.
#[must_use]
pub fn decode_capacity_rows(rows: &[Value]) -> Decoded<Vec<CapacityEntry>> {
    let mut entries: Vec<CapacityEntry> = Vec::with_capacity(rows.len());
    let mut issues: Vec<RecordIssue> = Vec::new();
    for row in rows {
        let decoded: Decoded<Option<CapacityEntry>> = decode_capacity_entry(row);
        issues.extend(decoded.issues);
        entries.extend(decoded.value);
    }
    Decoded {
        value: entries,
        issues,
    }
}

/// Decodes a dollar limit answer: either a bare value or an object holding one.
#[must_use]
pub fn decode_dollar_limit(raw: &Value) -> Decoded<Option<u64>> {
    let text: String = match raw {
        Value::Object(_) => Record::new("dollar_limit", raw).text(DOLLAR_LIMIT_ALIASES),
        other => value_text(other),
    };
    let mut issues: Vec<RecordIssue> = Vec::new();
    let value: Option<u64> = optional_limit(&text).unwrap_or_else(|detail| {
        issues.push(RecordIssue {
            record: "dollar_limit",
            field: "dollar_limit",
            detail: format!("{detail}; treating as unset"),
        });
        None
    });
    Decoded { value, issues }
}

/// Decodes a submission record.
///
/// When `with_snapshot` is set the snapshot is decoded too; it may sit
/// under `data_snapshot` as an object or a JSON string, or at the top level
/// of the record. Otherwise the submission is returned as a header only.
///
/// # Arguments
///
/// * `raw` - The record as returned by the store
/// * `with_snapshot` - Whether the record carries snapshot data
/// * `default_year` - The fiscal year to assume when the snapshot does not record one
#[must_use]
pub fn decode_submission(raw: &Value, with_snapshot: bool, default_year: u16) -> Decoded<Submission> {
    let mut record: Record<'_> = Record::new("submission", raw);

    let submission_id: String = record.required_text("submission_id", &["submission_id", "id"]);
    let vendor_id: String = record.required_text("vendor_id", &["vendor_id", "vendor"]);
    let submitted_by: String = record.text(&["submitted_by", "submitter"]);
    let submitted_date: String = record.text(&["submitted_date", "date", "created_at"]);
    let comments: String = record.text(&["comments", "comment", "notes"]);
    let approved_by: String = record.text(&["approved_by", "reviewed_by"]);
    let approval_date: String = record.text(&["approval_date", "reviewed_date"]);

    let type_text: String = record.text(&["submission_type", "type"]);
    let submission_type: SubmissionType = type_text.parse().unwrap_or_else(|_| {
        record.issue(
            "submission_type",
            format!("unrecognized value '{type_text}'; using manual"),
        );
        SubmissionType::Manual
    });

    let status_text: String = record.text(&["status"]);
    let status: SubmissionStatus = status_text.parse().unwrap_or_else(|_| {
        record.issue(
            "status",
            format!("unrecognized value '{status_text}'; using pending"),
        );
        SubmissionStatus::Pending
    });

    let snapshot: Option<SnapshotPayload> = if with_snapshot {
        let decoded: Decoded<SnapshotPayload> =
            decode_snapshot(record.lookup(SNAPSHOT_ALIASES), raw, default_year);
        record.issues.extend(decoded.issues);
        Some(decoded.value)
    } else {
        None
    };

    record.finish(Submission {
        submission_id,
        vendor_id,
        submitted_by,
        submitted_date,
        submission_type,
        status,
        comments,
        snapshot,
        approved_by: (!approved_by.is_empty()).then_some(approved_by),
        approval_date: (!approval_date.is_empty()).then_some(approval_date),
    })
}

/// Decodes snapshot data and classifies it by schema generation.
///
/// # Arguments
///
/// * `embedded` - The value stored under the snapshot column, if any
/// * `record` - The enclosing record, used when nothing is embedded
/// * `default_year` - The fiscal year to assume when none is recorded
#[must_use]
pub fn decode_snapshot(
    embedded: Option<&Value>,
    record: &Value,
    default_year: u16,
) -> Decoded<SnapshotPayload> {
    let mut issues: Vec<RecordIssue> = Vec::new();
    let parsed: Option<Value> = match embedded {
        Some(Value::String(text)) if !text.trim().is_empty() => {
            match serde_json::from_str::<Value>(text) {
                Ok(value) => Some(value),
                Err(err) => {
                    issues.push(RecordIssue {
                        record: "snapshot",
                        field: "data_snapshot",
                        detail: format!("not valid JSON ({err}); reading the record instead"),
                    });
                    None
                }
            }
        }
        Some(value @ Value::Object(_)) => Some(value.clone()),
        _ => None,
    };
    let source: &Value = parsed.as_ref().unwrap_or(record);

    let mut snapshot_record: Record<'_> = Record::new("snapshot", source);
    snapshot_record.issues.append(&mut issues);

    let entries: Vec<CapacityEntry> = match snapshot_record.lookup(ENTRIES_ALIASES) {
        Some(Value::Array(rows)) => {
            let decoded: Decoded<Vec<CapacityEntry>> = decode_capacity_rows(rows);
            snapshot_record.issues.extend(decoded.issues);
            decoded.value
        }
        Some(other) => {
            snapshot_record.issue(
                "entries",
                format!("expected an array, found {}; ignoring", type_name(other)),
            );
            Vec::new()
        }
        None => Vec::new(),
    };

    let dollar_limit: Option<u64> =
        optional_limit(&snapshot_record.text(DOLLAR_LIMIT_ALIASES)).unwrap_or_else(|detail| {
            snapshot_record.issue("dollar_limit", format!("{detail}; ignoring"));
            None
        });

    let year_text: String = snapshot_record.text(YEAR_ALIASES);
    let year: Option<u16> = if year_text.is_empty() {
        None
    } else {
        year_text.parse::<u16>().ok().or_else(|| {
            snapshot_record.issue(
                "year",
                format!("unrecognized value '{year_text}'; using {default_year}"),
            );
            None
        })
    };

    let default_capacity: Option<u32> =
        optional_capacity(&snapshot_record.text(DEFAULT_CAPACITY_ALIASES)).unwrap_or_else(
            |detail| {
                snapshot_record.issue("default_capacity", format!("{detail}; ignoring"));
                None
            },
        );

    let week_overrides: LegacyOverrides = match snapshot_record.lookup(WEEK_OVERRIDES_ALIASES) {
        Some(Value::Object(map)) => decode_overrides(map, &mut snapshot_record),
        _ => LegacyOverrides::None,
    };

    let sub_dept_capacities: BTreeMap<SubDepartment, u32> =
        match snapshot_record.lookup(SUB_DEPT_CAPACITIES_ALIASES) {
            Some(Value::Object(map)) => decode_sub_dept_capacities(map, &mut snapshot_record),
            _ => BTreeMap::new(),
        };

    let csv_content: String = snapshot_record.text(&["csv_content"]);
    let csv_filename: String = snapshot_record.text(&["csv_filename"]);

    let snapshot: CapacitySnapshot = CapacitySnapshot {
        entries,
        dollar_limit,
        year: year.unwrap_or(default_year),
        legacy: LegacyFields {
            default_capacity,
            week_overrides,
            sub_dept_capacities,
        },
        csv_content: (!csv_content.is_empty()).then_some(csv_content),
        csv_filename: (!csv_filename.is_empty()).then_some(csv_filename),
    };
    snapshot_record.finish(SnapshotPayload::classify(snapshot, year.is_some()))
}

/// Reads `{week: value}` or `{subdept: {week: value}}` overrides.
fn decode_overrides(map: &Map<String, Value>, record: &mut Record<'_>) -> LegacyOverrides {
    let mut vendor_level: BTreeMap<WeekNumber, u32> = BTreeMap::new();
    let mut by_sub_dept: BTreeMap<SubDepartment, BTreeMap<WeekNumber, u32>> = BTreeMap::new();

    for (key, value) in map {
        if let Value::Object(weeks) = value {
            let dept: SubDepartment = match SubDepartment::parse_exact(key) {
                Ok(dept) => dept,
                Err(err) => {
                    record.issue("week_overrides", format!("{err}; ignoring"));
                    continue;
                }
            };
            let decoded: BTreeMap<WeekNumber, u32> = decode_week_values(weeks, record);
            if !decoded.is_empty() {
                by_sub_dept.insert(dept, decoded);
            }
        } else if let Some((week, capacity)) = decode_week_value(key, value, record) {
            vendor_level.insert(week, capacity);
        }
    }

    match (vendor_level.is_empty(), by_sub_dept.is_empty()) {
        (true, true) => LegacyOverrides::None,
        (false, true) => LegacyOverrides::VendorLevel(vendor_level),
        (true, false) => LegacyOverrides::BySubDept(by_sub_dept),
        (false, false) => {
            record.issue(
                "week_overrides",
                String::from("mixes vendor-level and sub-department overrides; keeping sub-department"),
            );
            LegacyOverrides::BySubDept(by_sub_dept)
        }
    }
}

fn decode_week_values(
    weeks: &Map<String, Value>,
    record: &mut Record<'_>,
) -> BTreeMap<WeekNumber, u32> {
    weeks
        .iter()
        .filter_map(|(key, value)| decode_week_value(key, value, record))
        .collect()
}

fn decode_week_value(key: &str, value: &Value, record: &mut Record<'_>) -> Option<(WeekNumber, u32)> {
    let week: WeekNumber = parse_week_number(key)
        .map_err(|err| record.issue("week_overrides", format!("{err}; ignoring")))
        .ok()?;
    let capacity: u32 = parse_capacity_value(&value_text(value))
        .map_err(|err| record.issue("week_overrides", format!("week {week}: {err}; ignoring")))
        .ok()?;
    Some((week, capacity))
}

fn decode_sub_dept_capacities(
    map: &Map<String, Value>,
    record: &mut Record<'_>,
) -> BTreeMap<SubDepartment, u32> {
    let mut capacities: BTreeMap<SubDepartment, u32> = BTreeMap::new();
    for (key, value) in map {
        let dept: SubDepartment = match SubDepartment::parse_exact(key) {
            Ok(dept) => dept,
            Err(err) => {
                record.issue("subdept_capacities", format!("{err}; ignoring"));
                continue;
            }
        };
        match optional_capacity(&value_text(value)) {
            Ok(Some(capacity)) => {
                capacities.insert(dept, capacity);
            }
            Ok(None) => {}
            Err(detail) => record.issue("subdept_capacities", format!("{dept}: {detail}; ignoring")),
        }
    }
    capacities
}
