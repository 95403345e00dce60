// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk capacity upload parsing and validation.
//!
//! Rows are checked in file order and the first failing row rejects the
//! whole file. The header is row 1, so the first data row is row 2.

use capacity_portal_domain::{
    CapacityEntry, EntryKey, SubDepartment, SubDeptMode, VendorProfile, WeekNumber,
    parse_capacity_value, parse_dollar_limit, parse_week_number, validate_not_past_week,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{HashMap, HashSet};

use crate::error::ApiError;

const WEEK_COLUMN: &str = "week_number";
const SUB_DEPT_COLUMN: &str = "subdept";
const CAPACITY_COLUMN: &str = "capacity_value";
const DOLLAR_LIMIT_COLUMN: &str = "dollar_limit";

/// The validated content of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedCapacity {
    /// One entry per data row, all marked as overrides.
    pub entries: Vec<CapacityEntry>,
    /// The first dollar limit found, for vendors tracking value.
    pub dollar_limit: Option<u64>,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn column<'r>(record: &'r StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'r str {
    header_map
        .get(name)
        .and_then(|&idx| record.get(idx))
        .unwrap_or("")
}

fn rejected(row: usize, message: String) -> ApiError {
    ApiError::InvalidUpload { row, message }
}

fn empty_file() -> ApiError {
    ApiError::InvalidInput {
        field: String::from("file"),
        message: String::from("File is empty or invalid"),
    }
}

/// Validates that the columns the profile needs are present.
fn validate_headers(
    headers: &StringRecord,
    profile: &VendorProfile,
) -> Result<HashMap<String, usize>, ApiError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let mut required: Vec<&str> = vec![WEEK_COLUMN, CAPACITY_COLUMN];
    if profile.sub_dept_mode == SubDeptMode::BySubDept {
        required.insert(1, SUB_DEPT_COLUMN);
    }
    let missing: Vec<&str> = required
        .into_iter()
        .filter(|column| !header_map.contains_key(*column))
        .collect();

    if !missing.is_empty() {
        return Err(rejected(
            1,
            format!("Missing required headers: {}", missing.join(", ")),
        ));
    }
    Ok(header_map)
}

/// Parses and validates an uploaded capacity file.
///
/// Checks, per row and in this order:
/// 1. `week_number` is an integer in 1-52
/// 2. the week is not before the current week
/// 3. `capacity_value` is a positive whole number
/// 4. for sub-department vendors, `subdept` is one of the fixed names (case-sensitive)
/// 5. the `(week, subdept)` pair has not appeared on an earlier row
/// 6. for vendors tracking value, a non-blank `dollar_limit` is positive
///
/// Only the first dollar limit found is kept. Weeks absent from the file
/// are not filled in.
///
/// # Arguments
///
/// * `content` - The file content
/// * `profile` - The uploading vendor's tracking configuration
/// * `current_week` - The current fiscal week
///
/// # Errors
///
/// Returns `ApiError::InvalidUpload` naming the first failing row, or
/// `ApiError::InvalidInput` if the file has no data rows.
pub fn parse_capacity_upload(
    content: &str,
    profile: &VendorProfile,
    current_week: u32,
) -> Result<UploadedCapacity, ApiError> {
    let mut reader: csv::Reader<&[u8]> = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: StringRecord = reader.headers().map_err(|_| empty_file())?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(empty_file());
    }
    let header_map: HashMap<String, usize> = validate_headers(&headers, profile)?;

    let tracks_value: bool = profile.tracking.tracks_value();
    let mut entries: Vec<CapacityEntry> = Vec::new();
    let mut seen: HashSet<EntryKey> = HashSet::new();
    let mut dollar_limit: Option<u64> = None;

    for (idx, result) in reader.records().enumerate() {
        let row: usize = idx + 2;
        let record: StringRecord =
            result.map_err(|e| rejected(row, format!("Unreadable row {row}: {e}")))?;
        let field = |name: &str| column(&record, &header_map, name).to_string();

        let week: WeekNumber = parse_week_number(&field(WEEK_COLUMN)).map_err(|_| {
            rejected(row, format!("Invalid week_number at row {row}. Must be 1-52."))
        })?;

        validate_not_past_week(week, current_week).map_err(|_| {
            rejected(
                row,
                format!(
                    "Week {week} at row {row} is in the past. Current week is {current_week}."
                ),
            )
        })?;

        let capacity_value: u32 = parse_capacity_value(&field(CAPACITY_COLUMN)).map_err(|_| {
            rejected(
                row,
                format!("Invalid capacity_value at row {row}. Must be a whole number > 0."),
            )
        })?;

        let sub_dept: Option<SubDepartment> = match profile.sub_dept_mode {
            SubDeptMode::VendorLevel => None,
            SubDeptMode::BySubDept => {
                let raw: String = field(SUB_DEPT_COLUMN);
                Some(SubDepartment::parse_exact(&raw).map_err(|_| {
                    rejected(
                        row,
                        format!(
                            "Invalid subdept '{raw}' at row {row}. Must be one of: {}.",
                            SubDepartment::valid_names()
                        ),
                    )
                })?)
            }
        };

        let key: EntryKey = EntryKey::new(week, sub_dept);
        if !seen.insert(key) {
            return Err(rejected(
                row,
                format!("Duplicate entry found for {} at row {row}.", key.describe()),
            ));
        }

        if tracks_value {
            let raw: String = field(DOLLAR_LIMIT_COLUMN);
            if !raw.is_empty() {
                let limit: u64 = parse_dollar_limit(&raw).map_err(|_| {
                    rejected(row, format!("Invalid dollar_limit at row {row}. Must be > 0."))
                })?;
                if dollar_limit.is_none() {
                    dollar_limit = Some(limit);
                }
            }
        }

        entries.push(CapacityEntry::new(week, sub_dept, capacity_value, true));
    }

    if entries.is_empty() {
        return Err(empty_file());
    }

    Ok(UploadedCapacity {
        entries,
        dollar_limit,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use capacity_portal_domain::TrackingType;

    fn vendor_level() -> VendorProfile {
        VendorProfile::new(TrackingType::Unit, SubDeptMode::VendorLevel)
    }

    fn by_sub_dept() -> VendorProfile {
        VendorProfile::new(TrackingType::Both, SubDeptMode::BySubDept)
    }

    fn upload_error(content: &str, profile: &VendorProfile, current_week: u32) -> (usize, String) {
        match parse_capacity_upload(content, profile, current_week).unwrap_err() {
            ApiError::InvalidUpload { row, message } => (row, message),
            other => panic!("expected an upload error, got {other:?}"),
        }
    }

    #[test]
    fn test_vendor_level_file_is_parsed_sparse() {
        let uploaded: UploadedCapacity = parse_capacity_upload(
            "week_number,capacity_value\n1,1000\n2,1000\n40,1500\n41,1500",
            &vendor_level(),
            1,
        )
        .unwrap();
        assert_eq!(uploaded.entries.len(), 4);
        assert!(uploaded.entries.iter().all(|e| e.is_override && e.sub_dept.is_none()));
        assert_eq!(uploaded.dollar_limit, None);
    }

    #[test]
    fn test_week_out_of_range_names_row() {
        for bad in ["0", "53", "4.5", "ten"] {
            let (row, message) = upload_error(
                &format!("week_number,capacity_value\n5,100\n{bad},100"),
                &vendor_level(),
                1,
            );
            assert_eq!(row, 3);
            assert_eq!(message, "Invalid week_number at row 3. Must be 1-52.");
        }
    }

    #[test]
    fn test_past_week_names_current_week() {
        let (row, message) =
            upload_error("week_number,capacity_value\n9,100", &vendor_level(), 10);
        assert_eq!(row, 2);
        assert!(message.contains("Current week is 10"), "{message}");
    }

    #[test]
    fn test_current_week_is_accepted() {
        assert!(parse_capacity_upload("week_number,capacity_value\n10,100", &vendor_level(), 10).is_ok());
    }

    #[test]
    fn test_non_positive_capacity_rejected() {
        for bad in ["0", "-5", "", "lots"] {
            let (_, message) = upload_error(
                &format!("week_number,capacity_value\n12,{bad}"),
                &vendor_level(),
                1,
            );
            assert_eq!(
                message,
                "Invalid capacity_value at row 2. Must be a whole number > 0."
            );
        }
    }

    #[test]
    fn test_fractional_capacity_rejected_as_not_whole() {
        let (row, message) =
            upload_error("week_number,capacity_value\n12,2.5", &vendor_level(), 1);
        assert_eq!(row, 2);
        assert!(message.contains("whole number"), "{message}");

        let parsed: UploadedCapacity =
            parse_capacity_upload("week_number,capacity_value\n12,1500.0", &vendor_level(), 1)
                .unwrap();
        assert_eq!(parsed.entries[0].capacity_value, 1500);
    }

    #[test]
    fn test_sub_department_names_are_case_sensitive() {
        let (row, message) = upload_error(
            "week_number,subdept,capacity_value\n5,Tops,400\n5,tops,300",
            &by_sub_dept(),
            1,
        );
        assert_eq!(row, 3);
        assert!(message.contains("Tops, Bottoms, Outerwear, Accessories"), "{message}");
    }

    #[test]
    fn test_same_week_different_sub_departments_accepted() {
        let uploaded: UploadedCapacity = parse_capacity_upload(
            "week_number,subdept,capacity_value\n5,Tops,400\n5,Bottoms,300",
            &by_sub_dept(),
            1,
        )
        .unwrap();
        assert_eq!(uploaded.entries.len(), 2);
    }

    #[test]
    fn test_duplicate_sub_department_week_rejected() {
        let (row, message) = upload_error(
            "week_number,subdept,capacity_value\n5,Tops,400\n6,Tops,400\n5,Tops,450",
            &by_sub_dept(),
            1,
        );
        assert_eq!(row, 4);
        assert_eq!(message, "Duplicate entry found for week 5, subdept Tops at row 4.");
    }

    #[test]
    fn test_missing_sub_department_column_rejected() {
        let (row, message) =
            upload_error("week_number,capacity_value\n5,400", &by_sub_dept(), 1);
        assert_eq!(row, 1);
        assert_eq!(message, "Missing required headers: subdept");
    }

    #[test]
    fn test_only_first_dollar_limit_kept() {
        let uploaded: UploadedCapacity = parse_capacity_upload(
            "week_number,subdept,capacity_value,dollar_limit\n5,Tops,400,\n5,Bottoms,300,250000\n6,Tops,400,9",
            &by_sub_dept(),
            1,
        )
        .unwrap();
        assert_eq!(uploaded.dollar_limit, Some(250_000));
    }

    #[test]
    fn test_bad_dollar_limit_rejected_for_value_tracking() {
        let (row, message) = upload_error(
            "week_number,subdept,capacity_value,dollar_limit\n5,Tops,400,-1",
            &by_sub_dept(),
            1,
        );
        assert_eq!(row, 2);
        assert_eq!(message, "Invalid dollar_limit at row 2. Must be > 0.");
    }

    #[test]
    fn test_dollar_limit_ignored_for_unit_tracking() {
        let uploaded: UploadedCapacity = parse_capacity_upload(
            "week_number,capacity_value,dollar_limit\n5,400,oops",
            &vendor_level(),
            1,
        )
        .unwrap();
        assert_eq!(uploaded.dollar_limit, None);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        for content in ["", "week_number,capacity_value\n", "\n\n"] {
            assert_eq!(
                parse_capacity_upload(content, &vendor_level(), 1).unwrap_err(),
                empty_file()
            );
        }
    }

    #[test]
    fn test_headers_match_loosely_and_blank_lines_skipped() {
        let uploaded: UploadedCapacity = parse_capacity_upload(
            " Week Number , Capacity_Value \n\n3, 700 \n",
            &vendor_level(),
            1,
        )
        .unwrap();
        assert_eq!(uploaded.entries[0].capacity_value, 700);
    }
}
