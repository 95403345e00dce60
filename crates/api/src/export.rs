// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV templates and exports in the upload format.

use capacity_portal_domain::{CapacityEntry, SubDeptMode, VendorProfile};
use csv::Writer;

use crate::error::CsvExportError;

const VENDOR_LEVEL_TEMPLATE: &str = "week_number,capacity_value\n1,1000\n2,1000\n40,1500\n41,1500";

const SUB_DEPT_TEMPLATE: &str = "week_number,subdept,capacity_value\n1,Tops,400\n1,Bottoms,300\n1,Outerwear,200\n1,Accessories,100";

/// File name offered for downloaded templates.
pub const TEMPLATE_FILENAME: &str = "capacity_template.csv";

/// Returns the upload template for a sub-department mode.
#[must_use]
pub const fn capacity_template(mode: SubDeptMode) -> &'static str {
    match mode {
        SubDeptMode::VendorLevel => VENDOR_LEVEL_TEMPLATE,
        SubDeptMode::BySubDept => SUB_DEPT_TEMPLATE,
    }
}

/// Writes entries in the upload format.
///
/// The `subdept` column is present for sub-department vendors. A
/// `dollar_limit` column is present for vendors tracking value, filled on
/// the first row only. Rows are ordered by week, then sub-department.
///
/// # Errors
///
/// Returns an error if the CSV output cannot be produced.
pub fn export_entries_csv(
    entries: &[CapacityEntry],
    profile: &VendorProfile,
    dollar_limit: Option<u64>,
) -> Result<String, CsvExportError> {
    let with_sub_dept: bool = profile.sub_dept_mode == SubDeptMode::BySubDept;
    let with_limit: bool = profile.tracking.tracks_value();

    let mut header: Vec<&str> = vec!["week_number"];
    if with_sub_dept {
        header.push("subdept");
    }
    header.push("capacity_value");
    if with_limit {
        header.push("dollar_limit");
    }

    let mut sorted: Vec<CapacityEntry> = entries.to_vec();
    sorted.sort_by_key(CapacityEntry::key);

    let mut writer: Writer<Vec<u8>> = Writer::from_writer(Vec::new());
    writer.write_record(&header)?;
    for (idx, entry) in sorted.iter().enumerate() {
        let mut record: Vec<String> = vec![entry.week.to_string()];
        if with_sub_dept {
            record.push(entry.sub_dept.map(|d| d.to_string()).unwrap_or_default());
        }
        record.push(entry.capacity_value.to_string());
        if with_limit {
            record.push(
                dollar_limit
                    .filter(|_| idx == 0)
                    .map(|limit| limit.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }

    let bytes: Vec<u8> = writer
        .into_inner()
        .map_err(|e| CsvExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::upload::{UploadedCapacity, parse_capacity_upload};
    use capacity_portal_domain::{SubDepartment, TrackingType, WeekNumber};

    fn week(value: u8) -> WeekNumber {
        WeekNumber::new(value).unwrap()
    }

    #[test]
    fn test_templates_pass_upload_validation() {
        let vendor: VendorProfile = VendorProfile::new(TrackingType::Unit, SubDeptMode::VendorLevel);
        let uploaded: UploadedCapacity =
            parse_capacity_upload(capacity_template(vendor.sub_dept_mode), &vendor, 1).unwrap();
        assert_eq!(uploaded.entries.len(), 4);

        let by_dept: VendorProfile = VendorProfile::new(TrackingType::Unit, SubDeptMode::BySubDept);
        let uploaded: UploadedCapacity =
            parse_capacity_upload(capacity_template(by_dept.sub_dept_mode), &by_dept, 1).unwrap();
        assert_eq!(uploaded.entries[3].sub_dept, Some(SubDepartment::Accessories));
    }

    #[test]
    fn test_export_orders_rows_and_places_limit_once() {
        let profile: VendorProfile = VendorProfile::new(TrackingType::Both, SubDeptMode::BySubDept);
        let entries: Vec<CapacityEntry> = vec![
            CapacityEntry::new(week(2), Some(SubDepartment::Tops), 410, true),
            CapacityEntry::new(week(1), Some(SubDepartment::Bottoms), 300, false),
            CapacityEntry::new(week(1), Some(SubDepartment::Tops), 400, false),
        ];

        let csv: String = export_entries_csv(&entries, &profile, Some(75_000)).unwrap();
        assert_eq!(
            csv,
            "week_number,subdept,capacity_value,dollar_limit\n1,Tops,400,75000\n1,Bottoms,300,\n2,Tops,410,\n"
        );
    }

    #[test]
    fn test_vendor_level_unit_export_has_two_columns() {
        let profile: VendorProfile = VendorProfile::new(TrackingType::Unit, SubDeptMode::VendorLevel);
        let csv: String = export_entries_csv(
            &[CapacityEntry::new(week(40), None, 1500, true)],
            &profile,
            Some(1),
        )
        .unwrap();
        assert_eq!(csv, "week_number,capacity_value\n40,1500\n");
    }
}
