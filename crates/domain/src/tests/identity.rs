// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    SubDeptMode, UNKNOWN_VENDOR_NAME, Vendor, VendorProfile, VendorStatus, classify_sub_dept_mode,
    compact_key, keys_match, looks_like_email, normalize_key, resolve_vendor_from_list,
    vendor_display_name,
};

fn create_test_vendor(id: &str, name: &str) -> Vendor {
    Vendor {
        id: id.to_string(),
        name: name.to_string(),
        profile: VendorProfile::default(),
        status: VendorStatus::Active,
        login_email: format!("{}@example.com", compact_key(id)),
        login_password_hash: String::from("secret"),
    }
}

fn create_test_directory() -> Vec<Vendor> {
    vec![
        create_test_vendor("V-01", "Acme Apparel"),
        create_test_vendor("V-02", "Bolt Garments"),
    ]
}

#[test]
fn test_normalize_and_compact_keys() {
    assert_eq!(normalize_key("  Buyer@Example.COM "), "buyer@example.com");
    assert_eq!(compact_key(" V - 01_a "), "v01a");
    assert!(keys_match("V-01", " v-01 "));
    assert!(!keys_match("V-01", "V01"));
}

#[test]
fn test_looks_like_email() {
    assert!(looks_like_email("ops@vendor.com"));
    assert!(!looks_like_email("ops-at-vendor"));
    assert!(!looks_like_email("ops@localhost"));
}

#[test]
fn test_classify_sub_dept_mode_exact_tokens() {
    for raw in ["subdept", "SUB_DEPT", "sub-dept", " SubDepartment "] {
        assert_eq!(
            classify_sub_dept_mode(raw),
            SubDeptMode::BySubDept,
            "expected '{raw}' to classify as by-sub-department"
        );
    }
}

#[test]
fn test_classify_sub_dept_mode_recovers_typos() {
    assert_eq!(classify_sub_dept_mode("seb dept"), SubDeptMode::BySubDept);
    assert_eq!(classify_sub_dept_mode("Sub Depts"), SubDeptMode::BySubDept);
}

#[test]
fn test_classify_sub_dept_mode_defaults_to_vendor_level() {
    for raw in ["vendor", "", "department", "subtotal", "???"] {
        assert_eq!(classify_sub_dept_mode(raw), SubDeptMode::VendorLevel);
    }
}

#[test]
fn test_resolve_vendor_by_id_name_and_compact_id() {
    let vendors: Vec<Vendor> = create_test_directory();

    let by_id: Option<&Vendor> = resolve_vendor_from_list(&vendors, "V-01");
    assert_eq!(by_id.map(|v| v.id.as_str()), Some("V-01"));

    let by_name: Option<&Vendor> = resolve_vendor_from_list(&vendors, " bolt garments ");
    assert_eq!(by_name.map(|v| v.id.as_str()), Some("V-02"));

    let by_compact: Option<&Vendor> = resolve_vendor_from_list(&vendors, "v 01");
    assert_eq!(by_compact.map(|v| v.id.as_str()), Some("V-01"));
}

#[test]
fn test_resolve_vendor_returns_none_for_unrelated_reference() {
    let vendors: Vec<Vendor> = create_test_directory();
    assert!(resolve_vendor_from_list(&vendors, "Zenith Knitwear").is_none());
    assert!(resolve_vendor_from_list(&vendors, "   ").is_none());
}

#[test]
fn test_resolve_vendor_prefers_id_over_name() {
    let vendors: Vec<Vendor> = vec![
        create_test_vendor("Acme", "First"),
        create_test_vendor("V-09", "Acme"),
    ];
    let resolved: Option<&Vendor> = resolve_vendor_from_list(&vendors, "acme");
    assert_eq!(resolved.map(|v| v.name.as_str()), Some("First"));
}

#[test]
fn test_vendor_display_name_falls_back_to_unknown() {
    let vendors: Vec<Vendor> = create_test_directory();
    assert_eq!(vendor_display_name(&vendors, "V_02"), "Bolt Garments");
    assert_eq!(vendor_display_name(&vendors, "missing"), UNKNOWN_VENDOR_NAME);
}
