// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier normalization and tolerant matching.
//!
//! Upstream directory data drifts in case, spacing and punctuation. These
//! helpers never fail; unrecognized input degrades to a default.

use crate::types::{SubDeptMode, Vendor};

/// Display name used when a vendor reference cannot be resolved.
pub const UNKNOWN_VENDOR_NAME: &str = "Unknown Vendor";

/// Exact tokens recognized as by-sub-department mode.
const SUB_DEPT_TOKENS: [&str; 8] = [
    "subdept",
    "sub_dept",
    "sub-dept",
    "sub dept",
    "subdepartment",
    "sub_department",
    "sub-department",
    "bysubdept",
];

/// Trims and lowercases a value for comparison.
#[must_use]
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Lowercases a value and strips all whitespace, underscores and dashes.
#[must_use]
pub fn compact_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compares two identifiers case-insensitively, ignoring surrounding whitespace.
#[must_use]
pub fn keys_match(a: &str, b: &str) -> bool {
    normalize_key(a) == normalize_key(b)
}

/// Returns whether a value plausibly holds an email address.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    let trimmed: &str = value.trim();
    trimmed.contains('@') && trimmed.contains('.')
}

/// Classifies a sub-department mode string.
///
/// Recognizes the exact tokens in `SUB_DEPT_TOKENS`, plus any value that
/// contains both a "sub" (or the common typo "seb") token and a "dept"
/// token. Everything else is vendor-level.
#[must_use]
pub fn classify_sub_dept_mode(raw: &str) -> SubDeptMode {
    let normalized: String = normalize_key(raw);
    if SUB_DEPT_TOKENS.contains(&normalized.as_str()) {
        return SubDeptMode::BySubDept;
    }

    let has_sub: bool = normalized.contains("sub") || normalized.contains("seb");
    let has_dept: bool = normalized.contains("dept");
    if has_sub && has_dept {
        SubDeptMode::BySubDept
    } else {
        SubDeptMode::VendorLevel
    }
}

/// Resolves a vendor from an arbitrary reference.
///
/// The reference is usually a vendor id but may be a name, with drift in
/// case and spacing. Resolution order:
/// 1. Exact normalized id match
/// 2. Exact normalized name match
/// 3. Id match after compacting both sides
///
/// # Returns
///
/// The first vendor matched, or `None` if nothing matches.
#[must_use]
pub fn resolve_vendor_from_list<'a>(vendors: &'a [Vendor], reference: &str) -> Option<&'a Vendor> {
    let wanted: String = normalize_key(reference);
    if wanted.is_empty() {
        return None;
    }

    if let Some(vendor) = vendors.iter().find(|v| normalize_key(&v.id) == wanted) {
        return Some(vendor);
    }
    if let Some(vendor) = vendors.iter().find(|v| normalize_key(&v.name) == wanted) {
        return Some(vendor);
    }

    let compact: String = compact_key(reference);
    vendors
        .iter()
        .find(|v| !v.id.is_empty() && compact_key(&v.id) == compact)
}

/// Returns the display name for a vendor reference, or `UNKNOWN_VENDOR_NAME`.
#[must_use]
pub fn vendor_display_name(vendors: &[Vendor], reference: &str) -> String {
    resolve_vendor_from_list(vendors, reference).map_or_else(
        || UNKNOWN_VENDOR_NAME.to_string(),
        |vendor| vendor.name.clone(),
    )
}
