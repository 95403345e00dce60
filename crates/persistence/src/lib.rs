// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! External store boundary for the Vendor Capacity Portal.
//!
//! All vendor, user, capacity and submission data lives in a remote
//! spreadsheet-backed endpoint. This crate provides:
//!
//! - The `CapacityStore` trait, one method per store action
//! - `SheetsClient`, the HTTP/JSON implementation
//! - `InMemoryStore`, an in-process implementation with fault injection
//! - The record decoder that maps drifting column names onto domain types
//! - Credential comparison for stored hashes and plaintext
//!
//! ## Request Model
//!
//! Each store method issues exactly one request. Multi-step operations
//! (such as approving a submission) are sequenced by the caller and are
//! not transactional: a failed step leaves earlier steps applied.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod action;
mod credentials;
mod data_models;
mod error;
mod http;
mod memory;
mod records;
mod store;

#[cfg(test)]
mod tests;

pub use action::StoreAction;
pub use credentials::{hash_password, is_bcrypt_hash, verify_password};
pub use data_models::{
    ActionResponse, AddProductionUserRequest, AuthResponse, CapacityEntryData,
    DeleteProductionUserRequest, SaveCapacityRequest, SaveDollarLimitRequest,
    SubmitForApprovalRequest, UpdateSubmissionStatusRequest, UpdateVendorSettingsRequest,
    week_overrides_value,
};
pub use error::PersistenceError;
pub use http::SheetsClient;
pub use memory::InMemoryStore;
pub use records::{
    Decoded, RecordIssue, decode_capacity_entry, decode_capacity_rows, decode_dollar_limit,
    decode_production_user, decode_snapshot, decode_submission, decode_vendor,
};
pub use store::{CapacityStore, NewSubmission, NewTeamMember, StatusUpdate, VendorSettings};
