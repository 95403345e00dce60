// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Credential comparison against stored values.
//!
//! The store may hold either bcrypt hashes or plaintext passwords.
//! Plaintext is compared like any other identifier: trimmed and
//! case-insensitive.

use crate::error::PersistenceError;
use capacity_portal_domain::keys_match;

/// Returns whether a stored credential is a bcrypt hash.
#[must_use]
pub fn is_bcrypt_hash(stored: &str) -> bool {
    let stored: &str = stored.trim();
    stored.starts_with("$2") && stored.len() == 60
}

/// Checks a candidate password against a stored credential.
///
/// # Arguments
///
/// * `candidate` - The password as typed
/// * `stored` - The stored hash or plaintext password
///
/// # Returns
///
/// `true` if the password matches. An empty stored credential never matches.
#[must_use]
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    let stored: &str = stored.trim();
    if stored.is_empty() {
        return false;
    }
    if is_bcrypt_hash(stored) {
        return bcrypt::verify(candidate, stored).unwrap_or(false);
    }
    keys_match(candidate, stored)
}

/// Hashes a password for storage.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PersistenceError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}
