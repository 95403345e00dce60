// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors that can occur at the external store boundary.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The HTTP request could not be completed or returned an error status.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint URL could not be parsed.
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The store answered but refused the action.
    #[error("{action} was rejected: {message}")]
    Rejected { action: String, message: String },

    /// The store answered with a shape this client does not understand.
    #[error("{action} returned an unexpected response: {detail}")]
    UnexpectedShape { action: String, detail: String },

    /// The requested record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The store could not be reached for this action.
    #[error("Store unavailable for {action}")]
    Unavailable { action: String },

    /// Hashing a credential failed.
    #[error("Credential hashing failed: {0}")]
    Credential(#[from] bcrypt::BcryptError),
}

impl PersistenceError {
    /// Returns whether the error means the store could not be reached.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable { .. })
    }
}
