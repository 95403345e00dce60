// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// A review decision as data only.
///
/// Commands are the only way to request a submission status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Approve a pending submission and apply its snapshot.
    Approve {
        /// Email of the approving production team member.
        approved_by: String,
        /// Review timestamp (RFC 3339).
        reviewed_at: String,
        /// Optional reviewer comments.
        comments: Option<String>,
    },
    /// Reject a pending submission. Live capacity is never touched.
    Reject {
        /// Email of the rejecting production team member.
        rejected_by: String,
        /// Review timestamp (RFC 3339).
        reviewed_at: String,
        /// Optional reviewer comments.
        comments: Option<String>,
    },
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "ApproveSubmission",
            Self::Reject { .. } => "RejectSubmission",
        }
    }
}
