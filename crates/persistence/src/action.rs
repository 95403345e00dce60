// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// The actions exposed by the external store.
///
/// Every request carries exactly one of these as its `action` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreAction {
    AuthenticateVendor,
    AuthenticateProduction,
    GetAllVendors,
    GetUsers,
    GetCapacity,
    GetDollarLimit,
    GetSubmissions,
    GetSubmissionDetails,
    SubmitForApproval,
    SaveCapacity,
    SaveDollarLimit,
    UpdateSubmissionStatus,
    UpdateVendorSettings,
    GetProductionTeam,
    AddProductionUser,
    DeleteProductionUser,
}

impl StoreAction {
    /// Returns the wire name of this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticateVendor => "authenticateVendor",
            Self::AuthenticateProduction => "authenticateProduction",
            Self::GetAllVendors => "getAllVendors",
            Self::GetUsers => "getUsers",
            Self::GetCapacity => "getCapacity",
            Self::GetDollarLimit => "getDollarLimit",
            Self::GetSubmissions => "getSubmissions",
            Self::GetSubmissionDetails => "getSubmissionDetails",
            Self::SubmitForApproval => "submitForApproval",
            Self::SaveCapacity => "saveCapacity",
            Self::SaveDollarLimit => "saveDollarLimit",
            Self::UpdateSubmissionStatus => "updateSubmissionStatus",
            Self::UpdateVendorSettings => "updateVendorSettings",
            Self::GetProductionTeam => "getProductionTeam",
            Self::AddProductionUser => "addProductionUser",
            Self::DeleteProductionUser => "deleteProductionUser",
        }
    }

    /// Returns whether this action changes data in the store.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::SubmitForApproval
                | Self::SaveCapacity
                | Self::SaveDollarLimit
                | Self::UpdateSubmissionStatus
                | Self::UpdateVendorSettings
                | Self::AddProductionUser
                | Self::DeleteProductionUser
        )
    }
}

impl std::fmt::Display for StoreAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
