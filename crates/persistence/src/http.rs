// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP client for the spreadsheet-backed store endpoint.
//!
//! Every request targets the same URL and names its action in the
//! `action` query parameter. Reads are `GET` with query parameters,
//! writes are `POST` with a JSON body. Responses are always JSON.

use crate::action::StoreAction;
use crate::data_models::{
    ActionResponse, AddProductionUserRequest, AuthResponse, DeleteProductionUserRequest,
    SaveCapacityRequest, SaveDollarLimitRequest, SubmitForApprovalRequest,
    UpdateSubmissionStatusRequest, UpdateVendorSettingsRequest,
};
use crate::error::PersistenceError;
use crate::records::{
    decode_capacity_rows, decode_dollar_limit, decode_production_user, decode_submission,
    decode_vendor,
};
use crate::store::{CapacityStore, NewSubmission, NewTeamMember, StatusUpdate, VendorSettings};
use async_trait::async_trait;
use capacity_portal::Submission;
use capacity_portal_domain::{CapacityEntry, ProductionUser, SubmissionStatus, Vendor};
use num_traits::ToPrimitive;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

const ARRAY_KEYS: [&str; 3] = ["data", "rows", "items"];

/// Client for the store endpoint.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    endpoint: Url,
    default_year: u16,
}

impl SheetsClient {
    /// Creates a client for an endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The store URL
    /// * `timeout` - Per-request timeout
    /// * `default_year` - Fiscal year assumed for snapshots that do not record one
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or is not HTTP(S).
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        default_year: u16,
    ) -> Result<Self, PersistenceError> {
        let url: Url = Url::parse(endpoint.trim()).map_err(|e| PersistenceError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PersistenceError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client: reqwest::Client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            client,
            endpoint: url,
            default_year,
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(name = "store_get", skip(self, params))]
    async fn get(
        &self,
        action: StoreAction,
        params: &[(&str, String)],
    ) -> Result<Value, PersistenceError> {
        debug!(action = %action, "Dispatching store read");
        let body: String = self
            .client
            .get(self.endpoint.clone())
            .query(&[("action", action.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(name = "store_post", skip(self, body))]
    async fn post<T: Serialize + Sync>(
        &self,
        action: StoreAction,
        body: &T,
    ) -> Result<ActionResponse, PersistenceError> {
        debug!(action = %action, "Dispatching store write");
        let text: String = self
            .client
            .post(self.endpoint.clone())
            .query(&[("action", action.as_str())])
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        acknowledge(action, serde_json::from_str(&text)?)
    }

    async fn authenticate(
        &self,
        action: StoreAction,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, PersistenceError> {
        let value: Value = self
            .get(
                action,
                &[
                    ("email", email.trim().to_string()),
                    ("password", password.to_string()),
                ],
            )
            .await?;
        let response: AuthResponse = serde_json::from_value(value)?;
        if !response.success {
            return Err(PersistenceError::Rejected {
                action: action.as_str().to_string(),
                message: response
                    .error
                    .unwrap_or_else(|| String::from("Invalid credentials")),
            });
        }
        Ok(response)
    }

    async fn get_rows(
        &self,
        action: StoreAction,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>, PersistenceError> {
        let value: Value = self.get(action, params).await?;
        rows(action, value)
    }
}

/// Checks a write acknowledgement for an explicit refusal.
fn acknowledge(action: StoreAction, value: Value) -> Result<ActionResponse, PersistenceError> {
    if !value.is_object() {
        return Ok(ActionResponse::default());
    }
    let response: ActionResponse = serde_json::from_value(value)?;
    let refused: bool = response
        .success
        .map_or_else(|| response.error.is_some(), |success| !success);
    if refused {
        return Err(PersistenceError::Rejected {
            action: action.as_str().to_string(),
            message: response
                .error
                .unwrap_or_else(|| String::from("Request failed")),
        });
    }
    Ok(response)
}

/// Extracts the row list from a read answer.
///
/// Accepts a bare array, `null`, or an object wrapping the array.
fn rows(action: StoreAction, value: Value) -> Result<Vec<Value>, PersistenceError> {
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => {
            if let Some(Value::String(message)) = map.remove("error") {
                return Err(PersistenceError::Rejected {
                    action: action.as_str().to_string(),
                    message,
                });
            }
            for key in ARRAY_KEYS {
                if let Some(Value::Array(rows)) = map.remove(key) {
                    return Ok(rows);
                }
            }
            Err(PersistenceError::UnexpectedShape {
                action: action.as_str().to_string(),
                detail: String::from("expected an array of records"),
            })
        }
        other => Err(PersistenceError::UnexpectedShape {
            action: action.as_str().to_string(),
            detail: format!("expected an array of records, found {other}"),
        }),
    }
}

fn missing_record(action: StoreAction, field: &str) -> PersistenceError {
    PersistenceError::UnexpectedShape {
        action: action.as_str().to_string(),
        detail: format!("successful answer without a '{field}' record"),
    }
}

#[async_trait]
impl CapacityStore for SheetsClient {
    async fn authenticate_vendor(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Vendor, PersistenceError> {
        let action: StoreAction = StoreAction::AuthenticateVendor;
        let response: AuthResponse = self.authenticate(action, email, password).await?;
        let raw: Value = response
            .vendor
            .ok_or_else(|| missing_record(action, "vendor"))?;
        Ok(decode_vendor(&raw).into_logged())
    }

    async fn authenticate_production(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProductionUser, PersistenceError> {
        let action: StoreAction = StoreAction::AuthenticateProduction;
        let response: AuthResponse = self.authenticate(action, email, password).await?;
        let raw: Value = response.user.ok_or_else(|| missing_record(action, "user"))?;
        Ok(decode_production_user(&raw).into_logged())
    }

    async fn get_all_vendors(&self) -> Result<Vec<Vendor>, PersistenceError> {
        let rows: Vec<Value> = self.get_rows(StoreAction::GetAllVendors, &[]).await?;
        Ok(rows
            .iter()
            .map(|raw| decode_vendor(raw).into_logged())
            .collect())
    }

    async fn get_users(&self) -> Result<Vec<ProductionUser>, PersistenceError> {
        let rows: Vec<Value> = self.get_rows(StoreAction::GetUsers, &[]).await?;
        Ok(rows
            .iter()
            .map(|raw| decode_production_user(raw).into_logged())
            .collect())
    }

    async fn get_capacity(
        &self,
        vendor_id: &str,
        year: u16,
    ) -> Result<Vec<CapacityEntry>, PersistenceError> {
        let rows: Vec<Value> = self
            .get_rows(
                StoreAction::GetCapacity,
                &[
                    ("vendor_id", vendor_id.to_string()),
                    ("year", year.to_string()),
                ],
            )
            .await?;
        Ok(decode_capacity_rows(&rows).into_logged())
    }

    async fn get_dollar_limit(&self, vendor_id: &str) -> Result<Option<u64>, PersistenceError> {
        let value: Value = self
            .get(
                StoreAction::GetDollarLimit,
                &[("vendor_id", vendor_id.to_string())],
            )
            .await?;
        Ok(decode_dollar_limit(&value).into_logged())
    }

    async fn get_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>, PersistenceError> {
        let params: Vec<(&str, String)> = status
            .map(|status| ("status", status.as_str().to_string()))
            .into_iter()
            .collect();
        let rows: Vec<Value> = self.get_rows(StoreAction::GetSubmissions, &params).await?;
        Ok(rows
            .iter()
            .map(|raw| decode_submission(raw, false, self.default_year).into_logged())
            .collect())
    }

    async fn get_submission_details(
        &self,
        submission_id: &str,
    ) -> Result<Submission, PersistenceError> {
        let value: Value = self
            .get(
                StoreAction::GetSubmissionDetails,
                &[("submission_id", submission_id.to_string())],
            )
            .await?;
        let not_found = || PersistenceError::NotFound {
            kind: "submission",
            id: submission_id.to_string(),
        };
        if !value.is_object() || value.get("error").is_some() {
            return Err(not_found());
        }

        let submission: Submission =
            decode_submission(&value, true, self.default_year).into_logged();
        if submission.submission_id.is_empty() {
            return Err(not_found());
        }
        Ok(submission)
    }

    async fn submit_for_approval(
        &self,
        submission: &NewSubmission,
    ) -> Result<Option<String>, PersistenceError> {
        let body: SubmitForApprovalRequest = SubmitForApprovalRequest::from(submission);
        let response: ActionResponse = self.post(StoreAction::SubmitForApproval, &body).await?;
        info!(
            vendor_id = %submission.vendor_id,
            submission_type = submission.submission_type.as_str(),
            entries = body.entries.len(),
            "Submission queued for approval"
        );
        Ok(response.submission_id)
    }

    async fn save_capacity(
        &self,
        vendor_id: &str,
        year: u16,
        entries: &[CapacityEntry],
    ) -> Result<usize, PersistenceError> {
        let body: SaveCapacityRequest = SaveCapacityRequest {
            vendor_id: vendor_id.to_string(),
            year,
            entries: entries.iter().map(Into::into).collect(),
        };
        let response: ActionResponse = self.post(StoreAction::SaveCapacity, &body).await?;
        let written: usize = response
            .count
            .and_then(|count| count.to_usize())
            .unwrap_or(entries.len());
        info!(vendor_id, year, written, "Live capacity saved");
        Ok(written)
    }

    async fn save_dollar_limit(
        &self,
        vendor_id: &str,
        dollar_limit: u64,
    ) -> Result<(), PersistenceError> {
        let body: SaveDollarLimitRequest = SaveDollarLimitRequest {
            vendor_id: vendor_id.to_string(),
            dollar_limit,
        };
        self.post(StoreAction::SaveDollarLimit, &body).await?;
        info!(vendor_id, dollar_limit, "Live dollar limit saved");
        Ok(())
    }

    async fn update_submission_status(
        &self,
        update: &StatusUpdate,
    ) -> Result<(), PersistenceError> {
        let body: UpdateSubmissionStatusRequest = UpdateSubmissionStatusRequest::from(update);
        self.post(StoreAction::UpdateSubmissionStatus, &body).await?;
        info!(
            submission_id = %update.submission_id,
            status = update.status.as_str(),
            approved_by = %update.approved_by,
            "Submission status updated"
        );
        Ok(())
    }

    async fn update_vendor_settings(
        &self,
        vendor_id: &str,
        settings: VendorSettings,
    ) -> Result<(), PersistenceError> {
        let body: UpdateVendorSettingsRequest = UpdateVendorSettingsRequest::new(vendor_id, settings);
        self.post(StoreAction::UpdateVendorSettings, &body).await?;
        info!(
            vendor_id,
            tracking_type = settings.tracking.as_str(),
            subdept_mode = settings.sub_dept_mode.as_str(),
            status = settings.status.as_str(),
            "Vendor settings updated"
        );
        Ok(())
    }

    async fn get_production_team(&self) -> Result<Vec<ProductionUser>, PersistenceError> {
        let rows: Vec<Value> = self.get_rows(StoreAction::GetProductionTeam, &[]).await?;
        Ok(rows
            .iter()
            .map(|raw| decode_production_user(raw).into_logged())
            .collect())
    }

    async fn add_production_user(&self, member: &NewTeamMember) -> Result<(), PersistenceError> {
        let body: AddProductionUserRequest = AddProductionUserRequest::from(member);
        self.post(StoreAction::AddProductionUser, &body).await?;
        info!(email = %member.email, "Production team member added");
        Ok(())
    }

    async fn delete_production_user(&self, email: &str) -> Result<(), PersistenceError> {
        let body: DeleteProductionUserRequest = DeleteProductionUserRequest {
            email: email.to_string(),
        };
        self.post(StoreAction::DeleteProductionUser, &body).await?;
        info!(email, "Production team member removed");
        Ok(())
    }
}
