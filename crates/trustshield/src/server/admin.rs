use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use firmware::{ArtifactReport, IntegrityStatus, ScanAction};

use crate::engine::{
    AdminLogsOutcome, FirmwareOutcome, HoneypotOutcome, HoneypotRequest, PaymentOutcome,
    PaymentRequest, ScoreView, ZeroTrustOutcome, ZeroTrustRequest,
};
use crate::payments::TransactionRecord;
use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiArtifactReport {
    pub artifact: String,
    pub path: String,
    /// `unknown`, `safe` or `compromised`.
    pub prior_status: String,
    /// `none`, `recovered` or `unrecoverable`.
    pub action: String,
    pub reason: Option<String>,
    pub previous_scan: String,
    pub final_status: String,
    pub observed_hash: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiFirmwareScan {
    pub baseline_hash: String,
    pub artifacts: Vec<ApiArtifactReport>,
    pub recovered: usize,
    pub unrecoverable: usize,
    pub global: ScoreView,
}

fn status_str(status: IntegrityStatus) -> String {
    match status {
        IntegrityStatus::Unknown => "unknown",
        IntegrityStatus::Safe => "safe",
        IntegrityStatus::Compromised => "compromised",
    }
    .to_string()
}

impl From<&ArtifactReport> for ApiArtifactReport {
    fn from(report: &ArtifactReport) -> Self {
        let (action, reason) = match &report.action {
            ScanAction::None => ("none", None),
            ScanAction::Recovered => ("recovered", None),
            ScanAction::Unrecoverable { reason } => ("unrecoverable", Some(reason.clone())),
        };
        Self {
            artifact: report.artifact.clone(),
            path: report.path.display().to_string(),
            prior_status: status_str(report.prior_status),
            action: action.to_string(),
            reason,
            previous_scan: status_str(report.previous_scan),
            final_status: status_str(report.final_status()),
            observed_hash: report.observed_hash.clone(),
        }
    }
}

impl From<FirmwareOutcome> for ApiFirmwareScan {
    fn from(outcome: FirmwareOutcome) -> Self {
        Self {
            recovered: outcome.report.recovered(),
            unrecoverable: outcome.report.unrecoverable(),
            artifacts: outcome.report.artifacts.iter().map(ApiArtifactReport::from).collect(),
            baseline_hash: outcome.report.baseline_hash,
            global: outcome.global,
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/zero-trust",
    tag = "admin",
    request_body = ZeroTrustRequest,
    responses(
        (status = 200, description = "Access decision", body = ZeroTrustOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Run the TPM, geo and device checks and decide access."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn zero_trust(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<ZeroTrustRequest>,
) -> Result<Json<ZeroTrustOutcome>, ApiError> {
    let outcome = state.engine.run_zero_trust_check(&payload)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/admin/firmware/scan",
    tag = "admin",
    responses(
        (status = 200, description = "Per-artifact scan results", body = ApiFirmwareScan),
        (status = 422, body = ApiErrorResponse),
    ),
    description = "Check firmware artifacts against the baseline and restore compromised ones."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn firmware_scan(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ApiFirmwareScan>, ApiError> {
    let outcome = state.engine.run_firmware_scan().await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/admin/logs/refresh",
    tag = "admin",
    responses(
        (status = 200, description = "Admin logs with flagged entries", body = AdminLogsOutcome),
        (status = 500, body = ApiErrorResponse),
    ),
    description = "Fetch admin logs and flag denylisted actions."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn refresh_logs(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<AdminLogsOutcome>, ApiError> {
    let outcome = state.engine.refresh_admin_logs().await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/admin/honeypot",
    tag = "admin",
    request_body = HoneypotRequest,
    responses(
        (status = 200, description = "Trap recorded", body = HoneypotOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Record a login against the decoy admin portal."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn honeypot(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<HoneypotRequest>,
) -> Result<Json<HoneypotOutcome>, ApiError> {
    let outcome = state.engine.trigger_honeypot(&payload)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/admin/payments",
    tag = "admin",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = PaymentOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Record an incoming payment; the credential is stored hashed."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn record_payment(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<PaymentOutcome>, ApiError> {
    let outcome = state.engine.record_payment(&payload)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/admin/payments",
    tag = "admin",
    responses(
        (status = 200, description = "Transactions, newest first", body = [TransactionRecord]),
    ),
    description = "List recorded transactions."
)]
pub(crate) async fn list_payments(
    State(state): State<Arc<ServerState>>,
) -> Json<Vec<TransactionRecord>> {
    Json(state.engine.transactions())
}
