use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::engine::ScoreView;
use crate::events::AuditRecord;
use crate::server::ServerState;
use crate::utils::time::rfc3339;

const DEFAULT_AUDIT_LIMIT: usize = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuditQuery {
    pub limit: Option<usize>,
    /// Resume from this sequence number (inclusive) instead of tailing.
    pub since: Option<u64>,
}

/// Flattened view of an audit record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiAuditRecord {
    pub seq: u64,
    pub id: String,
    pub kind: String,
    pub subject_id: String,
    pub timestamp: String,
    pub delta: Option<i32>,
    pub verdict: Option<String>,
    /// The full event as recorded.
    #[schema(value_type = Object)]
    pub detail: serde_json::Value,
}

impl From<&AuditRecord> for ApiAuditRecord {
    fn from(record: &AuditRecord) -> Self {
        let event = &record.event;
        Self {
            seq: record.seq,
            id: event.id().to_string(),
            kind: event.kind().to_string(),
            subject_id: event.subject_id().to_string(),
            timestamp: rfc3339(event.timestamp()),
            delta: event.delta(),
            verdict: event.verdict(),
            detail: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[utoipa::path(
    get,
    path = "/score",
    tag = "audit",
    responses(
        (status = 200, description = "Global trust score", body = ScoreView),
    ),
    description = "Current global trust score and its display band."
)]
pub(crate) async fn global_score(State(state): State<Arc<ServerState>>) -> Json<ScoreView> {
    Json(state.engine.global_score())
}

#[utoipa::path(
    get,
    path = "/audit",
    tag = "audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit records, oldest first", body = [ApiAuditRecord]),
    ),
    description = "Tail of the audit trail, or up to `limit` records starting at `since`."
)]
pub(crate) async fn audit_tail(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<AuditQuery>,
) -> Json<Vec<ApiAuditRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    let records = match query.since {
        Some(seq) => state.engine.audit_since(seq, limit),
        None => state.engine.audit_tail(limit),
    };
    Json(records.iter().map(ApiAuditRecord::from).collect())
}
