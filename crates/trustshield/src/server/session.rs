use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::catalog::CatalogItem;
use crate::engine::{
    CartOutcome, CheckoutOutcome, CheckoutRequest, LoginOutcome, LoginRequest, LogoutOutcome,
    OtpOutcome,
};
use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;
use crate::session::SessionSnapshot;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OpenSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OtpRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    /// Catalog id or product name.
    pub item: String,
}

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    responses(
        (status = 200, description = "New shopper session", body = OpenSessionResponse),
    ),
    description = "Open a shopper session."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn open_session(
    State(state): State<Arc<ServerState>>,
) -> Json<OpenSessionResponse> {
    Json(OpenSessionResponse {
        session_id: state.engine.open_session(),
    })
}

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session state and trust score", body = SessionSnapshot),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Current login, cart and checkout state of a session."
)]
pub(crate) async fn session_snapshot(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.engine.session_snapshot(&id)?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/login",
    tag = "sessions",
    params(("id" = String, Path, description = "Session id")),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login scored and MFA decided", body = LoginOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Score typing and IP signals for a login and decide whether an OTP is needed."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let outcome = state.engine.login(&id, &payload)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/otp",
    tag = "sessions",
    params(("id" = String, Path, description = "Session id")),
    request_body = OtpRequest,
    responses(
        (status = 200, description = "OTP verdict", body = OtpOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Answer a pending OTP challenge."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn submit_otp(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(payload): Json<OtpRequest>,
) -> Result<Json<OtpOutcome>, ApiError> {
    let outcome = state.engine.submit_otp(&id, &payload.code)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/logout",
    tag = "sessions",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session logged out", body = LogoutOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Log out and forget the session's device registration."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn logout(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<LogoutOutcome>, ApiError> {
    let outcome = state.engine.logout(&id)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/cart",
    tag = "shopping",
    params(("id" = String, Path, description = "Session id")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added or blocked", body = CartOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Add a catalog item and run the cart anomaly rules."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn add_to_cart(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<CartOutcome>, ApiError> {
    let outcome = state.engine.add_to_cart(&id, &payload.item)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/checkout",
    tag = "shopping",
    params(("id" = String, Path, description = "Session id")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout verdict", body = CheckoutOutcome),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Check out, re-authenticating when shipping or payment changed."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn checkout(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutOutcome>, ApiError> {
    let outcome = state.engine.checkout(&id, &payload)?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/catalog",
    tag = "shopping",
    responses(
        (status = 200, description = "Products on sale", body = [CatalogItem]),
    ),
    description = "List the product catalog."
)]
pub(crate) async fn catalog(State(state): State<Arc<ServerState>>) -> Json<Vec<CatalogItem>> {
    Json(state.engine.catalog().to_vec())
}
