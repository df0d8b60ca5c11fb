// Payout endpoints: affiliate withdrawal requests and the admin workflow
// that drives a payout through its status lifecycle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    app::AppState,
    auth::CurrentUser,
    models::{ProcessPayoutRequest, RequestPayoutRequest},
    utils::ServiceError,
};

use super::affiliates::find_affiliate_by_email;

/// Request a payout against the available balance
/// POST /api/v1/payouts
#[utoipa::path(
    post,
    path = "/v1/payouts",
    tag = "Payouts",
    operation_id = "requestPayout",
    request_body = RequestPayoutRequest,
    responses(
        (status = 201, description = "Payout request created"),
        (status = 400, description = "Amount below minimum or exceeds balance"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "Not an affiliate")
    ),
    security(("bearerAuth" = []))
)]
pub async fn request_payout(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<RequestPayoutRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let affiliate = match find_affiliate_by_email(&state, &user.email).await {
        Ok(affiliate) => affiliate,
        Err(e) => return e.into_response(),
    };

    match state
        .payout_service
        .request_payout(&user, &affiliate.id, request)
        .await
    {
        Ok(payout) => (StatusCode::CREATED, Json(payout)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Admin action on a payout: approve, reject, or complete
/// POST /api/v1/payouts/{id}/process
#[utoipa::path(
    post,
    path = "/v1/payouts/{id}/process",
    tag = "Payouts",
    operation_id = "processPayout",
    params(
        ("id" = String, Path, description = "Payout id")
    ),
    request_body = ProcessPayoutRequest,
    responses(
        (status = 200, description = "Payout transitioned"),
        (status = 400, description = "Unknown action or disallowed transition"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Payout not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn process_payout(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(payout_id): Path<String>,
    Json(request): Json<ProcessPayoutRequest>,
) -> impl IntoResponse {
    let action = match request.parsed_action() {
        Ok(action) => action,
        Err(e) => return e.into_response(),
    };

    match state
        .payout_service
        .process_request(&user, &payout_id, action)
        .await
    {
        Ok(payout) => Json(payout).into_response(),
        Err(e) => e.into_response(),
    }
}
