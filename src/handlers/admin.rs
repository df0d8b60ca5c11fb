// Admin back-office endpoints: affiliate and referral lifecycle, package
// catalog management, the daily payout sweep trigger, leads, and DNS
// provisioning.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    app::AppState,
    auth::CurrentUser,
    models::{
        Affiliate, AffiliateStatus, CreateDnsRecordRequest, CreatePackageRequest, HostingPackage,
        Lead, Payout, Referral, Stored, UpdateAffiliateStatusRequest, UpdatePackageRequest,
        UpdateReferralStatusRequest,
    },
    utils::ServiceError,
};

/// List all affiliates
/// GET /api/v1/admin/affiliates
#[utoipa::path(
    get,
    path = "/v1/admin/affiliates",
    tag = "Admin",
    operation_id = "adminListAffiliates",
    responses(
        (status = 200, description = "All affiliates"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_affiliates(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    let docs = match state.store.list(Affiliate::COLLECTION, None, None).await {
        Ok(docs) => docs,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match Stored::<Affiliate>::from_documents(&docs) {
        Ok(affiliates) => Json(affiliates).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Change an affiliate's status
/// POST /api/v1/admin/affiliates/{id}/status
#[utoipa::path(
    post,
    path = "/v1/admin/affiliates/{id}/status",
    tag = "Admin",
    operation_id = "adminUpdateAffiliateStatus",
    params(("id" = String, Path, description = "Affiliate id")),
    request_body = UpdateAffiliateStatusRequest,
    responses(
        (status = 200, description = "Affiliate updated"),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Affiliate not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_affiliate_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(affiliate_id): Path<String>,
    Json(request): Json<UpdateAffiliateStatusRequest>,
) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    let status = match request.parsed_status() {
        Ok(status) => status,
        Err(e) => return e.into_response(),
    };

    let updated = match state
        .store
        .update(
            Affiliate::COLLECTION,
            &affiliate_id,
            json!({ "status": status.as_str() }),
        )
        .await
    {
        Ok(doc) => doc,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    let affiliate = match Stored::<Affiliate>::from_document(&updated) {
        Ok(affiliate) => affiliate,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    info!(%affiliate_id, status = status.as_str(), "Affiliate status updated");

    // Approval email is best-effort.
    if status == AffiliateStatus::Approved {
        if let Some(email) = &state.email_service {
            if let Err(e) = email
                .send_affiliate_approved(
                    &affiliate.entity.user_email,
                    &affiliate.entity.full_name,
                    &affiliate.entity.referral_code,
                )
                .await
            {
                warn!(%e, "Approval notification email failed");
            }
        }
    }

    Json(affiliate).into_response()
}

/// Change a referral's status (e.g. approve a pending referral)
/// POST /api/v1/admin/referrals/{id}/status
#[utoipa::path(
    post,
    path = "/v1/admin/referrals/{id}/status",
    tag = "Admin",
    operation_id = "adminUpdateReferralStatus",
    params(("id" = String, Path, description = "Referral id")),
    request_body = UpdateReferralStatusRequest,
    responses(
        (status = 200, description = "Referral updated"),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Referral not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_referral_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(referral_id): Path<String>,
    Json(request): Json<UpdateReferralStatusRequest>,
) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    let status = match request.parsed_status() {
        Ok(status) => status,
        Err(e) => return e.into_response(),
    };

    // Only the status moves; the recorded commission amount is immutable.
    let updated = match state
        .store
        .update(
            Referral::COLLECTION,
            &referral_id,
            json!({ "status": status.as_str() }),
        )
        .await
    {
        Ok(doc) => doc,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match Stored::<Referral>::from_document(&updated) {
        Ok(referral) => Json(referral).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Run the daily recurring-commission sweep
/// POST /api/v1/admin/payouts/run-daily
#[utoipa::path(
    post,
    path = "/v1/admin/payouts/run-daily",
    tag = "Admin",
    operation_id = "adminRunDailySweep",
    responses(
        (status = 200, description = "Sweep report"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn run_daily_payouts(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    match state.payout_service.run_daily_sweep().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List all payouts
/// GET /api/v1/admin/payouts
#[utoipa::path(
    get,
    path = "/v1/admin/payouts",
    tag = "Admin",
    operation_id = "adminListPayouts",
    responses(
        (status = 200, description = "All payouts"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_payouts(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    let docs = match state.store.list(Payout::COLLECTION, None, None).await {
        Ok(docs) => docs,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match Stored::<Payout>::from_documents(&docs) {
        Ok(payouts) => Json(payouts).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// List captured leads
/// GET /api/v1/admin/leads
#[utoipa::path(
    get,
    path = "/v1/admin/leads",
    tag = "Admin",
    operation_id = "adminListLeads",
    responses(
        (status = 200, description = "All leads"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_leads(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    let docs = match state.store.list(Lead::COLLECTION, None, None).await {
        Ok(docs) => docs,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match Stored::<Lead>::from_documents(&docs) {
        Ok(leads) => Json(leads).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Create a hosting package
/// POST /api/v1/admin/packages
#[utoipa::path(
    post,
    path = "/v1/admin/packages",
    tag = "Admin",
    operation_id = "adminCreatePackage",
    request_body = CreatePackageRequest,
    responses(
        (status = 201, description = "Package created"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_package(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreatePackageRequest>,
) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let package = request.into_package();
    let fields = match serde_json::to_value(&package) {
        Ok(fields) => fields,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.store.create(HostingPackage::COLLECTION, fields).await {
        Ok(doc) => match Stored::<HostingPackage>::from_document(&doc) {
            Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
            Err(e) => ServiceError::from(e).into_response(),
        },
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Update a hosting package
/// PUT /api/v1/admin/packages/{id}
#[utoipa::path(
    put,
    path = "/v1/admin/packages/{id}",
    tag = "Admin",
    operation_id = "adminUpdatePackage",
    params(("id" = String, Path, description = "Package id")),
    request_body = UpdatePackageRequest,
    responses(
        (status = 200, description = "Package updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Package not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_package(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(package_id): Path<String>,
    Json(request): Json<UpdatePackageRequest>,
) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    match state
        .store
        .update(HostingPackage::COLLECTION, &package_id, request.to_patch())
        .await
    {
        Ok(doc) => match Stored::<HostingPackage>::from_document(&doc) {
            Ok(stored) => Json(stored).into_response(),
            Err(e) => ServiceError::from(e).into_response(),
        },
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Provision a proxied DNS record for a customer subdomain
/// POST /api/v1/admin/dns/records
#[utoipa::path(
    post,
    path = "/v1/admin/dns/records",
    tag = "Admin",
    operation_id = "adminCreateDnsRecord",
    request_body = CreateDnsRecordRequest,
    responses(
        (status = 200, description = "Record created"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin access required"),
        (status = 500, description = "DNS provider failure")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_dns_record(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateDnsRecordRequest>,
) -> impl IntoResponse {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let ip = request
        .ip
        .clone()
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| state.config.cloudflare.origin_ip.clone());
    if ip.is_empty() {
        return ServiceError::validation("No target IP supplied and no origin IP configured")
            .into_response();
    }

    match state
        .dns_provider
        .create_a_record(&request.subdomain, &ip)
        .await
    {
        Ok(record_id) => Json(json!({
            "record_id": record_id,
            "name": format!("{}.{}", request.subdomain, state.config.cloudflare.zone_name),
            "content": ip,
            "proxied": true,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
