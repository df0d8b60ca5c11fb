// Affiliate dashboard endpoints: signup, profile, referral and payout
// history, and the non-production test-purchase backdoor.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    app::AppState,
    auth::CurrentUser,
    models::{
        Affiliate, AffiliateStatus, AffiliateTier, Referral, SaleChannel, SignupRequest, Stored,
        TestPurchaseRequest,
    },
    services::{commission::SaleEvent, ReferralCodeGenerator},
    utils::{ServiceError, ServiceResult},
};

/// Look up the affiliate record owned by the given user email.
pub(crate) async fn find_affiliate_by_email(
    state: &AppState,
    email: &str,
) -> ServiceResult<Stored<Affiliate>> {
    let docs = state
        .store
        .filter(
            Affiliate::COLLECTION,
            json!({ "user_email": email }),
            None,
            Some(1),
        )
        .await?;

    match docs.first() {
        Some(doc) => Ok(Stored::from_document(doc)?),
        None => Err(ServiceError::NotFound(Affiliate::COLLECTION)),
    }
}

/// Register the calling user as an affiliate
/// POST /api/v1/affiliates/signup
#[utoipa::path(
    post,
    path = "/v1/affiliates/signup",
    tag = "Affiliates",
    operation_id = "affiliateSignup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Affiliate created"),
        (status = 400, description = "Validation failed or already registered"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn signup(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SignupRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    // One affiliate account per user.
    match find_affiliate_by_email(&state, &user.email).await {
        Ok(_) => {
            return ServiceError::validation("An affiliate account already exists for this user")
                .into_response()
        },
        Err(ServiceError::NotFound(_)) => {},
        Err(e) => return e.into_response(),
    }

    let parent_affiliate_id = match &request.parent_referral_code {
        Some(code) if !code.is_empty() => {
            let parents = match state
                .store
                .filter(
                    Affiliate::COLLECTION,
                    json!({ "referral_code": code }),
                    None,
                    Some(1),
                )
                .await
            {
                Ok(docs) => docs,
                Err(e) => return ServiceError::from(e).into_response(),
            };
            match parents.first() {
                Some(parent) => Some(parent.id.clone()),
                None => {
                    return ServiceError::validation("Unknown parent referral code")
                        .into_response()
                },
            }
        },
        _ => None,
    };

    let generator = ReferralCodeGenerator::new(state.store.clone());
    let referral_code = match generator.generate_unique().await {
        Ok(code) => code,
        Err(e) => return e.into_response(),
    };

    let affiliate = Affiliate {
        user_email: user.email.clone(),
        full_name: request.full_name,
        referral_code,
        tier: AffiliateTier::Bronze,
        status: AffiliateStatus::Pending,
        paypal_email: request.paypal_email,
        pending_balance: 0.0,
        total_earnings: 0.0,
        total_referrals: 0,
        daily_payout_active: false,
        parent_affiliate_id,
        max_package_id: None,
    };

    let fields = match serde_json::to_value(&affiliate) {
        Ok(fields) => fields,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match state.store.create(Affiliate::COLLECTION, fields).await {
        Ok(doc) => {
            info!(affiliate_id = %doc.id, "Affiliate signed up");
            match Stored::<Affiliate>::from_document(&doc) {
                Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
                Err(e) => ServiceError::from(e).into_response(),
            }
        },
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Get the calling user's affiliate profile
/// GET /api/v1/affiliates/me
#[utoipa::path(
    get,
    path = "/v1/affiliates/me",
    tag = "Affiliates",
    operation_id = "getOwnAffiliate",
    responses(
        (status = 200, description = "Affiliate profile"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not an affiliate")
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    match find_affiliate_by_email(&state, &user.email).await {
        Ok(affiliate) => Json(affiliate).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the calling affiliate's referrals
/// GET /api/v1/affiliates/me/referrals
#[utoipa::path(
    get,
    path = "/v1/affiliates/me/referrals",
    tag = "Affiliates",
    operation_id = "listOwnReferrals",
    responses(
        (status = 200, description = "Referral history"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not an affiliate")
    ),
    security(("bearerAuth" = []))
)]
pub async fn my_referrals(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    let affiliate = match find_affiliate_by_email(&state, &user.email).await {
        Ok(affiliate) => affiliate,
        Err(e) => return e.into_response(),
    };

    let docs = match state
        .store
        .filter(
            Referral::COLLECTION,
            json!({ "affiliate_id": affiliate.id }),
            None,
            None,
        )
        .await
    {
        Ok(docs) => docs,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match Stored::<Referral>::from_documents(&docs) {
        Ok(referrals) => Json(referrals).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// List the calling affiliate's payouts
/// GET /api/v1/affiliates/me/payouts
#[utoipa::path(
    get,
    path = "/v1/affiliates/me/payouts",
    tag = "Affiliates",
    operation_id = "listOwnPayouts",
    responses(
        (status = 200, description = "Payout history"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not an affiliate")
    ),
    security(("bearerAuth" = []))
)]
pub async fn my_payouts(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    let affiliate = match find_affiliate_by_email(&state, &user.email).await {
        Ok(affiliate) => affiliate,
        Err(e) => return e.into_response(),
    };

    match state.payout_service.payouts_for_affiliate(&affiliate.id).await {
        Ok(payouts) => Json(payouts).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fabricate a referral without a payment call, so an affiliate can verify
/// their funnel end to end. Disabled in production.
/// POST /api/v1/affiliates/test-purchase
#[utoipa::path(
    post,
    path = "/v1/affiliates/test-purchase",
    tag = "Affiliates",
    operation_id = "testPurchase",
    request_body = TestPurchaseRequest,
    responses(
        (status = 200, description = "Test referral recorded"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Disabled in production"),
        (status = 404, description = "Package or affiliate not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn test_purchase(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<TestPurchaseRequest>,
) -> impl IntoResponse {
    if state.config.is_production() {
        return ServiceError::Forbidden(
            "Test purchases are disabled in production".to_string(),
        )
        .into_response();
    }

    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let affiliate = match find_affiliate_by_email(&state, &user.email).await {
        Ok(affiliate) => affiliate,
        Err(e) => return e.into_response(),
    };

    let package_doc = match state
        .store
        .get(crate::models::HostingPackage::COLLECTION, &request.package_id)
        .await
    {
        Ok(doc) => doc,
        Err(e) => return ServiceError::from(e).into_response(),
    };
    let package: crate::models::HostingPackage = match package_doc.parse() {
        Ok(package) => package,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    let event = SaleEvent {
        referral_code: Some(affiliate.entity.referral_code.clone()),
        channel: SaleChannel::TestPurchase,
        customer_email: format!("test+{}@hostly.sh", uuid::Uuid::new_v4().simple()),
        customer_name: Some("Test Customer".to_string()),
        package_id: Some(package_doc.id.clone()),
        package_name: Some(package.name.clone()),
        sale_amount: package.price,
        is_recurring: package.recurring_commission,
        billing_cycle: None,
    };

    match state.commission_engine.attribute_sale(event).await {
        Ok(sale) => Json(json!({
            "referral": sale.referral,
            "payout_recipient": sale.payout_recipient.as_str(),
            "commission_amount": sale.commission_amount,
            "daily_payout_unlocked": sale.daily_payout_unlocked,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
