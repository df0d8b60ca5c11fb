// Checkout endpoints: PayPal order creation and capture. Capture is the
// moment a sale becomes real; only then does the commission engine run.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    models::{HostingPackage, SaleChannel},
    services::commission::SaleEvent,
    utils::ServiceError,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "package_id is required"))]
    pub package_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CaptureOrderRequest {
    #[validate(length(min = 1, message = "package_id is required"))]
    pub package_id: String,

    pub referral_code: Option<String>,

    #[validate(email(message = "Invalid customer email"))]
    pub customer_email: String,

    pub customer_name: Option<String>,

    pub billing_cycle: Option<String>,
}

/// Create a PayPal order for a hosting package
/// POST /api/v1/checkout/orders
#[utoipa::path(
    post,
    path = "/v1/checkout/orders",
    tag = "Checkout",
    operation_id = "createOrder",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created; redirect the buyer to approve_url"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Package not found"),
        (status = 500, description = "Payment provider failure")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let package_doc = match state
        .store
        .get(HostingPackage::COLLECTION, &request.package_id)
        .await
    {
        Ok(doc) => doc,
        Err(e) => return ServiceError::from(e).into_response(),
    };
    let package: HostingPackage = match package_doc.parse() {
        Ok(package) => package,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    if !package.is_active {
        return ServiceError::validation("Package is no longer available").into_response();
    }

    let description = format!("{} hosting package", package.name);
    match state
        .payment_gateway
        .create_order(package.price, &description)
        .await
    {
        Ok(order) => Json(json!({
            "order_id": order.order_id,
            "approve_url": order.approve_url,
            "amount": package.price,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Capture an approved PayPal order and attribute the sale
/// POST /api/v1/checkout/orders/{order_id}/capture
#[utoipa::path(
    post,
    path = "/v1/checkout/orders/{order_id}/capture",
    tag = "Checkout",
    operation_id = "captureOrder",
    params(
        ("order_id" = String, Path, description = "PayPal order id")
    ),
    request_body = CaptureOrderRequest,
    responses(
        (status = 200, description = "Payment captured and sale attributed"),
        (status = 400, description = "Validation failed or payment not completed"),
        (status = 404, description = "Package not found"),
        (status = 500, description = "Payment provider failure")
    )
)]
pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(request): Json<CaptureOrderRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    // Resolve the package before touching the provider, so a bad request
    // fails with no side effects anywhere.
    let package_doc = match state
        .store
        .get(HostingPackage::COLLECTION, &request.package_id)
        .await
    {
        Ok(doc) => doc,
        Err(e) => return ServiceError::from(e).into_response(),
    };
    let package: HostingPackage = match package_doc.parse() {
        Ok(package) => package,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    let capture = match state.payment_gateway.capture_order(&order_id).await {
        Ok(capture) => capture,
        Err(e) => return e.into_response(),
    };

    if !capture.is_completed() {
        return ServiceError::validation(format!(
            "Payment not completed (capture status: {})",
            capture.status
        ))
        .into_response();
    }

    let event = SaleEvent {
        referral_code: request.referral_code.clone(),
        channel: SaleChannel::Checkout,
        customer_email: request.customer_email.clone(),
        customer_name: request.customer_name.clone(),
        package_id: Some(package_doc.id.clone()),
        package_name: Some(package.name.clone()),
        sale_amount: package.price,
        is_recurring: package.recurring_commission,
        billing_cycle: Some(
            request
                .billing_cycle
                .clone()
                .unwrap_or_else(|| "monthly".to_string()),
        ),
    };

    match state.commission_engine.attribute_sale(event).await {
        Ok(sale) => Json(json!({
            "order_id": order_id,
            "capture_status": capture.status,
            "referral": sale.referral,
            "payout_recipient": sale.payout_recipient.as_str(),
            "commission_amount": sale.commission_amount,
            "daily_payout_unlocked": sale.daily_payout_unlocked,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
