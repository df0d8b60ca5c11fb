// API documentation: generated OpenAPI spec plus an embedded Swagger UI
// page, served behind the ENABLE_SWAGGER_UI flag.

use axum::{
    response::{Html, IntoResponse},
    Json,
};
use utoipa::OpenApi;

use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hostly Backend API",
        description = "Affiliate commission, payout, and purchase API",
        version = "0.1.0"
    ),
    paths(
        crate::handlers::affiliates::signup,
        crate::handlers::affiliates::me,
        crate::handlers::affiliates::my_referrals,
        crate::handlers::affiliates::my_payouts,
        crate::handlers::affiliates::test_purchase,
        crate::handlers::checkout::create_order,
        crate::handlers::checkout::capture_order,
        crate::handlers::payouts::request_payout,
        crate::handlers::payouts::process_payout,
        crate::handlers::domains::register_domain,
        crate::handlers::packages::list_packages,
        crate::handlers::admin::list_affiliates,
        crate::handlers::admin::update_affiliate_status,
        crate::handlers::admin::update_referral_status,
        crate::handlers::admin::run_daily_payouts,
        crate::handlers::admin::list_payouts,
        crate::handlers::admin::list_leads,
        crate::handlers::admin::create_package,
        crate::handlers::admin::update_package,
        crate::handlers::admin::create_dns_record,
    ),
    components(schemas(
        models::SignupRequest,
        models::UpdateAffiliateStatusRequest,
        models::TestPurchaseRequest,
        models::RequestPayoutRequest,
        models::ProcessPayoutRequest,
        models::UpdateReferralStatusRequest,
        models::CreatePackageRequest,
        models::UpdatePackageRequest,
        models::RegisterDomainRequest,
        models::CreateDnsRecordRequest,
        crate::handlers::checkout::CreateOrderRequest,
        crate::handlers::checkout::CaptureOrderRequest,
    )),
    tags(
        (name = "Affiliates", description = "Affiliate signup and dashboard"),
        (name = "Checkout", description = "PayPal purchase flow"),
        (name = "Payouts", description = "Withdrawal requests and processing"),
        (name = "Domains", description = "Domain registration"),
        (name = "Packages", description = "Hosting package catalog"),
        (name = "Admin", description = "Back-office operations"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI JSON specification at /v1/docs/openapi.json
pub async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serve Swagger UI HTML at /v1/docs
pub async fn serve_swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hostly API Documentation</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
    <style>
        body { margin: 0; padding: 0; }
        #swagger-ui { max-width: 1460px; margin: 0 auto; padding: 20px; }
        .topbar { display: none; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: '/api/v1/docs/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true,
                docExpansion: 'list',
                tryItOutEnabled: true,
                validatorUrl: null
            });
        }
    </script>
</body>
</html>"#;
