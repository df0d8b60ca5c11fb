// HTTP surface: affiliate dashboard, checkout, payouts, domains, packages,
// and the admin back office.

pub mod admin;
pub mod affiliates;
pub mod checkout;
pub mod docs;
pub mod domains;
pub mod packages;
pub mod payouts;

use crate::app::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

// Affiliate dashboard routes
pub fn affiliate_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(affiliates::signup))
        .route("/me", get(affiliates::me))
        .route("/me/referrals", get(affiliates::my_referrals))
        .route("/me/payouts", get(affiliates::my_payouts))
        .route("/test-purchase", post(affiliates::test_purchase))
}

// Checkout routes
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(checkout::create_order))
        .route("/orders/{order_id}/capture", post(checkout::capture_order))
}

// Payout routes
pub fn payout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(payouts::request_payout))
        .route("/{id}/process", post(payouts::process_payout))
}

// Domain routes
pub fn domain_routes() -> Router<AppState> {
    Router::new().route("/register", post(domains::register_domain))
}

// Public catalog routes
pub fn package_routes() -> Router<AppState> {
    Router::new().route("/", get(packages::list_packages))
}

// Admin back-office routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/affiliates", get(admin::list_affiliates))
        .route(
            "/affiliates/{id}/status",
            post(admin::update_affiliate_status),
        )
        .route(
            "/referrals/{id}/status",
            post(admin::update_referral_status),
        )
        .route("/payouts", get(admin::list_payouts))
        .route("/payouts/run-daily", post(admin::run_daily_payouts))
        .route("/leads", get(admin::list_leads))
        .route("/packages", post(admin::create_package))
        .route("/packages/{id}", put(admin::update_package))
        .route("/dns/records", post(admin::create_dns_record))
}

// Documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(docs::serve_swagger_ui))
        .route("/openapi.json", get(docs::serve_openapi_spec))
}
