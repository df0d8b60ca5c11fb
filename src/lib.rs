// Library exports for Hostly Backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod auth;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use auth::{AuthProvider, CurrentUser, Role, StaticAuthProvider};
pub use models::{
    Affiliate, AffiliateStatus, AffiliateTier, HostingPackage, Payout, PayoutAction,
    PayoutRecipient, PayoutStatus, Referral, ReferralStatus, SaleChannel, Stored,
};
pub use services::{
    CommissionEngine, DnsProvider, DomainRegistrar, EmailService, PaymentGateway, PayoutService,
    SaleEvent, SweepReport,
};
pub use store::{Document, EntityStore, MemoryStore, SortSpec, StoreError};
pub use utils::{ServiceError, ServiceResult};

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::{CloudflareClient, OpenSrsClient, PayPalClient};

// Library initialization function for external consumers
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use tracing::info;

    // Load environment
    dotenv::dotenv().ok();

    // Initialize config
    let config = Arc::new(app_config::config().clone());

    info!("Initializing entity store...");
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());

    let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuthProvider::from_env());

    // Outbound collaborators
    let payment_gateway: Arc<dyn PaymentGateway> =
        Arc::new(PayPalClient::new(config.paypal.clone()));
    let domain_registrar: Arc<dyn DomainRegistrar> =
        Arc::new(OpenSrsClient::new(config.opensrs.clone()));
    let dns_provider: Arc<dyn DnsProvider> =
        Arc::new(CloudflareClient::new(config.cloudflare.clone()));

    // Email is optional: without an API key, notifications are skipped.
    let email_service = if config.email.api_key.is_empty() {
        info!("No email API key configured, notifications disabled");
        None
    } else {
        Some(Arc::new(EmailService::new(config.email.clone())?))
    };

    // Core services
    let commission_engine = Arc::new(CommissionEngine::new(store.clone()));
    let payout_service = Arc::new(PayoutService::new(store.clone(), email_service.clone()));

    Ok(AppState {
        config,
        store,
        auth,
        payment_gateway,
        domain_registrar,
        dns_provider,
        commission_engine,
        payout_service,
        email_service,
    })
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/health", get(health_check))
        .nest("/affiliates", handlers::affiliate_routes())
        .nest("/checkout", handlers::checkout_routes())
        .nest("/payouts", handlers::payout_routes())
        .nest("/domains", handlers::domain_routes())
        .nest("/packages", handlers::package_routes())
        .nest("/admin", handlers::admin_routes());

    if state.config.features.enable_swagger_ui {
        api = api.nest("/docs", handlers::docs_routes());
    }

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let timestamp = chrono::Utc::now().to_rfc3339();

    // A trivial read exercises the store round trip.
    let store_health = match state
        .store
        .list(models::HostingPackage::COLLECTION, None, Some(1))
        .await
    {
        Ok(_) => serde_json::json!({ "status": "healthy", "error": null }),
        Err(e) => serde_json::json!({
            "status": "unhealthy",
            "error": format!("Store read failed: {}", e)
        }),
    };

    let healthy = store_health["status"] == "healthy";
    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "hostly-backend",
        "timestamp": timestamp,
        "components": {
            "store": store_health,
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
