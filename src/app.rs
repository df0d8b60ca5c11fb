// Application state and configuration
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    auth::AuthProvider,
    services::{
        CommissionEngine, DnsProvider, DomainRegistrar, EmailService, PaymentGateway,
        PayoutService,
    },
    store::EntityStore,
};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn EntityStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub domain_registrar: Arc<dyn DomainRegistrar>,
    pub dns_provider: Arc<dyn DnsProvider>,
    pub commission_engine: Arc<CommissionEngine>,
    pub payout_service: Arc<PayoutService>,
    pub email_service: Option<Arc<EmailService>>,
}
