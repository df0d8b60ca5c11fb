// Common test utilities and helper structs
// Shared across all test files to avoid duplication

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use hostly_backend_core::{
    app::AppState,
    app_config::{
        AppConfig, CloudflareConfig, EmailConfig, Environment, FeatureConfig, OpenSrsConfig,
        PayPalConfig, ServerConfig,
    },
    auth::{CurrentUser, Role, StaticAuthProvider},
    build_router,
    models::{Affiliate, HostingPackage, Referral},
    services::{
        CommissionEngine, DnsProvider, DomainRegistrar, GatewayCapture, GatewayOrder,
        PaymentGateway, PayoutService,
    },
    store::{EntityStore, MemoryStore},
    ServiceResult,
};

pub const AFFILIATE_TOKEN: &str = "affiliate-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const OTHER_TOKEN: &str = "other-token";

pub const AFFILIATE_EMAIL: &str = "partner@example.com";
pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const OTHER_EMAIL: &str = "visitor@example.com";

/// Payment gateway stub with a settable capture status.
pub struct StubGateway {
    capture_status: Mutex<String>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            capture_status: Mutex::new("COMPLETED".to_string()),
        }
    }

    pub fn set_capture_status(&self, status: &str) {
        *self.capture_status.lock().unwrap() = status.to_string();
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, _amount: f64, _description: &str) -> ServiceResult<GatewayOrder> {
        Ok(GatewayOrder {
            order_id: "stub-order-1".to_string(),
            approve_url: Some("https://paypal.test/approve/stub-order-1".to_string()),
        })
    }

    async fn capture_order(&self, _order_id: &str) -> ServiceResult<GatewayCapture> {
        Ok(GatewayCapture {
            status: self.capture_status.lock().unwrap().clone(),
            payer_email: Some("payer@example.com".to_string()),
        })
    }
}

/// Domain registrar stub with a settable availability answer.
pub struct StubRegistrar {
    available: AtomicBool,
}

impl StubRegistrar {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl DomainRegistrar for StubRegistrar {
    async fn check_availability(&self, _domain: &str) -> ServiceResult<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn register(
        &self,
        _domain: &str,
        _years: u32,
        _registrant_email: &str,
    ) -> ServiceResult<String> {
        Ok("osrs-order-42".to_string())
    }
}

pub struct StubDns;

#[async_trait]
impl DnsProvider for StubDns {
    async fn create_a_record(&self, _subdomain: &str, _ip: &str) -> ServiceResult<String> {
        Ok("cf-record-1".to_string())
    }
}

pub fn test_config(environment: Environment) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            port: 0,
            environment,
            rust_log: "info".to_string(),
        },
        paypal: PayPalConfig {
            api_url: "https://paypal.test".to_string(),
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            currency: "USD".to_string(),
            return_url: "https://hostly.test/success".to_string(),
            cancel_url: "https://hostly.test/cancel".to_string(),
        },
        opensrs: OpenSrsConfig {
            api_url: "https://opensrs.test".to_string(),
            username: "tester".to_string(),
            api_key: "key".to_string(),
            domain_price: 10.0,
        },
        cloudflare: CloudflareConfig {
            api_url: "https://cloudflare.test".to_string(),
            api_token: "token".to_string(),
            zone_id: "zone-1".to_string(),
            zone_name: "hostly.test".to_string(),
            origin_ip: "203.0.113.10".to_string(),
        },
        email: EmailConfig {
            api_key: String::new(),
            api_url: "https://resend.test".to_string(),
            from_email: "noreply@hostly.test".to_string(),
            from_name: "Hostly".to_string(),
            dashboard_url: "https://app.hostly.test".to_string(),
        },
        features: FeatureConfig {
            enable_swagger_ui: false,
        },
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<StubGateway>,
    pub registrar: Arc<StubRegistrar>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::spawn_with_environment(Environment::Test)
    }

    pub fn spawn_with_environment(environment: Environment) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(StubGateway::new());
        let registrar = Arc::new(StubRegistrar::new());

        let auth = StaticAuthProvider::new()
            .with_user(
                AFFILIATE_TOKEN,
                CurrentUser {
                    email: AFFILIATE_EMAIL.to_string(),
                    full_name: "Pat Partner".to_string(),
                    role: Role::User,
                },
            )
            .with_user(
                ADMIN_TOKEN,
                CurrentUser {
                    email: ADMIN_EMAIL.to_string(),
                    full_name: "Olly Ops".to_string(),
                    role: Role::Admin,
                },
            )
            .with_user(
                OTHER_TOKEN,
                CurrentUser {
                    email: OTHER_EMAIL.to_string(),
                    full_name: "Val Visitor".to_string(),
                    role: Role::User,
                },
            );

        let entity_store: Arc<dyn EntityStore> = store.clone();
        let state = AppState {
            config: Arc::new(test_config(environment)),
            store: entity_store.clone(),
            auth: Arc::new(auth),
            payment_gateway: gateway.clone(),
            domain_registrar: registrar.clone(),
            dns_provider: Arc::new(StubDns),
            commission_engine: Arc::new(CommissionEngine::new(entity_store.clone())),
            payout_service: Arc::new(PayoutService::new(entity_store, None)),
            email_service: None,
        };

        Self {
            app: build_router(state),
            store,
            gateway,
            registrar,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read failed");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await
    }

    // =========================================================================
    // SEED HELPERS
    // =========================================================================

    pub async fn seed_affiliate(&self, fields: Value) -> String {
        let mut base = json!({
            "user_email": AFFILIATE_EMAIL,
            "full_name": "Pat Partner",
            "referral_code": "AFF2CODE",
            "tier": "bronze",
            "status": "approved",
            "paypal_email": "pat-paypal@example.com",
            "pending_balance": 0.0,
            "total_earnings": 0.0,
            "total_referrals": 0,
            "daily_payout_active": false,
            "parent_affiliate_id": null,
            "max_package_id": null,
        });
        merge(&mut base, fields);
        self.store
            .create(Affiliate::COLLECTION, base)
            .await
            .expect("seed affiliate")
            .id
    }

    pub async fn seed_package(&self, fields: Value) -> String {
        let mut base = json!({
            "name": "Starter Hosting",
            "price": 100.0,
            "daily_payout": 3.0,
            "daily_price": 3.33,
            "monthly_price": 100.0,
            "commission_rate": 30.0,
            "recurring_commission": true,
            "is_active": true,
            "sort_order": 1,
        });
        merge(&mut base, fields);
        self.store
            .create(HostingPackage::COLLECTION, base)
            .await
            .expect("seed package")
            .id
    }

    pub async fn seed_referral(&self, affiliate_id: &str, fields: Value) -> String {
        let mut base = json!({
            "affiliate_id": affiliate_id,
            "payout_recipient": "admin",
            "customer_email": "customer@example.com",
            "customer_name": "Casey Customer",
            "package_id": null,
            "package_name": null,
            "sale_amount": 100.0,
            "commission_amount": 30.0,
            "status": "approved",
            "is_recurring": true,
            "billing_cycle": "monthly",
            "referral_source": "checkout",
        });
        merge(&mut base, fields);
        self.store
            .create(Referral::COLLECTION, base)
            .await
            .expect("seed referral")
            .id
    }

    pub async fn count(&self, collection: &'static str, predicate: Value) -> usize {
        self.store
            .filter(collection, predicate, None, None)
            .await
            .expect("filter failed")
            .len()
    }

    pub async fn get_doc(&self, collection: &'static str, id: &str) -> Value {
        self.store
            .get(collection, id)
            .await
            .expect("document missing")
            .fields
    }
}

fn merge(base: &mut Value, overrides: Value) {
    if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
}
