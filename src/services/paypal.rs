// PayPal payment gateway collaborator.
//
// OAuth2 client-credentials token exchange, order creation with a
// return/cancel URL pair, and order capture. A capture status of
// "COMPLETED" is the only success signal the commission engine accepts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    app_config::PayPalConfig,
    utils::{ServiceError, ServiceResult},
};

const PROVIDER: &str = "paypal";

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    pub approve_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayCapture {
    pub status: String,
    pub payer_email: Option<String>,
}

impl GatewayCapture {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, amount: f64, description: &str) -> ServiceResult<GatewayOrder>;
    async fn capture_order(&self, order_id: &str) -> ServiceResult<GatewayCapture>;
}

pub struct PayPalClient {
    http: Client,
    config: PayPalConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    #[serde(default)]
    links: Vec<OrderLink>,
}

#[derive(Deserialize)]
struct OrderLink {
    rel: String,
    href: String,
}

#[derive(Deserialize)]
struct CaptureResponse {
    status: String,
    #[serde(default)]
    payer: Option<Payer>,
}

#[derive(Deserialize)]
struct Payer {
    email_address: Option<String>,
}

impl PayPalClient {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    async fn access_token(&self) -> ServiceResult<String> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.config.api_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::upstream(
                PROVIDER,
                format!("token exchange failed: {}", body),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    #[instrument(skip(self))]
    async fn create_order(&self, amount: f64, description: &str) -> ServiceResult<GatewayOrder> {
        let token = self.access_token().await?;

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": self.config.currency,
                    "value": format!("{:.2}", amount),
                },
                "description": description,
            }],
            "application_context": {
                "return_url": self.config.return_url,
                "cancel_url": self.config.cancel_url,
            },
        });

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.config.api_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::upstream(
                PROVIDER,
                format!("order creation failed: {}", body),
            ));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        let approve_url = order
            .links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.clone());

        info!(order_id = %order.id, "PayPal order created");
        Ok(GatewayOrder {
            order_id: order.id,
            approve_url,
        })
    }

    #[instrument(skip(self))]
    async fn capture_order(&self, order_id: &str) -> ServiceResult<GatewayCapture> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.config.api_url, order_id
            ))
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::upstream(
                PROVIDER,
                format!("capture failed: {}", body),
            ));
        }

        let capture: CaptureResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        info!(order_id, status = %capture.status, "PayPal order captured");
        Ok(GatewayCapture {
            status: capture.status,
            payer_email: capture.payer.and_then(|p| p.email_address),
        })
    }
}
