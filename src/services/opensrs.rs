// OpenSRS domain registrar collaborator.
//
// XCP-style JSON requests signed with the registrar's legacy scheme:
// X-Signature is md5(md5(body + key) + key) in lowercase hex. LOOKUP checks
// availability, SW_REGISTER places the registration.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use crate::{
    app_config::OpenSrsConfig,
    utils::{ServiceError, ServiceResult},
};

const PROVIDER: &str = "opensrs";

#[async_trait]
pub trait DomainRegistrar: Send + Sync {
    async fn check_availability(&self, domain: &str) -> ServiceResult<bool>;
    /// Returns the registrar order id.
    async fn register(
        &self,
        domain: &str,
        years: u32,
        registrant_email: &str,
    ) -> ServiceResult<String>;
}

pub struct OpenSrsClient {
    http: Client,
    config: OpenSrsConfig,
}

impl OpenSrsClient {
    pub fn new(config: OpenSrsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Legacy XCP signature: nested MD5 over body and shared key.
    pub fn sign(body: &str, key: &str) -> String {
        let inner = format!("{:x}", md5::compute(format!("{}{}", body, key)));
        format!("{:x}", md5::compute(format!("{}{}", inner, key)))
    }

    async fn post_xcp(&self, action: &str, attributes: JsonValue) -> ServiceResult<JsonValue> {
        let body = json!({
            "action": action,
            "object": "DOMAIN",
            "protocol": "XCP",
            "attributes": attributes,
        })
        .to_string();

        let signature = Self::sign(&body, &self.config.api_key);

        let response = self
            .http
            .post(&self.config.api_url)
            .header("Content-Type", "application/json")
            .header("X-Username", &self.config.username)
            .header("X-Signature", signature)
            .body(body)
            .send()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::upstream(PROVIDER, body));
        }

        let parsed: JsonValue = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        let success = parsed
            .get("is_success")
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
            == 1;
        if !success {
            let text = parsed
                .get("response_text")
                .and_then(|v| v.as_str())
                .unwrap_or("request rejected");
            return Err(ServiceError::upstream(PROVIDER, text.to_string()));
        }

        Ok(parsed)
    }
}

#[async_trait]
impl DomainRegistrar for OpenSrsClient {
    #[instrument(skip(self))]
    async fn check_availability(&self, domain: &str) -> ServiceResult<bool> {
        let response = self
            .post_xcp("LOOKUP", json!({ "domain": domain }))
            .await?;

        let status = response
            .pointer("/attributes/status")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        Ok(status == "available")
    }

    #[instrument(skip(self))]
    async fn register(
        &self,
        domain: &str,
        years: u32,
        registrant_email: &str,
    ) -> ServiceResult<String> {
        let response = self
            .post_xcp(
                "SW_REGISTER",
                json!({
                    "domain": domain,
                    "period": years,
                    "reg_type": "new",
                    "handle": "process",
                    "custom_nameservers": 0,
                    "reg_username": registrant_email,
                }),
            )
            .await?;

        let order_id = response
            .pointer("/attributes/id")
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .ok_or_else(|| {
                ServiceError::upstream(PROVIDER, "registration response missing order id")
            })?;

        info!(domain, order_id = %order_id, "Domain registered");
        Ok(order_id)
    }
}
