// Cloudflare DNS collaborator: provisions a proxied A record for a
// subdomain against the configured zone.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use crate::{
    app_config::CloudflareConfig,
    utils::{ServiceError, ServiceResult},
};

const PROVIDER: &str = "cloudflare";

#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Returns the created record id.
    async fn create_a_record(&self, subdomain: &str, ip: &str) -> ServiceResult<String>;
}

pub struct CloudflareClient {
    http: Client,
    config: CloudflareConfig,
}

impl CloudflareClient {
    pub fn new(config: CloudflareConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    #[instrument(skip(self))]
    async fn create_a_record(&self, subdomain: &str, ip: &str) -> ServiceResult<String> {
        let record_name = format!("{}.{}", subdomain, self.config.zone_name);

        let response = self
            .http
            .post(format!(
                "{}/zones/{}/dns_records",
                self.config.api_url, self.config.zone_id
            ))
            .bearer_auth(&self.config.api_token)
            .json(&json!({
                "type": "A",
                "name": record_name,
                "content": ip,
                "ttl": 1,
                "proxied": true,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        let status = response.status();
        let parsed: JsonValue = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER, e.to_string()))?;

        let success = parsed
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !status.is_success() || !success {
            return Err(ServiceError::upstream(
                PROVIDER,
                parsed.get("errors").map(|e| e.to_string()).unwrap_or_else(
                    || format!("DNS record creation failed with status {}", status),
                ),
            ));
        }

        let record_id = parsed
            .pointer("/result/id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        info!(record = %record_name, record_id = %record_id, "DNS record created");
        Ok(record_id)
    }
}
