// Centralized configuration management for Hostly Backend
// Load ALL env vars ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paypal: PayPalConfig,
    pub opensrs: OpenSrsConfig,
    pub cloudflare: CloudflareConfig,
    pub email: EmailConfig,
    pub features: FeatureConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// PayPal payment processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalConfig {
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub currency: String,
    pub return_url: String,
    pub cancel_url: String,
}

/// OpenSRS domain registrar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSrsConfig {
    pub api_url: String,
    pub username: String,
    pub api_key: String,
    /// Flat retail price for a one-year registration.
    pub domain_price: f64,
}

/// Cloudflare DNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    pub api_url: String,
    pub api_token: String,
    pub zone_id: String,
    pub zone_name: String,
    /// Default A-record target for provisioned subdomains.
    pub origin_ip: String,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub api_key: String,
    pub api_url: String,
    pub from_email: String,
    pub from_name: String,
    pub dashboard_url: String,
}

/// Feature flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub enable_swagger_ui: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_f64_or_default = |key: &str, default: &str| -> Result<f64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid number".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));
        let rust_log = get_or_default("RUST_LOG", "info");

        let server = ServerConfig {
            bind_address,
            port,
            environment: environment.clone(),
            rust_log,
        };

        // PayPal credentials are the only hard requirement: without them the
        // checkout surface cannot function at all.
        let paypal = PayPalConfig {
            api_url: get_or_default("PAYPAL_API_URL", "https://api-m.sandbox.paypal.com"),
            client_id: get_required("PAYPAL_CLIENT_ID")?,
            client_secret: get_required("PAYPAL_CLIENT_SECRET")?,
            currency: get_or_default("PAYPAL_CURRENCY", "USD"),
            return_url: get_or_default(
                "PAYPAL_RETURN_URL",
                "https://hostly.sh/checkout/success",
            ),
            cancel_url: get_or_default("PAYPAL_CANCEL_URL", "https://hostly.sh/checkout/cancel"),
        };

        let opensrs = OpenSrsConfig {
            api_url: get_or_default("OPENSRS_API_URL", "https://horizon.opensrs.net:55443"),
            username: get_or_default("OPENSRS_USERNAME", ""),
            api_key: get_or_default("OPENSRS_API_KEY", ""),
            domain_price: parse_f64_or_default("DOMAIN_PRICE", "10.0")?,
        };

        let cloudflare = CloudflareConfig {
            api_url: get_or_default("CLOUDFLARE_API_URL", "https://api.cloudflare.com/client/v4"),
            api_token: get_or_default("CLOUDFLARE_API_TOKEN", ""),
            zone_id: get_or_default("CLOUDFLARE_ZONE_ID", ""),
            zone_name: get_or_default("CLOUDFLARE_ZONE_NAME", "hostly.sh"),
            origin_ip: get_or_default("CLOUDFLARE_ORIGIN_IP", ""),
        };

        let email = EmailConfig {
            api_key: get_or_default("RESEND_API_KEY", ""),
            api_url: get_or_default("RESEND_API_URL", "https://api.resend.com/emails"),
            from_email: get_or_default("EMAIL_FROM_ADDRESS", "noreply@hostly.sh"),
            from_name: get_or_default("EMAIL_FROM_NAME", "Hostly"),
            dashboard_url: get_or_default("DASHBOARD_URL", "https://app.hostly.sh"),
        };

        let features = FeatureConfig {
            enable_swagger_ui: parse_bool_or_default("ENABLE_SWAGGER_UI", "false"),
        };

        Ok(Self {
            server,
            paypal,
            opensrs,
            cloudflare,
            email,
            features,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.server.environment == Environment::Development
    }
}

/// Get the global configuration instance
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_string() {
        assert_eq!(
            Environment::from("development".to_string()),
            Environment::Development
        );
        assert_eq!(
            Environment::from("prod".to_string()),
            Environment::Production
        );
        assert_eq!(Environment::from("test".to_string()), Environment::Test);
        assert_eq!(
            Environment::from("staging".to_string()),
            Environment::Staging
        );
        assert_eq!(
            Environment::from("anything-else".to_string()),
            Environment::Development
        );
    }

    // Single test so the PAYPAL_* mutations cannot race another test thread.
    #[test]
    fn test_config_from_env() {
        env::remove_var("PAYPAL_CLIENT_ID");
        env::remove_var("PAYPAL_CLIENT_SECRET");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));

        env::set_var("PAYPAL_CLIENT_ID", "test-client-id");
        env::set_var("PAYPAL_CLIENT_SECRET", "test-client-secret");
        env::set_var("DOMAIN_PRICE", "12.5");

        let config = AppConfig::from_env().expect("Failed to load test config");

        assert_eq!(config.paypal.client_id, "test-client-id");
        assert_eq!(config.opensrs.domain_price, 12.5);
        assert_eq!(config.paypal.currency, "USD");
        assert_eq!(config.server.environment, Environment::Development);

        env::remove_var("PAYPAL_CLIENT_ID");
        env::remove_var("PAYPAL_CLIENT_SECRET");
        env::remove_var("DOMAIN_PRICE");
    }
}
