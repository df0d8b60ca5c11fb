// Registered-domain record and the registration request DTO.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::referral::PayoutRecipient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Registered,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub affiliate_id: PayoutRecipient,
    pub domain_name: String,
    pub years: u32,
    pub status: DomainStatus,
    pub registrar_order_id: String,
}

impl Domain {
    pub const COLLECTION: &'static str = "domains";
}

lazy_static! {
    static ref DOMAIN_NAME_REGEX: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)+$")
            .unwrap();
    pub static ref SUBDOMAIN_REGEX: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap();
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterDomainRequest {
    #[validate(regex(path = "DOMAIN_NAME_REGEX", message = "Invalid domain name"))]
    pub domain_name: String,

    #[validate(range(min = 1, max = 10, message = "Years must be 1-10"))]
    #[serde(default = "default_years")]
    pub years: u32,

    pub referral_code: Option<String>,

    #[validate(email(message = "Invalid customer email"))]
    pub customer_email: Option<String>,

    pub customer_name: Option<String>,
}

fn default_years() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDnsRecordRequest {
    #[validate(regex(path = "SUBDOMAIN_REGEX", message = "Invalid subdomain label"))]
    pub subdomain: String,

    /// Overrides the configured origin IP when present.
    pub ip: Option<String>,
}
