// CRM lead created whenever a referral code resolves to an affiliate,
// regardless of who ends up credited with the sale.

use serde::{Deserialize, Serialize};

use super::referral::SaleChannel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub affiliate_id: String,
    pub package_id: Option<String>,
    pub source: SaleChannel,
}

impl Lead {
    pub const COLLECTION: &'static str = "leads";
}
