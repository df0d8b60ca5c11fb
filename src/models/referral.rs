// Referral ledger model.
//
// One record per attributed sale. Immutable once created except for status
// transitions driven by the admin back office and the payout sweep.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::ServiceError;

/// Who a sale (or its commission) is credited to.
///
/// The wire format keeps the legacy shape: an affiliate document id, or the
/// literal string `"admin"` when the house takes the sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutRecipient {
    Affiliate(String),
    House,
}

pub const HOUSE_SENTINEL: &str = "admin";

impl PayoutRecipient {
    pub fn as_str(&self) -> &str {
        match self {
            PayoutRecipient::Affiliate(id) => id,
            PayoutRecipient::House => HOUSE_SENTINEL,
        }
    }

    pub fn is_house(&self) -> bool {
        matches!(self, PayoutRecipient::House)
    }

    pub fn affiliate_id(&self) -> Option<&str> {
        match self {
            PayoutRecipient::Affiliate(id) => Some(id),
            PayoutRecipient::House => None,
        }
    }
}

impl From<&str> for PayoutRecipient {
    fn from(s: &str) -> Self {
        if s == HOUSE_SENTINEL {
            PayoutRecipient::House
        } else {
            PayoutRecipient::Affiliate(s.to_string())
        }
    }
}

impl Serialize for PayoutRecipient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PayoutRecipient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(PayoutRecipient::from(s.as_str()))
    }
}

/// Sales channel a referral came through. Each channel carries its own
/// commission percentage (see `services::commission`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    Checkout,
    DomainRegistration,
    TestPurchase,
}

impl SaleChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleChannel::Checkout => "checkout",
            SaleChannel::DomainRegistration => "domain_registration",
            SaleChannel::TestPurchase => "test_purchase",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Approved,
    Paid,
    Refunded,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Approved => "approved",
            ReferralStatus::Paid => "paid",
            ReferralStatus::Refunded => "refunded",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReferralStatus::Pending),
            "approved" => Some(ReferralStatus::Approved),
            "paid" => Some(ReferralStatus::Paid),
            "refunded" => Some(ReferralStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    /// The affiliate the sale was attributed to (or the house when no
    /// referral code matched).
    pub affiliate_id: PayoutRecipient,
    /// Who the commission is payable to. The house keeps early sales even
    /// when an affiliate referred them.
    pub payout_recipient: PayoutRecipient,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub sale_amount: f64,
    pub commission_amount: f64,
    pub status: ReferralStatus,
    pub is_recurring: bool,
    pub billing_cycle: Option<String>,
    pub referral_source: SaleChannel,
}

impl Referral {
    pub const COLLECTION: &'static str = "referrals";
}

/// Admin request to move a referral through its status lifecycle.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct UpdateReferralStatusRequest {
    pub status: String,
}

impl UpdateReferralStatusRequest {
    pub fn parsed_status(&self) -> Result<ReferralStatus, ServiceError> {
        ReferralStatus::from_string(&self.status).ok_or_else(|| {
            ServiceError::validation(format!("Unknown referral status: {}", self.status))
        })
    }
}
