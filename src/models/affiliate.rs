// Affiliate partner model and signup/admin DTOs.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffiliateStatus {
    Pending,
    Approved,
    /// Set when the affiliate unlocks recurring daily payouts.
    Active,
    Suspended,
}

impl AffiliateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AffiliateStatus::Pending => "pending",
            AffiliateStatus::Approved => "approved",
            AffiliateStatus::Active => "active",
            AffiliateStatus::Suspended => "suspended",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AffiliateStatus::Pending),
            "approved" => Some(AffiliateStatus::Approved),
            "active" => Some(AffiliateStatus::Active),
            "suspended" => Some(AffiliateStatus::Suspended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffiliateTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl AffiliateTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AffiliateTier::Bronze => "bronze",
            AffiliateTier::Silver => "silver",
            AffiliateTier::Gold => "gold",
            AffiliateTier::Platinum => "platinum",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "bronze" => Some(AffiliateTier::Bronze),
            "silver" => Some(AffiliateTier::Silver),
            "gold" => Some(AffiliateTier::Gold),
            "platinum" => Some(AffiliateTier::Platinum),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliate {
    pub user_email: String,
    pub full_name: String,
    pub referral_code: String,
    pub tier: AffiliateTier,
    pub status: AffiliateStatus,
    pub paypal_email: Option<String>,
    #[serde(default)]
    pub pending_balance: f64,
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub total_referrals: i64,
    #[serde(default)]
    pub daily_payout_active: bool,
    pub parent_affiliate_id: Option<String>,
    pub max_package_id: Option<String>,
}

impl Affiliate {
    pub const COLLECTION: &'static str = "affiliates";

    /// Whether the daily sweep should pick this affiliate up.
    pub fn eligible_for_daily_payout(&self) -> bool {
        self.daily_payout_active && self.status == AffiliateStatus::Active
    }
}

lazy_static! {
    pub static ref REFERRAL_CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9]{8}$").unwrap();
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid PayPal email"))]
    pub paypal_email: Option<String>,

    /// Referral code of the reseller this affiliate signed up under.
    pub parent_referral_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAffiliateStatusRequest {
    pub status: String,
}

impl UpdateAffiliateStatusRequest {
    pub fn parsed_status(&self) -> Result<AffiliateStatus, ServiceError> {
        AffiliateStatus::from_string(&self.status).ok_or_else(|| {
            ServiceError::validation(format!("Unknown affiliate status: {}", self.status))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TestPurchaseRequest {
    #[validate(length(min = 1, message = "package_id is required"))]
    pub package_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AffiliateStatus::Pending,
            AffiliateStatus::Approved,
            AffiliateStatus::Active,
            AffiliateStatus::Suspended,
        ] {
            assert_eq!(AffiliateStatus::from_string(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_daily_payout_eligibility() {
        let mut affiliate = Affiliate {
            user_email: "a@b.com".to_string(),
            full_name: "A B".to_string(),
            referral_code: "AAAA1111".to_string(),
            tier: AffiliateTier::Bronze,
            status: AffiliateStatus::Active,
            paypal_email: None,
            pending_balance: 0.0,
            total_earnings: 0.0,
            total_referrals: 0,
            daily_payout_active: true,
            parent_affiliate_id: None,
            max_package_id: None,
        };
        assert!(affiliate.eligible_for_daily_payout());

        affiliate.status = AffiliateStatus::Suspended;
        assert!(!affiliate.eligible_for_daily_payout());

        affiliate.status = AffiliateStatus::Active;
        affiliate.daily_payout_active = false;
        assert!(!affiliate.eligible_for_daily_payout());
    }

    #[test]
    fn test_referral_code_regex() {
        assert!(REFERRAL_CODE_REGEX.is_match("AB12CD34"));
        assert!(!REFERRAL_CODE_REGEX.is_match("ab12cd34"));
        assert!(!REFERRAL_CODE_REGEX.is_match("AB12CD3"));
    }
}
