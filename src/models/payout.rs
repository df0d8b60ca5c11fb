// Payout model: one record per withdrawal cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::ServiceError;

/// Minimum an affiliate may withdraw in one request. There is no maximum.
pub const MIN_PAYOUT_AMOUNT: f64 = 1.00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Completed | PayoutStatus::Failed)
    }
}

/// How a payout record came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutSource {
    /// Created by the daily recurring-commission sweep.
    Daily,
    /// Created by an affiliate's explicit withdrawal request.
    Request,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub affiliate_id: String,
    pub paypal_email: String,
    pub amount: f64,
    pub status: PayoutStatus,
    pub source: PayoutSource,
    pub note: Option<String>,
    /// Calendar date (YYYY-MM-DD) of the sweep run that produced this
    /// payout. Uniqueness per (affiliate, run_date) makes re-running the
    /// sweep within one day a no-op.
    pub run_date: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Payout {
    pub const COLLECTION: &'static str = "payouts";
}

/// Admin action on a payout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutAction {
    Approve,
    Reject,
    Complete,
}

impl PayoutAction {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(PayoutAction::Approve),
            "reject" => Some(PayoutAction::Reject),
            "complete" => Some(PayoutAction::Complete),
            _ => None,
        }
    }

    /// The status this action drives the payout into.
    pub fn target_status(&self) -> PayoutStatus {
        match self {
            PayoutAction::Approve => PayoutStatus::Processing,
            PayoutAction::Reject => PayoutStatus::Failed,
            PayoutAction::Complete => PayoutStatus::Completed,
        }
    }

    /// Statuses this action may be applied from.
    pub fn allowed_from(&self, current: PayoutStatus) -> bool {
        match self {
            PayoutAction::Approve => current == PayoutStatus::Pending,
            PayoutAction::Complete => current == PayoutStatus::Processing,
            PayoutAction::Reject => {
                matches!(current, PayoutStatus::Pending | PayoutStatus::Processing)
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RequestPayoutRequest {
    pub amount: f64,

    /// Overrides the PayPal address on the affiliate record when present.
    #[validate(email(message = "Invalid PayPal email"))]
    pub paypal_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProcessPayoutRequest {
    pub action: String,
}

impl ProcessPayoutRequest {
    pub fn parsed_action(&self) -> Result<PayoutAction, ServiceError> {
        PayoutAction::from_string(&self.action).ok_or_else(|| {
            ServiceError::validation(format!(
                "Unknown action '{}': expected approve, reject, or complete",
                self.action
            ))
        })
    }
}
