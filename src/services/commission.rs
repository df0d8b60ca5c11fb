// Commission engine: sale attribution and affiliate crediting.
//
// Every purchase channel funnels through `attribute_sale`, which decides
// whether the commission is payable to the referring affiliate or to the
// house, writes the referral ledger entry, and moves the affiliate through
// the daily-payout graduation gate.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument};

use crate::{
    models::{
        Affiliate, AffiliateStatus, AffiliateTier, Lead, PayoutRecipient, Referral,
        ReferralStatus, SaleChannel, Stored,
    },
    store::EntityStore,
    utils::{round_cents, ServiceResult},
};

// Per-channel commission table. Each sales channel has always carried its
// own percentage; the table is the single place they live.
const CHECKOUT_RATE: f64 = 0.30;
const DOMAIN_RATE: f64 = 0.50;
const TIER_RATE_BRONZE: f64 = 0.15;
const TIER_RATE_SILVER: f64 = 0.25;
const TIER_RATE_GOLD: f64 = 0.35;

/// Prior approved referrals needed before a sale is credited straight to
/// the affiliate. The first two attributed sales go to the house; the sale
/// that brings the approved count to three (and every sale after it) pays
/// the affiliate.
const DIRECT_CREDIT_THRESHOLD: usize = 2;

/// Total referrals at which recurring daily payouts unlock.
const DAILY_PAYOUT_UNLOCK_AT: i64 = 3;

pub fn commission_rate(channel: SaleChannel, tier: AffiliateTier) -> f64 {
    match channel {
        SaleChannel::Checkout => CHECKOUT_RATE,
        SaleChannel::DomainRegistration => DOMAIN_RATE,
        SaleChannel::TestPurchase => match tier {
            AffiliateTier::Bronze => TIER_RATE_BRONZE,
            AffiliateTier::Silver => TIER_RATE_SILVER,
            AffiliateTier::Gold | AffiliateTier::Platinum => TIER_RATE_GOLD,
        },
    }
}

pub fn compute_commission(sale_amount: f64, channel: SaleChannel, tier: AffiliateTier) -> f64 {
    round_cents(sale_amount * commission_rate(channel, tier))
}

/// A completed purchase, ready for attribution.
#[derive(Debug, Clone)]
pub struct SaleEvent {
    pub referral_code: Option<String>,
    pub channel: SaleChannel,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub sale_amount: f64,
    pub is_recurring: bool,
    pub billing_cycle: Option<String>,
}

/// Outcome of attributing one sale.
#[derive(Debug)]
pub struct AttributedSale {
    pub referral: Stored<Referral>,
    pub payout_recipient: PayoutRecipient,
    pub commission_amount: f64,
    /// True when this sale flipped the affiliate into recurring daily
    /// payouts.
    pub daily_payout_unlocked: bool,
}

pub struct CommissionEngine {
    store: Arc<dyn EntityStore>,
}

impl CommissionEngine {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Record a completed sale: resolve the affiliate, decide the payout
    /// recipient, write the referral, and update affiliate state.
    #[instrument(skip(self, event), fields(channel = event.channel.as_str()))]
    pub async fn attribute_sale(&self, event: SaleEvent) -> ServiceResult<AttributedSale> {
        let affiliate = self.resolve_affiliate(event.referral_code.as_deref()).await?;

        let tier = affiliate
            .as_ref()
            .map(|a| a.entity.tier)
            .unwrap_or(AffiliateTier::Bronze);
        let commission_amount = compute_commission(event.sale_amount, event.channel, tier);

        let (affiliate_ref, payout_recipient) = match &affiliate {
            None => (PayoutRecipient::House, PayoutRecipient::House),
            Some(aff) => {
                let approved = self.approved_referral_count(&aff.id).await?;
                let recipient = if approved >= DIRECT_CREDIT_THRESHOLD {
                    PayoutRecipient::Affiliate(aff.id.clone())
                } else {
                    PayoutRecipient::House
                };
                (PayoutRecipient::Affiliate(aff.id.clone()), recipient)
            },
        };

        let status = if payout_recipient.is_house() {
            ReferralStatus::Pending
        } else {
            ReferralStatus::Approved
        };

        let referral = Referral {
            affiliate_id: affiliate_ref,
            payout_recipient: payout_recipient.clone(),
            customer_email: event.customer_email.clone(),
            customer_name: event.customer_name.clone(),
            package_id: event.package_id.clone(),
            package_name: event.package_name.clone(),
            sale_amount: event.sale_amount,
            commission_amount,
            status,
            is_recurring: event.is_recurring,
            billing_cycle: event.billing_cycle.clone(),
            referral_source: event.channel,
        };

        let doc = self
            .store
            .create(Referral::COLLECTION, serde_json::to_value(&referral)?)
            .await?;
        let referral = Stored::<Referral>::from_document(&doc)?;

        let mut daily_payout_unlocked = false;
        if let Some(aff) = &affiliate {
            self.record_lead(aff, &event).await?;
            daily_payout_unlocked = self.refresh_referral_totals(aff).await?;

            // Domain commissions post to the cash balance immediately;
            // checkout and test-purchase commissions reach it only through
            // the daily sweep.
            if !payout_recipient.is_house() && event.channel == SaleChannel::DomainRegistration {
                super::balance::adjust_balance(
                    self.store.as_ref(),
                    &aff.id,
                    commission_amount,
                    commission_amount,
                )
                .await?;
            }
        }

        info!(
            recipient = payout_recipient.as_str(),
            commission = commission_amount,
            "Sale attributed"
        );

        Ok(AttributedSale {
            referral,
            payout_recipient,
            commission_amount,
            daily_payout_unlocked,
        })
    }

    /// Exact-match lookup by referral code. Unknown or absent codes resolve
    /// to no affiliate, and the sale falls back to the house.
    async fn resolve_affiliate(
        &self,
        referral_code: Option<&str>,
    ) -> ServiceResult<Option<Stored<Affiliate>>> {
        let Some(code) = referral_code.filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let docs = self
            .store
            .filter(
                Affiliate::COLLECTION,
                json!({ "referral_code": code }),
                None,
                Some(1),
            )
            .await?;

        match docs.first() {
            Some(doc) => Ok(Some(Stored::from_document(doc)?)),
            None => Ok(None),
        }
    }

    async fn approved_referral_count(&self, affiliate_id: &str) -> ServiceResult<usize> {
        let docs = self
            .store
            .filter(
                Referral::COLLECTION,
                json!({
                    "affiliate_id": affiliate_id,
                    "status": ReferralStatus::Approved.as_str(),
                }),
                None,
                None,
            )
            .await?;
        Ok(docs.len())
    }

    /// Recompute the affiliate's total referral count and open the daily
    /// payout gate once it reaches the unlock threshold. Returns whether
    /// the gate flipped on this call.
    async fn refresh_referral_totals(&self, affiliate: &Stored<Affiliate>) -> ServiceResult<bool> {
        let total = self
            .store
            .filter(
                Referral::COLLECTION,
                json!({ "affiliate_id": affiliate.id }),
                None,
                None,
            )
            .await?
            .len() as i64;

        let unlocking = total >= DAILY_PAYOUT_UNLOCK_AT && !affiliate.entity.daily_payout_active;

        let patch = if unlocking {
            json!({
                "total_referrals": total,
                "daily_payout_active": true,
                "status": AffiliateStatus::Active.as_str(),
            })
        } else {
            json!({ "total_referrals": total })
        };

        self.store
            .update(Affiliate::COLLECTION, &affiliate.id, patch)
            .await?;

        if unlocking {
            info!(affiliate_id = %affiliate.id, total, "Daily payouts unlocked");
        }
        Ok(unlocking)
    }

    /// A matched referral code always produces a lead, even when the sale
    /// itself was kept by the house.
    async fn record_lead(
        &self,
        affiliate: &Stored<Affiliate>,
        event: &SaleEvent,
    ) -> ServiceResult<()> {
        let lead = Lead {
            customer_email: event.customer_email.clone(),
            customer_name: event.customer_name.clone(),
            affiliate_id: affiliate.id.clone(),
            package_id: event.package_id.clone(),
            source: event.channel,
        };
        self.store
            .create(Lead::COLLECTION, serde_json::to_value(&lead)?)
            .await?;
        Ok(())
    }
}
