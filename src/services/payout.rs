// Payout processing: the daily recurring-commission sweep and the
// affiliate-initiated request / admin approval workflow.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use super::{balance::adjust_balance, email::EmailService};
use crate::{
    auth::CurrentUser,
    models::{
        Affiliate, AffiliateStatus, Payout, PayoutAction, PayoutSource, PayoutStatus, Referral,
        ReferralStatus, RequestPayoutRequest, Stored, MIN_PAYOUT_AMOUNT,
    },
    store::EntityStore,
    utils::{round_cents, ServiceError, ServiceResult},
};

/// Days of recurring commission a monthly total is spread across.
const DAILY_SWEEP_DIVISOR: f64 = 30.0;

/// Result of one daily sweep invocation.
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub processed: u32,
    pub skipped: u32,
    pub failed: u32,
    pub total_amount: f64,
}

pub struct PayoutService {
    store: Arc<dyn EntityStore>,
    email: Option<Arc<EmailService>>,
}

impl PayoutService {
    pub fn new(store: Arc<dyn EntityStore>, email: Option<Arc<EmailService>>) -> Self {
        Self { store, email }
    }

    /// Affiliate-initiated withdrawal against the available balance.
    ///
    /// The debit happens first, through the CAS helper, so the balance check
    /// and the deduction are a single atomic step; creating the payout
    /// record afterwards is compensated if it fails.
    #[instrument(skip(self, user, request))]
    pub async fn request_payout(
        &self,
        user: &CurrentUser,
        affiliate_id: &str,
        request: RequestPayoutRequest,
    ) -> ServiceResult<Stored<Payout>> {
        let doc = self.store.get(Affiliate::COLLECTION, affiliate_id).await?;
        let affiliate: Affiliate = doc.parse()?;

        if affiliate.user_email != user.email {
            return Err(ServiceError::Forbidden(
                "Payouts can only be requested for your own affiliate account".to_string(),
            ));
        }

        let amount = request.amount;
        if !amount.is_finite() || round_cents(amount) != amount {
            return Err(ServiceError::validation(
                "Amount must be a dollar value with at most two decimals",
            ));
        }
        if amount < MIN_PAYOUT_AMOUNT {
            return Err(ServiceError::validation(format!(
                "Minimum payout amount is ${:.2}",
                MIN_PAYOUT_AMOUNT
            )));
        }

        let paypal_email = request
            .paypal_email
            .clone()
            .or_else(|| affiliate.paypal_email.clone())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::validation("No PayPal email on file"))?;

        // Atomic: rejects the request when the balance no longer covers it.
        adjust_balance(self.store.as_ref(), affiliate_id, -amount, 0.0).await?;

        let payout = Payout {
            affiliate_id: affiliate_id.to_string(),
            paypal_email,
            amount,
            status: PayoutStatus::Pending,
            source: PayoutSource::Request,
            note: None,
            run_date: None,
            processed_at: None,
        };

        let created = self
            .store
            .create(Payout::COLLECTION, serde_json::to_value(&payout)?)
            .await;

        match created {
            Ok(doc) => {
                info!(affiliate_id, amount, "Payout requested");
                Ok(Stored::from_document(&doc)?)
            },
            Err(e) => {
                // Give the money back before surfacing the failure.
                if let Err(refund_err) =
                    adjust_balance(self.store.as_ref(), affiliate_id, amount, 0.0).await
                {
                    error!(
                        affiliate_id,
                        %refund_err,
                        "Failed to restore balance after payout create failure"
                    );
                }
                Err(e.into())
            },
        }
    }

    /// Admin action on a payout: approve, reject, or complete.
    #[instrument(skip(self, user))]
    pub async fn process_request(
        &self,
        user: &CurrentUser,
        payout_id: &str,
        action: PayoutAction,
    ) -> ServiceResult<Stored<Payout>> {
        user.require_admin()?;

        let doc = self.store.get(Payout::COLLECTION, payout_id).await?;
        let payout: Payout = doc.parse()?;

        if !action.allowed_from(payout.status) {
            return Err(ServiceError::validation(format!(
                "Cannot {} a {} payout",
                match action {
                    PayoutAction::Approve => "approve",
                    PayoutAction::Reject => "reject",
                    PayoutAction::Complete => "complete",
                },
                payout.status.as_str()
            )));
        }

        // Rejection reverses the original debit.
        if action == PayoutAction::Reject {
            adjust_balance(self.store.as_ref(), &payout.affiliate_id, payout.amount, 0.0).await?;
        }

        let new_status = action.target_status();
        let patch = if new_status.is_terminal() {
            json!({
                "status": new_status.as_str(),
                "processed_at": Utc::now(),
            })
        } else {
            json!({ "status": new_status.as_str() })
        };

        let updated = self.store.update(Payout::COLLECTION, payout_id, patch).await?;
        info!(payout_id, status = new_status.as_str(), "Payout processed");

        if new_status == PayoutStatus::Completed {
            self.notify_payout_completed(&payout).await;
        }

        Ok(Stored::from_document(&updated)?)
    }

    /// Daily batch: convert each eligible affiliate's approved recurring
    /// commission into a pending payout and withdrawable balance.
    ///
    /// A payout tagged with today's run date acts as the idempotency key;
    /// re-running the sweep within one day is a no-op for already-swept
    /// affiliates. Failures are isolated per affiliate.
    #[instrument(skip(self))]
    pub async fn run_daily_sweep(&self) -> ServiceResult<SweepReport> {
        let run_date = Utc::now().format("%Y-%m-%d").to_string();
        let mut report = SweepReport::default();

        let affiliates = self
            .store
            .filter(
                Affiliate::COLLECTION,
                json!({
                    "daily_payout_active": true,
                    "status": AffiliateStatus::Active.as_str(),
                }),
                None,
                None,
            )
            .await?;

        info!(count = affiliates.len(), %run_date, "Starting daily payout sweep");

        for doc in &affiliates {
            match self.sweep_affiliate(doc, &run_date).await {
                Ok(Some(amount)) => {
                    report.processed += 1;
                    report.total_amount = round_cents(report.total_amount + amount);
                },
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(affiliate_id = %doc.id, %e, "Sweep failed for affiliate");
                },
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            total = report.total_amount,
            "Daily payout sweep finished"
        );
        Ok(report)
    }

    async fn sweep_affiliate(
        &self,
        doc: &crate::store::Document,
        run_date: &str,
    ) -> ServiceResult<Option<f64>> {
        let affiliate: Affiliate = doc.parse()?;

        let already_swept = self
            .store
            .filter(
                Payout::COLLECTION,
                json!({ "affiliate_id": doc.id, "run_date": run_date }),
                None,
                Some(1),
            )
            .await?;
        if !already_swept.is_empty() {
            return Ok(None);
        }

        let referrals = self
            .store
            .filter(
                Referral::COLLECTION,
                json!({
                    "affiliate_id": doc.id,
                    "status": ReferralStatus::Approved.as_str(),
                    "is_recurring": true,
                }),
                None,
                None,
            )
            .await?;

        if referrals.is_empty() {
            return Ok(None);
        }

        let total_monthly_commission: f64 = referrals
            .iter()
            .map(|r| {
                r.fields
                    .get("commission_amount")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0)
            })
            .sum();
        let daily_amount = round_cents(total_monthly_commission / DAILY_SWEEP_DIVISOR);
        if daily_amount <= 0.0 {
            return Ok(None);
        }

        let payout = Payout {
            affiliate_id: doc.id.clone(),
            paypal_email: affiliate.paypal_email.clone().unwrap_or_default(),
            amount: daily_amount,
            status: PayoutStatus::Pending,
            source: PayoutSource::Daily,
            note: Some(format!("Daily recurring commission for {}", run_date)),
            run_date: Some(run_date.to_string()),
            processed_at: None,
        };
        self.store
            .create(Payout::COLLECTION, serde_json::to_value(&payout)?)
            .await?;

        adjust_balance(self.store.as_ref(), &doc.id, daily_amount, 0.0).await?;

        Ok(Some(daily_amount))
    }

    /// Affiliate-facing payout history.
    pub async fn payouts_for_affiliate(
        &self,
        affiliate_id: &str,
    ) -> ServiceResult<Vec<Stored<Payout>>> {
        let docs = self
            .store
            .filter(
                Payout::COLLECTION,
                json!({ "affiliate_id": affiliate_id }),
                None,
                None,
            )
            .await?;
        let mut payouts = Stored::from_documents(&docs)?;
        payouts.sort_by(|a: &Stored<Payout>, b: &Stored<Payout>| b.created_at.cmp(&a.created_at));
        Ok(payouts)
    }

    /// Completion email is best-effort: the payout has already reached its
    /// terminal state, so a delivery failure is logged and swallowed.
    async fn notify_payout_completed(&self, payout: &Payout) {
        let Some(email) = &self.email else {
            return;
        };

        let affiliate = match self
            .store
            .get(Affiliate::COLLECTION, &payout.affiliate_id)
            .await
            .and_then(|doc| doc.parse::<Affiliate>())
        {
            Ok(affiliate) => affiliate,
            Err(e) => {
                warn!(%e, "Could not load affiliate for payout email");
                return;
            },
        };

        if let Err(e) = email
            .send_payout_processed(
                &affiliate.user_email,
                &affiliate.full_name,
                payout.amount,
                &payout.paypal_email,
            )
            .await
        {
            warn!(%e, "Payout notification email failed");
        }
    }
}
