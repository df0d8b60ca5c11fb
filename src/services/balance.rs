// Atomic affiliate balance mutation.
//
// Every balance change is a compare-and-swap against the document version:
// read, recompute, write-if-unchanged, retry on conflict. A debit re-checks
// the available balance inside the loop, so two concurrent withdrawals can
// never overdraw the account.

use serde_json::json;
use tracing::warn;

use crate::{
    models::{Affiliate, Stored},
    store::{EntityStore, StoreError},
    utils::{round_cents, ServiceError, ServiceResult},
};

const MAX_CAS_ATTEMPTS: u32 = 5;

/// Apply `delta_pending` to `pending_balance` and `delta_earnings` to
/// `total_earnings`. Returns the affiliate as written.
pub async fn adjust_balance(
    store: &dyn EntityStore,
    affiliate_id: &str,
    delta_pending: f64,
    delta_earnings: f64,
) -> ServiceResult<Stored<Affiliate>> {
    for attempt in 1..=MAX_CAS_ATTEMPTS {
        let doc = store.get(Affiliate::COLLECTION, affiliate_id).await?;
        let affiliate: Affiliate = doc.parse()?;

        let new_pending = round_cents(affiliate.pending_balance + delta_pending);
        if new_pending < 0.0 {
            return Err(ServiceError::validation(
                "Requested amount exceeds pending balance",
            ));
        }
        let new_earnings = round_cents(affiliate.total_earnings + delta_earnings);

        let result = store
            .update_checked(
                Affiliate::COLLECTION,
                affiliate_id,
                doc.version,
                json!({
                    "pending_balance": new_pending,
                    "total_earnings": new_earnings,
                }),
            )
            .await;

        match result {
            Ok(updated) => return Ok(Stored::from_document(&updated)?),
            Err(StoreError::VersionConflict { .. }) => {
                warn!(
                    affiliate_id,
                    attempt, "Balance update conflicted, retrying"
                );
                continue;
            },
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::VersionConflict(Affiliate::COLLECTION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AffiliateStatus, AffiliateTier};
    use crate::store::MemoryStore;

    async fn seed_affiliate(store: &MemoryStore, balance: f64) -> String {
        let affiliate = Affiliate {
            user_email: "a@b.com".to_string(),
            full_name: "A B".to_string(),
            referral_code: "AAAA1111".to_string(),
            tier: AffiliateTier::Bronze,
            status: AffiliateStatus::Active,
            paypal_email: Some("a@b.com".to_string()),
            pending_balance: balance,
            total_earnings: balance,
            total_referrals: 0,
            daily_payout_active: false,
            parent_affiliate_id: None,
            max_package_id: None,
        };
        store
            .create(
                Affiliate::COLLECTION,
                serde_json::to_value(&affiliate).unwrap(),
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_credit_and_debit() {
        let store = MemoryStore::new();
        let id = seed_affiliate(&store, 10.0).await;

        let updated = adjust_balance(&store, &id, 5.25, 5.25).await.unwrap();
        assert_eq!(updated.entity.pending_balance, 15.25);
        assert_eq!(updated.entity.total_earnings, 15.25);

        let updated = adjust_balance(&store, &id, -15.25, 0.0).await.unwrap();
        assert_eq!(updated.entity.pending_balance, 0.0);
    }

    #[tokio::test]
    async fn test_overdraft_is_rejected() {
        let store = MemoryStore::new();
        let id = seed_affiliate(&store, 3.0).await;

        let err = adjust_balance(&store, &id, -3.01, 0.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let doc = store.get(Affiliate::COLLECTION, &id).await.unwrap();
        assert_eq!(doc.fields["pending_balance"], 3.0);
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let id = seed_affiliate(&store, 10.0).await;

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                adjust_balance(store.as_ref(), &id, -4.0, 0.0).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // Only two $4 debits fit a $10 balance.
        assert_eq!(successes, 2);
        let doc = store.get(Affiliate::COLLECTION, &id).await.unwrap();
        assert_eq!(doc.fields["pending_balance"], 2.0);
    }
}
