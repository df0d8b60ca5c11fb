// Daily recurring-commission sweep: amounts, eligibility, and run-date
// idempotency.

mod common;

use common::{TestApp, ADMIN_TOKEN, AFFILIATE_TOKEN};
use hostly_backend_core::models::{Affiliate, Payout};
use hostly_backend_core::store::EntityStore;
use serde_json::json;

async fn run_sweep(app: &TestApp) -> serde_json::Value {
    let (status, body) = app
        .post("/api/v1/admin/payouts/run-daily", Some(ADMIN_TOKEN), json!({}))
        .await;
    assert_eq!(status, 200, "sweep failed: {}", body);
    body
}

#[tokio::test]
async fn test_sweep_pays_one_thirtieth_of_monthly_commission() {
    let app = TestApp::spawn();
    let affiliate_id = app
        .seed_affiliate(json!({
            "status": "active",
            "daily_payout_active": true,
            "pending_balance": 0.0,
        }))
        .await;
    // $300 of approved recurring commission across three referrals.
    for _ in 0..3 {
        app.seed_referral(&affiliate_id, json!({"commission_amount": 100.0}))
            .await;
    }

    let report = run_sweep(&app).await;
    assert_eq!(report["processed"], 1);
    assert_eq!(report["total_amount"], 10.0);

    let payouts = app
        .store
        .filter(Payout::COLLECTION, json!({"affiliate_id": affiliate_id}), None, None)
        .await
        .unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].fields["amount"], 10.0);
    assert_eq!(payouts[0].fields["status"], "pending");
    assert_eq!(payouts[0].fields["source"], "daily");
    assert!(payouts[0].fields["run_date"].is_string());
    assert!(payouts[0].fields["note"]
        .as_str()
        .unwrap()
        .contains(payouts[0].fields["run_date"].as_str().unwrap()));

    let affiliate = app.get_doc(Affiliate::COLLECTION, &affiliate_id).await;
    assert_eq!(affiliate["pending_balance"], 10.0);
}

#[tokio::test]
async fn test_affiliate_without_qualifying_referrals_is_skipped() {
    let app = TestApp::spawn();
    let affiliate_id = app
        .seed_affiliate(json!({
            "status": "active",
            "daily_payout_active": true,
        }))
        .await;
    // Pending and non-recurring referrals do not qualify.
    app.seed_referral(&affiliate_id, json!({"status": "pending"}))
        .await;
    app.seed_referral(&affiliate_id, json!({"is_recurring": false}))
        .await;

    let report = run_sweep(&app).await;
    assert_eq!(report["processed"], 0);
    assert_eq!(report["skipped"], 1);
    assert_eq!(app.count(Payout::COLLECTION, json!({})).await, 0);
}

#[tokio::test]
async fn test_inactive_affiliates_are_not_selected() {
    let app = TestApp::spawn();
    // Eligible flag set but status never flipped to active.
    let affiliate_id = app
        .seed_affiliate(json!({
            "status": "approved",
            "daily_payout_active": true,
        }))
        .await;
    app.seed_referral(&affiliate_id, json!({})).await;

    let report = run_sweep(&app).await;
    assert_eq!(report["processed"], 0);
    assert_eq!(report["skipped"], 0);
    assert_eq!(app.count(Payout::COLLECTION, json!({})).await, 0);
}

#[tokio::test]
async fn test_rerunning_the_sweep_same_day_is_a_noop() {
    let app = TestApp::spawn();
    let affiliate_id = app
        .seed_affiliate(json!({
            "status": "active",
            "daily_payout_active": true,
        }))
        .await;
    app.seed_referral(&affiliate_id, json!({"commission_amount": 300.0}))
        .await;

    let first = run_sweep(&app).await;
    assert_eq!(first["processed"], 1);

    let second = run_sweep(&app).await;
    assert_eq!(second["processed"], 0);
    assert_eq!(second["skipped"], 1);

    // One payout, one day's balance.
    assert_eq!(app.count(Payout::COLLECTION, json!({})).await, 1);
    let affiliate = app.get_doc(Affiliate::COLLECTION, &affiliate_id).await;
    assert_eq!(affiliate["pending_balance"], 10.0);
}

#[tokio::test]
async fn test_sweep_requires_admin() {
    let app = TestApp::spawn();
    let (status, _) = app
        .post(
            "/api/v1/admin/payouts/run-daily",
            Some(AFFILIATE_TOKEN),
            json!({}),
        )
        .await;
    assert_eq!(status, 403);
}
