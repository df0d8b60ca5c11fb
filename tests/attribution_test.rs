// Sale attribution through the checkout capture flow: who gets credited,
// when referrals auto-approve, and when daily payouts unlock.

mod common;

use common::{TestApp, ADMIN_TOKEN, AFFILIATE_TOKEN};
use hostly_backend_core::models::{Affiliate, Lead, Referral};
use serde_json::json;

async fn capture_sale(app: &TestApp, package_id: &str, referral_code: Option<&str>) -> serde_json::Value {
    let (status, body) = app
        .post(
            "/api/v1/checkout/orders/stub-order-1/capture",
            None,
            json!({
                "package_id": package_id,
                "referral_code": referral_code,
                "customer_email": "buyer@example.com",
                "customer_name": "Bailey Buyer",
            }),
        )
        .await;
    assert_eq!(status, 200, "capture failed: {}", body);
    body
}

#[tokio::test]
async fn test_first_sale_goes_to_house_as_pending() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({"referral_code": "CODEAAAA"})).await;
    let package_id = app.seed_package(json!({})).await;

    let body = capture_sale(&app, &package_id, Some("CODEAAAA")).await;

    assert_eq!(body["payout_recipient"], "admin");
    assert_eq!(body["referral"]["status"], "pending");
    assert_eq!(body["referral"]["affiliate_id"], affiliate_id);
    // 30% checkout commission on the $100 package.
    assert_eq!(body["commission_amount"], 30.0);
    assert_eq!(body["daily_payout_unlocked"], false);

    let affiliate = app.get_doc(Affiliate::COLLECTION, &affiliate_id).await;
    assert_eq!(affiliate["total_referrals"], 1);
    assert_eq!(affiliate["daily_payout_active"], false);
    // No cash posts for a house-kept checkout sale.
    assert_eq!(affiliate["pending_balance"], 0.0);

    // The matched code produced a lead even though the house kept the sale.
    assert_eq!(
        app.count(Lead::COLLECTION, json!({"affiliate_id": affiliate_id}))
            .await,
        1
    );
}

#[tokio::test]
async fn test_second_sale_still_goes_to_house() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({"referral_code": "CODEBBBB"})).await;
    let package_id = app.seed_package(json!({})).await;
    app.seed_referral(&affiliate_id, json!({"status": "approved"}))
        .await;

    let body = capture_sale(&app, &package_id, Some("CODEBBBB")).await;

    assert_eq!(body["payout_recipient"], "admin");
    assert_eq!(body["referral"]["status"], "pending");
}

#[tokio::test]
async fn test_third_sale_is_credited_and_unlocks_daily_payouts() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({"referral_code": "CODECCCC"})).await;
    let package_id = app.seed_package(json!({})).await;
    app.seed_referral(&affiliate_id, json!({"status": "approved"}))
        .await;
    app.seed_referral(&affiliate_id, json!({"status": "approved"}))
        .await;

    let body = capture_sale(&app, &package_id, Some("CODECCCC")).await;

    assert_eq!(body["payout_recipient"], affiliate_id);
    assert_eq!(body["referral"]["status"], "approved");
    assert_eq!(body["daily_payout_unlocked"], true);

    let affiliate = app.get_doc(Affiliate::COLLECTION, &affiliate_id).await;
    assert_eq!(affiliate["total_referrals"], 3);
    assert_eq!(affiliate["daily_payout_active"], true);
    assert_eq!(affiliate["status"], "active");
    // Checkout commissions accrue only through the daily sweep.
    assert_eq!(affiliate["pending_balance"], 0.0);
}

#[tokio::test]
async fn test_unknown_code_records_sale_for_the_house() {
    let app = TestApp::spawn();
    let package_id = app.seed_package(json!({})).await;

    let body = capture_sale(&app, &package_id, Some("NOSUCHCO")).await;

    assert_eq!(body["payout_recipient"], "admin");
    assert_eq!(body["referral"]["affiliate_id"], "admin");
    assert_eq!(body["referral"]["status"], "pending");

    // No affiliate matched, so no lead either.
    assert_eq!(app.count(Lead::COLLECTION, json!({})).await, 0);
}

#[tokio::test]
async fn test_missing_code_records_sale_for_the_house() {
    let app = TestApp::spawn();
    let package_id = app.seed_package(json!({})).await;

    let body = capture_sale(&app, &package_id, None).await;
    assert_eq!(body["payout_recipient"], "admin");
    assert_eq!(app.count(Referral::COLLECTION, json!({})).await, 1);
}

#[tokio::test]
async fn test_commission_amount_is_never_recomputed() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({"referral_code": "CODEDDDD"})).await;
    let package_id = app.seed_package(json!({})).await;

    let body = capture_sale(&app, &package_id, Some("CODEDDDD")).await;
    let referral_id = body["referral"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["referral"]["commission_amount"], 30.0);

    // Admin approval and a later package price change leave the recorded
    // amount untouched.
    let (status, _) = app
        .post(
            &format!("/api/v1/admin/referrals/{}/status", referral_id),
            Some(ADMIN_TOKEN),
            json!({"status": "approved"}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = app
        .put(
            &format!("/api/v1/admin/packages/{}", package_id),
            Some(ADMIN_TOKEN),
            json!({"price": 500.0}),
        )
        .await;
    assert_eq!(status, 200);

    let referral = app.get_doc(Referral::COLLECTION, &referral_id).await;
    assert_eq!(referral["commission_amount"], 30.0);
    assert_eq!(referral["status"], "approved");
}

#[tokio::test]
async fn test_own_referrals_listing() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({})).await;
    app.seed_referral(&affiliate_id, json!({})).await;
    app.seed_referral(&affiliate_id, json!({"status": "pending"}))
        .await;

    let (status, body) = app
        .get("/api/v1/affiliates/me/referrals", Some(AFFILIATE_TOKEN))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 2);
}
