// Domain registration flow: registrar availability gate, local records,
// and the flat 50% commission on the $10 domain price.

mod common;

use common::{TestApp, AFFILIATE_TOKEN};
use hostly_backend_core::models::{Affiliate, Domain, Referral};
use hostly_backend_core::store::EntityStore;
use serde_json::json;

#[tokio::test]
async fn test_successful_registration_creates_domain_and_referral() {
    let app = TestApp::spawn();
    app.seed_affiliate(json!({"referral_code": "CODEAAAA"})).await;

    let (status, body) = app
        .post(
            "/api/v1/domains/register",
            Some(AFFILIATE_TOKEN),
            json!({
                "domain_name": "example-shop.com",
                "years": 2,
                "referral_code": "CODEAAAA",
                "customer_email": "buyer@example.com",
            }),
        )
        .await;
    assert_eq!(status, 200, "registration failed: {}", body);

    assert_eq!(body["commission_amount"], 5.0);
    assert_eq!(body["domain"]["domain_name"], "example-shop.com");
    assert_eq!(body["domain"]["years"], 2);
    assert_eq!(body["domain"]["status"], "registered");
    assert_eq!(body["domain"]["registrar_order_id"], "osrs-order-42");

    assert_eq!(app.count(Domain::COLLECTION, json!({})).await, 1);
    assert_eq!(app.count(Referral::COLLECTION, json!({})).await, 1);

    let referrals = app
        .store
        .filter(Referral::COLLECTION, json!({}), None, None)
        .await
        .unwrap();
    assert_eq!(referrals[0].fields["commission_amount"], 5.0);
    assert_eq!(referrals[0].fields["sale_amount"], 10.0);
    assert_eq!(referrals[0].fields["referral_source"], "domain_registration");
    assert_eq!(referrals[0].fields["is_recurring"], false);
}

#[tokio::test]
async fn test_unavailable_domain_creates_nothing() {
    let app = TestApp::spawn();
    app.registrar.set_available(false);

    let (status, body) = app
        .post(
            "/api/v1/domains/register",
            Some(AFFILIATE_TOKEN),
            json!({"domain_name": "taken.com"}),
        )
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("not available"));

    assert_eq!(app.count(Domain::COLLECTION, json!({})).await, 0);
    assert_eq!(app.count(Referral::COLLECTION, json!({})).await, 0);
}

#[tokio::test]
async fn test_direct_credit_posts_domain_commission_immediately() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({"referral_code": "CODEBBBB"})).await;
    // Two prior approved referrals: the next sale pays the affiliate.
    app.seed_referral(&affiliate_id, json!({"status": "approved"}))
        .await;
    app.seed_referral(&affiliate_id, json!({"status": "approved"}))
        .await;

    let (status, body) = app
        .post(
            "/api/v1/domains/register",
            Some(AFFILIATE_TOKEN),
            json!({
                "domain_name": "direct-credit.com",
                "referral_code": "CODEBBBB",
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["payout_recipient"], affiliate_id);

    // Domain commissions post to the balance right away.
    let affiliate = app.get_doc(Affiliate::COLLECTION, &affiliate_id).await;
    assert_eq!(affiliate["pending_balance"], 5.0);
    assert_eq!(affiliate["total_earnings"], 5.0);
}

#[tokio::test]
async fn test_house_credited_domain_sale_posts_no_cash() {
    let app = TestApp::spawn();
    let affiliate_id = app.seed_affiliate(json!({"referral_code": "CODECCCC"})).await;

    let (status, body) = app
        .post(
            "/api/v1/domains/register",
            Some(AFFILIATE_TOKEN),
            json!({
                "domain_name": "house-sale.com",
                "referral_code": "CODECCCC",
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["payout_recipient"], "admin");

    let affiliate = app.get_doc(Affiliate::COLLECTION, &affiliate_id).await;
    assert_eq!(affiliate["pending_balance"], 0.0);
    assert_eq!(affiliate["total_earnings"], 0.0);
}

#[tokio::test]
async fn test_invalid_domain_name_is_rejected() {
    let app = TestApp::spawn();
    let (status, _) = app
        .post(
            "/api/v1/domains/register",
            Some(AFFILIATE_TOKEN),
            json!({"domain_name": "not a domain"}),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_registration_requires_authentication() {
    let app = TestApp::spawn();
    let (status, _) = app
        .post(
            "/api/v1/domains/register",
            None,
            json!({"domain_name": "example.com"}),
        )
        .await;
    assert_eq!(status, 401);
}
