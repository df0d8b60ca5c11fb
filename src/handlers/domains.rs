// Domain registration endpoint: registrar lookup, registration, local
// record, then the flat-commission path through the engine.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    app::AppState,
    auth::CurrentUser,
    models::{
        Affiliate, Domain, DomainStatus, PayoutRecipient, RegisterDomainRequest, SaleChannel,
        Stored,
    },
    services::commission::SaleEvent,
    utils::ServiceError,
};

/// Register a domain for a customer
/// POST /api/v1/domains/register
#[utoipa::path(
    post,
    path = "/v1/domains/register",
    tag = "Domains",
    operation_id = "registerDomain",
    request_body = RegisterDomainRequest,
    responses(
        (status = 200, description = "Domain registered and commission recorded"),
        (status = 400, description = "Validation failed or domain unavailable"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Registrar failure")
    ),
    security(("bearerAuth" = []))
)]
pub async fn register_domain(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<RegisterDomainRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    // Availability check first: an unavailable domain aborts with zero
    // writes anywhere.
    match state
        .domain_registrar
        .check_availability(&request.domain_name)
        .await
    {
        Ok(true) => {},
        Ok(false) => {
            return ServiceError::validation(format!(
                "Domain {} is not available",
                request.domain_name
            ))
            .into_response()
        },
        Err(e) => return e.into_response(),
    }

    let registrant_email = request
        .customer_email
        .clone()
        .unwrap_or_else(|| user.email.clone());

    let registrar_order_id = match state
        .domain_registrar
        .register(&request.domain_name, request.years, &registrant_email)
        .await
    {
        Ok(order_id) => order_id,
        Err(e) => return e.into_response(),
    };

    // The registration already happened upstream; everything from here on
    // is local bookkeeping and is not compensated on failure.
    let affiliate_ref = match resolve_affiliate_ref(&state, request.referral_code.as_deref()).await
    {
        Ok(reference) => reference,
        Err(e) => return e.into_response(),
    };

    let domain = Domain {
        affiliate_id: affiliate_ref,
        domain_name: request.domain_name.clone(),
        years: request.years,
        status: DomainStatus::Registered,
        registrar_order_id: registrar_order_id.clone(),
    };

    let domain_fields = match serde_json::to_value(&domain) {
        Ok(fields) => fields,
        Err(e) => return ServiceError::from(e).into_response(),
    };
    let domain_doc = match state.store.create(Domain::COLLECTION, domain_fields).await {
        Ok(doc) => doc,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    let event = SaleEvent {
        referral_code: request.referral_code.clone(),
        channel: SaleChannel::DomainRegistration,
        customer_email: registrant_email,
        customer_name: request.customer_name.clone(),
        package_id: None,
        package_name: Some(format!("Domain: {}", request.domain_name)),
        sale_amount: state.config.opensrs.domain_price,
        is_recurring: false,
        billing_cycle: None,
    };

    let sale = match state.commission_engine.attribute_sale(event).await {
        Ok(sale) => sale,
        Err(e) => return e.into_response(),
    };

    info!(domain = %request.domain_name, order_id = %registrar_order_id, "Domain registration complete");

    let stored_domain = match Stored::<Domain>::from_document(&domain_doc) {
        Ok(stored) => stored,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    Json(json!({
        "domain": stored_domain,
        "referral": sale.referral,
        "payout_recipient": sale.payout_recipient.as_str(),
        "commission_amount": sale.commission_amount,
    }))
    .into_response()
}

/// Resolve a referral code to the domain record's affiliate reference.
async fn resolve_affiliate_ref(
    state: &AppState,
    referral_code: Option<&str>,
) -> Result<PayoutRecipient, ServiceError> {
    let Some(code) = referral_code.filter(|c| !c.is_empty()) else {
        return Ok(PayoutRecipient::House);
    };

    let docs = state
        .store
        .filter(
            Affiliate::COLLECTION,
            json!({ "referral_code": code }),
            None,
            Some(1),
        )
        .await?;

    Ok(docs
        .first()
        .map(|doc| PayoutRecipient::Affiliate(doc.id.clone()))
        .unwrap_or(PayoutRecipient::House))
}
