// Public package catalog endpoint.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    app::AppState,
    models::{HostingPackage, Stored},
    store::SortSpec,
    utils::ServiceError,
};

/// List active hosting packages
/// GET /api/v1/packages
#[utoipa::path(
    get,
    path = "/v1/packages",
    tag = "Packages",
    operation_id = "listPackages",
    responses(
        (status = 200, description = "Active packages, in display order")
    )
)]
pub async fn list_packages(State(state): State<AppState>) -> impl IntoResponse {
    let docs = match state
        .store
        .filter(
            HostingPackage::COLLECTION,
            json!({ "is_active": true }),
            Some(SortSpec::asc("sort_order")),
            None,
        )
        .await
    {
        Ok(docs) => docs,
        Err(e) => return ServiceError::from(e).into_response(),
    };

    match Stored::<HostingPackage>::from_documents(&docs) {
        Ok(packages) => Json(packages).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}
