//! Read-only option lists consumed by the checkout form and the admin UI.

use crate::server::AppState;
use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use shop_types::CatalogOptionsResponse;

/// Handles GET /api/health.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
	Json(json!({
		"status": "ok",
		"shop": state.engine.config().shop.id,
	}))
}

/// Handles GET /api/catalog/options.
///
/// Lists every status and payment method together with the subset offered at
/// checkout, and the fields each delivery type requires.
pub async fn options() -> Json<CatalogOptionsResponse> {
	Json(CatalogOptionsResponse::current())
}
