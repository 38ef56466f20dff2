use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use settee_cart::{CartLine, GroupView, OptionPicker};
use settee_catalog::{product_from_value, Selection};
use settee_shared::Money;
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Product record as delivered by the storefront API
    pub product: serde_json::Value,
    /// Group name -> choice label, applied over the defaults
    #[serde(default)]
    pub selections: BTreeMap<String, String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub title: String,
    pub total_cents: Money,
    pub total: String,
    pub formatted_total: String,
    pub selection: Selection,
    pub groups: Vec<GroupView>,
    pub cart_line: CartLine,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/quotes", post(create_quote))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /v1/quotes
/// Price a configuration and build the cart line for it
pub async fn create_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let product = product_from_value(req.product, state.pricing.config())?;

    let mut picker = OptionPicker::new(&product, &state.pricing);
    for (group, label) in &req.selections {
        picker.choose(group, label)?;
    }
    picker.selection().validate(&product.catalog)?;
    picker.set_quantity(req.quantity);

    let cart_line = picker.cart_line(&state.cart)?;
    let total = picker.total()?;
    tracing::info!(
        "Quoted {} at {} (quantity {})",
        product.title,
        total,
        cart_line.quantity
    );

    Ok(Json(QuoteResponse {
        title: product.title.clone(),
        total_cents: total,
        total: total.to_plain_string(),
        formatted_total: total.format_currency(),
        selection: picker.selection().clone(),
        groups: picker.groups(),
        cart_line,
    }))
}
