//! Catalog browsing, plan purchase, and the daily profit trigger.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::guards::AuthUser;
use crate::core::{accrual, catalog, purchase};
use crate::errors::{Error, Result};

#[derive(Deserialize)]
struct PurchaseRequest {
    #[serde(default)]
    product_id: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/purchase", post(buy))
        .route("/daily-profit", post(daily_profit))
}

async fn list(State(state): State<AppState>, AuthUser(_): AuthUser) -> Result<Json<Value>> {
    let plans = catalog::list_products(&state.db).await?;
    Ok(Json(json!(plans)))
}

async fn buy(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<Value>> {
    let bought = purchase::purchase_product(&state.db, claims.sub, req.product_id).await?;

    Ok(Json(json!({
        "message": "Product purchased successfully",
        "product": bought,
    })))
}

/// The accrual scheduler entry point; meant to be hit once per day by a cron
/// job holding admin credentials.
async fn daily_profit(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Value>> {
    if !claims.is_admin {
        return Err(Error::Forbidden {
            message: "Only admin can run this operation".to_string(),
        });
    }

    let run = accrual::process_daily_profit(&state.db).await?;

    Ok(Json(json!({
        "message": format!("Processed daily profit for {} investments", run.processed_count),
    })))
}
