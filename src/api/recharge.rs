//! Recharge requests and UTR submission.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::guards::AuthUser;
use crate::core::recharge;
use crate::errors::Result;

#[derive(Deserialize)]
struct RechargeRequest {
    #[serde(default)]
    amount: f64,
}

#[derive(Deserialize)]
struct UtrRequest {
    #[serde(default)]
    utr: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(request))
        .route("/update-utr/{id}", post(update_utr))
}

async fn request(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<RechargeRequest>,
) -> Result<Json<Value>> {
    let created = recharge::request_recharge(&state.db, claims.sub, req.amount).await?;

    Ok(Json(json!({
        "message": "Recharge request created successfully",
        "recharge": created,
    })))
}

async fn update_utr(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(recharge_id): Path<i64>,
    Json(req): Json<UtrRequest>,
) -> Result<Json<Value>> {
    let updated = recharge::attach_utr(&state.db, claims.sub, recharge_id, &req.utr).await?;

    Ok(Json(json!({
        "message": "UTR submitted successfully. Admin will verify it shortly.",
        "recharge": updated,
    })))
}
