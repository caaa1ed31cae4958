//! The strict referral-claim endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::guards::AuthUser;
use crate::core::account;
use crate::errors::Result;

#[derive(Deserialize)]
struct VerifyReferralRequest {
    #[serde(default)]
    referral_code: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/verify-referral", post(verify_referral))
}

async fn verify_referral(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<VerifyReferralRequest>,
) -> Result<Json<Value>> {
    let referrer = account::claim_referral(&state.db, claims.sub, &req.referral_code).await?;

    Ok(Json(json!({
        "message": "Referral code applied successfully",
        "referrer": {
            "id": referrer.id,
            "name": referrer.name,
            "username": referrer.username,
        },
    })))
}
