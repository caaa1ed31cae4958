//! Withdrawal requests.

use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};

use super::AppState;
use super::guards::AuthUser;
use crate::core::withdrawal::{self, WithdrawalInput};
use crate::errors::Result;

pub fn router() -> Router<AppState> {
    Router::new().route("/request", post(request))
}

async fn request(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(input): Json<WithdrawalInput>,
) -> Result<Json<Value>> {
    let created = withdrawal::request_withdrawal(&state.db, claims.sub, &input).await?;

    Ok(Json(json!({
        "message": "Withdrawal request submitted successfully",
        "withdrawal": created,
    })))
}
