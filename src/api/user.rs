//! Authenticated self-service reads: profile, holdings, activity feed.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use super::AppState;
use super::guards::AuthUser;
use crate::core::{account, report};
use crate::errors::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/products", get(my_products))
        .route("/transactions", get(my_transactions))
}

async fn profile(State(state): State<AppState>, AuthUser(claims): AuthUser) -> Result<Json<Value>> {
    let me = account::find_user_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found".to_string(),
        })?;

    Ok(Json(json!(me)))
}

async fn my_products(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Value>> {
    let holdings = report::user_products_view(&state.db, claims.sub).await?;
    Ok(Json(json!(holdings)))
}

async fn my_transactions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Value>> {
    let feed = report::user_transaction_feed(&state.db, claims.sub).await?;
    Ok(Json(json!(feed)))
}
