//! Registration and login endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use crate::core::account::{self, RegisterInput};
use crate::errors::Result;

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    phone_number: String,
    #[serde(default)]
    password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<Value>> {
    let created = account::register(&state.db, &input).await?;

    Ok(Json(json!({
        "message": "User registered successfully",
        "user": created,
    })))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let (token, logged_in) =
        account::login(&state.db, &state.jwt, &req.phone_number, &req.password).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": logged_in,
    })))
}
