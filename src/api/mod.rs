//! HTTP surface - axum routers over the core operations.
//!
//! Handlers are thin: decode the request, call into [`crate::core`], shape
//! the response. All authentication is carried by the extractors in
//! [`guards`]; error mapping lives on [`crate::errors::Error`] itself.

use std::sync::Arc;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::auth::JwtAuth;

mod admin;
mod auth;
mod guards;
mod products;
mod recharge;
mod referral;
mod user;
mod withdrawals;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The database pool
    pub db: DatabaseConnection,
    /// Token issuance/verification handle
    pub jwt: Arc<JwtAuth>,
}

/// Assembles the full route tree.
pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/auth", auth::router())
        .nest("/api/user", user::router())
        .nest("/api/products", products::router())
        .nest("/api/recharge", recharge::router())
        .nest("/api/withdrawals", withdrawals::router())
        .nest("/api/referral", referral::router())
        .nest("/api/admin", admin::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
