//! Admin console endpoints: dashboard, listings, and privileged mutations.
//!
//! Every route here requires a token whose claims carry the admin flag.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::guards::AdminUser;
use crate::core::account::{self, UserUpdate};
use crate::core::catalog::{self, ProductInput, ProductUpdate};
use crate::core::{accrual, recharge, report, withdrawal};
use crate::errors::Result;

#[derive(Deserialize)]
struct BalanceAdjustment {
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    reason: String,
}

#[derive(Deserialize)]
struct VerifyUtrRequest {
    #[serde(default)]
    utr: String,
    #[serde(default)]
    action: String,
}

#[derive(Deserialize)]
struct WithdrawalResolution {
    #[serde(default)]
    status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/users", get(users))
        .route("/transactions", get(transactions))
        .route("/withdrawals", get(withdrawals))
        .route("/recharges", get(recharges))
        .route("/referrals", get(referrals))
        .route("/user/{user_id}/balance", post(adjust_balance))
        .route("/user/{user_id}", put(update_user))
        .route("/verify-utr", post(verify_utr))
        .route("/withdrawal/{withdrawal_id}", put(resolve_withdrawal))
        .route("/process-investment-rebate", post(process_rebate))
        .route("/products", get(products).post(create_product))
        .route(
            "/products/{product_id}",
            put(update_product).delete(delete_product),
        )
}

async fn dashboard_stats(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let stats = report::dashboard_stats(&state.db).await?;
    Ok(Json(json!(stats)))
}

async fn users(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let accounts = report::list_users(&state.db).await?;
    Ok(Json(json!(accounts)))
}

async fn transactions(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let ledger = report::list_transactions(&state.db).await?;
    Ok(Json(json!(ledger)))
}

async fn withdrawals(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let rows = report::list_withdrawals(&state.db).await?;
    Ok(Json(json!(rows)))
}

async fn recharges(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let rows = report::list_recharges(&state.db).await?;
    Ok(Json(json!(rows)))
}

async fn referrals(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let rows = report::list_referrals(&state.db).await?;
    Ok(Json(json!(rows)))
}

async fn adjust_balance(
    State(state): State<AppState>,
    _: AdminUser,
    Path(user_key): Path<String>,
    Json(req): Json<BalanceAdjustment>,
) -> Result<Json<Value>> {
    let (updated, entry) =
        account::adjust_balance(&state.db, &user_key, req.amount, &req.reason).await?;

    Ok(Json(json!({
        "message": "Balance updated successfully",
        "user": updated,
        "transaction": entry,
    })))
}

async fn update_user(
    State(state): State<AppState>,
    _: AdminUser,
    Path(user_id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<Value>> {
    let updated = account::update_user(&state.db, user_id, &update).await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": updated,
    })))
}

async fn verify_utr(
    State(state): State<AppState>,
    _: AdminUser,
    Json(req): Json<VerifyUtrRequest>,
) -> Result<Json<Value>> {
    let resolved = recharge::verify_utr(&state.db, &req.utr, &req.action).await?;

    let outcome = if resolved.status == recharge::RECHARGE_COMPLETED {
        "approved"
    } else {
        "rejected"
    };
    Ok(Json(json!({
        "message": format!("Recharge {outcome} successfully"),
    })))
}

async fn resolve_withdrawal(
    State(state): State<AppState>,
    _: AdminUser,
    Path(withdrawal_id): Path<i64>,
    Json(req): Json<WithdrawalResolution>,
) -> Result<Json<Value>> {
    let resolved = withdrawal::resolve_withdrawal(&state.db, withdrawal_id, &req.status).await?;

    Ok(Json(json!({
        "message": "Withdrawal updated successfully",
        "withdrawal": resolved,
    })))
}

async fn process_rebate(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let run = accrual::process_investment_rebate(&state.db).await?;

    Ok(Json(json!({
        "message": "Investment rebate applied successfully",
        "usersAffected": run.users_affected,
        "totalAmountAdded": run.total_amount_added,
    })))
}

async fn products(State(state): State<AppState>, _: AdminUser) -> Result<Json<Value>> {
    let plans = catalog::list_products(&state.db).await?;
    Ok(Json(json!(plans)))
}

async fn create_product(
    State(state): State<AppState>,
    _: AdminUser,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Value>)> {
    let created = catalog::create_product(&state.db, &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product": created,
        })),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    _: AdminUser,
    Path(product_id): Path<i64>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Value>> {
    let updated = catalog::update_product(&state.db, product_id, &update).await?;

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": updated,
    })))
}

async fn delete_product(
    State(state): State<AppState>,
    _: AdminUser,
    Path(product_id): Path<i64>,
) -> Result<Json<Value>> {
    let deleted = catalog::delete_product(&state.db, product_id).await?;

    Ok(Json(json!({
        "message": "Product deleted successfully",
        "product": deleted,
    })))
}
