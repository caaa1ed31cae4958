//! Core business logic - framework-agnostic ledger operations.
//!
//! Each submodule owns one slice of the money state machine. Everything here
//! takes a database connection (or an open transaction) and returns plain
//! data; the API layer is just a thin translation on top.
//!
//! Balance mutations go through the atomic helpers below: a single
//! `UPDATE ... SET col = col ± x` statement, optionally guarded with a
//! `WHERE col >= x` filter. Zero rows affected means the guard failed and
//! nothing moved, so a check-then-debit race cannot overdraw an account even
//! with concurrent requests against the same user.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::{User, transaction, user};
use crate::errors::{Error, Result};

pub mod account;
pub mod accrual;
pub mod catalog;
pub mod purchase;
pub mod recharge;
pub mod report;
pub mod withdrawal;

/// Ledger entry type: plan purchase
pub const TX_INVESTMENT: &str = "investment";
/// Ledger entry type: daily profit accrual
pub const TX_DAILY_INCOME: &str = "daily_income";
/// Ledger entry type: approved recharge
pub const TX_RECHARGE: &str = "recharge";
/// Ledger entry type: approved withdrawal
pub const TX_WITHDRAWAL: &str = "withdrawal";
/// Ledger entry type: manual admin credit
pub const TX_ADMIN_ADJUSTMENT: &str = "admin_adjustment";
/// Ledger entry type: rebate payout
pub const TX_INVESTMENT_REBATE: &str = "investment_rebate";

/// Appends one immutable row to the transaction ledger.
pub(crate) async fn record_transaction<C>(
    conn: &C,
    user_id: i64,
    tx_type: &str,
    amount: f64,
    description: String,
    reference_id: String,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    transaction::ActiveModel {
        user_id: Set(user_id),
        tx_type: Set(tx_type.to_string()),
        amount: Set(amount),
        status: Set("completed".to_string()),
        description: Set(description),
        reference_id: Set(reference_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

/// Atomically credits the user's withdrawable profit balance.
pub(crate) async fn credit_profit_balance<C>(conn: &C, user_id: i64, amount: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let res = User::update_many()
        .col_expr(
            user::Column::Balance,
            Expr::col(user::Column::Balance).add(amount),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        return Err(Error::NotFound {
            message: "User not found".to_string(),
        });
    }
    Ok(())
}

/// Atomically credits the user's recharge balance.
pub(crate) async fn credit_recharge_balance<C>(conn: &C, user_id: i64, amount: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let res = User::update_many()
        .col_expr(
            user::Column::RechargeBalance,
            Expr::col(user::Column::RechargeBalance).add(amount),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        return Err(Error::NotFound {
            message: "User not found".to_string(),
        });
    }
    Ok(())
}

/// Atomically moves `price` from the recharge balance into the lifetime
/// invested total, guarded on the balance covering the price.
///
/// Returns `false` (and leaves the row untouched) when it does not.
pub(crate) async fn debit_recharge_for_purchase<C>(
    conn: &C,
    user_id: i64,
    price: f64,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let res = User::update_many()
        .col_expr(
            user::Column::RechargeBalance,
            Expr::col(user::Column::RechargeBalance).sub(price),
        )
        .col_expr(
            user::Column::TotalInvested,
            Expr::col(user::Column::TotalInvested).add(price),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::RechargeBalance.gte(price))
        .exec(conn)
        .await?;

    Ok(res.rows_affected == 1)
}

/// Atomically debits the profit balance and credits the lifetime withdrawn
/// total, guarded on the balance covering the amount.
///
/// Returns `false` (and leaves the row untouched) when it does not.
pub(crate) async fn debit_profit_for_withdrawal<C>(
    conn: &C,
    user_id: i64,
    amount: f64,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let res = User::update_many()
        .col_expr(
            user::Column::Balance,
            Expr::col(user::Column::Balance).sub(amount),
        )
        .col_expr(
            user::Column::TotalWithdrawn,
            Expr::col(user::Column::TotalWithdrawn).add(amount),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::Balance.gte(amount))
        .exec(conn)
        .await?;

    Ok(res.rows_affected == 1)
}
