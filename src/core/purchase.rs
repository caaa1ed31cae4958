//! Purchase business logic - buying an investment plan.
//!
//! A purchase is funded exclusively from the buyer's recharge balance, never
//! from withdrawable profit. The whole operation (guarded debit, purchase
//! row, ledger entry) runs in one database transaction, so a failure at any
//! step leaves no partial money movement behind.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::core::{TX_INVESTMENT, account, catalog, debit_recharge_for_purchase,
    record_transaction};
use crate::entities::{Purchase, purchase};
use crate::errors::{Error, Result};

/// Purchase still accruing daily income
pub const PURCHASE_ACTIVE: &str = "active";
/// Purchase past its end date
pub const PURCHASE_COMPLETED: &str = "completed";

/// Returns the [start, end) UTC window of the calendar month containing `at`.
fn month_window(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let month_start = at
        .date_naive()
        .with_day(1)
        .expect("day one is always a valid date");
    let next_month_start = month_start + Months::new(1);

    (
        month_start.and_time(NaiveTime::MIN).and_utc(),
        next_month_start.and_time(NaiveTime::MIN).and_utc(),
    )
}

/// Buys a plan for the given user.
///
/// Guards, in order: the plan and user must exist, the recharge balance must
/// cover the price, and the user must not already hold a purchase of this
/// plan made in the current calendar month. On success the recharge balance
/// is debited, the lifetime invested total credited, and an active purchase
/// plus its ledger entry are written - all atomically.
pub async fn purchase_product(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
) -> Result<purchase::Model> {
    let plan = catalog::get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "Product not found".to_string(),
        })?;

    let buyer = account::find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found".to_string(),
        })?;

    if buyer.recharge_balance < plan.price {
        return Err(Error::InsufficientFunds {
            message: "Insufficient recharge balance".to_string(),
        });
    }

    let now = Utc::now();
    let (month_start, next_month_start) = month_window(now);

    let existing = Purchase::find()
        .filter(purchase::Column::UserId.eq(user_id))
        .filter(purchase::Column::ProductId.eq(product_id))
        .filter(purchase::Column::PurchaseDate.gte(month_start))
        .filter(purchase::Column::PurchaseDate.lt(next_month_start))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(Error::Conflict {
            message: "You can only buy this product once per month".to_string(),
        });
    }

    let txn = db.begin().await?;

    // The guarded debit re-checks the balance atomically, so a concurrent
    // purchase that passed the read above cannot overdraw the account.
    if !debit_recharge_for_purchase(&txn, user_id, plan.price).await? {
        return Err(Error::InsufficientFunds {
            message: "Insufficient recharge balance".to_string(),
        });
    }

    let end_date = now + Duration::days(i64::from(plan.duration));
    let created = purchase::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        daily_income: Set(plan.daily_income),
        purchase_date: Set(now),
        end_date: Set(end_date),
        status: Set(PURCHASE_ACTIVE.to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    record_transaction(
        &txn,
        user_id,
        TX_INVESTMENT,
        plan.price,
        format!("Purchased {} investment plan", plan.name),
        created.id.to_string(),
    )
    .await?;

    txn.commit().await?;

    Ok(created)
}
