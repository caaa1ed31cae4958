//! Accrual business logic - daily profit and the admin rebate.
//!
//! The daily run walks every active purchase and credits one day of income,
//! using the transaction ledger itself as the deduplication key: a purchase
//! that already has a `daily_income` entry dated today is skipped, so running
//! the job twice in one day is a no-op the second time.
//!
//! The rebate deliberately has no such guard. It pays one day of income and
//! shortens the schedule by one day on every call, as a manual fast-forward
//! tool; rate-limiting it is the operator's responsibility.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::core::purchase::{PURCHASE_ACTIVE, PURCHASE_COMPLETED};
use crate::core::{TX_DAILY_INCOME, TX_INVESTMENT_REBATE, credit_profit_balance,
    record_transaction};
use crate::entities::{Purchase, Transaction, purchase, transaction};
use crate::errors::Result;
use sea_orm::TransactionTrait;

/// Purchases loaded per page when walking the book.
const ACCRUAL_PAGE_SIZE: u64 = 256;

/// Outcome of one daily accrual run.
#[derive(Debug, Clone)]
pub struct AccrualRunResult {
    /// Purchases credited in this run
    pub processed_count: usize,
    /// Calendar date the run was keyed on
    pub run_date: NaiveDate,
}

/// Outcome of one rebate pass.
#[derive(Debug, Clone)]
pub struct RebateRunResult {
    /// Purchases paid out (one per owning user per purchase)
    pub users_affected: usize,
    /// Sum of all amounts credited
    pub total_amount_added: f64,
}

/// Returns the [start, end) UTC window of the calendar day containing `at`.
fn day_window(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Credits one day of income to every active purchase, at most once per
/// calendar day per purchase.
///
/// Neither `status` nor `end_date` is touched here; schedule changes belong
/// exclusively to [`process_investment_rebate`].
pub async fn process_daily_profit(db: &DatabaseConnection) -> Result<AccrualRunResult> {
    let now = Utc::now();
    let (day_start, day_end) = day_window(now);

    let mut processed_count = 0;
    let mut pages = Purchase::find()
        .filter(purchase::Column::Status.eq(PURCHASE_ACTIVE))
        .paginate(db, ACCRUAL_PAGE_SIZE);

    while let Some(batch) = pages.fetch_and_next().await? {
        for investment in batch {
            if now < investment.purchase_date || now > investment.end_date {
                continue;
            }

            let already_credited = Transaction::find()
                .filter(transaction::Column::ReferenceId.eq(investment.id.to_string()))
                .filter(transaction::Column::TxType.eq(TX_DAILY_INCOME))
                .filter(transaction::Column::CreatedAt.gte(day_start))
                .filter(transaction::Column::CreatedAt.lt(day_end))
                .one(db)
                .await?;
            if already_credited.is_some() {
                continue;
            }

            let txn = db.begin().await?;
            credit_profit_balance(&txn, investment.user_id, investment.daily_income).await?;
            record_transaction(
                &txn,
                investment.user_id,
                TX_DAILY_INCOME,
                investment.daily_income,
                format!("Daily income from plan {} investment", investment.product_id),
                investment.id.to_string(),
            )
            .await?;
            txn.commit().await?;

            processed_count += 1;
        }
    }

    Ok(AccrualRunResult {
        processed_count,
        run_date: now.date_naive(),
    })
}

/// Pays one day of income to every active, unexpired purchase and shortens
/// its end date by one day, completing it when the schedule runs out.
///
/// Repeated calls repeatedly pay out; there is intentionally no
/// double-payout protection here.
pub async fn process_investment_rebate(db: &DatabaseConnection) -> Result<RebateRunResult> {
    let now = Utc::now();

    let mut users_affected = 0;
    let mut total_amount_added = 0.0;

    let mut pages = Purchase::find()
        .filter(purchase::Column::Status.eq(PURCHASE_ACTIVE))
        .filter(purchase::Column::EndDate.gt(now))
        .paginate(db, ACCRUAL_PAGE_SIZE);

    while let Some(batch) = pages.fetch_and_next().await? {
        for investment in batch {
            let amount = investment.daily_income;
            let new_end_date = investment.end_date - Duration::days(1);

            let txn = db.begin().await?;
            credit_profit_balance(&txn, investment.user_id, amount).await?;
            record_transaction(
                &txn,
                investment.user_id,
                TX_INVESTMENT_REBATE,
                amount,
                format!(
                    "Investment rebate: Daily profit added for plan {}",
                    investment.product_id
                ),
                investment.id.to_string(),
            )
            .await?;

            let mut active: purchase::ActiveModel = investment.into();
            active.end_date = Set(new_end_date);
            if new_end_date <= now {
                active.status = Set(PURCHASE_COMPLETED.to_string());
            }
            active.update(&txn).await?;
            txn.commit().await?;

            users_affected += 1;
            total_amount_added += amount;
        }
    }

    Ok(RebateRunResult {
        users_affected,
        total_amount_added,
    })
}
