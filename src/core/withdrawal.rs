//! Withdrawal business logic - cashing out the profit balance.
//!
//! Requests only park the payout details; no money moves until an admin
//! approves, at which point the profit balance is debited atomically. The
//! recharge balance is never withdrawable. One non-rejected request per user
//! per rolling 24 hours.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;

use crate::core::{TX_WITHDRAWAL, account, debit_profit_for_withdrawal, record_transaction};
use crate::entities::{Withdrawal, withdrawal};
use crate::errors::{Error, Result};

/// Awaiting admin resolution
pub const WITHDRAWAL_PENDING: &str = "pending";
/// Paid out; the profit balance was debited
pub const WITHDRAWAL_APPROVED: &str = "approved";
/// Declined; no balance change, and does not count against the 24-hour rule
pub const WITHDRAWAL_REJECTED: &str = "rejected";

/// Smallest amount a user may withdraw.
pub const MIN_WITHDRAWAL_AMOUNT: f64 = 100.0;

/// Withdrawal request payload with its method-specific destination fields.
/// `amount` and `method` default to empty values so that missing input is
/// reported by the guards below, not as a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalInput {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub method: String,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_number: Option<String>,
    pub account_holder_name: Option<String>,
    pub upi_id: Option<String>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Opens a pending withdrawal request for the calling user.
///
/// Guards, in order: positive amount, known method with its destination
/// fields present, the 100-minimum, a profit balance covering the amount,
/// and no other non-rejected request within the last 24 hours.
pub async fn request_withdrawal(
    db: &DatabaseConnection,
    user_id: i64,
    input: &WithdrawalInput,
) -> Result<withdrawal::Model> {
    if !(input.amount > 0.0) || !input.amount.is_finite() {
        return Err(Error::Validation {
            message: "Amount is required and must be greater than 0".to_string(),
        });
    }

    match input.method.as_str() {
        "bank" => {
            if is_blank(input.bank_name.as_deref())
                || is_blank(input.ifsc_code.as_deref())
                || is_blank(input.account_number.as_deref())
                || is_blank(input.account_holder_name.as_deref())
            {
                return Err(Error::Validation {
                    message: "Bank details are required for bank withdrawal".to_string(),
                });
            }
        }
        "upi" => {
            if is_blank(input.upi_id.as_deref()) {
                return Err(Error::Validation {
                    message: "UPI ID is required for UPI withdrawal".to_string(),
                });
            }
        }
        _ => {
            return Err(Error::Validation {
                message: "Method must be either \"bank\" or \"upi\"".to_string(),
            });
        }
    }

    if input.amount < MIN_WITHDRAWAL_AMOUNT {
        return Err(Error::Conflict {
            message: "Minimum withdrawal amount is ₹100".to_string(),
        });
    }

    let requester = account::find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found".to_string(),
        })?;

    if requester.balance < input.amount {
        return Err(Error::InsufficientFunds {
            message: "Insufficient profit balance. You can only withdraw profits from investments."
                .to_string(),
        });
    }

    let cutoff = Utc::now() - Duration::hours(24);
    let recent = Withdrawal::find()
        .filter(withdrawal::Column::UserId.eq(user_id))
        .filter(withdrawal::Column::CreatedAt.gte(cutoff))
        .filter(withdrawal::Column::Status.ne(WITHDRAWAL_REJECTED))
        .one(db)
        .await?;

    if recent.is_some() {
        return Err(Error::Conflict {
            message: "You can only make one withdrawal every 24 hours".to_string(),
        });
    }

    let is_bank = input.method == "bank";
    withdrawal::ActiveModel {
        user_id: Set(user_id),
        amount: Set(input.amount),
        method: Set(input.method.clone()),
        bank_name: Set(input.bank_name.clone().filter(|_| is_bank)),
        ifsc_code: Set(input.ifsc_code.clone().filter(|_| is_bank)),
        account_number: Set(input.account_number.clone().filter(|_| is_bank)),
        account_holder_name: Set(input.account_holder_name.clone().filter(|_| is_bank)),
        upi_id: Set(input.upi_id.clone().filter(|_| !is_bank)),
        status: Set(WITHDRAWAL_PENDING.to_string()),
        created_at: Set(Utc::now()),
        processed_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Resolves a withdrawal request, admin-only.
///
/// `approved` debits the profit balance (guarded, so a balance that no
/// longer covers the amount refuses the approval), credits the lifetime
/// withdrawn total, and writes the ledger entry. `rejected` frees the user
/// to request again immediately. A terminal request cannot be re-resolved.
pub async fn resolve_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: i64,
    status: &str,
) -> Result<withdrawal::Model> {
    if !matches!(
        status,
        WITHDRAWAL_APPROVED | WITHDRAWAL_REJECTED | WITHDRAWAL_PENDING
    ) {
        return Err(Error::Validation {
            message: "Status must be approved, rejected, or pending".to_string(),
        });
    }

    let found = Withdrawal::find_by_id(withdrawal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: format!("Withdrawal with ID {withdrawal_id} not found"),
        })?;

    if matches!(found.status.as_str(), "approved" | "rejected") {
        return Err(Error::Conflict {
            message: "This withdrawal has already been processed".to_string(),
        });
    }

    let txn = db.begin().await?;

    if status == WITHDRAWAL_APPROVED {
        if !debit_profit_for_withdrawal(&txn, found.user_id, found.amount).await? {
            return Err(Error::InsufficientFunds {
                message: "Insufficient profit balance".to_string(),
            });
        }

        let destination = if found.method == "bank" {
            found.bank_name.clone().unwrap_or_default()
        } else {
            found.upi_id.clone().unwrap_or_default()
        };
        record_transaction(
            &txn,
            found.user_id,
            TX_WITHDRAWAL,
            found.amount,
            format!("Withdrawal via {}: {}", found.method, destination),
            found.id.to_string(),
        )
        .await?;
    }

    let mut active: withdrawal::ActiveModel = found.into();
    active.status = Set(status.to_string());
    if status != WITHDRAWAL_PENDING {
        active.processed_at = Set(Some(Utc::now()));
    }
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::TX_WITHDRAWAL;
    use crate::entities::{Transaction, transaction};
    use crate::test_utils::*;

    fn upi_request(amount: f64) -> WithdrawalInput {
        WithdrawalInput {
            amount,
            method: "upi".to_string(),
            bank_name: None,
            ifsc_code: None,
            account_number: None,
            account_holder_name: None,
            upi_id: Some("alice@upi".to_string()),
        }
    }

    fn bank_request(amount: f64) -> WithdrawalInput {
        WithdrawalInput {
            amount,
            method: "bank".to_string(),
            bank_name: Some("State Bank".to_string()),
            ifsc_code: Some("SBIN0000001".to_string()),
            account_number: Some("12345678".to_string()),
            account_holder_name: Some("Alice".to_string()),
            upi_id: None,
        }
    }

    #[tokio::test]
    async fn test_request_method_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 0.0, 500.0).await?;

        let mut input = upi_request(150.0);
        input.method = "cash".to_string();
        let err = request_withdrawal(&db, requester.id, &input).await.unwrap_err();
        assert_eq!(err.to_string(), "Method must be either \"bank\" or \"upi\"");

        let mut input = bank_request(150.0);
        input.ifsc_code = None;
        let err = request_withdrawal(&db, requester.id, &input).await.unwrap_err();
        assert_eq!(err.to_string(), "Bank details are required for bank withdrawal");

        let mut input = upi_request(150.0);
        input.upi_id = None;
        let err = request_withdrawal(&db, requester.id, &input).await.unwrap_err();
        assert_eq!(err.to_string(), "UPI ID is required for UPI withdrawal");

        let err = request_withdrawal(&db, requester.id, &upi_request(0.0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount is required and must be greater than 0");

        Ok(())
    }

    #[tokio::test]
    async fn test_request_guard_sequence() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;

        // Below the minimum, reported before any balance concern
        let err = request_withdrawal(&db, requester.id, &upi_request(50.0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Minimum withdrawal amount is ₹100");

        // Above the minimum but the profit balance is empty
        let err = request_withdrawal(&db, requester.id, &upi_request(150.0))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient profit balance. You can only withdraw profits from investments."
        );

        // Admin credit brings the balance up; the request now goes through
        crate::core::account::adjust_balance(&db, &requester.id.to_string(), 200.0, "top up")
            .await?;
        let created = request_withdrawal(&db, requester.id, &upi_request(150.0)).await?;
        assert_eq!(created.status, WITHDRAWAL_PENDING);
        // The balance is untouched until approval
        assert_eq!(reload_user(&db, requester.id).await?.balance, 200.0);

        // A second request inside 24 hours is refused
        let err = request_withdrawal(&db, requester.id, &upi_request(150.0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You can only make one withdrawal every 24 hours");

        Ok(())
    }

    #[tokio::test]
    async fn test_recharge_balance_is_not_withdrawable() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 5000.0, 0.0).await?;

        let err = request_withdrawal(&db, requester.id, &upi_request(150.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_request_frees_the_window() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 0.0, 500.0).await?;

        let first = request_withdrawal(&db, requester.id, &upi_request(150.0)).await?;
        resolve_withdrawal(&db, first.id, WITHDRAWAL_REJECTED).await?;

        // Rejection left the balance alone and does not count against 24h
        assert_eq!(reload_user(&db, requester.id).await?.balance, 500.0);
        let second = request_withdrawal(&db, requester.id, &upi_request(150.0)).await?;
        assert_eq!(second.status, WITHDRAWAL_PENDING);

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_approval_moves_money_once() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 0.0, 500.0).await?;
        let created = request_withdrawal(&db, requester.id, &bank_request(150.0)).await?;

        let err = resolve_withdrawal(&db, created.id, "done").await.unwrap_err();
        assert_eq!(err.to_string(), "Status must be approved, rejected, or pending");

        let err = resolve_withdrawal(&db, 999, WITHDRAWAL_APPROVED).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let resolved = resolve_withdrawal(&db, created.id, WITHDRAWAL_APPROVED).await?;
        assert_eq!(resolved.status, WITHDRAWAL_APPROVED);
        assert!(resolved.processed_at.is_some());

        let updated = reload_user(&db, requester.id).await?;
        assert_eq!(updated.balance, 350.0);
        assert_eq!(updated.total_withdrawn, 150.0);

        let entry = Transaction::find()
            .filter(transaction::Column::UserId.eq(requester.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(entry.tx_type, TX_WITHDRAWAL);
        assert_eq!(entry.amount, 150.0);
        assert_eq!(entry.description, "Withdrawal via bank: State Bank");
        assert_eq!(entry.reference_id, created.id.to_string());

        // Terminal: cannot be resolved twice
        let err = resolve_withdrawal(&db, created.id, WITHDRAWAL_APPROVED)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(reload_user(&db, requester.id).await?.balance, 350.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_approval_refused_when_balance_dropped() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 0.0, 150.0).await?;
        let created = request_withdrawal(&db, requester.id, &upi_request(150.0)).await?;

        // Balance drained between request and approval
        crate::core::account::update_user(
            &db,
            requester.id,
            &crate::core::account::UserUpdate {
                balance: Some(0.0),
                ..Default::default()
            },
        )
        .await?;

        let err = resolve_withdrawal(&db, created.id, WITHDRAWAL_APPROVED)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));

        // The request stays pending and no ledger entry was written
        let unchanged = crate::entities::Withdrawal::find_by_id(created.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(unchanged.status, WITHDRAWAL_PENDING);
        assert_eq!(
            Transaction::find()
                .filter(transaction::Column::UserId.eq(requester.id))
                .all(&db)
                .await?
                .len(),
            0
        );

        Ok(())
    }
}
