//! Recharge business logic - topping up the non-withdrawable funding pool.
//!
//! The flow is three-step: the user opens a pending request, attaches the
//! UTR of their external payment, and an admin resolves the request by UTR
//! lookup. Only approval moves money; a resolved request is immutable.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::core::{TX_RECHARGE, credit_recharge_balance, record_transaction};
use crate::entities::{Recharge, recharge};
use crate::errors::{Error, Result};

/// Awaiting UTR submission and admin review
pub const RECHARGE_PENDING: &str = "pending";
/// Approved; the amount was credited to the recharge balance
pub const RECHARGE_COMPLETED: &str = "completed";
/// Rejected; no credit happened
pub const RECHARGE_FAILED: &str = "failed";

/// Admin resolution of a recharge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyAction {
    Approve,
    Reject,
}

impl VerifyAction {
    /// Parses the boundary vocabulary.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Whether a stored status counts as resolved. Legacy rows written with the
/// "approved"/"rejected" vocabulary are treated as resolved rather than
/// silently re-processable.
fn is_resolved(status: &str) -> bool {
    matches!(status, "completed" | "failed" | "approved" | "rejected")
}

/// Opens a pending recharge request. No UTR is attached yet.
pub async fn request_recharge(
    db: &DatabaseConnection,
    user_id: i64,
    amount: f64,
) -> Result<recharge::Model> {
    if !(amount > 0.0) || !amount.is_finite() {
        return Err(Error::Validation {
            message: "Amount is required and must be greater than 0".to_string(),
        });
    }

    recharge::ActiveModel {
        user_id: Set(user_id),
        amount: Set(amount),
        status: Set(RECHARGE_PENDING.to_string()),
        utr: Set(None),
        created_at: Set(Utc::now()),
        processed_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Attaches the external payment reference to the caller's own request.
///
/// The status does not change here; that is the admin's job.
pub async fn attach_utr(
    db: &DatabaseConnection,
    user_id: i64,
    recharge_id: i64,
    utr: &str,
) -> Result<recharge::Model> {
    if utr.trim().is_empty() {
        return Err(Error::Validation {
            message: "UTR is required".to_string(),
        });
    }

    let found = Recharge::find_by_id(recharge_id)
        .filter(recharge::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "Recharge request not found or does not belong to user".to_string(),
        })?;

    if is_resolved(&found.status) {
        return Err(Error::Conflict {
            message: "This recharge has already been processed".to_string(),
        });
    }

    let mut active: recharge::ActiveModel = found.into();
    active.utr = Set(Some(utr.trim().to_string()));
    active.update(db).await.map_err(Into::into)
}

/// Resolves a recharge request by UTR lookup, admin-only.
///
/// Approval credits the user's recharge balance and writes the ledger entry;
/// rejection marks the request failed with no balance change. Either way the
/// request becomes immutable.
pub async fn verify_utr(
    db: &DatabaseConnection,
    utr: &str,
    action: &str,
) -> Result<recharge::Model> {
    if utr.trim().is_empty() {
        return Err(Error::Validation {
            message: "UTR number is required".to_string(),
        });
    }

    let action = VerifyAction::parse(action).ok_or_else(|| Error::Validation {
        message: "Action must be approve or reject".to_string(),
    })?;

    let found = Recharge::find()
        .filter(recharge::Column::Utr.eq(utr.trim()))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: format!(
                "Recharge with UTR {utr} not found or UTR number not submitted by user"
            ),
        })?;

    if is_resolved(&found.status) {
        return Err(Error::Conflict {
            message: "This recharge has already been processed".to_string(),
        });
    }

    let txn = db.begin().await?;

    let new_status = match action {
        VerifyAction::Approve => {
            credit_recharge_balance(&txn, found.user_id, found.amount).await?;
            record_transaction(
                &txn,
                found.user_id,
                TX_RECHARGE,
                found.amount,
                format!("Recharge via UTR: {}", utr.trim()),
                utr.trim().to_string(),
            )
            .await?;
            RECHARGE_COMPLETED
        }
        VerifyAction::Reject => RECHARGE_FAILED,
    };

    let mut active: recharge::ActiveModel = found.into();
    active.status = Set(new_status.to_string());
    active.processed_at = Set(Some(Utc::now()));
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::purchase::purchase_product;
    use crate::entities::{Transaction, transaction};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_request_recharge_validates_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;

        assert!(request_recharge(&db, requester.id, 0.0).await.is_err());
        assert!(request_recharge(&db, requester.id, -5.0).await.is_err());

        let created = request_recharge(&db, requester.id, 1000.0).await?;
        assert_eq!(created.status, RECHARGE_PENDING);
        assert!(created.utr.is_none());
        assert!(created.processed_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_attach_utr_checks_ownership() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;
        let stranger = create_funded_user(&db, "bob", "9000000002", 0.0, 0.0).await?;

        let created = request_recharge(&db, owner.id, 1000.0).await?;

        let err = attach_utr(&db, owner.id, created.id, "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "UTR is required");

        let err = attach_utr(&db, stranger.id, created.id, "UTR001")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let updated = attach_utr(&db, owner.id, created.id, "UTR001").await?;
        assert_eq!(updated.utr.as_deref(), Some("UTR001"));
        assert_eq!(updated.status, RECHARGE_PENDING);

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_utr_approve_credits_once() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;
        let created = request_recharge(&db, owner.id, 1000.0).await?;
        attach_utr(&db, owner.id, created.id, "UTR001").await?;

        let err = verify_utr(&db, "UTR001", "confirm").await.unwrap_err();
        assert_eq!(err.to_string(), "Action must be approve or reject");

        let err = verify_utr(&db, "MISSING", "approve").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let resolved = verify_utr(&db, "UTR001", "approve").await?;
        assert_eq!(resolved.status, RECHARGE_COMPLETED);
        assert!(resolved.processed_at.is_some());

        let updated = reload_user(&db, owner.id).await?;
        assert_eq!(updated.recharge_balance, 1000.0);
        assert_eq!(updated.balance, 0.0);

        let entries = Transaction::find()
            .filter(transaction::Column::UserId.eq(owner.id))
            .all(&db)
            .await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tx_type, TX_RECHARGE);
        assert_eq!(entries[0].reference_id, "UTR001");

        // Already processed: no second credit
        let err = verify_utr(&db, "UTR001", "approve").await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(reload_user(&db, owner.id).await?.recharge_balance, 1000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_utr_reject_moves_no_money() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;
        let created = request_recharge(&db, owner.id, 500.0).await?;
        attach_utr(&db, owner.id, created.id, "UTR002").await?;

        let resolved = verify_utr(&db, "UTR002", "reject").await?;
        assert_eq!(resolved.status, RECHARGE_FAILED);

        let updated = reload_user(&db, owner.id).await?;
        assert_eq!(updated.recharge_balance, 0.0);

        // Rejection is terminal too: the UTR cannot be re-used to approve
        let err = verify_utr(&db, "UTR002", "approve").await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        // A resolved request also refuses a new UTR
        let err = attach_utr(&db, owner.id, created.id, "UTR003")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_recharge_approval_unlocks_purchase() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_product(&db, "Starter Plan", 490.0, 80.0, 9).await?;
        let buyer = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;

        // No funds yet: the purchase is refused
        let err = purchase_product(&db, buyer.id, plan.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Insufficient recharge balance");

        // Recharge 1000 via UTR "X1", approved by an admin
        let created = request_recharge(&db, buyer.id, 1000.0).await?;
        attach_utr(&db, buyer.id, created.id, "X1").await?;
        verify_utr(&db, "X1", "approve").await?;
        assert_eq!(reload_user(&db, buyer.id).await?.recharge_balance, 1000.0);

        // The same purchase now goes through
        let bought = purchase_product(&db, buyer.id, plan.id).await?;
        let updated = reload_user(&db, buyer.id).await?;
        assert_eq!(updated.recharge_balance, 510.0);
        assert_eq!(updated.total_invested, 490.0);

        let investment = Transaction::find()
            .filter(transaction::Column::UserId.eq(buyer.id))
            .filter(transaction::Column::TxType.eq(crate::core::TX_INVESTMENT))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(investment.amount, 490.0);
        assert_eq!(investment.reference_id, bought.id.to_string());

        Ok(())
    }
}
