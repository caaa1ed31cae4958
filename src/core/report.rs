//! Reporting business logic - read-side views for users and the admin console.
//!
//! Everything here is a query shaped for display: the merged per-user
//! activity feed, the operator dashboard counters, and the admin listings
//! with owner details joined in. Nothing in this module moves money.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder};
use serde::Serialize;

use crate::core::purchase::PURCHASE_ACTIVE;
use crate::core::recharge::RECHARGE_PENDING;
use crate::core::withdrawal::WITHDRAWAL_PENDING;
use crate::entities::{
    Product, Purchase, Recharge, Transaction, User, Withdrawal, purchase, recharge, transaction,
    user, withdrawal,
};
use crate::errors::Result;

/// Operator dashboard counters.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Registered accounts
    #[serde(rename = "totalUsers")]
    pub total_users: u64,
    /// Active purchases that have not yet reached their end date
    #[serde(rename = "activeProducts")]
    pub active_products: u64,
    /// Sum of all approved recharge amounts
    #[serde(rename = "totalRecharges")]
    pub total_recharges: f64,
    /// Withdrawal requests awaiting resolution
    #[serde(rename = "pendingWithdrawals")]
    pub pending_withdrawals: u64,
}

/// One row of a user's merged activity feed: a ledger transaction or a
/// synthetic entry for a still-pending request.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub amount: f64,
    pub status: String,
    pub description: String,
    pub created_at: chrono::DateTime<Utc>,
}

/// A purchase enriched with its plan's display name.
#[derive(Debug, Clone, Serialize)]
pub struct UserPurchaseView {
    #[serde(flatten)]
    pub purchase: purchase::Model,
    pub product_name: String,
}

/// A withdrawal enriched with its owner's contact details.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalView {
    #[serde(flatten)]
    pub withdrawal: withdrawal::Model,
    pub user_phone: String,
    pub user_username: String,
}

/// A recharge enriched with its owner's contact details.
#[derive(Debug, Clone, Serialize)]
pub struct RechargeView {
    #[serde(flatten)]
    pub recharge: recharge::Model,
    pub user_phone: String,
    pub user_username: String,
}

/// One referred user joined to their referrer.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralView {
    pub id: i64,
    pub user_name: String,
    pub user_username: String,
    pub referrer_id: Option<i64>,
    pub referral_date: chrono::DateTime<Utc>,
}

/// Computes the operator dashboard counters.
pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats> {
    let now = Utc::now();

    let total_users = User::find().count(db).await?;

    let active_products = Purchase::find()
        .filter(purchase::Column::Status.eq(PURCHASE_ACTIVE))
        .filter(purchase::Column::EndDate.gte(now))
        .count(db)
        .await?;

    // Legacy rows may carry the "approved" vocabulary; both mean credited
    let total_recharges = Recharge::find()
        .filter(recharge::Column::Status.is_in(["approved", "completed"]))
        .all(db)
        .await?
        .iter()
        .map(|r| r.amount)
        .sum();

    let pending_withdrawals = Withdrawal::find()
        .filter(withdrawal::Column::Status.eq(WITHDRAWAL_PENDING))
        .count(db)
        .await?;

    Ok(DashboardStats {
        total_users,
        active_products,
        total_recharges,
        pending_withdrawals,
    })
}

/// Builds a user's merged activity feed, newest first: every ledger
/// transaction plus synthetic entries for pending withdrawals and recharges.
pub async fn user_transaction_feed(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<FeedEntry>> {
    let mut feed: Vec<FeedEntry> = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| FeedEntry {
            id: t.id,
            user_id: t.user_id,
            entry_type: t.tx_type,
            amount: t.amount,
            status: t.status,
            description: t.description,
            created_at: t.created_at,
        })
        .collect();

    let pending_withdrawals = Withdrawal::find()
        .filter(withdrawal::Column::UserId.eq(user_id))
        .filter(withdrawal::Column::Status.eq(WITHDRAWAL_PENDING))
        .all(db)
        .await?;
    feed.extend(pending_withdrawals.into_iter().map(|w| FeedEntry {
        id: w.id,
        user_id: w.user_id,
        entry_type: "withdrawal_pending".to_string(),
        amount: w.amount,
        status: WITHDRAWAL_PENDING.to_string(),
        description: format!("Pending withdrawal request via {}", w.method),
        created_at: w.created_at,
    }));

    let pending_recharges = Recharge::find()
        .filter(recharge::Column::UserId.eq(user_id))
        .filter(recharge::Column::Status.eq(RECHARGE_PENDING))
        .all(db)
        .await?;
    feed.extend(pending_recharges.into_iter().map(|r| FeedEntry {
        id: r.id,
        user_id: r.user_id,
        entry_type: "recharge_pending".to_string(),
        amount: r.amount,
        status: RECHARGE_PENDING.to_string(),
        description: "Pending recharge request".to_string(),
        created_at: r.created_at,
    }));

    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(feed)
}

/// Lists a user's purchases with their plan names, newest first. A plan that
/// was deleted after purchase falls back to a generic name.
pub async fn user_products_view(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<UserPurchaseView>> {
    let purchases = Purchase::find()
        .filter(purchase::Column::UserId.eq(user_id))
        .order_by_desc(purchase::Column::PurchaseDate)
        .all(db)
        .await?;

    let plan_names: HashMap<i64, String> = Product::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    Ok(purchases
        .into_iter()
        .map(|bought| {
            let product_name = plan_names
                .get(&bought.product_id)
                .cloned()
                .unwrap_or_else(|| format!("Plan {}", bought.product_id));
            UserPurchaseView {
                purchase: bought,
                product_name,
            }
        })
        .collect())
}

async fn user_directory(db: &DatabaseConnection) -> Result<HashMap<i64, user::Model>> {
    Ok(User::find()
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

/// Lists every user account (credential fields are never serialized).
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the full transaction ledger, newest first.
pub async fn list_transactions(db: &DatabaseConnection) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .order_by_desc(transaction::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every withdrawal with the owner's contact details joined in.
pub async fn list_withdrawals(db: &DatabaseConnection) -> Result<Vec<WithdrawalView>> {
    let directory = user_directory(db).await?;

    Ok(Withdrawal::find()
        .order_by_desc(withdrawal::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(|w| {
            let owner = directory.get(&w.user_id);
            WithdrawalView {
                user_phone: owner.map_or_else(|| "Unknown".to_string(), |u| u.phone_number.clone()),
                user_username: owner.map_or_else(|| "Unknown".to_string(), |u| u.username.clone()),
                withdrawal: w,
            }
        })
        .collect())
}

/// Lists every recharge with the owner's contact details joined in.
pub async fn list_recharges(db: &DatabaseConnection) -> Result<Vec<RechargeView>> {
    let directory = user_directory(db).await?;

    Ok(Recharge::find()
        .order_by_desc(recharge::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(|r| {
            let owner = directory.get(&r.user_id);
            RechargeView {
                user_phone: owner.map_or_else(|| "Unknown".to_string(), |u| u.phone_number.clone()),
                user_username: owner.map_or_else(|| "Unknown".to_string(), |u| u.username.clone()),
                recharge: r,
            }
        })
        .collect())
}

/// Lists every referred user joined to their referrer.
pub async fn list_referrals(db: &DatabaseConnection) -> Result<Vec<ReferralView>> {
    let directory = user_directory(db).await?;

    Ok(User::find()
        .filter(user::Column::ReferredBy.is_not_null())
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|referred| ReferralView {
            id: referred.id,
            user_name: referred.name.clone(),
            user_username: referred.username.clone(),
            referrer_id: referred
                .referred_by
                .and_then(|id| directory.get(&id).map(|r| r.id)),
            referral_date: referred.created_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::Duration;
    use crate::core::account::{RegisterInput, claim_referral, register};
    use crate::core::purchase::purchase_product;
    use crate::core::recharge::{attach_utr, request_recharge, verify_utr};
    use crate::core::withdrawal::{WithdrawalInput, request_withdrawal};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_dashboard_stats() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_product(&db, "Starter Plan", 490.0, 80.0, 9).await?;
        let buyer = create_funded_user(&db, "alice", "9000000001", 1000.0, 500.0).await?;
        create_funded_user(&db, "bob", "9000000002", 0.0, 0.0).await?;

        purchase_product(&db, buyer.id, plan.id).await?;

        let opened = request_recharge(&db, buyer.id, 300.0).await?;
        attach_utr(&db, buyer.id, opened.id, "UTR-STATS").await?;
        verify_utr(&db, "UTR-STATS", "approve").await?;
        request_recharge(&db, buyer.id, 50.0).await?;

        request_withdrawal(
            &db,
            buyer.id,
            &WithdrawalInput {
                amount: 150.0,
                method: "upi".to_string(),
                bank_name: None,
                ifsc_code: None,
                account_number: None,
                account_holder_name: None,
                upi_id: Some("alice@upi".to_string()),
            },
        )
        .await?;

        let stats = dashboard_stats(&db).await?;
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.active_products, 1);
        assert_eq!(stats.total_recharges, 300.0);
        assert_eq!(stats.pending_withdrawals, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_user_feed_merges_pending_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_product(&db, "Starter Plan", 490.0, 80.0, 9).await?;
        let owner = create_funded_user(&db, "alice", "9000000001", 1000.0, 500.0).await?;
        let other = create_funded_user(&db, "bob", "9000000002", 0.0, 0.0).await?;

        purchase_product(&db, owner.id, plan.id).await?;
        request_recharge(&db, owner.id, 300.0).await?;
        request_withdrawal(
            &db,
            owner.id,
            &WithdrawalInput {
                amount: 150.0,
                method: "upi".to_string(),
                bank_name: None,
                ifsc_code: None,
                account_number: None,
                account_holder_name: None,
                upi_id: Some("alice@upi".to_string()),
            },
        )
        .await?;
        request_recharge(&db, other.id, 99.0).await?;

        let feed = user_transaction_feed(&db, owner.id).await?;
        assert_eq!(feed.len(), 3);

        let types: Vec<&str> = feed.iter().map(|e| e.entry_type.as_str()).collect();
        assert!(types.contains(&"investment"));
        assert!(types.contains(&"withdrawal_pending"));
        assert!(types.contains(&"recharge_pending"));
        // Other users' activity never leaks in
        assert!(feed.iter().all(|e| e.user_id == owner.id));
        // Newest first
        assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        Ok(())
    }

    #[tokio::test]
    async fn test_user_products_view_falls_back_on_deleted_plan() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_product(&db, "Starter Plan", 490.0, 80.0, 9).await?;
        let owner = create_funded_user(&db, "alice", "9000000001", 0.0, 0.0).await?;

        let now = Utc::now();
        insert_purchase(
            &db,
            owner.id,
            plan.id,
            80.0,
            now - Duration::days(1),
            now + Duration::days(8),
            PURCHASE_ACTIVE,
        )
        .await?;
        insert_purchase(
            &db,
            owner.id,
            999,
            50.0,
            now - Duration::days(2),
            now + Duration::days(5),
            PURCHASE_ACTIVE,
        )
        .await?;

        let views = user_products_view(&db, owner.id).await?;
        assert_eq!(views.len(), 2);

        let named: Vec<&str> = views.iter().map(|v| v.product_name.as_str()).collect();
        assert!(named.contains(&"Starter Plan"));
        assert!(named.contains(&"Plan 999"));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_listings_join_owner_details() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_funded_user(&db, "alice", "9000000001", 0.0, 500.0).await?;

        request_recharge(&db, owner.id, 300.0).await?;
        request_withdrawal(
            &db,
            owner.id,
            &WithdrawalInput {
                amount: 150.0,
                method: "upi".to_string(),
                bank_name: None,
                ifsc_code: None,
                account_number: None,
                account_holder_name: None,
                upi_id: Some("alice@upi".to_string()),
            },
        )
        .await?;

        let withdrawals = list_withdrawals(&db).await?;
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(withdrawals[0].user_phone, "9000000001");
        assert_eq!(withdrawals[0].user_username, "alice");

        let recharges = list_recharges(&db).await?;
        assert_eq!(recharges.len(), 1);
        assert_eq!(recharges[0].user_username, "alice");

        Ok(())
    }

    #[tokio::test]
    async fn test_referral_listing() -> Result<()> {
        let db = setup_test_db().await?;
        let referrer = register(
            &db,
            &RegisterInput {
                name: "Alice".to_string(),
                username: "alice".to_string(),
                phone_number: "9000000001".to_string(),
                password: "secret123".to_string(),
                confirm_password: "secret123".to_string(),
                referral_code: None,
            },
        )
        .await?;
        let referred = register(
            &db,
            &RegisterInput {
                name: "Bob".to_string(),
                username: "bob".to_string(),
                phone_number: "9000000002".to_string(),
                password: "secret123".to_string(),
                confirm_password: "secret123".to_string(),
                referral_code: None,
            },
        )
        .await?;
        claim_referral(&db, referred.id, &referrer.referral_code).await?;

        let referrals = list_referrals(&db).await?;
        assert_eq!(referrals.len(), 1);
        assert_eq!(referrals[0].id, referred.id);
        assert_eq!(referrals[0].user_username, "bob");
        assert_eq!(referrals[0].referrer_id, Some(referrer.id));

        Ok(())
    }
}
