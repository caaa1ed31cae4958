//! User entity - Represents a platform account with its two balances.
//!
//! Every user carries a withdrawable profit `balance` and a non-withdrawable
//! `recharge_balance` funding pool, along with lifetime investment totals and
//! the referral linkage. Users are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login handle, globally unique
    #[sea_orm(unique)]
    pub username: String,
    /// Phone number used for login, globally unique
    #[sea_orm(unique)]
    pub phone_number: String,
    /// Argon2 password hash; skipped on serialization so it can never leak
    /// into an API response
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// This user's own referral code, globally unique
    #[sea_orm(unique)]
    pub referral_code: String,
    /// The user who referred this one, set at most once
    pub referred_by: Option<i64>,
    /// Withdrawable profit balance (daily income, rebates, admin credits)
    pub balance: f64,
    /// Non-withdrawable funding pool, usable only to purchase plans
    pub recharge_balance: f64,
    /// Lifetime sum of plan purchase prices, monotonically non-decreasing
    pub total_invested: f64,
    /// Lifetime sum of approved withdrawal amounts, monotonically non-decreasing
    pub total_withdrawn: f64,
    /// Deactivated users cannot log in
    pub is_active: bool,
    /// Grants access to the admin console routes
    pub is_admin: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last mutated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and the other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many plan purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
    /// One user has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One user has many recharge requests
    #[sea_orm(has_many = "super::recharge::Entity")]
    Recharges,
    /// One user has many withdrawal requests
    #[sea_orm(has_many = "super::withdrawal::Entity")]
    Withdrawals,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::recharge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recharges.def()
    }
}

impl Related<super::withdrawal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
