//! Transaction entity - The append-only money ledger.
//!
//! Every balance movement writes exactly one row here. Rows are never
//! mutated or deleted; the accrual scheduler also uses them as its
//! once-per-day deduplication key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User whose balance moved
    pub user_id: i64,
    /// One of `"investment"`, `"daily_income"`, `"recharge"`, `"withdrawal"`,
    /// `"admin_adjustment"`, `"investment_rebate"`
    pub tx_type: String,
    /// Amount moved
    pub amount: f64,
    /// Always `"completed"`; pending states live on Recharge/Withdrawal
    pub status: String,
    /// Human-readable description
    pub description: String,
    /// Link back to the purchase id, recharge UTR, withdrawal id, or an
    /// admin-adjustment marker
    pub reference_id: String,
    /// When the ledger entry was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
