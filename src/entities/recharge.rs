//! Recharge entity - A user's request to top up their recharge balance.
//!
//! Created pending with no UTR; the user attaches a UTR after paying, and an
//! admin resolves the request to completed (credits the balance) or failed.
//! Once resolved the record is immutable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recharge request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recharges")]
pub struct Model {
    /// Unique identifier for the recharge request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting user
    pub user_id: i64,
    /// Amount to credit on approval
    pub amount: f64,
    /// `"pending"`, `"completed"`, or `"failed"`
    pub status: String,
    /// External payment reference (UTR) attached by the user after payment
    pub utr: Option<String>,
    /// When the request was created
    pub created_at: DateTimeUtc,
    /// When an admin resolved the request
    pub processed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Recharge and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recharge belongs to one user
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
