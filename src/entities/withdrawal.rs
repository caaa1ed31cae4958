//! Withdrawal entity - A user's request to cash out profit balance.
//!
//! Requests are created pending and carry the payout destination (bank
//! account or UPI handle). The balance is only debited when an admin
//! approves the request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    /// Unique identifier for the withdrawal request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting user
    pub user_id: i64,
    /// Amount to pay out on approval
    pub amount: f64,
    /// `"bank"` or `"upi"`
    pub method: String,
    /// Bank name, for bank transfers
    pub bank_name: Option<String>,
    /// IFSC routing code, for bank transfers
    pub ifsc_code: Option<String>,
    /// Account number, for bank transfers
    pub account_number: Option<String>,
    /// Account holder name, for bank transfers
    pub account_holder_name: Option<String>,
    /// UPI handle, for UPI payouts
    pub upi_id: Option<String>,
    /// `"pending"`, `"approved"`, or `"rejected"`
    pub status: String,
    /// When the request was created
    pub created_at: DateTimeUtc,
    /// When an admin resolved the request
    pub processed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Withdrawal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each withdrawal belongs to one user
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
