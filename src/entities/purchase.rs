//! Purchase entity - One user's subscription to an investment plan.
//!
//! `daily_income` is snapshotted from the plan at purchase time and never
//! re-read from the catalog. `end_date` is computed once at creation; only
//! the rebate operation may shorten it afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Plan this purchase was made against; the value outlives plan deletion
    pub product_id: i64,
    /// Daily income snapshotted from the plan at purchase time
    pub daily_income: f64,
    /// When the purchase was made
    pub purchase_date: DateTimeUtc,
    /// `purchase_date + duration` days; shortened only by the rebate operation
    pub end_date: DateTimeUtc,
    /// `"active"` or `"completed"`
    pub status: String,
    /// Record creation timestamp
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Purchase and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchase belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each purchase references one plan
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
