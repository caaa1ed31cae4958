//! Product entity - A purchasable investment plan in the catalog.
//!
//! Plans are read-mostly: users buy them, admins manage them. Deletion is
//! blocked while any active purchase still references the plan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Investment plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable plan name (e.g., "Starter Plan")
    pub name: String,
    /// Purchase price, debited from the buyer's recharge balance
    pub price: f64,
    /// Profit credited per day while the purchase is active
    pub daily_income: f64,
    /// Plan length in days
    pub duration: i32,
    /// Total payout over the full duration
    pub total_return: f64,
    /// Informational: expected `total_return - price`
    pub profit: f64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One plan has many purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
