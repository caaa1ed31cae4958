//! Catalog business logic - management of the purchasable plan list.
//!
//! Reads are open to any authenticated caller; create/update/delete are
//! admin console operations. Deleting a plan is refused while any active
//! purchase still references it, so running subscriptions never lose their
//! metadata.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::core::purchase::PURCHASE_ACTIVE;
use crate::entities::{Product, Purchase, product, purchase};
use crate::errors::{Error, Result};

/// Payload for creating a plan; every field is required. Defaults let a
/// missing field surface as a validation message instead of a
/// deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub daily_income: f64,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub total_return: f64,
    #[serde(default)]
    pub profit: f64,
}

/// Partial plan patch; only the supplied fields are touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub daily_income: Option<f64>,
    pub duration: Option<i32>,
    pub total_return: Option<f64>,
    pub profit: Option<f64>,
}

/// Retrieves the full plan catalog, ordered by id.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific plan by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_amount(value: f64) -> Result<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(Error::InvalidAmount { amount: value });
    }
    Ok(())
}

/// Creates a new plan, performing input validation.
pub async fn create_product(
    db: &DatabaseConnection,
    input: &ProductInput,
) -> Result<product::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "All product fields are required".to_string(),
        });
    }
    validate_amount(input.price)?;
    validate_amount(input.daily_income)?;
    validate_amount(input.total_return)?;
    if input.duration <= 0 {
        return Err(Error::Validation {
            message: "Duration must be at least one day".to_string(),
        });
    }

    product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        price: Set(input.price),
        daily_income: Set(input.daily_income),
        duration: Set(input.duration),
        total_return: Set(input.total_return),
        profit: Set(input.profit),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Patches an existing plan with the supplied fields.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    update: &ProductUpdate,
) -> Result<product::Model> {
    let found = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "Product not found".to_string(),
        })?;

    let mut active: product::ActiveModel = found.into();

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Product name cannot be empty".to_string(),
            });
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = update.price {
        validate_amount(price)?;
        active.price = Set(price);
    }
    if let Some(daily_income) = update.daily_income {
        validate_amount(daily_income)?;
        active.daily_income = Set(daily_income);
    }
    if let Some(duration) = update.duration {
        if duration <= 0 {
            return Err(Error::Validation {
                message: "Duration must be at least one day".to_string(),
            });
        }
        active.duration = Set(duration);
    }
    if let Some(total_return) = update.total_return {
        validate_amount(total_return)?;
        active.total_return = Set(total_return);
    }
    if let Some(profit) = update.profit {
        active.profit = Set(profit);
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a plan, unless active purchases still reference it.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let found = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "Product not found".to_string(),
        })?;

    let active_purchases = Purchase::find()
        .filter(purchase::Column::ProductId.eq(product_id))
        .filter(purchase::Column::Status.eq(PURCHASE_ACTIVE))
        .count(db)
        .await?;

    if active_purchases > 0 {
        return Err(Error::Conflict {
            message:
                "Cannot delete product with active investments. Please wait for all investments to complete."
                    .to_string(),
        });
    }

    let deleted = found.clone();
    found.delete(db).await?;
    Ok(deleted)
}
