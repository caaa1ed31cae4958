//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::auth::JwtAuth;
use crate::entities::{Purchase, product, purchase, user};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory SQLite database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A token handle with a fixed test secret.
pub fn test_jwt() -> JwtAuth {
    JwtAuth::new(b"test-secret")
}

/// Inserts a user directly with the given balances, sidestepping
/// registration (and its hashing cost) for tests that only need an account
/// to move money through.
pub async fn create_funded_user(
    db: &DatabaseConnection,
    username: &str,
    phone_number: &str,
    recharge_balance: f64,
    balance: f64,
) -> Result<user::Model> {
    let now = Utc::now();
    user::ActiveModel {
        name: Set(format!("{username} (test)")),
        username: Set(username.to_string()),
        phone_number: Set(phone_number.to_string()),
        password_hash: Set("test-hash".to_string()),
        referral_code: Set(format!("{}-TEST", username.to_uppercase())),
        referred_by: Set(None),
        balance: Set(balance),
        recharge_balance: Set(recharge_balance),
        total_invested: Set(0.0),
        total_withdrawn: Set(0.0),
        is_active: Set(true),
        is_admin: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Re-reads a user row, failing the test if it vanished.
pub async fn reload_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    crate::core::account::find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found".to_string(),
        })
}

/// Creates a plan with a consistent return profile for the given terms.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    daily_income: f64,
    duration: i32,
) -> Result<product::Model> {
    let total_return = daily_income * f64::from(duration);
    product::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        daily_income: Set(daily_income),
        duration: Set(duration),
        total_return: Set(total_return),
        profit: Set(total_return - price),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts a purchase row with explicit dates and status, for scheduler
/// tests that need windows the purchase operation would never produce.
pub async fn insert_purchase(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    daily_income: f64,
    purchase_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: &str,
) -> Result<purchase::Model> {
    purchase::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        daily_income: Set(daily_income),
        purchase_date: Set(purchase_date),
        end_date: Set(end_date),
        status: Set(status.to_string()),
        created_at: Set(purchase_date),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Overwrites a purchase's status directly.
pub async fn set_purchase_status(
    db: &DatabaseConnection,
    purchase_id: i64,
    status: &str,
) -> Result<()> {
    let found = Purchase::find_by_id(purchase_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "Purchase not found".to_string(),
        })?;

    let mut active: purchase::ActiveModel = found.into();
    active.status = Set(status.to_string());
    active.update(db).await?;
    Ok(())
}
