//! First-run seeding: default plan catalog and bootstrap admin account.
//!
//! Both operations are no-ops on an already-populated database, so startup
//! can call them unconditionally.

use crate::auth;
use crate::config::catalog::{self, ProductConfig};
use crate::entities::{Product, User, product, user};
use crate::errors::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use tracing::{info, warn};

/// The stock plan catalog used when no config.toml overrides it.
fn default_catalog() -> Vec<ProductConfig> {
    let plans = [
        ("Starter Plan", 490.0, 80.0, 9, 720.0, 230.0),
        ("Smart Saver", 750.0, 85.0, 14, 1190.0, 440.0),
        ("Bronze Booster", 1000.0, 100.0, 15, 1500.0, 500.0),
        ("Silver Growth", 1500.0, 115.0, 20, 2300.0, 800.0),
        ("Gold Income", 2000.0, 135.0, 23, 3105.0, 1105.0),
        ("Platinum Plan", 2500.0, 160.0, 24, 3840.0, 1340.0),
        ("Elite Earning", 3000.0, 180.0, 25, 4500.0, 1500.0),
        ("VIP Profiter", 3500.0, 200.0, 27, 5400.0, 1900.0),
        ("Executive Growth", 4000.0, 220.0, 28, 6160.0, 2160.0),
        ("Royal Investor", 5000.0, 250.0, 30, 7500.0, 2500.0),
    ];

    plans
        .into_iter()
        .map(
            |(name, price, daily_income, duration, total_return, profit)| ProductConfig {
                name: name.to_string(),
                price,
                daily_income,
                duration,
                total_return,
                profit,
            },
        )
        .collect()
}

/// Seeds the plan catalog when the products table is empty.
///
/// A `config.toml` next to the binary takes precedence over the built-in
/// list. Returns the number of plans inserted.
pub async fn seed_initial_products(db: &DatabaseConnection) -> Result<usize> {
    let existing = Product::find().count(db).await?;
    if existing > 0 {
        return Ok(0);
    }

    let plans = match catalog::load_default_config() {
        Ok(config) => {
            info!("Seeding plan catalog from config.toml");
            config.products
        }
        Err(_) => default_catalog(),
    };

    for plan in &plans {
        product::ActiveModel {
            name: Set(plan.name.clone()),
            price: Set(plan.price),
            daily_income: Set(plan.daily_income),
            duration: Set(plan.duration),
            total_return: Set(plan.total_return),
            profit: Set(plan.profit),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(plans.len())
}

/// Creates the bootstrap admin account when no admin exists yet.
///
/// The password comes from `ADMIN_PASSWORD`; the fallback is only acceptable
/// for local development and is flagged at startup. Returns whether an
/// account was created.
pub async fn seed_admin_user(db: &DatabaseConnection) -> Result<bool> {
    let existing = User::find()
        .filter(user::Column::IsAdmin.eq(true))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        warn!("ADMIN_PASSWORD is not set; seeding admin with the default password");
        "admin123".to_string()
    });

    let now = Utc::now();
    user::ActiveModel {
        name: Set("Admin User".to_string()),
        username: Set("admin".to_string()),
        phone_number: Set("9999999999".to_string()),
        password_hash: Set(auth::hash_password(&password)?),
        referral_code: Set("ADMIN001".to_string()),
        referred_by: Set(None),
        balance: Set(0.0),
        recharge_balance: Set(0.0),
        total_invested: Set(0.0),
        total_withdrawn: Set(0.0),
        is_active: Set(true),
        is_admin: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(true)
}
