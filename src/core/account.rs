//! Account business logic - registration, login, referrals, admin edits.
//!
//! Registration and login own all credential-adjacent validation; hashing and
//! token signing themselves live in [`crate::auth`]. The referral linkage has
//! two entry points with different strictness: registration resolves a
//! supplied code best-effort (an unknown code is silently ignored), while
//! [`claim_referral`] rejects every invalid case and sets `referred_by`
//! exactly once.

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;

use crate::auth::{self, Claims, JwtAuth};
use crate::core::{TX_ADMIN_ADJUSTMENT, credit_profit_balance, record_transaction};
use crate::entities::{User, transaction, user};
use crate::errors::{Error, Result};

/// Attempts before giving up on a free referral code.
const REFERRAL_CODE_ATTEMPTS: usize = 32;

/// Registration request payload. Fields default to empty so that missing
/// input surfaces as a validation message rather than a deserialization
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Optional referral code; resolved best-effort
    #[serde(default)]
    pub referral_code: Option<String>,
}

/// Admin patch of a user record. Only the fields present are touched; a
/// supplied password is routed through the credential hasher, never stored
/// raw.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub balance: Option<f64>,
    pub recharge_balance: Option<f64>,
    pub total_invested: Option<f64>,
    pub total_withdrawn: Option<f64>,
    pub referral_code: Option<String>,
    pub referred_by: Option<i64>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub password: Option<String>,
}

/// Finds a user by primary key.
pub async fn find_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by phone number.
pub async fn find_user_by_phone(
    db: &DatabaseConnection,
    phone_number: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::PhoneNumber.eq(phone_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by username.
pub async fn find_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by their own referral code.
pub async fn find_user_by_referral_code(
    db: &DatabaseConnection,
    referral_code: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::ReferralCode.eq(referral_code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves an admin-supplied user key as id, then phone number, then
/// username, in that order.
pub async fn find_user_flexible(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<user::Model>> {
    if let Ok(id) = key.parse::<i64>() {
        if let Some(found) = find_user_by_id(db, id).await? {
            return Ok(Some(found));
        }
    }
    if let Some(found) = find_user_by_phone(db, key).await? {
        return Ok(Some(found));
    }
    find_user_by_username(db, key).await
}

/// Generates a referral code from the username's first four characters
/// (uppercased) plus a random 4-digit suffix, retrying until the code is
/// unused.
async fn generate_referral_code(db: &DatabaseConnection, username: &str) -> Result<String> {
    let prefix: String = username
        .trim()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();

    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
        let code = format!("{prefix}{suffix}");
        if find_user_by_referral_code(db, &code).await?.is_none() {
            return Ok(code);
        }
    }

    // The 4-digit space around this prefix is saturated; widen the suffix
    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let suffix: u32 = rand::thread_rng().gen_range(10_000_000..100_000_000);
        let code = format!("{prefix}{suffix}");
        if find_user_by_referral_code(db, &code).await?.is_none() {
            return Ok(code);
        }
    }

    Err(Error::Conflict {
        message: "Unable to allocate a unique referral code".to_string(),
    })
}

/// Registers a new user.
///
/// All five credential fields are required, the password must be confirmed
/// and at least 6 characters, and phone number / username must be globally
/// unused (a phone collision is reported first when both collide). A
/// supplied referral code links `referred_by` when it resolves and is
/// silently dropped when it does not.
pub async fn register(db: &DatabaseConnection, input: &RegisterInput) -> Result<user::Model> {
    if input.name.trim().is_empty()
        || input.username.trim().is_empty()
        || input.phone_number.trim().is_empty()
        || input.password.is_empty()
        || input.confirm_password.is_empty()
    {
        return Err(Error::Validation {
            message: "All fields are required".to_string(),
        });
    }

    if input.password != input.confirm_password {
        return Err(Error::Validation {
            message: "Passwords do not match".to_string(),
        });
    }

    if input.password.len() < 6 {
        return Err(Error::Validation {
            message: "Password must be at least 6 characters long".to_string(),
        });
    }

    let existing = User::find()
        .filter(
            Condition::any()
                .add(user::Column::PhoneNumber.eq(input.phone_number.trim()))
                .add(user::Column::Username.eq(input.username.trim())),
        )
        .one(db)
        .await?;

    if let Some(existing) = existing {
        if existing.phone_number == input.phone_number.trim() {
            return Err(Error::Validation {
                message: "Phone number already registered".to_string(),
            });
        }
        return Err(Error::Validation {
            message: "Username already taken".to_string(),
        });
    }

    let referred_by = match input.referral_code.as_deref() {
        Some(code) if !code.trim().is_empty() => find_user_by_referral_code(db, code.trim())
            .await?
            .map(|referrer| referrer.id),
        _ => None,
    };

    let password_hash = auth::hash_password(&input.password)?;
    let referral_code = generate_referral_code(db, input.username.trim()).await?;

    let now = Utc::now();
    user::ActiveModel {
        name: Set(input.name.trim().to_string()),
        username: Set(input.username.trim().to_string()),
        phone_number: Set(input.phone_number.trim().to_string()),
        password_hash: Set(password_hash),
        referral_code: Set(referral_code),
        referred_by: Set(referred_by),
        balance: Set(0.0),
        recharge_balance: Set(0.0),
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

/// Logs a user in, returning a signed session token and the user record.
///
/// Absent users and wrong passwords fail with the same message so the
/// endpoint does not reveal which phone numbers are registered.
pub async fn login(
    db: &DatabaseConnection,
    jwt: &JwtAuth,
    phone_number: &str,
    password: &str,
) -> Result<(String, user::Model)> {
    if phone_number.trim().is_empty() || password.is_empty() {
        return Err(Error::Validation {
            message: "Phone number and password are required".to_string(),
        });
    }

    let found = find_user_by_phone(db, phone_number.trim()).await?;
    let Some(found) = found else {
        return Err(Error::Unauthorized {
            message: "Invalid phone number or password".to_string(),
        });
    };

    if !found.is_active {
        return Err(Error::Unauthorized {
            message: "Account is deactivated".to_string(),
        });
    }

    if !auth::verify_password(password, &found.password_hash)? {
        return Err(Error::Unauthorized {
            message: "Invalid phone number or password".to_string(),
        });
    }

    let claims = Claims::new(found.id, found.phone_number.clone(), found.is_admin);
    let token = jwt.encode(&claims)?;

    Ok((token, found))
}

/// Applies a referral code to the calling user, strictly.
///
/// Unlike registration, every failure here is reported: unknown codes,
/// self-referral, and a second claim after `referred_by` was already set.
/// Returns the referrer.
pub async fn claim_referral(
    db: &DatabaseConnection,
    user_id: i64,
    referral_code: &str,
) -> Result<user::Model> {
    if referral_code.trim().is_empty() {
        return Err(Error::Validation {
            message: "Referral code is required".to_string(),
        });
    }

    let referrer = find_user_by_referral_code(db, referral_code.trim())
        .await?
        .ok_or_else(|| Error::Validation {
            message: "Invalid referral code".to_string(),
        })?;

    if referrer.id == user_id {
        return Err(Error::Validation {
            message: "Cannot use your own referral code".to_string(),
        });
    }

    let caller = find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::Validation {
            message: "User not found".to_string(),
        })?;

    if caller.referred_by.is_some() {
        return Err(Error::Validation {
            message: "You have already used a referral code".to_string(),
        });
    }

    let mut active: user::ActiveModel = caller.into();
    active.referred_by = Set(Some(referrer.id));
    active.updated_at = Set(Utc::now());
    active.update(db).await?;

    Ok(referrer)
}

/// Credits a user's profit balance directly and records the adjustment.
///
/// The target may be given as an id, phone number, or username. Single-step:
/// there is no approval workflow and no upper bound.
pub async fn adjust_balance(
    db: &DatabaseConnection,
    target: &str,
    amount: f64,
    reason: &str,
) -> Result<(user::Model, transaction::Model)> {
    if !(amount > 0.0) || !amount.is_finite() {
        return Err(Error::Validation {
            message: "Valid amount is required".to_string(),
        });
    }
    if reason.trim().is_empty() {
        return Err(Error::Validation {
            message: "Reason is required".to_string(),
        });
    }

    let target_user = find_user_flexible(db, target)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found. Please enter a valid User ID, Phone Number, or Username."
                .to_string(),
        })?;

    let txn = db.begin().await?;

    credit_profit_balance(&txn, target_user.id, amount).await?;
    let entry = record_transaction(
        &txn,
        target_user.id,
        TX_ADMIN_ADJUSTMENT,
        amount,
        format!("Admin adjustment: {}", reason.trim()),
        format!("ADJ-{}", Utc::now().timestamp_millis()),
    )
    .await?;

    txn.commit().await?;

    let updated = find_user_by_id(db, target_user.id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found".to_string(),
        })?;

    Ok((updated, entry))
}

/// Patches a user record with the supplied fields, bypassing ledger guards.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    update: &UserUpdate,
) -> Result<user::Model> {
    let found = find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: "User not found".to_string(),
        })?;

    let mut active: user::ActiveModel = found.into();

    if let Some(name) = &update.name {
        active.name = Set(name.clone());
    }
    if let Some(username) = &update.username {
        active.username = Set(username.clone());
    }
    if let Some(phone_number) = &update.phone_number {
        active.phone_number = Set(phone_number.clone());
    }
    if let Some(balance) = update.balance {
        active.balance = Set(balance);
    }
    if let Some(recharge_balance) = update.recharge_balance {
        active.recharge_balance = Set(recharge_balance);
    }
    if let Some(total_invested) = update.total_invested {
        active.total_invested = Set(total_invested);
    }
    if let Some(total_withdrawn) = update.total_withdrawn {
        active.total_withdrawn = Set(total_withdrawn);
    }
    if let Some(referral_code) = &update.referral_code {
        active.referral_code = Set(referral_code.clone());
    }
    if let Some(referred_by) = update.referred_by {
        active.referred_by = Set(Some(referred_by));
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_admin) = update.is_admin {
        active.is_admin = Set(is_admin);
    }
    if let Some(password) = &update.password {
        active.password_hash = Set(auth::hash_password(password)?);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}
