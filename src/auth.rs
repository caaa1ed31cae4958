//! Credential boundary: password hashing and signed session tokens.
//!
//! The rest of the crate treats both concerns as opaque collaborators: the
//! core validates business rules and calls in here to hash/verify passwords
//! (Argon2id) and to issue/decode the 24-hour bearer tokens the API accepts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// How long an issued token stays valid.
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Claims carried by every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: i64,
    /// Phone number at issuance time
    pub phone_number: String,
    /// Whether the user had admin privileges at issuance time
    pub is_admin: bool,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

impl Claims {
    /// Builds claims for a user with the standard 24-hour expiry.
    pub fn new(user_id: i64, phone_number: String, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            phone_number,
            is_admin,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        }
    }
}

/// Token issuance and verification handle, shared via application state.
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    /// Creates a handle from the shared HS256 secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
        }
    }

    /// Signs a token for the given claims.
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(Error::Token)
    }

    /// Decodes and validates a token, returning its claims.
    ///
    /// Expiry is enforced by the default validation; callers at the HTTP
    /// boundary map any failure here to a 403.
    pub fn decode(&self, token: &str) -> std::result::Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// Hashes a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Verifies a password against a stored Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let jwt = JwtAuth::new(b"test-secret");
        let claims = Claims::new(42, "9876543210".to_string(), false);
        let token = jwt.encode(&claims).unwrap();

        let decoded = jwt.decode(&token).unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.phone_number, "9876543210");
        assert!(!decoded.is_admin);
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let jwt = JwtAuth::new(b"test-secret");
        let other = JwtAuth::new(b"other-secret");
        let token = jwt
            .encode(&Claims::new(1, "1112223333".to_string(), true))
            .unwrap();

        assert!(other.decode(&token).is_err());
    }
}
