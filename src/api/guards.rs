//! Bearer-token extractors guarding the authenticated routes.
//!
//! [`AuthUser`] rejects requests without a token (401) or with one that does
//! not verify (403). [`AdminUser`] additionally requires the admin flag
//! carried in the claims (403). Handlers take these as plain arguments, so a
//! route is gated by its signature alone.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use super::AppState;
use crate::auth::Claims;
use crate::errors::Error;

/// Any authenticated caller.
pub struct AuthUser(pub Claims);

/// An authenticated caller with the admin flag set.
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| Error::Unauthorized {
                message: "Access token required".to_string(),
            })?;

        let claims = state.jwt.decode(token).map_err(|_| Error::Forbidden {
            message: "Invalid or expired token".to_string(),
        })?;

        Ok(AuthUser(claims))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_admin {
            return Err(Error::Forbidden {
                message: "Admin access required".to_string(),
            });
        }

        Ok(AdminUser(claims))
    }
}
