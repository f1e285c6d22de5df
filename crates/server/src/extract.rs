//! Request extractors for session-token authentication.

use axum::{extract::FromRequestParts, http::request::Parts};
use services::services::auth::{AuthError, AuthService, AuthUser};

use crate::{error::ApiError, state::AppState};

/// The authenticated caller, resolved from a `Bearer` session token.
///
/// Rejects the request with 401 when the token is missing, unknown, or
/// expired.
pub struct CurrentUser(pub AuthUser);

/// Like [`CurrentUser`] but never rejects: yields `None` when there is no
/// valid session. Dashboard routes use this to decide between rendering
/// and redirecting.
pub struct MaybeUser(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::Unauthorized)?;
        let user = AuthService::new(state.db().pool.clone())
            .authenticate(token)
            .await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        match AuthService::new(state.db().pool.clone())
            .authenticate(token)
            .await
        {
            Ok(user) => Ok(Self(Some(user))),
            Err(AuthError::Unauthorized) => Ok(Self(None)),
            Err(e) => Err(e.into()),
        }
    }
}
