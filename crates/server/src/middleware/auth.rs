//! Session resolution from the `auth-token` cookie.
//!
//! Three extractors with increasing strictness:
//!
//! - [`OptionalUser`] - anonymous is fine; a missing, malformed or expired
//!   token resolves to `None`, never to an error.
//! - [`RequireUser`] - rejects anonymous requests with 401.
//! - [`RequireAdmin`] - rejects non-admin users with 403.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};

use sapling_core::{Role, UserId};

use crate::error::AppError;
use crate::services::auth::TOKEN_TTL_SECONDS;
use crate::state::AppState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth-token";

/// The identity resolved from a valid session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this user may reach admin surfaces.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Build the `Set-Cookie` value that establishes a session.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{AUTH_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={TOKEN_TTL_SECONDS}")
}

/// Build the `Set-Cookie` value that ends a session.
///
/// Clearing the cookie is the whole logout; the token itself stays valid
/// until it expires.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{AUTH_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Pull the session token out of the request's Cookie headers, if present.
fn extract_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(AUTH_COOKIE))
        .find_map(|rest| rest.strip_prefix('='))
}

fn resolve_user(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    let token = extract_token(parts)?;
    let claims = state.jwt().verify(token).ok()?;

    Some(CurrentUser {
        id: UserId::new(claims.sub),
        email: claims.email,
        role: claims.role,
    })
}

/// Extractor yielding the current user when a valid session exists.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(resolve_user(parts, &state)))
    }
}

/// Extractor that rejects anonymous requests.
#[derive(Debug, Clone)]
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        resolve_user(parts, &state)
            .map(Self)
            .ok_or(AppError::Unauthenticated)
    }
}

/// Extractor that rejects everything but authenticated admins.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden);
        }

        Ok(Self(user))
    }
}
