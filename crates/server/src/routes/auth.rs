//! Authentication route handlers.
//!
//! Sessions are a signed token in an `HttpOnly` cookie. Login sets it,
//! logout clears it; `/auth/check` is what clients poll to decide whether
//! they are holding a local cart or talking to the persisted one.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{OptionalUser, RequireUser, clear_session_cookie, session_cookie};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - create a customer account and start a session.
#[tracing::instrument(skip_all, fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .register(body.name.trim(), body.email.trim(), &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "Account registered");

    let token = state.jwt().issue(&user)?;

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&token))],
        Json(user),
    )
        .into_response())
}

/// POST /auth/login - check credentials and set the session cookie.
#[tracing::instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .login(body.email.trim(), &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "Login");

    let token = state.jwt().issue(&user)?;

    Ok(([(SET_COOKIE, session_cookie(&token))], Json(user)).into_response())
}

/// GET/POST /auth/logout - clear the session cookie.
///
/// There is no server-side revocation; an already-issued token stays valid
/// until it expires.
pub async fn logout(OptionalUser(user): OptionalUser) -> Response {
    // Logging out without a live session is fine; the cookie gets cleared
    // either way.
    if let Some(user) = user {
        tracing::info!(user_id = %user.id, "Logout");
    }

    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// GET /auth/check - return the current account for a valid session.
pub async fn check(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Response> {
    // Token claims are a snapshot from issue time; answer with current data.
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    Ok(Json(user).into_response())
}
