//! Authentication error types.

use thiserror::Error;

use sapling_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. One variant for both, so responses
    /// never reveal whether an account exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email address is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Session token is malformed or has a bad signature.
    #[error("invalid token")]
    InvalidToken,

    /// Session token has expired.
    #[error("expired token")]
    ExpiredToken,

    /// Session token could not be created.
    #[error("token creation failed: {0}")]
    TokenCreation(String),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
