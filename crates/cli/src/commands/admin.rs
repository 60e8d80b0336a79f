//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! sapling-cli admin create -e admin@example.com -n "Admin Name" -p "a strong password"
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `SQLite` connection string for the shop database

use secrecy::SecretString;
use thiserror::Error;

use sapling_core::{Email, Role};
use sapling_server::db::{RepositoryError, UserRepository};
use sapling_server::services::auth;

/// Errors that can occur during admin account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected by the account policy.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Account already exists.
    #[error("An account already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Repository error while creating the account.
    #[error("Store error: {0}")]
    Repository(RepositoryError),
}

/// Create a new admin account.
///
/// # Returns
///
/// The ID of the created account.
pub async fn create_admin(email: &str, name: &str, password: &str) -> Result<i64, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    auth::validate_password(password)
        .map_err(|e| AdminError::WeakPassword(e.to_string()))?;
    let password_hash = auth::hash_password(password).map_err(|_| AdminError::PasswordHash)?;

    let database_url = std::env::var("SHOP_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("SHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to shop database...");
    let pool = sapling_server::db::create_pool(&database_url).await?;

    tracing::info!("Creating admin account: {}", email);

    let user = UserRepository::new(&pool)
        .create(name, &email, &password_hash, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.as_i64())
}
