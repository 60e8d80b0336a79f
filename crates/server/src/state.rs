//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ShopConfig;
use crate::services::auth::JwtService;
use crate::services::upload::ImageHostClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources like the database pool and configuration. One instance is built
/// at process startup and injected everywhere; there is no ambient global
/// store client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    jwt: JwtService,
    image_host: Option<ImageHostClient>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ShopConfig, pool: SqlitePool) -> Self {
        let jwt = JwtService::new(&config.jwt_secret);
        let image_host = config.image_host.as_ref().map(ImageHostClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                pool,
                jwt,
                image_host,
            }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the session token service.
    #[must_use]
    pub fn jwt(&self) -> &JwtService {
        &self.inner.jwt
    }

    /// Get a reference to the external image host client, when configured.
    #[must_use]
    pub fn image_host(&self) -> Option<&ImageHostClient> {
        self.inner.image_host.as_ref()
    }
}
