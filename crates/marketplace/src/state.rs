//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::MarketplaceConfig;
use crate::services::auth::ActivationTokens;
use crate::services::email::EmailService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketplaceConfig,
    pool: PgPool,
    email: EmailService,
    tokens: ActivationTokens,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(
        config: MarketplaceConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = EmailService::new(&config.email)?;
        let tokens = ActivationTokens::new(&config.session_secret);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                tokens,
            }),
        })
    }

    /// Get a reference to the marketplace configuration.
    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the activation token signer.
    #[must_use]
    pub fn tokens(&self) -> &ActivationTokens {
        &self.inner.tokens
    }
}
