/// Application context and dependency injection
use crate::{
    account::{AccountManager, TokenService},
    admin::{AccountLifecycleManager, AdminProfileManager, AuthorizationPolicy},
    auth::AuthGate,
    config::ServerConfig,
    db,
    error::{PlatformError, PlatformResult},
};
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub account_db: SqlitePool,
    pub tokens: Arc<TokenService>,
    pub auth_gate: AuthGate,
    pub policy: Arc<AuthorizationPolicy>,
    pub account_manager: Arc<AccountManager>,
    // Admin
    pub lifecycle: Arc<AccountLifecycleManager>,
    pub admin_profiles: Arc<AdminProfileManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> PlatformResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let account_db = db::create_pool(&config.storage.account_db, db::DatabaseOptions::default()).await?;
        db::run_migrations(&account_db).await?;
        db::test_connection(&account_db).await?;

        tracing::info!(path = ?config.storage.account_db, "Account database ready");

        Self::with_pool(config, account_db)
    }

    /// Wire the services over an already migrated pool
    pub fn with_pool(config: ServerConfig, account_db: SqlitePool) -> PlatformResult<Self> {
        // Duration fields below are only safe to build once validated
        config.validate()?;

        let tokens = Arc::new(TokenService::new(
            &config.authentication.jwt_secret,
            Duration::days(config.authentication.token_ttl_days),
        ));
        let auth_gate = AuthGate::new(tokens.clone(), account_db.clone());
        let policy = Arc::new(AuthorizationPolicy::new(config.authentication.admin_ids.iter().cloned()));
        let account_manager = Arc::new(AccountManager::new(account_db.clone(), &config, tokens.clone())?);
        let lifecycle = Arc::new(AccountLifecycleManager::new(account_db.clone()));
        let admin_profiles = Arc::new(AdminProfileManager::new(account_db.clone()));

        tracing::info!(admins = config.authentication.admin_ids.len(), "Admin policy loaded");

        Ok(Self {
            config: Arc::new(config),
            account_db,
            tokens,
            auth_gate,
            policy,
            account_manager,
            lifecycle,
            admin_profiles,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> PlatformResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                PlatformError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
