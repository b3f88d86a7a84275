/// Account manager: registration, login and self-service profile edits
use crate::{
    account::{AccountView, IssuedToken, PasswordHasher, ProfileMutationThrottle, TokenService},
    config::ServerConfig,
    db::account::{self as account_db, Account, AccountStatus, NewAccount, ProfileChanges, UserType},
    error::{PlatformError, PlatformResult},
};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Upper bound for a single page of accounts
pub const MAX_PAGE_SIZE: i64 = 100;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    throttle: ProfileMutationThrottle,
    /// Verified against when the email is unknown so both login failures cost the same
    dummy_hash: String,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: &ServerConfig, tokens: Arc<TokenService>) -> PlatformResult<Self> {
        let hasher = PasswordHasher::new(config.authentication.password_hash_cost)?;
        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string())?;
        let throttle = ProfileMutationThrottle::new(Duration::days(config.profile.cooldown_days));

        Ok(Self {
            db,
            hasher,
            tokens,
            throttle,
            dummy_hash,
        })
    }

    /// Register a new account with status `active`. The returned view never
    /// carries the password hash.
    pub async fn register(
        &self,
        email: String,
        password: String,
        display_name: String,
    ) -> PlatformResult<AccountView> {
        // Fast path; the unique constraint below is the real guard
        if account_db::find_by_email(&self.db, &email).await?.is_some() {
            return Err(PlatformError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash_password(password).await?;

        let new_account = NewAccount {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            display_name,
            created_at: Utc::now(),
        };

        match account_db::insert(&self.db, &new_account).await {
            Ok(()) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::debug!(email = %new_account.email, "Concurrent registration lost the race");
                return Err(PlatformError::Conflict("User already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(account_id = %new_account.id, "Account registered");

        Ok(AccountView {
            id: new_account.id,
            email: new_account.email,
            display_name: new_account.display_name,
            first_name: None,
            last_name: None,
            birth_date: None,
            profile_icon: None,
            gender: None,
            user_type: UserType::default(),
            status: AccountStatus::Active,
            last_profile_update: None,
            created_at: new_account.created_at,
        })
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> PlatformResult<(Account, IssuedToken)> {
        let account = account_db::find_by_email(&self.db, email).await?;

        let stored_hash = match &account {
            Some(account) => account.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let valid = self.verify_password(password.to_string(), stored_hash).await?;

        let account = match account {
            Some(account) if valid => account,
            _ => {
                tracing::debug!("Login rejected");
                return Err(PlatformError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&account.id)?;
        tracing::info!(account_id = %account.id, "Session token issued");

        Ok((account, token))
    }

    /// Get account by id
    pub async fn get_account(&self, id: &str) -> PlatformResult<Account> {
        account_db::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| PlatformError::NotFound("Account not found".to_string()))
    }

    /// List accounts with pagination.
    ///
    /// Accounts are ordered by id; pass the last id as cursor for the next page.
    pub async fn list_accounts(&self, cursor: Option<&str>, limit: i64) -> PlatformResult<Vec<Account>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(account_db::list(&self.db, cursor, limit).await?)
    }

    /// Apply a self-service profile edit, subject to the cooldown
    pub async fn update_profile(&self, account_id: &str, changes: &ProfileChanges) -> PlatformResult<Account> {
        self.update_profile_at(account_id, changes, Utc::now()).await
    }

    /// Apply a self-service profile edit as if the current time were `now`
    pub async fn update_profile_at(
        &self,
        account_id: &str,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> PlatformResult<Account> {
        let account = self.get_account(account_id).await?;

        if let Err(e) = self.throttle.check(account.last_profile_update, now) {
            tracing::debug!(account_id, "Profile edit inside cooldown window");
            return Err(e);
        }

        let window_start = self.throttle.window_start(now);
        let updated = account_db::update_profile(&self.db, account_id, changes, now, window_start).await?;
        if updated == 0 {
            // Another edit landed between the check and the write
            let current = self.get_account(account_id).await?;
            let next_allowed_at = self
                .throttle
                .next_allowed_at(current.last_profile_update)
                .unwrap_or(now);
            tracing::debug!(account_id, "Concurrent profile edit lost the race");
            return Err(PlatformError::RateLimited { next_allowed_at });
        }

        tracing::info!(account_id, "Profile updated");

        self.get_account(account_id).await
    }

    async fn hash_password(&self, password: String) -> PlatformResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PlatformError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> PlatformResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PlatformError::Internal(format!("Password verification task failed: {}", e)))?
    }
}
