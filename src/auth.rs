/// Authentication gate and request extractors
use crate::{
    account::TokenService,
    admin::AdminGrant,
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::account::{self as account_db, Account},
    error::{PlatformError, PlatformResult},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Resolves a bearer token to an active account.
///
/// Runs on every authenticated request, so a block or soft delete takes
/// effect immediately even for tokens issued before it.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
    db: SqlitePool,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>, db: SqlitePool) -> Self {
        Self { tokens, db }
    }

    /// Authenticate a request from its headers
    pub async fn authenticate(&self, headers: &HeaderMap) -> PlatformResult<Account> {
        let token = extract_bearer_token(headers)
            .ok_or_else(|| PlatformError::Unauthenticated("Missing authorization header".to_string()))?;

        self.authenticate_token(&token).await
    }

    /// Verify the token, load its account and require status `active`
    pub async fn authenticate_token(&self, token: &str) -> PlatformResult<Account> {
        let claims = self.tokens.verify(token)?;

        let account = account_db::find_by_id(&self.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(account_id = %claims.sub, "Token subject no longer exists");
                PlatformError::NotFound("User not found".to_string())
            })?;

        if !account.is_active() {
            tracing::debug!(account_id = %account.id, status = %account.status, "Inactive account refused");
            return Err(PlatformError::Forbidden("User is blocked or inactive.".to_string()));
        }

        Ok(account)
    }
}

/// Authenticated context - the active account behind the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account: Account,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, state: &AppContext) -> Result<Self, Self::Rejection> {
        let account = state.auth_gate.authenticate(&parts.headers).await?;
        Ok(AuthContext { account })
    }
}

/// Admin authentication context - an active account the policy accepts as admin
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub account: Account,
    pub grant: AdminGrant,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, state: &AppContext) -> Result<Self, Self::Rejection> {
        let account = state.auth_gate.authenticate(&parts.headers).await?;
        let grant = state.policy.authorize(&account)?;

        tracing::debug!(admin_id = grant.admin_id(), "Admin request authorized");

        Ok(AdminAuthContext { account, grant })
    }
}
