/// Admin API Endpoints
use crate::{
    account::{AccountMessageResponse, AccountView, ListAccountsResponse, MAX_PAGE_SIZE},
    admin::{AdminProfile, AdminProfileChanges, LifecycleAction},
    auth::AdminAuthContext,
    context::AppContext,
    db::owned::CascadeReport,
    error::PlatformResult,
};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 50;

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/users", get(list_users))
        // Lifecycle
        .route("/admin/users/block/:user_id", patch(block_user))
        .route("/admin/users/unblock/:user_id", patch(unblock_user))
        .route("/admin/users/delete/:user_id", patch(soft_delete_user))
        .route("/admin/users/:user_id/restore", patch(restore_user))
        .route("/admin/users/:user_id", delete(hard_delete_user))
        // Admin profile
        .route("/admin/users/profile/update", put(update_admin_profile))
}

#[derive(Debug, Deserialize)]
struct ListUsersQuery {
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    cursor: Option<String>,
}

/// List accounts, ordered by id
async fn list_users(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Query(query): Query<ListUsersQuery>,
) -> PlatformResult<Json<ListAccountsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let accounts = ctx
        .account_manager
        .list_accounts(query.cursor.as_deref(), limit)
        .await?;

    // A short page is the last one
    let cursor = if (accounts.len() as i64) < limit {
        None
    } else {
        accounts.last().map(|a| a.id.clone())
    };

    Ok(Json(ListAccountsResponse {
        users: accounts.into_iter().map(AccountView::from).collect(),
        cursor,
    }))
}

async fn block_user(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(user_id): Path<String>,
) -> PlatformResult<Json<AccountMessageResponse>> {
    apply(&ctx, &auth, &user_id, LifecycleAction::Block, "User blocked successfully").await
}

async fn unblock_user(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(user_id): Path<String>,
) -> PlatformResult<Json<AccountMessageResponse>> {
    apply(&ctx, &auth, &user_id, LifecycleAction::Unblock, "User unblocked successfully").await
}

async fn soft_delete_user(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(user_id): Path<String>,
) -> PlatformResult<Json<AccountMessageResponse>> {
    apply(&ctx, &auth, &user_id, LifecycleAction::SoftDelete, "User deleted successfully").await
}

async fn restore_user(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(user_id): Path<String>,
) -> PlatformResult<Json<AccountMessageResponse>> {
    apply(&ctx, &auth, &user_id, LifecycleAction::Restore, "User restored successfully").await
}

async fn apply(
    ctx: &AppContext,
    auth: &AdminAuthContext,
    user_id: &str,
    action: LifecycleAction,
    message: &str,
) -> PlatformResult<Json<AccountMessageResponse>> {
    let account = ctx.lifecycle.transition(&auth.grant, user_id, action).await?;

    Ok(Json(AccountMessageResponse {
        message: message.to_string(),
        user: account.into(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HardDeleteResponse {
    message: String,
    removed: CascadeReport,
}

/// Permanently delete an account and everything it owns
async fn hard_delete_user(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(user_id): Path<String>,
) -> PlatformResult<Json<HardDeleteResponse>> {
    let removed = ctx.lifecycle.hard_delete(&auth.grant, &user_id).await?;

    Ok(Json(HardDeleteResponse {
        message: "User and all related data permanently deleted".to_string(),
        removed,
    }))
}

#[derive(Debug, Serialize)]
struct AdminProfileResponse {
    message: String,
    profile: AdminProfile,
}

/// Create or update the calling admin's profile
async fn update_admin_profile(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Json(changes): Json<AdminProfileChanges>,
) -> PlatformResult<Json<AdminProfileResponse>> {
    let profile = ctx.admin_profiles.upsert(&auth.grant, &changes).await?;

    Ok(Json(AdminProfileResponse {
        message: "Admin profile updated successfully".to_string(),
        profile,
    }))
}
