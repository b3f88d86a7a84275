/// Self-service account endpoints
use crate::{
    account::{AccountMessageResponse, AccountView, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    auth::AuthContext,
    context::AppContext,
    db::account::ProfileChanges,
    error::{PlatformError, PlatformResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

/// Build user API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/me", get(me))
        .route("/api/users/:user_id", put(update_profile))
}

/// Register a new account
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> PlatformResult<(StatusCode, Json<RegisterResponse>)> {
    let user = ctx
        .account_manager
        .register(req.email, req.password, req.display_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Exchange credentials for a session token
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> PlatformResult<Json<LoginResponse>> {
    let (_account, issued) = ctx.account_manager.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// Current account
async fn me(auth: AuthContext) -> Json<AccountView> {
    Json(auth.account.into())
}

/// Edit the caller's own profile
async fn update_profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(user_id): Path<String>,
    Json(changes): Json<ProfileChanges>,
) -> PlatformResult<Json<AccountMessageResponse>> {
    if auth.account.id != user_id {
        tracing::warn!(caller = %auth.account.id, target = %user_id, "Profile edit for another account refused");
        return Err(PlatformError::Unauthorized(
            "You can only update your own profile".to_string(),
        ));
    }

    let account = ctx.account_manager.update_profile(&user_id, &changes).await?;

    Ok(Json(AccountMessageResponse {
        message: "Profile updated successfully".to_string(),
        user: account.into(),
    }))
}
