/// HTTP server: router assembly, health probe and the listener loop
use crate::{
    context::AppContext,
    db,
    error::{PlatformError, PlatformResult},
};
use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    // Lifecycle routes are PATCH and hard delete is DELETE
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .with_state(ctx)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Reports whether the account store answers; 503 when it does not
async fn health_check(State(ctx): State<AppContext>) -> (StatusCode, Json<serde_json::Value>) {
    let (status, overall, database) = match db::test_connection(&ctx.account_db).await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the account database");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };

    (
        status,
        Json(json!({
            "status": overall,
            "database": database,
            "version": ctx.config.service.version,
        })),
    )
}

async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": format!("No route for {}", uri.path()),
        })),
    )
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(ctx: AppContext) -> PlatformResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);

    tracing::info!(
        url = %ctx.service_url(),
        version = %ctx.config.service.version,
        admins = ctx.config.authentication.admin_ids.len(),
        "Account service listening on {}",
        addr
    );

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PlatformError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PlatformError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Account service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
