/// Platform accounts service
///
/// Account registration, session tokens and the admin-driven account
/// lifecycle for a multi-user content platform.
use platform_accounts::{
    config::{LogFormat, ServerConfig, DEFAULT_LOG_FILTER},
    context::AppContext,
    error::PlatformResult,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> PlatformResult<()> {
    // Configuration first: it picks the log format
    let config = ServerConfig::from_env()?;

    init_logging(&config);
    print_banner();

    let ctx = AppContext::new(config).await?;

    server::serve(ctx).await?;

    Ok(())
}

fn init_logging(config: &ServerConfig) {
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    match config.logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn print_banner() {
    println!(
        r#"
        Platform Accounts v{}
        account lifecycle and access control
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
