use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use usertable_server::app::{router, AppState};
use usertable_server::config::init_config;
use usertable_server::model::db::connect;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,usertable_server=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = init_config()?;

    let db = connect(&config.database_path).await?;
    let app = router(AppState::new(db, &config.jwt_secret), &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(
        "Server running on http://{} (static files from {})",
        config.bind_addr,
        config.static_dir.display()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
