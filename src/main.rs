use anyhow::Context;

use campus_erp::{app, config, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Campus ERP in {:?} mode", config.environment);

    let pool = database::connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    let app = app(AppState::new(pool));

    // Allow deployments to override the port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Campus ERP listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
