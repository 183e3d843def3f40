use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reelist_api::auth::JwtVerifier;
use reelist_api::config::Config;
use reelist_api::store::{create_pool, PgStore};
use reelist_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(JwtVerifier::new(&config.jwt_secret)),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
