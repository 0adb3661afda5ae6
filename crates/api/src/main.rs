use std::sync::Arc;

use anyhow::Context;

use bizconsole_api::{app, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bizconsole_observability::init();

    let config = ApiConfig::from_env()?;
    let services = Arc::new(app::services::AppServices::from_config(&config).await?);
    let router = app::build_app(services, &config.jwt_secret);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
