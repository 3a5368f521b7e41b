use anyhow::{Context, Result};
use image_classifier::{router, AppState, Config};
use std::{env, fs};
use tracing_subscriber::EnvFilter;

/// Serves the API on `BIND_ADDR`, or classifies a single image when given a
/// path.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::from_config(&config).await?;

    if let Some(image_path) = env::args().nth(1) {
        let image = fs::read(&image_path).with_context(|| format!("failed to read {image_path}"))?;
        let raw = app_state.inference.invoke(image).await?;
        let predictions = image_classifier::post_process(&raw, &app_state.labels)?;
        println!("{predictions:#?}");
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, router(app_state, config.max_upload_bytes)).await?;

    Ok(())
}
