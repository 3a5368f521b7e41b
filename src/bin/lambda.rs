use image_classifier::{router, AppState, Config};
use lambda_http::{run, Error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::from_config(&config).await?;

    let app = router(app_state, config.max_upload_bytes);

    run(app).await
}
