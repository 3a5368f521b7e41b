use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod postprocess;

pub use adapters::{InferenceEndpoint, Notifier, ObjectStorage, ResultStore};
pub use config::Config;
pub use labels::LabelTable;
pub use postprocess::{post_process, Prediction};

use adapters::{DynamoDbResultStore, S3Storage, SageMakerEndpoint, SnsNotifier};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ObjectStorage>,
    pub inference: Arc<dyn InferenceEndpoint>,
    pub results: Arc<dyn ResultStore>,
    pub notifier: Arc<dyn Notifier>,
    pub labels: Arc<LabelTable>,
}

impl AppState {
    /// Wires every adapter to its AWS service using `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let sdk_config = load_aws_config(&config.region).await;

        Ok(Self {
            storage: Arc::new(S3Storage::new(
                aws_sdk_s3::Client::new(&sdk_config),
                &config.upload_bucket,
            )),
            inference: Arc::new(SageMakerEndpoint::new(
                aws_sdk_sagemakerruntime::Client::new(&sdk_config),
                &config.sagemaker_endpoint,
                config.max_inference_payload_bytes,
            )),
            results: Arc::new(DynamoDbResultStore::new(
                aws_sdk_dynamodb::Client::new(&sdk_config),
                &config.results_table,
            )),
            notifier: Arc::new(SnsNotifier::new(
                aws_sdk_sns::Client::new(&sdk_config),
                &config.notification_topic_arn,
            )),
            labels: Arc::new(load_labels(config)?),
        })
    }
}

pub fn load_labels(config: &Config) -> Result<LabelTable> {
    match &config.labels_path {
        Some(path) => {
            let table = LabelTable::from_file(path)?;
            tracing::info!("Loaded {} labels from {}", table.len(), path.display());
            Ok(table)
        }
        None => Ok(LabelTable::imagenet().clone()),
    }
}

pub async fn load_aws_config(region: &str) -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::v2024_03_28())
        .await
        .into_builder()
        .region(Region::new(region.to_string()))
        .build()
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/save-result", post(handlers::save_result))
        .route("/notify", post(handlers::notify))
        .route("/classify", post(handlers::classify))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_labels_reads_configured_file() {
        let path = std::env::temp_dir().join(format!("labels-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "cat\ndog\nbird\n").unwrap();
        let path_value = path.to_string_lossy().into_owned();

        let config = Config::from_lookup(|name| {
            (name == "LABELS_PATH").then(|| path_value.clone())
        })
        .unwrap();
        let table = load_labels(&config).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.label_for(1), "dog");
        assert_eq!(table.label_for(3), "Class 3");
    }

    #[test]
    fn load_labels_defaults_to_imagenet() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(&load_labels(&config).unwrap(), LabelTable::imagenet());
    }
}
