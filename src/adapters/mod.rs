//! Thin wrappers around the managed services the handlers call.

use crate::error::AdapterError;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod inference;
pub mod notify;
pub mod results;
pub mod storage;

pub use inference::SageMakerEndpoint;
pub use notify::SnsNotifier;
pub use results::DynamoDbResultStore;
pub use storage::S3Storage;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AdapterError>;
}

#[async_trait]
pub trait InferenceEndpoint: Send + Sync {
    /// Returns the raw response body.
    async fn invoke(&self, image: Vec<u8>) -> Result<Vec<u8>, AdapterError>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn put_item(&self, item: Map<String, Value>) -> Result<(), AdapterError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), AdapterError>;
}
