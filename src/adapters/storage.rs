use super::ObjectStorage;
use crate::error::AdapterError;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AdapterError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AdapterError::Storage(e.into()))?;

        tracing::info!("Uploaded to: s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// Object key for an upload: a fresh UUID keeps same-named files apart.
pub fn upload_key(file_name: &str) -> String {
    format!("uploads/{}-{}", uuid::Uuid::new_v4(), file_name)
}
