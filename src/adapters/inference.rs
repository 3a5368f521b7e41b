use super::InferenceEndpoint;
use crate::error::AdapterError;
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_sagemakerruntime::primitives::Blob;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub struct SageMakerEndpoint {
    client: aws_sdk_sagemakerruntime::Client,
    endpoint_name: String,
    max_payload_bytes: usize,
}

impl SageMakerEndpoint {
    pub fn new(
        client: aws_sdk_sagemakerruntime::Client,
        endpoint_name: impl Into<String>,
        max_payload_bytes: usize,
    ) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
            max_payload_bytes,
        }
    }
}

#[async_trait]
impl InferenceEndpoint for SageMakerEndpoint {
    async fn invoke(&self, image: Vec<u8>) -> Result<Vec<u8>, AdapterError> {
        let image = if image.len() > self.max_payload_bytes {
            let max_size_bytes = self.max_payload_bytes;
            tokio::task::spawn_blocking(move || resize_image(&image, max_size_bytes))
                .await
                .map_err(|e| AdapterError::Inference(e.into()))?
                .map_err(|e| AdapterError::Inference(e.into()))?
        } else {
            image
        };

        let response = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type("application/x-image")
            .accept("application/json")
            .body(Blob::new(image))
            .send()
            .await
            .map_err(|e| AdapterError::Inference(e.into()))?;

        Ok(response.body.map(Blob::into_inner).unwrap_or_default())
    }
}

/// Shrinks the image 10% per step, re-encoding as JPEG, until it fits.
pub fn resize_image(image_data: &[u8], max_size_bytes: usize) -> Result<Vec<u8>> {
    let image = image::load_from_memory(image_data)?;
    // JPEG has no alpha channel
    let image = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut current_size = image_data.len();
    let mut width = image.width();
    let mut height = image.height();

    while current_size > max_size_bytes && width > 100 && height > 100 {
        width = (width as f32 * 0.9) as u32;
        height = (height as f32 * 0.9) as u32;

        let resized_image = image.resize(width, height, image::imageops::FilterType::Lanczos3);
        let mut cursor = Cursor::new(Vec::new());
        resized_image.write_to(&mut cursor, ImageFormat::Jpeg)?;
        let resized_image_data = cursor.into_inner();
        current_size = resized_image_data.len();

        if current_size <= max_size_bytes {
            return Ok(resized_image_data);
        }

        tracing::debug!("Resized image size: {} bytes", current_size);
    }

    Err(anyhow::anyhow!(
        "failed to resize image below {max_size_bytes} bytes"
    ))
}
