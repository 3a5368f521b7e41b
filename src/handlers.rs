use crate::{
    adapters::{
        notify::{Notification, NotificationRequest},
        storage::upload_key,
    },
    error::ApiError,
    postprocess::{self, Prediction},
    AppState,
};
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_key: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub predictions: Vec<Prediction>,
}

struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Reads the `file` part of a multipart body, skipping any other parts.
async fn read_file(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?.to_vec();

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(ApiError::bad_request("missing multipart field `file`"))
}

#[axum::debug_handler]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file(multipart).await?;
    let file_key = upload_key(&file.file_name);

    state
        .storage
        .put_object(&file_key, file.bytes, &file.content_type)
        .await?;

    Ok(Json(UploadResponse { file_key }))
}

#[axum::debug_handler]
pub async fn save_result(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = match body.get("id") {
        Some(Value::Null) | None => return Err(ApiError::bad_request("missing `id` field")),
        Some(id) => id.clone(),
    };

    state.results.put_item(body).await?;
    tracing::info!("Saved to DynamoDB: {}", id);

    Ok(Json(MessageResponse {
        message: "Saved to DynamoDB",
    }))
}

#[axum::debug_handler]
pub async fn notify(
    State(state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let notification = Notification::from_request(&request);

    state
        .notifier
        .publish(&notification.subject, &notification.message)
        .await?;
    tracing::info!("Notification sent: {}", notification.subject);

    Ok(Json(MessageResponse {
        message: "Notification sent",
    }))
}

#[axum::debug_handler]
pub async fn classify(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let file = read_file(multipart).await?;

    let raw = state.inference.invoke(file.bytes).await?;
    tracing::debug!("Raw inference result: {}", String::from_utf8_lossy(&raw));

    let predictions = postprocess::post_process(&raw, &state.labels).map_err(|e| {
        tracing::error!("Unparseable inference result: {}", String::from_utf8_lossy(&raw));
        e
    })?;

    if let Some(top) = predictions.first() {
        tracing::info!(
            file = %file.file_name,
            label = %top.label,
            confidence = top.confidence,
            "Classified image"
        );
    }

    Ok(Json(ClassifyResponse { predictions }))
}
