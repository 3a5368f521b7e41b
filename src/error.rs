use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The inference response could not be turned into a score vector.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("inference response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("inference response is not a JSON object")]
    NotAnObject,
    #[error("inference response has neither `predictions` nor `probabilities`")]
    MissingScores,
    #[error("`{key}` is not a numeric score vector")]
    InvalidScores { key: &'static str },
    #[error("score vector is empty")]
    EmptyScores,
}

/// A managed-service call failed. Never retried.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("object storage request failed")]
    Storage(#[source] BoxError),
    #[error("inference endpoint request failed")]
    Inference(#[source] BoxError),
    #[error("result store request failed")]
    ResultStore(#[source] BoxError),
    #[error("notification publish failed")]
    Notification(#[source] BoxError),
}

impl AdapterError {
    fn code(&self) -> &'static str {
        match self {
            AdapterError::Storage(_) => "STORAGE_ERROR",
            AdapterError::Inference(_) => "INFERENCE_ERROR",
            AdapterError::ResultStore(_) => "RESULT_STORE_ERROR",
            AdapterError::Notification(_) => "NOTIFICATION_ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        let message = msg.into();
        tracing::warn!("Bad request: {}", message);
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "PAYLOAD_TOO_LARGE"
        } else {
            "BAD_REQUEST"
        };
        let message = err.body_text();
        tracing::warn!("Invalid multipart body: {}", message);
        Self {
            status,
            code,
            message,
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        tracing::error!("Failed to parse prediction: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INFERENCE_PARSE_ERROR",
            message: err.to_string(),
        }
    }
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match std::error::Error::source(&err) {
            Some(source) => tracing::error!("{}: {:?}", err, source),
            None => tracing::error!("{}", err),
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope<'a> {
            error: ErrorBody<'a>,
        }

        #[derive(Serialize)]
        struct ErrorBody<'a> {
            code: &'a str,
            message: &'a str,
        }

        (
            self.status,
            Json(ErrorEnvelope {
                error: ErrorBody {
                    code: self.code,
                    message: &self.message,
                },
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_errors_map_to_server_errors() {
        let err = ApiError::from(AdapterError::Notification("topic not found".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "NOTIFICATION_ERROR");
    }

    #[test]
    fn parse_errors_keep_their_message() {
        let err = ApiError::from(ParseError::MissingScores);
        assert_eq!(err.code(), "INFERENCE_PARSE_ERROR");
        assert!(err.message.contains("probabilities"));
    }
}
