use super::Notifier;
use crate::error::AdapterError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

// SNS rejects longer subjects, and any containing line breaks or control
// characters.
const MAX_SUBJECT_CHARS: usize = 100;

pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), AdapterError> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| AdapterError::Notification(e.into()))?;
        Ok(())
    }
}

/// Body of `POST /notify`. Usually the full classification result; only these
/// fields are read.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
    pub predictions: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

impl Notification {
    pub fn from_request(request: &NotificationRequest) -> Self {
        let file_name = request.file_name.as_deref().unwrap_or("Unknown");

        let mut label = "No prediction available".to_string();
        let mut confidence = "N/A".to_string();

        if let Some(Value::Object(top)) = request
            .predictions
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|predictions| predictions.first())
        {
            if let Some(top_label) = top.get("label").and_then(Value::as_str) {
                label = top_label.to_string();
            }
            let score = top.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
            confidence = format!("{:.2}%", score * 100.0);
        }

        let subject = format!("Prediction for {file_name}")
            .chars()
            .filter(|c| !c.is_control())
            .take(MAX_SUBJECT_CHARS)
            .collect();
        let message = format!(
            "✅ Image Classification Completed\n\nFile: {file_name}\nPrediction: {label}\nConfidence: {confidence}"
        );

        Self { subject, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> NotificationRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn formats_the_top_prediction() {
        let notification = Notification::from_request(&request(json!({
            "fileName": "dog.png",
            "predictions": [
                { "label": "golden retriever", "confidence": 0.8731 },
                { "label": "Labrador retriever", "confidence": 0.1 }
            ]
        })));
        assert_eq!(notification.subject, "Prediction for dog.png");
        assert_eq!(
            notification.message,
            "✅ Image Classification Completed\n\nFile: dog.png\nPrediction: golden retriever\nConfidence: 87.31%"
        );
    }

    #[test]
    fn falls_back_when_nothing_was_predicted() {
        let notification = Notification::from_request(&request(json!({ "predictions": [] })));
        assert_eq!(notification.subject, "Prediction for Unknown");
        assert!(notification.message.contains("File: Unknown"));
        assert!(notification.message.contains("Prediction: No prediction available"));
        assert!(notification.message.ends_with("Confidence: N/A"));
    }

    #[test]
    fn missing_confidence_counts_as_zero() {
        let notification = Notification::from_request(&request(json!({
            "fileName": "x.jpg",
            "predictions": [{ "label": "tench" }]
        })));
        assert!(notification.message.ends_with("Confidence: 0.00%"));
    }

    #[test]
    fn control_characters_are_dropped_from_the_subject() {
        let notification = Notification::from_request(&NotificationRequest {
            file_name: Some("dog\r\n\tphoto.png".to_string()),
            predictions: None,
        });
        assert_eq!(notification.subject, "Prediction for dogphoto.png");
        assert!(notification.message.contains("File: dog\r\n\tphoto.png"));
    }

    #[test]
    fn long_subjects_are_truncated() {
        let file_name = "a".repeat(300);
        let notification = Notification::from_request(&NotificationRequest {
            file_name: Some(file_name),
            predictions: None,
        });
        assert_eq!(notification.subject.chars().count(), MAX_SUBJECT_CHARS);
    }
}
