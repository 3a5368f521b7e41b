use anyhow::{Context, Result};
use std::{net::SocketAddr, path::PathBuf, str::FromStr};

const DEFAULT_REGION: &str = "ap-south-1";
const DEFAULT_BUCKET: &str = "image-classifier-bucket-shivanshi";
const DEFAULT_TABLE: &str = "ImageClassificationResults";
const DEFAULT_TOPIC_ARN: &str =
    "arn:aws:sns:ap-south-1:765488553566:ImageClassificationNotifications";
const DEFAULT_ENDPOINT: &str = "image-classifier-endpoint";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
// SageMaker real-time endpoints reject larger request bodies.
const DEFAULT_MAX_INFERENCE_PAYLOAD_BYTES: usize = 6 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: String,
    pub upload_bucket: String,
    pub results_table: String,
    pub notification_topic_arn: String,
    pub sagemaker_endpoint: String,
    pub labels_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub max_inference_payload_bytes: usize,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            region: string("AWS_REGION", DEFAULT_REGION),
            upload_bucket: string("UPLOAD_BUCKET", DEFAULT_BUCKET),
            results_table: string("RESULTS_TABLE", DEFAULT_TABLE),
            notification_topic_arn: string("NOTIFICATION_TOPIC_ARN", DEFAULT_TOPIC_ARN),
            sagemaker_endpoint: string("SAGEMAKER_ENDPOINT", DEFAULT_ENDPOINT),
            labels_path: lookup("LABELS_PATH")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            max_upload_bytes: parsed(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_inference_payload_bytes: parsed(
                &lookup,
                "MAX_INFERENCE_PAYLOAD_BYTES",
                DEFAULT_MAX_INFERENCE_PAYLOAD_BYTES,
            )?,
            bind_addr: match lookup("BIND_ADDR").filter(|value| !value.is_empty()) {
                Some(value) => value
                    .parse()
                    .with_context(|| format!("BIND_ADDR is not a socket address: {value}"))?,
                None => DEFAULT_BIND_ADDR.parse()?,
            },
        })
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{name} has an invalid value: {value}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_match_the_deployment() {
        let config = config(&[]).unwrap();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.upload_bucket, "image-classifier-bucket-shivanshi");
        assert_eq!(config.results_table, "ImageClassificationResults");
        assert_eq!(config.labels_path, None);
        assert_eq!(config.max_inference_payload_bytes, 6 * 1024 * 1024);
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config(&[
            ("AWS_REGION", "us-east-1"),
            ("SAGEMAKER_ENDPOINT", "resnet50"),
            ("LABELS_PATH", "/opt/labels.txt"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("BIND_ADDR", "127.0.0.1:3000"),
        ])
        .unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.sagemaker_endpoint, "resnet50");
        assert_eq!(config.labels_path, Some(PathBuf::from("/opt/labels.txt")));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn empty_values_use_defaults() {
        let config = config(&[("UPLOAD_BUCKET", ""), ("LABELS_PATH", "")]).unwrap();
        assert_eq!(config.upload_bucket, DEFAULT_BUCKET);
        assert_eq!(config.labels_path, None);
    }

    #[test]
    fn malformed_numbers_name_the_variable() {
        let err = config(&[("MAX_UPLOAD_BYTES", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_BYTES"));
    }
}
