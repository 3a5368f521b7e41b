//! Turns a raw inference response into ranked, labeled predictions.

use crate::{error::ParseError, labels::LabelTable};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TOP_K: usize = 3;

const SCORE_KEYS: [&str; 2] = ["predictions", "probabilities"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreShape {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}

pub fn post_process(body: &[u8], labels: &LabelTable) -> Result<Vec<Prediction>, ParseError> {
    let scores = decode_scores(body)?;
    Ok(top_predictions(&scores, labels, TOP_K))
}

/// Extracts the score vector from `{"predictions": ...}` or
/// `{"probabilities": ...}`, unwrapping one level of batch nesting.
pub fn decode_scores(body: &[u8]) -> Result<Vec<f64>, ParseError> {
    let parsed: Value = serde_json::from_slice(body)?;
    let mut object = match parsed {
        Value::Object(object) => object,
        _ => return Err(ParseError::NotAnObject),
    };

    let (key, value) = SCORE_KEYS
        .iter()
        .find_map(|&key| match object.remove(key) {
            Some(value) if has_scores(&value) => Some((key, value)),
            _ => None,
        })
        .ok_or(ParseError::MissingScores)?;

    let scores = match serde_json::from_value(value) {
        Ok(ScoreShape::Flat(scores)) => scores,
        Ok(ScoreShape::Nested(rows)) => rows.into_iter().next().unwrap_or_default(),
        Err(_) => return Err(ParseError::InvalidScores { key }),
    };

    if scores.is_empty() {
        return Err(ParseError::EmptyScores);
    }
    Ok(scores)
}

// Falsy values (null, false, 0, "", [], {}) fall through to the next key.
fn has_scores(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}

/// Highest `k` scores, descending. Equal scores keep index order.
pub fn top_predictions(scores: &[f64], labels: &LabelTable, k: usize) -> Vec<Prediction> {
    scores
        .iter()
        .copied()
        .enumerate()
        .sorted_by(|(_, a), (_, b)| b.total_cmp(a))
        .take(k)
        .map(|(index, score)| Prediction {
            label: labels.label_for(index),
            confidence: round_confidence(score),
        })
        .collect()
}

/// Rounds the exact binary value to 4 decimal places. Scaling by 10^4 first
/// would round twice and push values like 0.00045 the wrong way.
fn round_confidence(score: f64) -> f64 {
    format!("{score:.4}").parse().unwrap_or(score)
}
