use super::ResultStore;
use crate::error::AdapterError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub struct DynamoDbResultStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoDbResultStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ResultStore for DynamoDbResultStore {
    async fn put_item(&self, item: Map<String, Value>) -> Result<(), AdapterError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(item)))
            .send()
            .await
            .map_err(|e| AdapterError::ResultStore(e.into()))?;
        Ok(())
    }
}

pub fn to_item(object: Map<String, Value>) -> HashMap<String, AttributeValue> {
    object
        .into_iter()
        .map(|(key, value)| (key, to_attribute_value(value)))
        .collect()
}

/// Numbers are sent as their decimal text, so floats are stored exactly as
/// they were written in the request instead of through a binary float.
pub fn to_attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(items) => {
            AttributeValue::L(items.into_iter().map(to_attribute_value).collect())
        }
        Value::Object(object) => AttributeValue::M(to_item(object)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_a_saved_result() {
        let body = json!({
            "id": "3f1c",
            "fileName": "dog.png",
            "timestamp": 1718000000000u64,
            "status": "completed",
            "error": null,
            "predictions": [
                { "label": "golden retriever", "confidence": 0.8731 }
            ]
        });
        let Value::Object(object) = body else {
            unreachable!()
        };
        let item = to_item(object);

        assert_eq!(item["id"], AttributeValue::S("3f1c".into()));
        assert_eq!(item["timestamp"], AttributeValue::N("1718000000000".into()));
        assert_eq!(item["error"], AttributeValue::Null(true));

        let AttributeValue::L(predictions) = &item["predictions"] else {
            panic!("predictions should be a list");
        };
        let AttributeValue::M(first) = &predictions[0] else {
            panic!("prediction should be a map");
        };
        assert_eq!(first["confidence"], AttributeValue::N("0.8731".into()));
        assert_eq!(first["label"], AttributeValue::S("golden retriever".into()));
    }

    #[test]
    fn booleans_and_nested_objects() {
        let value = to_attribute_value(json!({ "ok": true, "meta": { "n": -2.5 } }));
        let AttributeValue::M(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["ok"], AttributeValue::Bool(true));
        let AttributeValue::M(meta) = &map["meta"] else {
            panic!("expected a nested map");
        };
        assert_eq!(meta["n"], AttributeValue::N("-2.5".into()));
    }
}
