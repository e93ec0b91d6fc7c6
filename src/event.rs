//! Edge event shapes for the origin-response trigger.
//!
//! Only the parts the header handler reads are typed. Everything else on a
//! record or a response is carried through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Header name (lowercase) to its value records.
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

/// One value of a header in the provider's multi-value form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Original-case header name. The provider may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: Some(key.into()), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    pub headers: Headers,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    pub fn with_headers(headers: Headers) -> Self {
        Self { status: None, status_description: None, headers, extra: Map::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub cf: CfPayload,
}

/// The invocation payload: a wrapper around `Records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "Records")]
    pub records: Vec<Record>,
}

impl Event {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Wraps a single response the way the provider delivers it.
    pub fn for_response(response: Response) -> Self {
        Self {
            records: vec![Record {
                cf: CfPayload { response: Some(response), extra: Map::new() },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn keeps_unknown_response_fields() {
        let event = Event::from_value(json!({
            "Records": [{"cf": {
                "config": {"distributionId": "EDFDVBD6EXAMPLE"},
                "response": {
                    "status": "200",
                    "statusDescription": "OK",
                    "body": "hello",
                    "headers": {"server": [{"key": "Server", "value": "AmazonS3"}]}
                }
            }}]
        }))
        .unwrap();

        let cf = &event.records[0].cf;
        assert_eq!(cf.extra["config"]["distributionId"], "EDFDVBD6EXAMPLE");
        let response = cf.response.as_ref().unwrap();
        assert_eq!(response.status.as_deref(), Some("200"));
        assert_eq!(response.extra["body"], "hello");
        assert_eq!(response.headers["server"], vec![HeaderEntry::new("Server", "AmazonS3")]);

        let out = serde_json::to_value(response).unwrap();
        assert_eq!(out["statusDescription"], "OK");
        assert_eq!(out["body"], "hello");
    }

    #[test]
    fn header_entry_without_key_round_trips_unchanged() {
        let event = Event::from_value(json!({
            "Records": [{"cf": {"response": {"headers": {
                "x-cache": [{"value": "Miss from cloudfront"}]
            }}}}]
        }))
        .unwrap();

        let response = event.records[0].cf.response.as_ref().unwrap();
        assert_eq!(response.headers["x-cache"][0].key, None);
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"headers": {"x-cache": [{"value": "Miss from cloudfront"}]}})
        );
    }

    #[test]
    fn response_without_headers_is_malformed() {
        let err = Event::from_value(json!({"Records": [{"cf": {"response": {"status": "200"}}}]}))
            .unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn missing_records_is_malformed() {
        let err = Event::from_slice(br#"{"records": []}"#).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }
}
