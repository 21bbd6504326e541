//! Normalises backend responses to `{success, data, message, pagination}`.
//!
//! Not every route wraps its payload. A body without a `success` flag is
//! treated as the data itself.

use opsdesk_core::Pagination;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::transport::RawResponse;

#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
    pub message: Option<String>,
    pub pagination: Option<Pagination>,
}

/// Keys under which list routes nest their rows inside `data`.
const ROW_KEYS: &[&str] =
    &["items", "results", "docs", "tickets", "requests", "employees", "communications", "users"];

impl Envelope {
    pub fn from_response(response: RawResponse) -> Result<Self, ClientError> {
        let body = parse_body(&response.body);

        if !response.is_success() {
            let message = message_of(&body)
                .or_else(|| non_json_text(&response.body))
                .unwrap_or_else(|| format!("request failed with status {}", response.status));
            return Err(ClientError::Server { status: response.status, message });
        }

        let Value::Object(mut object) = body else {
            return Ok(Self { success: true, data: body, message: None, pagination: None });
        };

        let Some(success) = object.get("success").and_then(Value::as_bool) else {
            let pagination = object.get("pagination").and_then(decode_pagination);
            return Ok(Self {
                success: true,
                data: Value::Object(object),
                message: None,
                pagination,
            });
        };

        let message = object.get("message").and_then(Value::as_str).map(str::to_string);
        if !success {
            return Err(ClientError::Rejected {
                message: message.unwrap_or_else(|| "the server declined the request".to_string()),
            });
        }

        let data = object.remove("data").unwrap_or(Value::Null);
        let pagination = object
            .get("pagination")
            .or_else(|| data.get("pagination"))
            .and_then(decode_pagination);

        Ok(Self { success, data, message, pagination })
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        serde_json::from_value(self.data).map_err(|error| ClientError::Decode(error.to_string()))
    }

    /// Rows of a list response, whether `data` is the array itself or an
    /// object holding it.
    pub fn decode_rows<T: DeserializeOwned>(self) -> Result<Vec<T>, ClientError> {
        let rows = match self.data {
            Value::Array(rows) => rows,
            Value::Object(mut object) => ROW_KEYS
                .iter()
                .find_map(|key| match object.remove(*key) {
                    Some(Value::Array(rows)) => Some(rows),
                    _ => None,
                })
                .ok_or_else(|| ClientError::Decode("list response has no rows".to_string()))?,
            Value::Null => Vec::new(),
            other => {
                return Err(ClientError::Decode(format!("expected a list of rows, got {other}")))
            }
        };

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|error| ClientError::Decode(error.to_string()))
            })
            .collect()
    }
}

fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn message_of(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn non_json_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && !trimmed.starts_with('{') && !trimmed.starts_with('['))
        .then(|| trimmed.to_string())
}

fn decode_pagination(value: &Value) -> Option<Pagination> {
    serde_json::from_value(value.clone()).ok()
}
