// packages/store/src/record/readable.rs
//! Human-readable JSON form of a record
//!
//! `body` is written as plain text when the content type is textual and the
//! bytes are valid UTF-8; `rawResponse` when the bytes are valid UTF-8.
//! Anything else is base64 and named in the `encoding` map so the document
//! can be decoded back without loss.

use crate::record::method::Method;
use crate::record::response::ResponseRecord;
use crate::record::status::StatusCode;
use crate::utils::errors::{Result, StoreError};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BASE64: &str = "base64";

const TEXT_CONTENT_TYPES: [&str; 5] = [
    "text/",
    "application/json",
    "application/xml",
    "application/javascript",
    "application/x-www-form-urlencoded",
];

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldEncoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_response: Option<String>,
}

impl FieldEncoding {
    fn is_empty(&self) -> bool {
        self.body.is_none() && self.raw_response.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadableRecord {
    method: Method,
    status_code: StatusCode,
    url: String,
    host: String,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    body: String,
    body_length: u64,
    #[serde(default)]
    raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "FieldEncoding::is_empty")]
    encoding: FieldEncoding,
}

/// Whether the record's `Content-Type` header names a textual media type
pub fn is_text_content(headers: &HashMap<String, String>) -> bool {
    let content_type = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.to_ascii_lowercase());

    match content_type {
        Some(content_type) => TEXT_CONTENT_TYPES
            .iter()
            .any(|text_type| content_type.contains(text_type)),
        None => false,
    }
}

impl ResponseRecord {
    /// Build the readable JSON value for this record
    pub fn to_readable_value(&self) -> Result<serde_json::Value> {
        let mut encoding = FieldEncoding::default();

        let body = match std::str::from_utf8(&self.body) {
            Ok(text) if is_text_content(&self.headers) => text.to_string(),
            _ => {
                encoding.body = Some(BASE64.to_string());
                BASE64_STANDARD.encode(&self.body)
            }
        };

        let raw_response = self.raw_response.as_deref().map(|raw| match std::str::from_utf8(raw) {
            Ok(text) => text.to_string(),
            Err(_) => {
                encoding.raw_response = Some(BASE64.to_string());
                BASE64_STANDARD.encode(raw)
            }
        });

        let readable = ReadableRecord {
            method: self.method,
            status_code: self.status_code,
            url: self.url.clone(),
            host: self.host.clone(),
            headers: self.headers.clone(),
            body,
            body_length: self.body_length,
            raw_response,
            encoding,
        };

        serde_json::to_value(readable)
            .map_err(|e| StoreError::SerializationFailed(format!("readable JSON error: {}", e)))
    }

    /// Encode to readable JSON bytes
    pub fn to_readable_json(&self) -> Result<Vec<u8>> {
        let value = self.to_readable_value()?;
        serde_json::to_vec(&value)
            .map_err(|e| StoreError::SerializationFailed(format!("readable JSON error: {}", e)))
    }

    /// Decode a document produced by [`ResponseRecord::to_readable_json`]
    pub fn from_readable_json(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(StoreError::EmptyInput("input JSON data is empty".to_string()));
        }

        let readable: ReadableRecord = serde_json::from_slice(data).map_err(|e| {
            StoreError::DeserializationFailed(format!("failed to unmarshal readable record: {}", e))
        })?;

        let body = decode_field(readable.body, readable.encoding.body.as_deref(), "body")?;
        let raw_response = readable
            .raw_response
            .map(|raw| decode_field(raw, readable.encoding.raw_response.as_deref(), "rawResponse"))
            .transpose()?;

        Ok(ResponseRecord {
            method: readable.method,
            status_code: readable.status_code,
            url: readable.url,
            host: readable.host,
            headers: readable.headers,
            body,
            body_length: readable.body_length,
            raw_response,
        })
    }
}

fn decode_field(value: String, encoding: Option<&str>, field: &str) -> Result<Vec<u8>> {
    match encoding {
        None => Ok(value.into_bytes()),
        Some(BASE64) => BASE64_STANDARD.decode(value.as_bytes()).map_err(|e| {
            StoreError::DeserializationFailed(format!("invalid base64 in {}: {}", field, e))
        }),
        Some(other) => Err(StoreError::DeserializationFailed(format!(
            "unsupported encoding {:?} for {}",
            other, field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content_type: Option<&str>, body: &[u8], raw: Option<&[u8]>) -> ResponseRecord {
        let headers = content_type.map(|value| {
            HashMap::from([("Content-Type".to_string(), value.to_string())])
        });
        ResponseRecord::new(
            "https://example.com",
            "example.com",
            Method::Get,
            200,
            headers,
            Some(body.to_vec()),
            0,
            raw.map(|raw| raw.to_vec()),
        )
        .unwrap()
    }

    #[test]
    fn test_text_content_detection() {
        let mut headers = HashMap::new();
        assert!(!is_text_content(&headers));

        headers.insert("Content-Type".to_string(), "Application/JSON; charset=utf-8".to_string());
        assert!(is_text_content(&headers));

        headers.insert("Content-Type".to_string(), "image/png".to_string());
        assert!(!is_text_content(&headers));
    }

    #[test]
    fn test_text_body_stays_plain() {
        let record = record(Some("application/json"), br#"{"ok":true}"#, Some(b"HTTP/1.1 200 OK"));
        let value = record.to_readable_value().unwrap();

        assert_eq!(value["body"], r#"{"ok":true}"#);
        assert_eq!(value["rawResponse"], "HTTP/1.1 200 OK");
        assert!(value.get("encoding").is_none());
    }

    #[test]
    fn test_binary_fields_are_base64() {
        let binary = [0xff, 0xfe, 0x00, 0x80];
        let record = record(Some("image/png"), &binary, Some(&binary));
        let value = record.to_readable_value().unwrap();

        assert_eq!(value["encoding"]["body"], "base64");
        assert_eq!(value["encoding"]["rawResponse"], "base64");
        assert_eq!(value["body"], BASE64_STANDARD.encode(binary));
    }

    #[test]
    fn test_utf8_body_without_text_type_is_marked() {
        let record = record(None, b"plain words", None);
        let value = record.to_readable_value().unwrap();
        assert_eq!(value["encoding"]["body"], "base64");
        assert!(value["rawResponse"].is_null());
    }

    #[test]
    fn test_readable_json_decodes_back() {
        let binary = [0x00, 0x9f, 0x92, 0x96, 0xff];
        for original in [
            record(Some("text/html"), b"<html></html>", Some(b"HTTP/1.1 200 OK\r\n\r\n")),
            record(Some("application/octet-stream"), &binary, Some(&binary)),
            record(None, b"", None),
        ] {
            let json = original.to_readable_json().unwrap();
            let decoded = ResponseRecord::from_readable_json(&json).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let doc = br#"{"method":"GET","statusCode":200,"url":"u","host":"h","body":"x","bodyLength":1,"encoding":{"body":"rot13"}}"#;
        assert!(matches!(
            ResponseRecord::from_readable_json(doc),
            Err(StoreError::DeserializationFailed(_))
        ));
    }
}
