// packages/store/src/record/response.rs
//! Captured HTTP response record
//!
//! A record is validated at construction and never changes afterwards. Its
//! JSON form carries binary fields as base64 so bodies survive byte-for-byte.

use crate::record::method::Method;
use crate::record::status::StatusCode;
use crate::utils::errors::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single captured HTTP response plus its request metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub method: Method,
    pub status_code: StatusCode,
    pub url: String,
    pub host: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, with = "base64_bytes")]
    pub body: Vec<u8>,
    pub body_length: u64,
    #[serde(default, with = "base64_opt_bytes")]
    pub raw_response: Option<Vec<u8>>,
}

/// Field-by-field input for [`ResponseRecord::from_config`]
#[derive(Debug, Clone, Default)]
pub struct RecordConfig {
    pub url: String,
    pub host: String,
    pub method: Method,
    pub status_code: u16,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<Vec<u8>>,
    pub body_length: u64,
    pub raw_response: Option<Vec<u8>>,
}

impl ResponseRecord {
    /// Build a record, validating the status code.
    ///
    /// Missing headers or body become empty values, and a zero `body_length`
    /// is replaced by the body's actual length.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: impl Into<String>,
        host: impl Into<String>,
        method: Method,
        status_code: u16,
        headers: Option<HashMap<String, String>>,
        body: Option<Vec<u8>>,
        body_length: u64,
        raw_response: Option<Vec<u8>>,
    ) -> Result<Self> {
        let status_code = StatusCode::new(status_code)?;
        let headers = headers.unwrap_or_default();
        let body = body.unwrap_or_default();
        let body_length = if body_length == 0 {
            body.len() as u64
        } else {
            body_length
        };

        Ok(Self {
            method,
            status_code,
            url: url.into(),
            host: host.into(),
            headers,
            body,
            body_length,
            raw_response,
        })
    }

    pub fn from_config(config: RecordConfig) -> Result<Self> {
        Self::new(
            config.url,
            config.host,
            config.method,
            config.status_code,
            config.headers,
            config.body,
            config.body_length,
            config.raw_response,
        )
    }

    /// Decode the standard JSON form
    pub fn from_json(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(StoreError::EmptyInput("input JSON data is empty".to_string()));
        }
        serde_json::from_slice(data).map_err(|e| {
            StoreError::DeserializationFailed(format!("failed to unmarshal record: {}", e))
        })
    }

    /// Encode to the standard JSON form
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| StoreError::SerializationFailed(format!("JSON encoding error: {}", e)))
    }

    pub fn is_successful(&self) -> bool {
        self.status_code.is_success()
    }

    /// Reason phrase for the status, e.g. "OK"
    pub fn detailed_status_code(&self) -> &'static str {
        self.status_code.canonical_reason()
    }

    /// Body as text, replacing invalid UTF-8
    pub fn read_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn read_raw_response(&self) -> String {
        self.raw_response
            .as_deref()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .unwrap_or_default()
    }

    /// Header lookup ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for ResponseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\nUrl: {}", self.url)?;
        write!(f, "\nHost: {}", self.host)?;
        write!(f, "\nMethod: {}", self.method)?;
        write!(f, "\nStatusCode: {}", self.status_code)?;
        write!(f, "\nHeaders:")?;

        let mut headers: Vec<_> = self.headers.iter().collect();
        headers.sort();
        for (key, value) in headers {
            write!(f, "\n{}: {}", key, value)?;
        }

        if !self.body.is_empty() {
            write!(f, "\nBody:{}", self.read_body())?;
        }

        write!(f, "\nBodyLength: {}", self.body_length)
    }
}

pub(crate) mod base64_bytes {
    use base64::prelude::BASE64_STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        // null is accepted for an empty body
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(encoded) => BASE64_STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

pub(crate) mod base64_opt_bytes {
    use base64::prelude::BASE64_STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&BASE64_STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|encoded| {
                BASE64_STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
