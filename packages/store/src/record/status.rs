// packages/store/src/record/status.rs
//! Validated HTTP status codes
//!
//! Only registered status codes (those with a canonical reason phrase) are
//! accepted. Success means the 2xx range.

use crate::utils::errors::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const TOO_MANY_REQUESTS: StatusCode = StatusCode(429);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    /// Validate and wrap a numeric code
    pub fn new(code: u16) -> Result<Self> {
        validate_status_code(code)?;
        Ok(StatusCode(code))
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// True for the 2xx range
    pub fn is_success(&self) -> bool {
        is_success(self.0)
    }

    /// Reason phrase, e.g. "Not Found" for 404
    pub fn canonical_reason(&self) -> &'static str {
        http::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = StoreError;

    fn try_from(code: u16) -> Result<Self> {
        StatusCode::new(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.0
    }
}

/// Accept only status codes with a registered reason phrase
pub fn validate_status_code(code: u16) -> Result<()> {
    let registered = http::StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .is_some();

    if registered {
        Ok(())
    } else {
        Err(StoreError::ValidationFailed(format!(
            "invalid HTTP status code: {}",
            code
        )))
    }
}

pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}
