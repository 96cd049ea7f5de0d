// packages/store/src/record/mod.rs
//! Captured HTTP response records
//!
//! - **Method / StatusCode**: validated request verb and response status
//! - **ResponseRecord**: the immutable record held by the stores
//! - **Readable JSON**: text-first encoding with base64 fallback
//! - **Parser**: raw HTTP/1.x bytes to record

pub mod method;
pub mod parser;
pub mod readable;
pub mod response;
pub mod status;

// Re-export commonly used types
pub use method::{validate_method, Method};
pub use parser::{parse_raw_response, parse_str_response};
pub use readable::is_text_content;
pub use response::{RecordConfig, ResponseRecord};
pub use status::{is_success, validate_status_code, StatusCode};
