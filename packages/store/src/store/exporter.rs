// packages/store/src/store/exporter.rs
//! Export stored records to various formats
//!
//! Supports:
//! - JSON (readable record form, for analysis)
//! - HAR (HTTP Archive 1.2)
//! - JUnit XML (one test case per record, non-2xx records fail)

use crate::record::{is_text_content, ResponseRecord};
use crate::utils::errors::{Result, StoreError};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON array of readable records
    #[default]
    Json,

    /// HAR (HTTP Archive) format
    Har,

    /// JUnit XML format
    JUnit,
}

/// Exporter for stored records
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export records to a string
    pub fn export(&self, records: &[ResponseRecord]) -> Result<String> {
        debug!("Exporting {} records to {:?} format", records.len(), self.format);

        match self.format {
            ExportFormat::Json => self.export_json(records),
            ExportFormat::Har => self.export_har(records),
            ExportFormat::JUnit => Ok(self.export_junit(records)),
        }
    }

    fn export_json(&self, records: &[ResponseRecord]) -> Result<String> {
        let values = records
            .iter()
            .map(ResponseRecord::to_readable_value)
            .collect::<Result<Vec<_>>>()?;

        serde_json::to_string_pretty(&values)
            .map_err(|e| StoreError::SerializationFailed(format!("JSON export error: {}", e)))
    }

    fn export_har(&self, records: &[ResponseRecord]) -> Result<String> {
        let started = Utc::now().to_rfc3339();

        let har = HarDocument {
            log: HarLog {
                version: "1.2".to_string(),
                creator: HarCreator {
                    name: "respack".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                entries: records
                    .iter()
                    .map(|record| har_entry(record, &started))
                    .collect(),
            },
        };

        serde_json::to_string_pretty(&har)
            .map_err(|e| StoreError::SerializationFailed(format!("HAR export error: {}", e)))
    }

    fn export_junit(&self, records: &[ResponseRecord]) -> String {
        let failures = records.iter().filter(|r| !r.is_successful()).count();

        let cases = records
            .iter()
            .map(|record| {
                let name = xml_escape(&format!("{} {}", record.method, record.url));
                let classname = xml_escape(&record.host);
                if record.is_successful() {
                    format!(r#"  <testcase name="{}" classname="{}"/>"#, name, classname)
                } else {
                    format!(
                        r#"  <testcase name="{}" classname="{}">
    <failure message="{} {}"/>
  </testcase>"#,
                        name,
                        classname,
                        record.status_code,
                        xml_escape(record.detailed_status_code())
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="respack" tests="{}" failures="{}">
{}
</testsuite>"#,
            records.len(),
            failures,
            cases
        )
    }
}

fn har_entry(record: &ResponseRecord, started: &str) -> HarEntry {
    let mut headers: Vec<HarHeader> = record
        .headers
        .iter()
        .map(|(name, value)| HarHeader {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();
    headers.sort_by(|a, b| a.name.cmp(&b.name));

    let (text, encoding) = match std::str::from_utf8(&record.body) {
        Ok(text) if is_text_content(&record.headers) => (text.to_string(), None),
        _ => (BASE64_STANDARD.encode(&record.body), Some("base64".to_string())),
    };

    HarEntry {
        started_date_time: started.to_string(),
        time: 0.0,
        request: HarRequest {
            method: record.method.to_string(),
            url: record.url.clone(),
        },
        response: HarResponse {
            status: record.status_code.as_u16(),
            status_text: record.detailed_status_code().to_string(),
            headers,
            content: HarContent {
                size: record.body_length,
                mime_type: record.header("Content-Type").unwrap_or_default().to_string(),
                text,
                encoding,
            },
        },
    }
}

fn xml_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// HAR format structures
#[derive(Serialize)]
struct HarDocument {
    log: HarLog,
}

#[derive(Serialize)]
struct HarLog {
    version: String,
    creator: HarCreator,
    entries: Vec<HarEntry>,
}

#[derive(Serialize)]
struct HarCreator {
    name: String,
    version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarEntry {
    started_date_time: String,
    time: f64,
    request: HarRequest,
    response: HarResponse,
}

#[derive(Serialize)]
struct HarRequest {
    method: String,
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarResponse {
    status: u16,
    status_text: String,
    headers: Vec<HarHeader>,
    content: HarContent,
}

#[derive(Serialize)]
struct HarHeader {
    name: String,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarContent {
    size: u64,
    mime_type: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Method;
    use std::collections::HashMap;

    fn create_test_records() -> Vec<ResponseRecord> {
        let json = HashMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        vec![
            ResponseRecord::new(
                "https://example.com/ok",
                "example.com",
                Method::Get,
                200,
                Some(json.clone()),
                Some(br#"{"ok":true}"#.to_vec()),
                0,
                None,
            )
            .unwrap(),
            ResponseRecord::new(
                "https://example.com/missing?a=1&b=2",
                "example.com",
                Method::Post,
                404,
                Some(json),
                Some(vec![0xff, 0x00]),
                0,
                None,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_json_export() {
        let exporter = Exporter::new(ExportFormat::Json);
        let json = exporter.export(&create_test_records()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["body"], r#"{"ok":true}"#);
        assert_eq!(value[1]["encoding"]["body"], "base64");
    }

    #[test]
    fn test_har_export() {
        let exporter = Exporter::new(ExportFormat::Har);
        let har = exporter.export(&create_test_records()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&har).unwrap();
        assert_eq!(value["log"]["version"], "1.2");
        assert_eq!(value["log"]["creator"]["name"], "respack");

        let entries = value["log"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["request"]["method"], "GET");
        assert_eq!(entries[1]["response"]["status"], 404);
        assert_eq!(entries[1]["response"]["statusText"], "Not Found");
        assert_eq!(entries[1]["response"]["content"]["encoding"], "base64");
        assert_eq!(entries[0]["response"]["content"]["mimeType"], "application/json");
    }

    #[test]
    fn test_junit_export() {
        let exporter = Exporter::new(ExportFormat::JUnit);
        let xml = exporter.export(&create_test_records()).unwrap();

        assert!(xml.contains("<?xml"));
        assert!(xml.contains(r#"tests="2" failures="1""#));
        assert!(xml.contains(r#"<failure message="404 Not Found"/>"#));
        assert!(xml.contains("a=1&amp;b=2"));
    }

    #[test]
    fn test_empty_export() {
        let exporter = Exporter::new(ExportFormat::Json);
        assert_eq!(exporter.export(&[]).unwrap(), "[]");
    }
}
