//! Request/response envelope
//!
//! A request carries the HTML either directly (`Content-Type: text/html`)
//! or as the `html` field of a JSON object. The response is the Markdown
//! with download headers, or a JSON error body:
//!
//! | Situation | Status |
//! |---|---|
//! | Converted | 200 |
//! | Malformed JSON, missing/empty/non-string `html`, undecodable body | 400 |
//! | Conversion failed or panicked | 500 |
//!
//! ```rust
//! use confluence_markdown_converter::handler::{handle_request, ConversionRequest};
//!
//! let request = ConversionRequest::json(r#"{"html": "<title>Hello World</title><p>Hi</p>"}"#);
//! let response = handle_request(&request);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_text(), "Hi");
//! assert_eq!(
//!     response.header("Content-Disposition"),
//!     Some("attachment; filename=\"Hello-World.md\"")
//! );
//! ```

use std::panic::{self, AssertUnwindSafe};

use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::document::HtmlConverter;
use crate::error::ConversionError;
use crate::parser::decode_body;

const MISSING_HTML: &str =
    "Missing HTML content. Provide HTML string with Content-Type: text/html or JSON with \"html\" field.";

/// An incoming conversion request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionRequest {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ConversionRequest {
    /// A `text/html` request
    pub fn html(html: &str) -> Self {
        Self {
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: html.as_bytes().to_vec(),
        }
    }

    /// An `application/json` request
    pub fn json(json: &str) -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            body: json.as_bytes().to_vec(),
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Markdown(String),
    Error(ErrorBody),
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl ConversionResponse {
    fn markdown(markdown: String, filename: &str) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), "text/markdown".to_string()),
                (
                    "Content-Disposition".to_string(),
                    format!("attachment; filename=\"{}\"", filename),
                ),
                ("Cache-Control".to_string(), "no-cache".to_string()),
            ],
            body: ResponseBody::Markdown(markdown),
        }
    }

    fn error(status: u16, message: String) -> Self {
        let success = if status >= 500 { Some(false) } else { None };
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: ResponseBody::Error(ErrorBody {
                error: message,
                success,
            }),
        }
    }

    fn from_error(err: &ConversionError) -> Self {
        let status = err.status_code();
        let message = match err {
            ConversionError::InvalidJson(_) => err.to_string(),
            _ if status >= 500 => format!("Error converting HTML: {}", err.message()),
            _ => err.message().to_string(),
        };
        if status >= 500 {
            warn!("conversion failed with status {}: {}", status, err);
        }
        Self::error(status, message)
    }

    /// First header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The body as it goes on the wire
    pub fn body_text(&self) -> String {
        match &self.body {
            ResponseBody::Markdown(markdown) => markdown.clone(),
            ResponseBody::Error(body) => serde_json::to_string(body)
                .unwrap_or_else(|_| format!("{{\"error\":{:?}}}", body.error)),
        }
    }
}

/// Handle a request with default conversion options
pub fn handle_request(request: &ConversionRequest) -> ConversionResponse {
    handle_request_with(&HtmlConverter::new(), request)
}

/// Handle a request with the given converter
pub fn handle_request_with(
    converter: &HtmlConverter,
    request: &ConversionRequest,
) -> ConversionResponse {
    let html = match extract_html(request) {
        Ok(html) => html,
        Err(err) => return ConversionResponse::from_error(&err),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| converter.convert_str(&html)));
    match result {
        Ok(Ok(document)) => {
            let filename = document.filename();
            ConversionResponse::markdown(document.markdown, &filename)
        }
        Ok(Err(err)) => ConversionResponse::from_error(&err),
        Err(_) => ConversionResponse::from_error(&ConversionError::InternalError(
            "Internal panic during conversion".to_string(),
        )),
    }
}

/// Pull the HTML out of the request envelope
pub fn extract_html(request: &ConversionRequest) -> Result<String, ConversionError> {
    let content_type = request.content_type.as_deref();
    let is_html = content_type
        .map(|value| value.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false);

    if is_html && !request.body.iter().all(u8::is_ascii_whitespace) {
        return decode_body(&request.body, content_type);
    }

    let envelope: Value = serde_json::from_slice(&request.body)
        .map_err(|e| ConversionError::InvalidJson(e.to_string()))?;

    match envelope.get("html") {
        None => Err(ConversionError::InvalidInput(MISSING_HTML.to_string())),
        Some(Value::Null) => Err(ConversionError::InvalidInput(
            "HTML content is empty".to_string(),
        )),
        Some(Value::String(html)) if html.is_empty() => Err(ConversionError::InvalidInput(
            "HTML content is empty".to_string(),
        )),
        Some(Value::String(html)) => Ok(html.clone()),
        Some(other) => Err(ConversionError::InvalidInput(format!(
            "HTML content must be a string, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
