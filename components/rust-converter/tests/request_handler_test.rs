//! Request envelope, status codes and filenames

use confluence_markdown_converter::handler::{
    handle_request, handle_request_with, ConversionRequest, ResponseBody,
};
use confluence_markdown_converter::{ConversionOptions, HtmlConverter, NestedTableHandling};
use serde_json::{json, Value};

fn json_request(value: Value) -> ConversionRequest {
    ConversionRequest::json(&value.to_string())
}

fn error_body(body: &ResponseBody) -> &str {
    match body {
        ResponseBody::Error(error) => &error.error,
        ResponseBody::Markdown(markdown) => panic!("Expected error body, got markdown: {}", markdown),
    }
}

#[test]
fn test_json_envelope_success() {
    let html = "<html><head><title>Q3 Planning: Goals &amp; Risks</title></head><body><h1>Goals</h1></body></html>";
    let response = handle_request(&json_request(json!({ "html": html })));

    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "# Goals");
    assert_eq!(
        response.header("Content-Disposition"),
        Some("attachment; filename=\"Q3-Planning-Goals-Risks.md\"")
    );
    assert_eq!(response.header("Content-Type"), Some("text/markdown"));
}

#[test]
fn test_raw_html_with_charset() {
    let request = ConversionRequest {
        content_type: Some("TEXT/HTML; Charset=windows-1252".to_string()),
        body: b"<p>\x93quoted\x94</p>".to_vec(),
    };
    let response = handle_request(&request);
    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "\u{201c}quoted\u{201d}");
}

#[test]
fn test_malformed_json() {
    let response = handle_request(&ConversionRequest::json("{\"html\": "));
    assert_eq!(response.status, 400);
    assert!(error_body(&response.body).starts_with("Invalid JSON input: "));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[test]
fn test_missing_content_type_is_treated_as_json() {
    let request = ConversionRequest {
        content_type: None,
        body: br#"{"html": "<p>ok</p>"}"#.to_vec(),
    };
    let response = handle_request(&request);
    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "ok");
}

#[test]
fn test_missing_and_empty_html() {
    let missing = handle_request(&json_request(json!({ "content": "<p>x</p>" })));
    assert_eq!(missing.status, 400);
    assert!(error_body(&missing.body).starts_with("Missing HTML content."));

    let empty = handle_request(&json_request(json!({ "html": "" })));
    assert_eq!(empty.status, 400);
    assert_eq!(error_body(&empty.body), "HTML content is empty");
}

#[test]
fn test_error_body_wire_format() {
    let response = handle_request(&json_request(json!({ "html": "" })));
    let wire: Value = serde_json::from_str(&response.body_text()).expect("json body");
    assert_eq!(wire, json!({ "error": "HTML content is empty" }));
}

#[test]
fn test_server_error_wire_format() {
    let html = format!("{}deep{}", "<span>".repeat(1200), "</span>".repeat(1200));
    let response = handle_request(&ConversionRequest::html(&html));
    assert_eq!(response.status, 500);

    let wire: Value = serde_json::from_str(&response.body_text()).expect("json body");
    assert_eq!(wire["success"], json!(false));
    assert!(
        wire["error"]
            .as_str()
            .unwrap_or_default()
            .starts_with("Error converting HTML: ")
    );
}

#[test]
fn test_handler_uses_given_options() {
    let converter = HtmlConverter::with_options(ConversionOptions {
        nested_table_handling: NestedTableHandling::Html,
        ..Default::default()
    });
    let html = "<table><tr><td><table><tr><td>x</td></tr></table></td></tr></table>";
    let response = handle_request_with(&converter, &ConversionRequest::html(html));
    assert_eq!(response.status, 200);
    assert!(response.body_text().starts_with("<table>"));
}

#[test]
fn test_filename_defaults() {
    for html in [
        "<p>no title</p>",
        "<title>   </title><p>blank</p>",
        "<title>!!!</title><p>symbols</p>",
    ] {
        let response = handle_request(&ConversionRequest::html(html));
        assert_eq!(
            response.header("Content-Disposition"),
            Some("attachment; filename=\"converted.md\""),
            "html: {}",
            html
        );
    }
}
