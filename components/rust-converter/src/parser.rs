//! Request body decoding and HTML5 parsing
//!
//! Raw request bodies arrive as bytes with an optional `Content-Type`. They
//! are decoded to UTF-8 (honouring a `charset` parameter through
//! `encoding_rs`) and then handed to html5ever, which builds an `RcDom`
//! following the WHATWG parsing algorithm. Malformed markup never fails to
//! parse; html5ever repairs it the way a browser would.
//!
//! # Examples
//!
//! ```rust
//! use confluence_markdown_converter::parser::{decode_body, parse_html};
//!
//! let text = decode_body(b"<p>caf\xE9</p>", Some("text/html; charset=ISO-8859-1"))
//!     .expect("latin-1 decodes");
//! assert_eq!(text, "<p>caf\u{e9}</p>");
//!
//! let dom = parse_html(&text);
//! assert!(!dom.document.children.borrow().is_empty());
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::ConversionError;

const DEFAULT_CHARSET: &str = "UTF-8";

/// Extract the `charset` parameter of a Content-Type value
///
/// Accepts quoted and unquoted values, with or without spaces around `=`.
///
/// ```rust
/// use confluence_markdown_converter::parser::charset_from_content_type;
///
/// assert_eq!(
///     charset_from_content_type("text/html; charset=\"windows-1252\""),
///     Some("windows-1252".to_string())
/// );
/// assert_eq!(charset_from_content_type("application/json"), None);
/// ```
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    static CHARSET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex =
        CHARSET_REGEX.get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok());
    let regex = regex.as_ref()?;

    regex
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode a request body to a UTF-8 string
///
/// The charset comes from `content_type` when it carries one and defaults to
/// UTF-8 otherwise. A leading UTF-8 BOM is dropped.
///
/// # Errors
///
/// `ConversionError::EncodingError` when the label is unknown to
/// `encoding_rs` or the bytes are invalid for the charset.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> Result<String, ConversionError> {
    let charset = content_type
        .and_then(charset_from_content_type)
        .unwrap_or_else(|| DEFAULT_CHARSET.to_string());

    if charset.eq_ignore_ascii_case("UTF-8") || charset.eq_ignore_ascii_case("UTF8") {
        let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
        return std::str::from_utf8(body)
            .map(str::to_string)
            .map_err(|e| {
                ConversionError::EncodingError(format!(
                    "Invalid UTF-8 at byte position {}: {}",
                    e.valid_up_to(),
                    e
                ))
            });
    }

    let encoding = encoding_rs::Encoding::for_label(charset.as_bytes()).ok_or_else(|| {
        ConversionError::EncodingError(format!("Unsupported charset '{}'", charset))
    })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                charset
            ))
        })
}

/// Parse an HTML string into a DOM tree
///
/// Always succeeds: fragments get the implied `<html>`, `<head>` and
/// `<body>` elements, unclosed and misnested tags are repaired.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use proptest::prelude::*;

    #[test]
    fn test_charset_from_content_type_variants() {
        assert_eq!(
            charset_from_content_type("text/html; charset=UTF-8"),
            Some("UTF-8".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/html;charset=iso-8859-1"),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/html; CHARSET = \"utf-8\"; boundary=x"),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_decode_defaults_to_utf8() {
        let text = decode_body("<p>\u{2713} ok</p>".as_bytes(), None).expect("valid utf-8");
        assert_eq!(text, "<p>\u{2713} ok</p>");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let text = decode_body(b"\xEF\xBB\xBF<p>x</p>", Some("text/html")).expect("bom");
        assert_eq!(text, "<p>x</p>");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        match decode_body(b"\xFF\xFE<p>x</p>", Some("text/html; charset=utf-8")) {
            Err(ConversionError::EncodingError(msg)) => {
                assert!(msg.contains("byte position 0"), "got: {}", msg)
            }
            other => panic!("Expected EncodingError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_windows_1252() {
        let text = decode_body(b"<p>\x93quoted\x94</p>", Some("text/html; charset=windows-1252"))
            .expect("cp1252");
        assert_eq!(text, "<p>\u{201c}quoted\u{201d}</p>");
    }

    #[test]
    fn test_decode_unknown_charset() {
        match decode_body(b"<p>x</p>", Some("text/html; charset=klingon")) {
            Err(ConversionError::EncodingError(msg)) => assert!(msg.contains("klingon")),
            other => panic!("Expected EncodingError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_fragment_gets_body() {
        let dom = parse_html("<div><p>Content</p></div>");
        let body = dom::find_body(&dom.document).expect("implied body");
        assert_eq!(dom::element_children(&body).len(), 1);
    }

    #[test]
    fn test_parse_repairs_unclosed_table() {
        let dom = parse_html("<table><tr><td>a<td>b");
        let body = dom::find_body(&dom.document).expect("implied body");
        let table = dom::element_children(&body)
            .into_iter()
            .next()
            .expect("table element");
        assert_eq!(dom::tag_name(&table), Some("table".to_string()));
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(html in "\\PC{0,200}") {
            let dom = parse_html(&html);
            prop_assert!(dom::find_body(&dom.document).is_some());
        }

        #[test]
        fn prop_utf8_round_trips(text in "\\PC{0,100}") {
            let decoded = decode_body(text.as_bytes(), Some("text/html; charset=utf-8"));
            prop_assert_eq!(decoded, Ok(text));
        }
    }
}
