//! Confluence Markdown Converter
//!
//! Converts HTML pages, and Confluence exports in particular, to Markdown.
//! Tables that contain other tables are flattened: the outer table becomes
//! a pipe table and each nested table is appended after it as a numbered
//! block, referenced from the cell that held it.
//!
//! # Architecture
//!
//! - `sanitizer`: regex removal of Confluence chrome before parsing
//! - `parser`: body decoding and HTML5 parsing using html5ever
//! - `dom`: read-only helpers over the parsed tree
//! - `converter`: tree walk and render state
//! - `handlers`: tag → handler registry and the standard handlers
//! - `table`: pipe tables, nested table flattening, HTML passthrough
//! - `postprocess`: whitespace normalization and table row repair
//! - `metadata`: title and download filename
//! - `document`: the whole pipeline for one document
//! - `handler`: request/response envelope
//! - `security`: element skipping, link schemes, depth limits
//!
//! # Example
//!
//! ```rust
//! use confluence_markdown_converter::HtmlConverter;
//!
//! let html = "<table><tr><th>Key</th><th>Value</th></tr>\
//!             <tr><td>k</td><td><table><tr><td>a</td><td>b</td></tr></table></td></tr></table>";
//! let result = HtmlConverter::new().convert_str(html).expect("Conversion failed");
//! assert_eq!(
//!     result.markdown,
//!     "| Key | Value |\n| --- | --- |\n| k | (See Table 1) |\n\n**Table 1:**\n\n| a | b |\n| --- | --- |"
//! );
//! ```

pub mod converter;
pub mod document;
pub mod dom;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod metadata;
pub mod parser;
pub mod postprocess;
pub mod sanitizer;
pub mod security;
pub mod table;

// Re-export main types for convenience
pub use converter::{ConversionOptions, MarkdownConverter, NestedTableHandling, RenderState};
pub use document::{DocumentConversion, HtmlConverter};
pub use error::ConversionError;
pub use handler::{handle_request, ConversionRequest, ConversionResponse};
pub use handlers::{ElementHandler, HandlerRegistry};
pub use parser::parse_html;
pub use table::TableFallback;
