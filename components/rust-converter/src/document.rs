//! Whole-document conversion pipeline
//!
//! raw HTML → [`sanitize_html`] → [`parse_html`] → [`MarkdownConverter`]
//! (body only) → trim → [`postprocess`]
//!
//! # Examples
//!
//! ```rust
//! use confluence_markdown_converter::document::HtmlConverter;
//!
//! let html = r#"<html><head><title>Design Notes</title></head><body>
//!   <div id="main-header">Confluence chrome</div>
//!   <div id="content" class="view"><h1>Design</h1><p>Body text.</p></div>
//!   <div id="likes-and-labels-container">Like</div>
//! </body></html>"#;
//!
//! let result = HtmlConverter::new().convert_str(html).expect("Conversion failed");
//! assert_eq!(result.markdown, "# Design\n\nBody text.");
//! assert_eq!(result.title.as_deref(), Some("Design Notes"));
//! ```

use log::debug;

use crate::converter::{ConversionOptions, MarkdownConverter};
use crate::error::ConversionError;
use crate::metadata::{filename_from_title, PageMetadata};
use crate::parser::parse_html;
use crate::postprocess::postprocess;
use crate::sanitizer::{cuts_leading_chrome, sanitize_html};

/// Markdown plus the document title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConversion {
    pub markdown: String,
    pub title: Option<String>,
}

impl DocumentConversion {
    /// Download filename derived from the title
    pub fn filename(&self) -> String {
        filename_from_title(self.title.as_deref())
    }
}

/// Runs the full pipeline with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    options: ConversionOptions,
}

impl HtmlConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert an HTML document
    ///
    /// The title is read from the sanitized document. When the sanitizer
    /// cut away everything before the Confluence content div, the `<head>`
    /// went with it and the title is read from the raw document instead.
    pub fn convert_str(&self, html: &str) -> Result<DocumentConversion, ConversionError> {
        let sanitized = sanitize_html(html);
        debug!(
            "sanitized html from {} to {} bytes",
            html.len(),
            sanitized.len()
        );

        let dom = parse_html(&sanitized);
        let metadata = if cuts_leading_chrome(html) {
            PageMetadata::extract(&parse_html(html))
        } else {
            PageMetadata::extract(&dom)
        };

        let converter = MarkdownConverter::with_options(self.options.clone());
        let rendered = converter.convert(&dom)?;
        let markdown = postprocess(rendered.trim());
        debug!("converted document to {} bytes of markdown", markdown.len());

        Ok(DocumentConversion {
            markdown,
            title: metadata.title,
        })
    }
}
