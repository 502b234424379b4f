//! Document title and download filename
//!
//! The Markdown is served as an attachment named after the page's `<title>`:
//!
//! ```rust
//! use confluence_markdown_converter::metadata::{extract_title, filename_from_title};
//! use confluence_markdown_converter::parser::parse_html;
//!
//! let dom = parse_html("<html><head><title> Release Notes: v2.1 </title></head></html>");
//! let title = extract_title(&dom);
//! assert_eq!(title.as_deref(), Some("Release Notes: v2.1"));
//! assert_eq!(filename_from_title(title.as_deref()), "Release-Notes-v21.md");
//! ```

use std::sync::OnceLock;

use markup5ever_rcdom::RcDom;
use regex::Regex;

use crate::dom;

/// Filename used when the document has no usable title
pub const DEFAULT_FILENAME: &str = "converted.md";

/// Metadata carried alongside the converted Markdown
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    /// Trimmed text of the first `<title>` element
    pub title: Option<String>,
}

impl PageMetadata {
    /// Read the metadata of a parsed document
    pub fn extract(dom: &RcDom) -> Self {
        Self {
            title: extract_title(dom),
        }
    }

    /// Download filename for this page
    pub fn filename(&self) -> String {
        filename_from_title(self.title.as_deref())
    }
}

/// Text of the first `<title>` element, trimmed; `None` when missing or blank
pub fn extract_title(dom: &RcDom) -> Option<String> {
    let title = dom::find_first(&dom.document, "title")?;
    let text = dom::raw_text(&title);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Turn a title into a `.md` filename
///
/// Characters other than word characters, whitespace and `-` are removed,
/// then runs of whitespace and hyphens become a single `-`.
pub fn filename_from_title(title: Option<&str>) -> String {
    static UNSAFE_CHARS: OnceLock<Option<Regex>> = OnceLock::new();
    static SEPARATORS: OnceLock<Option<Regex>> = OnceLock::new();

    let Some(title) = title else {
        return DEFAULT_FILENAME.to_string();
    };

    let mut name = title.trim().to_string();
    if let Some(regex) = UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^\w\s-]").ok()) {
        name = regex.replace_all(&name, "").into_owned();
    }
    if let Some(regex) = SEPARATORS.get_or_init(|| Regex::new(r"[-\s]+").ok()) {
        name = regex.replace_all(&name, "-").into_owned();
    }

    if name.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("{}.md", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_extract_title() {
        let dom = parse_html("<html><head><title>Space Home</title></head><body>x</body></html>");
        assert_eq!(extract_title(&dom), Some("Space Home".to_string()));
    }

    #[test]
    fn test_missing_or_blank_title() {
        assert_eq!(extract_title(&parse_html("<p>no head</p>")), None);
        assert_eq!(extract_title(&parse_html("<title>   </title>")), None);
    }

    #[test]
    fn test_first_title_wins() {
        let dom = parse_html("<title>First</title><body><svg><title>Icon</title></svg></body>");
        assert_eq!(PageMetadata::extract(&dom).title, Some("First".to_string()));
    }

    #[test]
    fn test_filename_derivation() {
        assert_eq!(filename_from_title(Some("Team Space / Design")), "Team-Space-Design.md");
        assert_eq!(filename_from_title(Some("  a - - b  ")), "a-b.md");
        assert_eq!(filename_from_title(Some("Über_Plan 2024")), "Über_Plan-2024.md");
        assert_eq!(filename_from_title(Some("???")), DEFAULT_FILENAME);
        assert_eq!(filename_from_title(None), DEFAULT_FILENAME);
    }

    #[test]
    fn test_page_metadata_filename() {
        let metadata = PageMetadata {
            title: Some("Runbook: On-call".to_string()),
        };
        assert_eq!(metadata.filename(), "Runbook-On-call.md");
        assert_eq!(PageMetadata::default().filename(), DEFAULT_FILENAME);
    }
}
