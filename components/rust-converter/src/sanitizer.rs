//! Confluence chrome stripping on raw HTML text
//!
//! Confluence page exports wrap the actual page in a lot of markup that has no
//! Markdown equivalent: theme stylesheets, draw.io viewers, base64 previews,
//! the likes/labels footer. This module removes it with plain pattern
//! matching before the document ever reaches the HTML parser.
//!
//! # Steps
//!
//! Applied in this fixed order, every pattern case-insensitive and allowed to
//! span newlines:
//!
//! 1. Keep everything from the first `<div id="content...">` onward
//! 2. Drop everything from the first `<div id="likes-and-labels-container"`
//! 3. Remove `<link rel="stylesheet">` tags
//! 4. Remove `<style>...</style>` blocks
//! 5. Remove inline `style="..."` attributes
//! 6. Remove draw.io macro containers, `<svg>`, `<canvas>` and the
//!    diagram viewer bootstrap `<script>`
//! 7. Remove `<img>` elements whose `src` is a `data:` URI
//! 8. Remove the "draw.io evaluation version" banner
//! 9. Remove `geDiagramContainer` divs
//!
//! A pattern that does not match is a no-op. Sanitizing never fails.
//!
//! # Examples
//!
//! ```rust
//! use confluence_markdown_converter::sanitizer::sanitize_html;
//!
//! let html = r#"<head><style>p{}</style></head><div id="content"><p style="x">Hi</p></div>"#;
//! assert_eq!(sanitize_html(html), r#"<div id="content"><p >Hi</p></div>"#);
//! ```

use regex::Regex;
use std::sync::OnceLock;

type LazyRegex = OnceLock<Option<Regex>>;

/// Compile a hardcoded pattern once; a pattern that fails to compile turns
/// its step into a no-op instead of failing the conversion.
fn cached<'a>(cell: &'a LazyRegex, pattern: &str) -> Option<&'a Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn remove_all(html: String, cell: &LazyRegex, pattern: &str) -> String {
    match cached(cell, pattern) {
        Some(regex) if regex.is_match(&html) => regex.replace_all(&html, "").into_owned(),
        _ => html,
    }
}

static CONTENT_START: LazyRegex = OnceLock::new();
static LIKES_AND_LABELS: LazyRegex = OnceLock::new();
static STYLESHEET_LINK: LazyRegex = OnceLock::new();
static STYLE_BLOCK: LazyRegex = OnceLock::new();
static INLINE_STYLE: LazyRegex = OnceLock::new();
static DRAWIO_MACRO: LazyRegex = OnceLock::new();
static SVG_BLOCK: LazyRegex = OnceLock::new();
static CANVAS_BLOCK: LazyRegex = OnceLock::new();
static VIEWER_SCRIPT: LazyRegex = OnceLock::new();
static DATA_URI_IMG: LazyRegex = OnceLock::new();
static EVALUATION_BANNER: LazyRegex = OnceLock::new();
static DIAGRAM_CONTAINER: LazyRegex = OnceLock::new();

/// Strip Confluence export chrome from raw HTML
///
/// Returns the simplified HTML. Running it again on its own output changes
/// nothing for well-formed exports.
pub fn sanitize_html(html: &str) -> String {
    let mut html = html.to_string();

    if let Some(start) = cached(&CONTENT_START, r#"(?is)<div id="content[^>]*>"#)
        .and_then(|regex| regex.find(&html))
        .map(|found| found.start())
    {
        html.drain(..start);
    }

    if let Some(end) = cached(
        &LIKES_AND_LABELS,
        r#"(?is)<div id="likes-and-labels-container"#,
    )
    .and_then(|regex| regex.find(&html))
    .map(|found| found.start())
    {
        html.truncate(end);
    }

    let html = remove_all(
        html,
        &STYLESHEET_LINK,
        r#"(?is)<link[^>]*rel="stylesheet"[^>]*/?>"#,
    );
    let html = remove_all(html, &STYLE_BLOCK, r"(?is)<style>.*?</style>");
    let html = remove_all(html, &INLINE_STYLE, r#"(?is)style="[^"]*""#);
    let html = remove_all(
        html,
        &DRAWIO_MACRO,
        r#"(?is)<div[^>]*id="drawio-macro-content[^"]*"[^>]*>.*?</div>\s*<script[^>]*>.*?</script>"#,
    );
    let html = remove_all(html, &SVG_BLOCK, r"(?is)<svg[^>]*>.*?</svg>");
    let html = remove_all(html, &CANVAS_BLOCK, r"(?is)<canvas[^>]*>.*?</canvas>");
    let html = remove_all(
        html,
        &VIEWER_SCRIPT,
        r"(?is)<script[^>]*>\s*\(function\(\)\s*\{\s*function startViewer\(\).*?</script>",
    );
    let html = remove_all(
        html,
        &DATA_URI_IMG,
        r#"(?is)<img[^>]*src="data:[^"]*"[^>]*/?>\s*"#,
    );
    let html = remove_all(
        html,
        &EVALUATION_BANNER,
        r"(?is)<span[^>]*>draw\.io evaluation version</span>",
    );
    remove_all(
        html,
        &DIAGRAM_CONTAINER,
        r#"(?is)<div[^>]*class="[^"]*geDiagramContainer[^"]*"[^>]*>.*?</div>"#,
    )
}

/// Whether the content cut (step 1) would drop a prefix of `html`
///
/// The document `<head>` lives in that prefix, so callers use this to decide
/// where the page title has to be read from.
pub fn cuts_leading_chrome(html: &str) -> bool {
    cached(&CONTENT_START, r#"(?is)<div id="content[^>]*>"#)
        .and_then(|regex| regex.find(html))
        .is_some_and(|found| found.start() > 0)
}
