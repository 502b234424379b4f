//! Links
//!
//! The standard registry maps `<a>` to [`plain_link_handler`], which writes
//! the href as found. The converter replaces it with [`LinkHandler`]:
//!
//! - hrefs whose scheme is not `http`, `https` or `file` are dropped and the
//!   link renders as its text
//! - the path part of the href is percent-escaped (decoded first, so already
//!   escaped paths are not escaped twice)
//! - a link whose text equals its href becomes an autolink `<href>`
//! - with `default_title` the href doubles as the title

use log::debug;
use markup5ever_rcdom::Handle;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{chomp, push_padded, ElementHandler};
use crate::converter::{MarkdownConverter, RenderState};
use crate::dom;
use crate::error::ConversionError;
use crate::security::url_scheme;

/// Characters left alone when escaping a URL path
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Link handler with scheme filtering and URI escaping
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHandler;

impl ElementHandler for LinkHandler {
    fn handle(
        &self,
        converter: &MarkdownConverter,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError> {
        let rendered = converter.render_to_string(node, state.as_inline())?;
        let (prefix, text, suffix) = chomp(&rendered);
        if text.is_empty() {
            return Ok(());
        }

        if dom::has_ancestor(node, "pre") {
            push_padded(output, prefix, &text, suffix);
            return Ok(());
        }

        let href = match dom::attr(node, "href").filter(|href| !href.is_empty()) {
            Some(href) => href,
            None => {
                push_padded(output, prefix, &text, suffix);
                return Ok(());
            }
        };

        if !converter.security().is_allowed_link(&href) {
            debug!("dropping href with disallowed scheme: {}", href);
            push_padded(output, prefix, &text, suffix);
            return Ok(());
        }

        let href = escape_url_path(&href);
        let mut title = dom::attr(node, "title").filter(|title| !title.is_empty());
        let options = converter.options();

        // text nodes arrive with `_` escaped
        if options.autolinks
            && text.replace("\\_", "_") == href
            && title.is_none()
            && !options.default_title
        {
            push_padded(output, prefix, &format!("<{}>", href), suffix);
            return Ok(());
        }

        if options.default_title && title.is_none() {
            title = Some(href.clone());
        }

        let link = format_link(&text, &href, title.as_deref());
        push_padded(output, prefix, &link, suffix);
        Ok(())
    }
}

/// `<a>` without any filtering: `[text](href)`, or the text alone when
/// there is no href
pub fn plain_link_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    let rendered = converter.render_to_string(node, state.as_inline())?;
    let (prefix, text, suffix) = chomp(&rendered);
    if text.is_empty() {
        return Ok(());
    }

    match dom::attr(node, "href").filter(|href| !href.is_empty()) {
        Some(href) => {
            let title = dom::attr(node, "title").filter(|title| !title.is_empty());
            let link = format_link(&text, &href, title.as_deref());
            push_padded(output, prefix, &link, suffix);
        }
        None => push_padded(output, prefix, &text, suffix),
    }
    Ok(())
}

fn format_link(text: &str, href: &str, title: Option<&str>) -> String {
    match title {
        Some(title) => format!("[{}]({} \"{}\")", text, href, title.replace('"', "\\\"")),
        None => format!("[{}]({})", text, href),
    }
}

/// Percent-escape the path component of a URL
///
/// The scheme, authority, `;params`, query and fragment are kept as they
/// are. The path is percent-decoded first, then everything except ASCII
/// letters, digits and `_.-~/` is escaped.
///
/// ```
/// use confluence_markdown_converter::handlers::link::escape_url_path;
///
/// assert_eq!(
///     escape_url_path("https://wiki.example.com/display/My Space/Page?a=b c#top"),
///     "https://wiki.example.com/display/My%20Space/Page?a=b c#top"
/// );
/// assert_eq!(escape_url_path("docs/a%20b.html"), "docs/a%20b.html");
/// ```
pub fn escape_url_path(url: &str) -> String {
    let mut rest = url;
    let mut head = String::new();

    if let Some(scheme) = url_scheme(url) {
        let split = scheme.len() + 1;
        head.push_str(&url[..split]);
        rest = &url[split..];
    }

    if let Some(after_slashes) = rest.strip_prefix("//") {
        let end = after_slashes
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(after_slashes.len());
        head.push_str("//");
        head.push_str(&after_slashes[..end]);
        rest = &after_slashes[end..];
    }

    let mut path_end = rest.find(|c| matches!(c, '?' | '#')).unwrap_or(rest.len());
    let last_segment = rest[..path_end].rfind('/').map(|slash| slash + 1).unwrap_or(0);
    if let Some(params) = rest[last_segment..path_end].find(';') {
        path_end = last_segment + params;
    }

    let (path, tail) = rest.split_at(path_end);
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let escaped = utf8_percent_encode(&decoded, PATH_SAFE).to_string();

    format!("{}{}{}", head, escaped, tail)
}
