//! Images

use markup5ever_rcdom::Handle;

use super::ElementHandler;
use crate::converter::{MarkdownConverter, RenderState};
use crate::dom;
use crate::error::ConversionError;

/// Image handler aware of inline context and `data:` sources
///
/// In inline context (headings, table cells, links) an image renders as its
/// alt text unless its parent tag is listed in
/// `ConversionOptions::keep_inline_images_in`. A `data:` source is cut down
/// to its media type followed by `...` unless `keep_data_uris` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageHandler;

impl ElementHandler for ImageHandler {
    fn handle(
        &self,
        converter: &MarkdownConverter,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError> {
        let options = converter.options();
        let alt = dom::attr(node, "alt").unwrap_or_default();

        if state.inline {
            let parent = dom::parent_tag(node).unwrap_or_default();
            if !options.keep_inline_images_in.iter().any(|tag| tag == &parent) {
                output.push_str(&alt);
                return Ok(());
            }
        }

        let mut src = dom::attr(node, "src").unwrap_or_default();
        if src.starts_with("data:") && !options.keep_data_uris {
            src = truncate_data_uri(&src);
        }

        let title = dom::attr(node, "title").unwrap_or_default();
        output.push_str(&format_image(&alt, &src, &title));
        Ok(())
    }
}

/// `<img>` as `![alt](src)`, no context rules
pub fn plain_image_handler(
    _converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    _state: RenderState,
) -> Result<(), ConversionError> {
    let alt = dom::attr(node, "alt").unwrap_or_default();
    let src = dom::attr(node, "src").unwrap_or_default();
    let title = dom::attr(node, "title").unwrap_or_default();
    output.push_str(&format_image(&alt, &src, &title));
    Ok(())
}

/// Keep the part of a `data:` URI before the first comma
///
/// ```
/// use confluence_markdown_converter::handlers::image::truncate_data_uri;
///
/// assert_eq!(
///     truncate_data_uri("data:image/png;base64,iVBORw0KGgo="),
///     "data:image/png;base64..."
/// );
/// ```
pub fn truncate_data_uri(src: &str) -> String {
    let head = src.split(',').next().unwrap_or(src);
    format!("{}...", head)
}

fn format_image(alt: &str, src: &str, title: &str) -> String {
    if title.is_empty() {
        format!("![{}]({})", alt, src)
    } else {
        format!("![{}]({} \"{}\")", alt, src, title.replace('"', "\\\""))
    }
}
