//! Emphasis

use markup5ever_rcdom::Handle;

use super::{chomp, push_padded};
use crate::converter::{MarkdownConverter, RenderState};
use crate::error::ConversionError;

/// `<strong>`, `<b>`
pub fn bold_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    wrap_emphasis(converter, node, output, state, "**")
}

/// `<em>`, `<i>`
pub fn italic_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    wrap_emphasis(converter, node, output, state, "*")
}

fn wrap_emphasis(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
    markup: &str,
) -> Result<(), ConversionError> {
    let rendered = converter.render_to_string(node, state)?;
    let (prefix, text, suffix) = chomp(&rendered);

    if text.is_empty() {
        push_padded(output, prefix, "", "");
        return Ok(());
    }

    let body = format!("{markup}{text}{markup}");
    push_padded(output, prefix, &body, suffix);
    Ok(())
}
