//! Block-level handlers: headings, paragraphs, containers, breaks, rules and
//! block quotes

use markup5ever_rcdom::Handle;

use super::{ensure_blank_line, push_spaced};
use crate::converter::{collapse_whitespace, MarkdownConverter, RenderState};
use crate::dom;
use crate::error::ConversionError;

/// `<h1>`..`<h6>` in ATX style
///
/// Inside a table cell or link the heading collapses to its text.
pub fn heading_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    let text = converter.render_inline(node, state)?;

    if state.single_line {
        push_spaced(output, &text);
        return Ok(());
    }
    if text.is_empty() {
        return Ok(());
    }

    let level = dom::tag_name(node)
        .and_then(|tag| tag.get(1..).and_then(|digit| digit.parse::<usize>().ok()))
        .unwrap_or(1)
        .clamp(1, 6);

    ensure_blank_line(output);
    output.push_str(&"#".repeat(level));
    output.push(' ');
    output.push_str(&text);
    output.push_str("\n\n");
    Ok(())
}

/// `<p>`
pub fn paragraph_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    render_block(converter, node, output, state)
}

/// `<div>`, `<section>` and the other generic block containers
pub fn container_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    render_block(converter, node, output, state)
}

fn render_block(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    if state.single_line {
        if !output.is_empty() && !output.ends_with(char::is_whitespace) {
            output.push(' ');
        }
        converter.render_children(node, output, state)?;
        output.push(' ');
        return Ok(());
    }

    ensure_blank_line(output);
    let start = output.len();
    converter.render_children(node, output, state)?;
    if output[start..].trim().is_empty() {
        output.truncate(start);
    } else {
        ensure_blank_line(output);
    }
    Ok(())
}

/// `<br>`
pub fn line_break_handler(
    _converter: &MarkdownConverter,
    _node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    if state.single_line {
        output.push(' ');
    } else {
        output.push('\n');
    }
    Ok(())
}

/// `<hr>`
pub fn rule_handler(
    _converter: &MarkdownConverter,
    _node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    if state.single_line {
        output.push(' ');
        return Ok(());
    }
    ensure_blank_line(output);
    output.push_str("---\n\n");
    Ok(())
}

/// `<blockquote>`: every line of the rendered content gets a `>` prefix
pub fn blockquote_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    let content = converter.render_to_string(node, state)?;

    if state.single_line {
        push_spaced(output, &collapse_whitespace(&content));
        return Ok(());
    }

    let content = content.trim();
    if content.is_empty() {
        return Ok(());
    }

    ensure_blank_line(output);
    let quoted: Vec<String> = content
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect();
    output.push_str(&quoted.join("\n"));
    output.push_str("\n\n");
    Ok(())
}
