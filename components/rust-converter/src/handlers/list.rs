//! `<ul>`, `<ol>` and `<li>`

use markup5ever_rcdom::Handle;

use super::{ensure_blank_line, ensure_newline, push_spaced};
use crate::converter::{collapse_whitespace, MarkdownConverter, RenderState};
use crate::dom;
use crate::error::ConversionError;

/// Ordered or unordered list, nested lists indented by two spaces per level
pub fn list_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    if state.single_line {
        let text = converter.render_inline(node, state)?;
        push_spaced(output, &text);
        return Ok(());
    }

    if state.list_depth == 0 {
        ensure_blank_line(output);
    } else {
        ensure_newline(output);
    }

    let ordered = dom::is_element(node, "ol");
    let mut number = dom::attr(node, "start")
        .and_then(|start| start.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let item_state = state.descend();

    for child in dom::element_children(node) {
        if dom::is_element(&child, "li") {
            let marker = if ordered {
                let marker = format!("{}.", number);
                number += 1;
                marker
            } else {
                "-".to_string()
            };
            render_item(converter, &child, output, item_state, &marker)?;
        } else if is_list(&child) {
            // a list directly inside a list nests under the previous item
            list_handler(converter, &child, output, item_state.nested_list())?;
        }
    }

    if state.list_depth == 0 {
        output.push('\n');
    }
    Ok(())
}

/// `<li>` found outside a list
pub fn list_item_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    if state.single_line {
        let text = converter.render_inline(node, state)?;
        push_spaced(output, &text);
        return Ok(());
    }
    ensure_newline(output);
    render_item(converter, node, output, state, "-")
}

fn render_item(
    converter: &MarkdownConverter,
    item: &Handle,
    output: &mut String,
    state: RenderState,
    marker: &str,
) -> Result<(), ConversionError> {
    converter
        .security()
        .validate_depth(state.depth)
        .map_err(ConversionError::InternalError)?;

    let child_state = state.descend();
    let mut line = String::new();
    let mut nested = Vec::new();

    for child in item.children.borrow().iter() {
        if is_list(child) {
            nested.push(child.clone());
        } else {
            converter.render_node(child, &mut line, child_state.as_single_line())?;
        }
    }

    output.push_str(&"  ".repeat(state.list_depth));
    output.push_str(marker);
    let line = collapse_whitespace(&line);
    if !line.is_empty() {
        output.push(' ');
        output.push_str(&line);
    }
    output.push('\n');

    for list in nested {
        list_handler(converter, &list, output, child_state.nested_list())?;
    }
    Ok(())
}

fn is_list(node: &Handle) -> bool {
    dom::is_element(node, "ul") || dom::is_element(node, "ol")
}
