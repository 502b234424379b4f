//! Sanitized HTML passthrough for tables
//!
//! Serializes a table subtree back to HTML. With sanitizing on:
//!
//! - a `<div>` or `<span>` whose direct children include a table is
//!   unwrapped, keeping its children
//! - table-structural elements keep only `scope`, `colspan` and `rowspan`
//! - whitespace-only text between structural elements is dropped and other
//!   text has its whitespace runs squeezed (except inside `<pre>`)
//!
//! Comments are never written, and neither are elements the renderer skips
//! (`script`, `style` and friends).

use markup5ever_rcdom::{Handle, NodeData};

use super::TableFallback;
use crate::dom;
use crate::security::{SanitizeAction, SecurityValidator};

/// Elements whose attributes are filtered
const STRUCTURAL_ELEMENTS: &[&str] = &[
    "table", "thead", "tbody", "tfoot", "tr", "td", "th", "colgroup", "col",
];

/// Structural elements that only hold other elements
const ROW_CONTAINERS: &[&str] = &["table", "thead", "tbody", "tfoot", "tr", "colgroup"];

const KEPT_ATTRIBUTES: &[&str] = &["scope", "colspan", "rowspan"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Serialize `table` as HTML
///
/// `depth` is the table's depth in the document; the serializer fails with
/// [`TableFallback::DepthExceeded`] once a node goes past the validator's
/// limit.
pub fn table_html(
    table: &Handle,
    sanitize: bool,
    security: &SecurityValidator,
    depth: usize,
) -> Result<String, TableFallback> {
    let mut writer = HtmlWriter {
        sanitize,
        security,
        output: String::new(),
    };
    writer.write_node(table, depth, false, false)?;
    Ok(writer.output)
}

struct HtmlWriter<'a> {
    sanitize: bool,
    security: &'a SecurityValidator,
    output: String,
}

impl HtmlWriter<'_> {
    fn write_node(
        &mut self,
        node: &Handle,
        depth: usize,
        in_pre: bool,
        in_row_container: bool,
    ) -> Result<(), TableFallback> {
        self.security
            .validate_depth(depth)
            .map_err(|_| TableFallback::DepthExceeded)?;

        match node.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag = name.local.as_ref();
                if self.security.check_element(tag) == SanitizeAction::Remove {
                    return Ok(());
                }

                if self.sanitize && is_table_wrapper(node, tag) {
                    return self.write_children(node, depth, in_pre, in_row_container);
                }

                let structural = STRUCTURAL_ELEMENTS.contains(&tag);
                self.output.push('<');
                self.output.push_str(tag);
                for attr in attrs.borrow().iter() {
                    let attr_name = attr.name.local.as_ref();
                    if self.sanitize && structural && !KEPT_ATTRIBUTES.contains(&attr_name) {
                        continue;
                    }
                    self.output.push(' ');
                    self.output.push_str(attr_name);
                    self.output.push_str("=\"");
                    self.output.push_str(&escape_attribute(&attr.value));
                    self.output.push('"');
                }
                self.output.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    return Ok(());
                }

                let in_pre = in_pre || tag == "pre";
                self.write_children(node, depth, in_pre, ROW_CONTAINERS.contains(&tag))?;

                self.output.push_str("</");
                self.output.push_str(tag);
                self.output.push('>');
                Ok(())
            }
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                if !self.sanitize || in_pre {
                    self.output.push_str(&escape_text(&text));
                } else if !(in_row_container && text.trim().is_empty()) {
                    self.output.push_str(&escape_text(&squeeze_whitespace(&text)));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn write_children(
        &mut self,
        node: &Handle,
        depth: usize,
        in_pre: bool,
        in_row_container: bool,
    ) -> Result<(), TableFallback> {
        for child in node.children.borrow().iter() {
            self.write_node(child, depth + 1, in_pre, in_row_container)?;
        }
        Ok(())
    }
}

fn is_table_wrapper(node: &Handle, tag: &str) -> bool {
    (tag == "div" || tag == "span")
        && dom::element_children(node)
            .iter()
            .any(|child| dom::is_element(child, "table"))
}

/// Replace every whitespace run with a single space
fn squeeze_whitespace(text: &str) -> String {
    let mut squeezed = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                squeezed.push(' ');
            }
            in_space = true;
        } else {
            squeezed.push(ch);
            in_space = false;
        }
    }
    squeezed
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
