//! Table rendering
//!
//! Three renderings exist for a `<table>`:
//!
//! - a GFM pipe table ([`pipe::pipe_table`]), the standard conversion
//! - a flattened pipe table ([`flatten::flatten_table`]) for tables holding
//!   other tables: nested tables are pulled out into numbered blocks after
//!   the outer table and the cell that held them gets a `(See Table N)`
//!   marker
//! - sanitized HTML ([`html::table_html`])
//!
//! [`TableHandler`] picks one according to the options. Failures inside the
//! flattener or the HTML serializer come back as a [`TableFallback`] and the
//! handler falls back to the standard pipe table for that table only.

pub mod flatten;
pub mod html;
pub mod pipe;
pub mod rows;

use std::fmt;

use log::{debug, warn};
use markup5ever_rcdom::Handle;

use crate::converter::{MarkdownConverter, NestedTableHandling, RenderState};
use crate::dom;
use crate::error::ConversionError;
use crate::handlers::{ensure_blank_line, push_spaced, ElementHandler};
use flatten::{flatten_table, ReferenceAllocator};
use html::table_html;
use pipe::pipe_table;

/// Why a table could not get its preferred rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFallback {
    /// The header row has no cells
    NoColumns,
    /// The table nests deeper than the depth limit
    DepthExceeded,
}

impl fmt::Display for TableFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFallback::NoColumns => write!(f, "table has no columns"),
            TableFallback::DepthExceeded => write!(f, "table nesting exceeds the depth limit"),
        }
    }
}

impl std::error::Error for TableFallback {}

/// `<table>` handler installed by [`MarkdownConverter::with_options`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TableHandler;

impl ElementHandler for TableHandler {
    fn handle(
        &self,
        converter: &MarkdownConverter,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError> {
        if state.single_line {
            push_spaced(output, &dom::text_content(node));
            return Ok(());
        }

        let rendered = render_table(converter, node, state)?;
        write_table_block(output, &rendered);
        Ok(())
    }
}

fn render_table(
    converter: &MarkdownConverter,
    node: &Handle,
    state: RenderState,
) -> Result<String, ConversionError> {
    let options = converter.options();
    let security = converter.security();

    // Too deep for the recursive helpers; the pipe table reports the depth
    // error through the normal render path.
    let budget = security.max_depth().saturating_sub(state.depth);
    if dom::subtree_depth(node) > budget {
        warn!("table deeper than {} levels, skipping nested table handling", budget);
        return pipe_table(converter, node, state);
    }

    if options.preserve_tables_as_html {
        debug!("rendering table as html");
        return html_or_pipe(converter, node, state);
    }

    if !dom::contains_table(node) {
        return pipe_table(converter, node, state);
    }

    match options.nested_table_handling {
        NestedTableHandling::Html => {
            debug!("nested table found, rendering as html");
            html_or_pipe(converter, node, state)
        }
        NestedTableHandling::Append => {
            let mut references = ReferenceAllocator::new();
            match flatten_table(node, options, security, state.depth, &mut references) {
                Ok(Some(flattened)) => {
                    debug!(
                        "flattened nested table with {} appended blocks",
                        flattened.blocks.len()
                    );
                    Ok(flattened.to_markdown())
                }
                Ok(None) => Ok(String::new()),
                Err(reason) => {
                    warn!("nested table flattening failed ({}), using pipe table", reason);
                    pipe_table(converter, node, state)
                }
            }
        }
    }
}

fn html_or_pipe(
    converter: &MarkdownConverter,
    node: &Handle,
    state: RenderState,
) -> Result<String, ConversionError> {
    let options = converter.options();
    match table_html(node, options.sanitize_tables_html, converter.security(), state.depth) {
        Ok(html) => Ok(html),
        Err(reason) => {
            warn!("table html rendering failed ({}), using pipe table", reason);
            pipe_table(converter, node, state)
        }
    }
}

/// Write a rendered table as its own block
pub(crate) fn write_table_block(output: &mut String, table: &str) {
    let table = table.trim();
    if table.is_empty() {
        return;
    }
    ensure_blank_line(output);
    output.push_str(table);
    output.push_str("\n\n");
}
