//! Standard GFM pipe tables
//!
//! The first row is the header when it sits in `<thead>` or has a `<th>`.
//! Otherwise a blank header as wide as the widest row is written so every
//! row shows up as data. Cells are rendered inline, so links, emphasis and
//! code survive, and `colspan` is expanded into empty cells.

use markup5ever_rcdom::Handle;

use super::rows::{fit_to_width, has_header_cell, row_cells, table_rows};
use super::write_table_block;
use crate::converter::{MarkdownConverter, RenderState};
use crate::dom;
use crate::error::ConversionError;
use crate::handlers::push_spaced;

/// Upper bound on `colspan`, as in the HTML table model
const MAX_COLSPAN: usize = 1000;

/// Render `table` as a pipe table, or an empty string when it has no cells
pub fn pipe_table(
    converter: &MarkdownConverter,
    table: &Handle,
    state: RenderState,
) -> Result<String, ConversionError> {
    let rows = table_rows(table);
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    // table > tbody > tr > td
    let cell_state = state.descend().descend().descend();
    let mut rendered = Vec::with_capacity(rows.len());
    for row in &rows {
        rendered.push(render_row(converter, row, cell_state)?);
    }

    let header_present = dom::parent_tag(first).as_deref() == Some("thead") || has_header_cell(first);
    let (mut header, mut body) = if header_present {
        let header = rendered.remove(0);
        (header, rendered)
    } else {
        let width = rendered.iter().map(Vec::len).max().unwrap_or(0);
        (vec![String::new(); width], rendered)
    };

    let width = header.len();
    if width == 0 {
        return Ok(String::new());
    }
    fit_to_width(&mut header, width);

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(write_row(&header));
    lines.push(separator_row(width));
    for cells in body.iter_mut() {
        fit_to_width(cells, width);
        lines.push(write_row(cells));
    }
    Ok(lines.join("\n"))
}

/// `<table>` handler of the standard registry: always a pipe table
pub fn pipe_table_handler(
    converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    if state.single_line {
        push_spaced(output, &dom::text_content(node));
        return Ok(());
    }
    let table = pipe_table(converter, node, state)?;
    write_table_block(output, &table);
    Ok(())
}

fn render_row(
    converter: &MarkdownConverter,
    row: &Handle,
    state: RenderState,
) -> Result<Vec<String>, ConversionError> {
    let mut cells = Vec::new();
    for cell in row_cells(row) {
        let text = converter.render_inline(&cell, state)?;
        cells.push(escape_pipes(&text));

        let span = dom::attr(&cell, "colspan")
            .and_then(|span| span.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        cells.extend(std::iter::repeat_n(String::new(), span - 1));
    }
    Ok(cells)
}

/// Escape `|` so it stays inside its cell
pub fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

/// `| a | b |`
pub(crate) fn write_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// `| --- | --- |`
pub(crate) fn separator_row(width: usize) -> String {
    format!("| {} |", vec!["---"; width].join(" | "))
}
