//! Flattening of tables that contain other tables
//!
//! A nested table cannot live inside a pipe table cell, so the outer table
//! is written with plain cell text and each nested table becomes a numbered
//! block after it:
//!
//! ```text
//! | Key | Value |
//! | --- | --- |
//! | k | (See Table 1) |
//!
//! **Table 1:**
//!
//! | a | b |
//! | --- | --- |
//! ```
//!
//! Numbers come from a [`ReferenceAllocator`] owned by the caller and handed
//! down by mutable reference, so they increase in document order across the
//! body rows, left to right. Header cells keep their own text only; tables
//! inside them are dropped. A cell holding several tables gets one marker
//! for the range, `(See Tables 2-3)`.
//!
//! Every table below a body cell is extracted, at any depth, in document
//! order. A nested table that itself contains tables is written as sanitized
//! HTML (and the tables inside it still get their own blocks after it), as
//! is a nested table without rows.

use markup5ever_rcdom::Handle;

use super::html::table_html;
use super::pipe::{escape_pipes, separator_row, write_row};
use super::rows::{fit_to_width, has_header_cell, row_cells, table_rows};
use super::TableFallback;
use crate::converter::ConversionOptions;
use crate::dom;
use crate::security::SecurityValidator;

/// Hands out nested table numbers, starting at 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAllocator {
    next: usize,
}

impl ReferenceAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next unused number
    pub fn allocate(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Numbers handed out so far
    pub fn allocated(&self) -> usize {
        self.next - 1
    }
}

impl Default for ReferenceAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// One extracted nested table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedTableBlock {
    pub index: usize,
    /// Pipe table or sanitized HTML
    pub body: String,
}

/// A flattened outer table plus the blocks extracted from its cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedTable {
    pub header: Vec<String>,
    /// Body rows, each exactly `header.len()` cells wide
    pub rows: Vec<Vec<String>>,
    /// Extracted tables in allocation order
    pub blocks: Vec<NestedTableBlock>,
}

impl FlattenedTable {
    /// The table lines followed by the `**Table N:**` blocks
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(write_row(&self.header));
        lines.push(separator_row(self.header.len()));
        lines.extend(self.rows.iter().map(|row| write_row(row)));

        let mut markdown = lines.join("\n");
        if !self.blocks.is_empty() {
            let blocks: Vec<String> = self
                .blocks
                .iter()
                .map(|block| format!("**Table {}:**\n\n{}", block.index, block.body.trim()))
                .collect();
            markdown.push_str("\n\n");
            markdown.push_str(&blocks.join("\n\n"));
        }
        markdown
    }
}

/// Flatten `table`
///
/// `depth` is the table's depth in the document, used for the HTML
/// rendering of deeper nested tables. Returns `Ok(None)` for a table
/// without rows.
///
/// # Errors
///
/// [`TableFallback::NoColumns`] when the first row has no cells, and
/// [`TableFallback::DepthExceeded`] when a nested table is too deep to
/// serialize.
pub fn flatten_table(
    table: &Handle,
    options: &ConversionOptions,
    security: &SecurityValidator,
    depth: usize,
    references: &mut ReferenceAllocator,
) -> Result<Option<FlattenedTable>, TableFallback> {
    let rows = table_rows(table);
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut flattener = CellFlattener {
        options,
        security,
        depth,
        references,
        blocks: Vec::new(),
    };

    let (header, body_rows) = if has_header_cell(first) {
        let header: Vec<String> = row_cells(first)
            .iter()
            .map(|cell| escape_pipes(&dom::text_without_tables(cell)))
            .collect();
        (header, &rows[1..])
    } else {
        (vec![String::new(); row_cells(first).len()], &rows[..])
    };

    if header.is_empty() {
        return Err(TableFallback::NoColumns);
    }

    let mut flattened_rows = Vec::with_capacity(body_rows.len());
    for row in body_rows {
        let mut cells = flattener.row(row)?;
        fit_to_width(&mut cells, header.len());
        flattened_rows.push(cells);
    }

    Ok(Some(FlattenedTable {
        header,
        rows: flattened_rows,
        blocks: flattener.blocks,
    }))
}

/// `(See Table N)` or `(See Tables N-M)`
pub fn reference_marker(first: usize, last: usize) -> String {
    if first == last {
        format!("(See Table {})", first)
    } else {
        format!("(See Tables {}-{})", first, last)
    }
}

struct CellFlattener<'a> {
    options: &'a ConversionOptions,
    security: &'a SecurityValidator,
    depth: usize,
    references: &'a mut ReferenceAllocator,
    blocks: Vec<NestedTableBlock>,
}

impl CellFlattener<'_> {
    fn row(&mut self, row: &Handle) -> Result<Vec<String>, TableFallback> {
        row_cells(row).iter().map(|cell| self.cell(cell)).collect()
    }

    fn cell(&mut self, cell: &Handle) -> Result<String, TableFallback> {
        let text = escape_pipes(&dom::text_without_tables(cell));
        let nested = dom::descendant_tables(cell);
        if nested.is_empty() {
            return Ok(text);
        }

        let mut indices = Vec::with_capacity(nested.len());
        for table in &nested {
            let body = self.nested_block(cell, table)?;
            let index = self.references.allocate();
            self.blocks.push(NestedTableBlock { index, body });
            indices.push(index);
        }

        let first = indices.first().copied().unwrap_or_default();
        let last = indices.last().copied().unwrap_or(first);
        let marker = reference_marker(first, last);
        if text.is_empty() {
            Ok(marker)
        } else {
            Ok(format!("{} {}", text, marker))
        }
    }

    fn nested_block(&self, cell: &Handle, table: &Handle) -> Result<String, TableFallback> {
        let rows = table_rows(table);
        let width = rows.first().map(|row| row_cells(row).len()).unwrap_or(0);

        if width == 0 || dom::contains_table(table) {
            // table > tbody > tr > td puts the cell three levels below the outer table
            let depth = self.depth + 3 + dom::levels_below(cell, table).unwrap_or(1);
            return table_html(
                table,
                self.options.sanitize_tables_html,
                self.security,
                depth,
            );
        }

        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (position, row) in rows.iter().enumerate() {
            let mut cells: Vec<String> = row_cells(row)
                .iter()
                .map(|cell| escape_pipes(&dom::text_without_tables(cell)))
                .collect();
            fit_to_width(&mut cells, width);
            lines.push(write_row(&cells));
            if position == 0 {
                lines.push(separator_row(width));
            }
        }
        Ok(lines.join("\n"))
    }
}
