//! Row and cell enumeration
//!
//! Rows come from `<thead>` then `<tbody>` when the table has either, and
//! from the table's own `<tr>` children otherwise. Only direct children are
//! considered at each step, so rows and cells of nested tables are never
//! picked up.

use markup5ever_rcdom::Handle;

use crate::dom;

/// Rows of `table` in order: `<thead>` rows first, then `<tbody>` rows
pub fn table_rows(table: &Handle) -> Vec<Handle> {
    let heads = dom::children_named(table, &["thead"]);
    let bodies = dom::children_named(table, &["tbody"]);

    if heads.is_empty() && bodies.is_empty() {
        return dom::children_named(table, &["tr"]);
    }

    heads
        .iter()
        .chain(bodies.iter())
        .flat_map(|section| dom::children_named(section, &["tr"]))
        .collect()
}

/// `<th>` and `<td>` children of a row
pub fn row_cells(row: &Handle) -> Vec<Handle> {
    dom::children_named(row, &["th", "td"])
}

/// Whether any cell of `row` is a `<th>`
pub fn has_header_cell(row: &Handle) -> bool {
    row_cells(row).iter().any(|cell| dom::is_element(cell, "th"))
}

/// Pad with empty cells or truncate so the row has exactly `width` cells
pub fn fit_to_width(cells: &mut Vec<String>, width: usize) {
    cells.resize(width, String::new());
}
