//! Markdown normalization after rendering
//!
//! The renderer builds Markdown piece by piece and does not try to be tidy
//! about whitespace. This pass makes the result stable:
//!
//! 1. Trailing whitespace is trimmed from every line (`\r\n` becomes `\n`)
//! 2. Runs of three or more newlines collapse to a single blank line
//! 3. Table rows that were broken over several physical lines are merged
//!    back together and their cells re-padded
//!
//! Lines inside ``` fences are never touched by the table repair.

use regex::Regex;
use std::sync::OnceLock;

/// Run the full normalization pass
///
/// # Examples
///
/// ```rust
/// use confluence_markdown_converter::postprocess::postprocess;
///
/// let markdown = "# Title   \r\n\n\n\n| a |  b |\n c |\n";
/// assert_eq!(postprocess(markdown), "# Title\n\n| a | b c |\n");
/// ```
pub fn postprocess(markdown: &str) -> String {
    let trimmed = trim_line_ends(markdown);
    let collapsed = collapse_blank_lines(&trimmed);
    repair_table_rows(&collapsed)
}

/// Trim trailing whitespace from each line, normalizing line endings to `\n`
pub fn trim_line_ends(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse three or more consecutive newlines to exactly two
pub fn collapse_blank_lines(markdown: &str) -> String {
    static BLANK_RUN: OnceLock<Option<Regex>> = OnceLock::new();
    match BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").ok()) {
        Some(regex) => regex.replace_all(markdown, "\n\n").into_owned(),
        None => markdown.to_string(),
    }
}

/// Merge table rows split across lines and normalize their cells
///
/// A line that starts and ends with `|` (and is more than a lone pipe) opens
/// a row. Following lines are
/// folded into that row's last cell while they contain a pipe, are not a
/// separator row, and are not a complete row at least as wide as the one
/// being built. Every row is then rewritten with exactly one space of
/// padding around each cell's collapsed text. Escaped pipes (`\|`) are cell
/// content, not delimiters.
pub fn repair_table_rows(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_fence(line) {
            in_fence = !in_fence;
            result.push(line.to_string());
            i += 1;
            continue;
        }

        if in_fence || !looks_like_row(line) {
            result.push(line.to_string());
            i += 1;
            continue;
        }

        let mut row = line.to_string();
        let mut j = i + 1;
        while j < lines.len() {
            let next = lines[j].trim();

            if next.is_empty() || !next.contains('|') || is_fence(next) || is_separator(next) {
                break;
            }
            if looks_like_row(next) && count_pipes(next) >= count_pipes(&row) {
                break;
            }

            let open_row = row.trim_end();
            let open_row = open_row.strip_suffix('|').unwrap_or(open_row).trim_end();
            row = format!("{} {}", open_row, next);
            if !row.ends_with('|') {
                row.push_str(" |");
            }
            j += 1;
        }

        result.push(clean_table_row(&row));
        i = j;
    }

    result.join("\n")
}

/// Re-pad every cell of a single table row
///
/// Text before the first and after the last delimiter is kept as-is.
pub fn clean_table_row(row: &str) -> String {
    if row.trim().is_empty() || !row.contains('|') {
        return row.to_string();
    }

    let parts = split_unescaped_pipes(row);
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            if index == 0 || index == last {
                part.to_string()
            } else {
                let words: Vec<&str> = part.split_whitespace().collect();
                format!(" {} ", words.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn looks_like_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() > 1 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn is_separator(line: &str) -> bool {
    line.contains('|') && line.contains("---")
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn count_pipes(line: &str) -> usize {
    split_unescaped_pipes(line).len() - 1
}

/// Split on `|` that is not preceded by a backslash
fn split_unescaped_pipes(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut previous = None;
    for (index, ch) in line.char_indices() {
        if ch == '|' && previous != Some('\\') {
            parts.push(&line[start..index]);
            start = index + 1;
        }
        previous = Some(ch);
    }
    parts.push(&line[start..]);
    parts
}
