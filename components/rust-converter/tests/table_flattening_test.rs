//! Nested table flattening through the full pipeline

use confluence_markdown_converter::converter::{ConversionOptions, MarkdownConverter};
use confluence_markdown_converter::handlers::HandlerRegistry;
use confluence_markdown_converter::parser::parse_html;
use confluence_markdown_converter::{HtmlConverter, NestedTableHandling};
use proptest::prelude::*;

fn convert(html: &str) -> String {
    HtmlConverter::new()
        .convert_str(html)
        .expect("Failed to convert")
        .markdown
}

#[test]
fn test_simple_table_is_pipe_table() {
    let html = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
    assert_eq!(convert(html), "| A | B |\n| --- | --- |\n| 1 | 2 |");
}

#[test]
fn test_one_nested_table() {
    let html = r#"<table>
        <tr><th>Component</th><th>Settings</th></tr>
        <tr><td>Cache</td><td><table><tr><td>ttl</td><td>60</td></tr></table></td></tr>
    </table>"#;

    assert_eq!(
        convert(html),
        "| Component | Settings |\n\
         | --- | --- |\n\
         | Cache | (See Table 1) |\n\
         \n\
         **Table 1:**\n\
         \n\
         | ttl | 60 |\n\
         | --- | --- |"
    );
}

#[test]
fn test_two_nested_tables_in_one_cell() {
    let html = r#"<table>
        <tr><th>Env</th><th>Hosts</th></tr>
        <tr><td>prod</td><td>
            <table><tr><td>web-1</td></tr></table>
            <table><tr><td>db-1</td></tr></table>
        </td></tr>
    </table>"#;

    let markdown = convert(html);
    assert!(markdown.contains("| prod | (See Tables 1-2) |"));

    let first = markdown.find("**Table 1:**").expect("first block");
    let second = markdown.find("**Table 2:**").expect("second block");
    assert!(first < second);
    assert!(markdown[first..second].contains("| web-1 |"));
    assert!(markdown[second..].contains("| db-1 |"));
}

#[test]
fn test_cell_text_kept_before_marker() {
    let html = r#"<table><tr><th>Step</th><th>Notes</th></tr>
        <tr><td>1</td><td>Check <b>these</b>:<table><tr><td>x</td></tr></table></td></tr></table>"#;
    assert!(convert(html).contains("| 1 | Check these : (See Table 1) |"));
}

#[test]
fn test_header_cell_table_takes_no_index() {
    let html = r#"<table>
        <tr><th>Name <table><tr><td>legend</td></tr></table></th><th>Value</th></tr>
        <tr><td>a</td><td><table><tr><td>body</td></tr></table></td></tr>
    </table>"#;

    assert_eq!(
        convert(html),
        "| Name | Value |\n\
         | --- | --- |\n\
         | a | (See Table 1) |\n\
         \n\
         **Table 1:**\n\
         \n\
         | body |\n\
         | --- |"
    );
}

#[test]
fn test_doubly_nested_tables_each_get_a_block() {
    let html = "<table><tr><th>Outer</th></tr>\
        <tr><td><table><tr><td>mid<table><tr><td>deep</td></tr></table></td></tr></table></td></tr>\
        <tr><td><table><tr><td>last</td></tr></table></td></tr></table>";

    let markdown = convert(html);
    assert!(markdown.contains("| (See Tables 1-2) |"));
    assert!(markdown.contains("| (See Table 3) |"));

    let first = markdown.find("**Table 1:**").expect("first block");
    let second = markdown.find("**Table 2:**").expect("second block");
    let third = markdown.find("**Table 3:**").expect("third block");
    assert!(first < second && second < third);
    assert!(markdown[first..second].contains("<td>mid<table>"));
    assert!(markdown[second..third].contains("| deep |"));
    assert!(markdown[third..].contains("| last |"));
}

#[test]
fn test_references_restart_per_top_level_table() {
    let nested = "<table><tr><th>H</th></tr><tr><td><table><tr><td>n</td></tr></table></td></tr></table>";
    let html = format!("{}<p>between</p>{}", nested, nested);
    let markdown = convert(&html);
    assert_eq!(markdown.matches("(See Table 1)").count(), 2);
    assert!(!markdown.contains("Table 2"));
}

#[test]
fn test_html_strategy_keeps_structure() {
    let options = ConversionOptions {
        nested_table_handling: NestedTableHandling::Html,
        ..Default::default()
    };
    let html = r#"<div class="table-wrap"><table class="confluenceTable">
        <tr><th class="confluenceTh" scope="col">Name</th></tr>
        <tr><td class="confluenceTd"><div class="table-wrap"><table class="inner"><tr><td rowspan="1">v</td></tr></table></div></td></tr>
    </table></div>"#;

    let markdown = HtmlConverter::with_options(options)
        .convert_str(html)
        .expect("Failed to convert")
        .markdown;

    assert_eq!(
        markdown,
        "<table><tbody><tr><th scope=\"col\">Name</th></tr>\
         <tr><td><table><tbody><tr><td rowspan=\"1\">v</td></tr></tbody></table></td></tr></tbody></table>"
    );
}

#[test]
fn test_unsanitized_html_keeps_attributes() {
    let options = ConversionOptions {
        preserve_tables_as_html: true,
        sanitize_tables_html: false,
        ..Default::default()
    };
    let markdown = HtmlConverter::with_options(options)
        .convert_str(r#"<table class="confluenceTable"><tr><td class="c">x</td></tr></table>"#)
        .expect("Failed to convert")
        .markdown;
    assert_eq!(
        markdown,
        "<table class=\"confluenceTable\"><tbody><tr><td class=\"c\">x</td></tr></tbody></table>"
    );
}

#[test]
fn test_flattened_table_between_paragraphs() {
    let html = "<p>Intro</p>\
        <table><tr><th>K</th></tr><tr><td><table><tr><td>v</td></tr></table></td></tr></table>\
        <p>Outro</p>";
    assert_eq!(
        convert(html),
        "Intro\n\n| K |\n| --- |\n| (See Table 1) |\n\n**Table 1:**\n\n| v |\n| --- |\n\nOutro"
    );
}

#[test]
fn test_headerless_outer_table_gets_blank_header() {
    let html = "<table><tr><td>a</td><td><table><tr><td>n</td></tr></table></td></tr></table>";
    assert!(convert(html).starts_with("|  |  |\n| --- | --- |\n| a | (See Table 1) |"));
}

fn simple_table(rows: &[Vec<String>], header: bool) -> String {
    let mut html = String::from("<table>");
    for (index, row) in rows.iter().enumerate() {
        let tag = if header && index == 0 { "th" } else { "td" };
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<{tag}>{cell}</{tag}>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

proptest! {
    #[test]
    fn prop_flat_tables_match_standard_pipe_tables(
        rows in prop::collection::vec(
            prop::collection::vec("[a-z0-9]{0,6}( [a-z]{1,4})?", 1..5),
            1..6,
        ),
        header in any::<bool>(),
    ) {
        let html = simple_table(&rows, header);
        let dom = parse_html(&html);

        let flattening = MarkdownConverter::new().convert(&dom).expect("Failed to convert");
        let standard = MarkdownConverter::with_registry(
            ConversionOptions::default(),
            HandlerRegistry::standard(),
        )
        .convert(&dom)
        .expect("Failed to convert");

        prop_assert_eq!(flattening, standard);
    }

    #[test]
    fn prop_flattened_rows_have_header_width(
        header_width in 1usize..5,
        row_widths in prop::collection::vec(0usize..7, 1..5),
        nested_at in 0usize..5,
    ) {
        let mut html = String::from("<table><tr>");
        for column in 0..header_width {
            html.push_str(&format!("<th>h{column}</th>"));
        }
        html.push_str("</tr>");
        for (row, width) in row_widths.iter().enumerate() {
            html.push_str("<tr>");
            for column in 0..*width {
                if column == nested_at % (*width).max(1) && row == 0 {
                    html.push_str("<td><table><tr><td>n</td></tr></table></td>");
                } else {
                    html.push_str(&format!("<td>c{row}{column}</td>"));
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");

        let markdown = convert(&html);
        let table_lines: Vec<&str> = markdown
            .lines()
            .take_while(|line| line.starts_with('|'))
            .collect();
        let expected_pipes = header_width + 1;
        for line in table_lines {
            let pipes = line.matches('|').count() - line.matches("\\|").count();
            prop_assert_eq!(pipes, expected_pipes, "line: {}", line);
        }
    }
}
