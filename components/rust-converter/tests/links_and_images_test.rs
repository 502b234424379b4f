//! Link filtering, URI escaping and image handling

use confluence_markdown_converter::converter::{ConversionOptions, MarkdownConverter};
use confluence_markdown_converter::parser::parse_html;
use confluence_markdown_converter::HtmlConverter;

fn render(html: &str) -> String {
    let dom = parse_html(html);
    MarkdownConverter::new()
        .convert(&dom)
        .expect("Failed to convert")
        .trim()
        .to_string()
}

fn convert(html: &str) -> String {
    HtmlConverter::new()
        .convert_str(html)
        .expect("Failed to convert")
        .markdown
}

#[test]
fn test_data_uri_image_is_truncated() {
    let html = r#"<p><img alt="chart" src="data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg=="></p>"#;
    let markdown = render(html);
    assert_eq!(markdown, "![chart](data:image/png;base64...)");
    assert!(!markdown.contains("iVBOR"));
}

#[test]
fn test_single_quoted_data_uri_survives_sanitizer_and_is_truncated() {
    let html = "<p>Before <img alt='x' src='data:image/gif;base64,R0lGODlhAQABAAAAACw='> after</p>";
    assert_eq!(convert(html), "Before ![x](data:image/gif;base64...) after");
}

#[test]
fn test_double_quoted_data_uri_image_removed_by_sanitizer() {
    let html = r#"<p>Before <img src="data:image/png;base64,AAAA" alt="gone"> after</p>"#;
    assert_eq!(convert(html), "Before after");
}

#[test]
fn test_javascript_link_renders_as_text() {
    let markdown = convert(r#"<p>Do not <a href="javascript:alert(1)">click me</a> please</p>"#);
    assert_eq!(markdown, "Do not click me please");
    assert!(!markdown.contains("javascript"));
    assert!(!markdown.contains("]("));
}

#[test]
fn test_uppercase_script_scheme_rejected() {
    assert_eq!(convert(r#"<a href="JavaScript:void(0)">x</a>"#), "x");
    assert_eq!(convert(r#"<a href="data:text/html,hi">y</a>"#), "y");
}

#[test]
fn test_allowed_schemes_and_relative_links() {
    assert_eq!(
        convert(r#"<a href="https://example.com/a b">web</a>"#),
        "[web](https://example.com/a%20b)"
    );
    assert_eq!(
        convert(r#"<a href="file:///share/Team Docs/plan.pdf">plan</a>"#),
        "[plan](file:///share/Team%20Docs/plan.pdf)"
    );
    assert_eq!(
        convert(r#"<a href="/display/ENG/Runbook?focus=1#steps">runbook</a>"#),
        "[runbook](/display/ENG/Runbook?focus=1#steps)"
    );
}

#[test]
fn test_already_escaped_path_not_double_escaped() {
    assert_eq!(
        convert(r#"<a href="https://example.com/My%20Page">page</a>"#),
        "[page](https://example.com/My%20Page)"
    );
}

#[test]
fn test_link_in_table_cell() {
    let html = r#"<table><tr><th>Doc</th></tr><tr><td><a href="/x" title="X">See x</a></td></tr></table>"#;
    assert_eq!(convert(html), "| Doc |\n| --- |\n| [See x](/x \"X\") |");
}

#[test]
fn test_image_in_link_is_alt_text() {
    assert_eq!(
        convert(r#"<a href="https://example.com/"><img src="logo.png" alt="Example"></a>"#),
        "[Example](https://example.com/)"
    );
}

#[test]
fn test_keep_data_uris_option() {
    let options = ConversionOptions {
        keep_data_uris: true,
        ..Default::default()
    };
    let dom = parse_html(r#"<img alt="a" src="data:image/png;base64,AAAA">"#);
    let markdown = MarkdownConverter::with_options(options)
        .convert(&dom)
        .expect("Failed to convert");
    assert_eq!(markdown.trim(), "![a](data:image/png;base64,AAAA)");
}

#[test]
fn test_scripts_and_styles_never_rendered() {
    let markdown = convert(
        "<p>Text <script>steal()</script>more</p><style>p { color: red }</style><noscript>enable js</noscript>",
    );
    assert_eq!(markdown, "Text more");
}
