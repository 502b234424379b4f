//! Fenced code blocks and inline code

use markup5ever_rcdom::Handle;

use super::{ensure_blank_line, push_spaced};
use crate::converter::{collapse_whitespace, MarkdownConverter, RenderState};
use crate::dom;
use crate::error::ConversionError;

/// `<pre>` as a fenced block; the language comes from a `language-*` or
/// `lang-*` class on the `<pre>` or its `<code>` child
pub fn code_block_handler(
    _converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    state: RenderState,
) -> Result<(), ConversionError> {
    let code = dom::raw_text(node);

    if state.single_line {
        let text = collapse_whitespace(&code);
        if !text.is_empty() {
            push_spaced(output, &format!("`{}`", text));
        }
        return Ok(());
    }

    let language = detect_language(node).unwrap_or_default();
    let code = code.trim_matches('\n');

    ensure_blank_line(output);
    output.push_str("```");
    output.push_str(&language);
    output.push('\n');
    output.push_str(code);
    output.push_str("\n```\n\n");
    Ok(())
}

/// `<code>` and friends outside a `<pre>`
pub fn inline_code_handler(
    _converter: &MarkdownConverter,
    node: &Handle,
    output: &mut String,
    _state: RenderState,
) -> Result<(), ConversionError> {
    let raw = dom::raw_text(node);
    let code = collapse_whitespace(&raw);
    if code.is_empty() {
        return Ok(());
    }

    let fence = if code.contains('`') { "``" } else { "`" };
    if raw.starts_with(char::is_whitespace)
        && !output.is_empty()
        && !output.ends_with(char::is_whitespace)
    {
        output.push(' ');
    }
    output.push_str(fence);
    output.push_str(&code);
    output.push_str(fence);
    if raw.ends_with(char::is_whitespace) {
        output.push(' ');
    }
    Ok(())
}

fn detect_language(pre: &Handle) -> Option<String> {
    let mut candidates = vec![pre.clone()];
    candidates.extend(dom::children_named(pre, &["code"]));

    candidates.iter().find_map(|node| {
        dom::attr(node, "class").and_then(|classes| {
            classes.split_whitespace().find_map(|class| {
                class
                    .strip_prefix("language-")
                    .or_else(|| class.strip_prefix("lang-"))
                    .filter(|language| !language.is_empty())
                    .map(str::to_string)
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::converter::MarkdownConverter;
    use crate::parser::parse_html;

    fn convert(html: &str) -> String {
        let dom = parse_html(html);
        MarkdownConverter::new()
            .convert(&dom)
            .expect("Conversion failed")
            .trim()
            .to_string()
    }

    #[test]
    fn test_plain_pre_block() {
        assert_eq!(
            convert("<p>Run:</p><pre>make  all\nmake test</pre>"),
            "Run:\n\n```\nmake  all\nmake test\n```"
        );
    }

    #[test]
    fn test_lang_class_on_pre() {
        assert_eq!(
            convert("<pre class=\"code lang-sql\">SELECT 1;</pre>"),
            "```sql\nSELECT 1;\n```"
        );
    }

    #[test]
    fn test_inline_code_with_backtick() {
        assert_eq!(convert("<p>use <code>a`b</code></p>"), "use ``a`b``");
    }

    #[test]
    fn test_pre_inside_table_cell_is_inline_code() {
        assert_eq!(
            convert("<table><tr><th>Cmd</th></tr><tr><td><pre>ls -la</pre></td></tr></table>"),
            "| Cmd |\n| --- |\n| `ls -la` |"
        );
    }
}
