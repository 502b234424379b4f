//! Element handlers and the tag → handler registry
//!
//! Every element the renderer meets is looked up by tag name in a
//! [`HandlerRegistry`]. Tags without an entry are treated as transparent
//! containers and only their children are rendered.
//!
//! A handler is anything implementing [`ElementHandler`], including plain
//! functions and closures with the matching signature. Registering a handler
//! for a tag that already has one replaces the old entry, which is how the
//! converter swaps in its link, image and table handlers on top of
//! [`HandlerRegistry::standard`].

pub mod block;
pub mod code;
pub mod image;
pub mod inline;
pub mod link;
pub mod list;

use std::collections::HashMap;

use markup5ever_rcdom::Handle;

use crate::converter::{MarkdownConverter, RenderState};
use crate::error::ConversionError;
use crate::table::pipe::pipe_table_handler;

/// Renders one element (and usually its subtree) into Markdown
pub trait ElementHandler: Send + Sync {
    /// Append the Markdown for `node` to `output`
    fn handle(
        &self,
        converter: &MarkdownConverter,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError>;
}

impl<F> ElementHandler for F
where
    F: Fn(&MarkdownConverter, &Handle, &mut String, RenderState) -> Result<(), ConversionError>
        + Send
        + Sync,
{
    fn handle(
        &self,
        converter: &MarkdownConverter,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError> {
        self(converter, node, output, state)
    }
}

/// Mapping from tag name to handler
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn ElementHandler>>,
    tag_to_handler: HashMap<&'static str, usize>,
}

impl HandlerRegistry {
    /// An empty registry: every element is a transparent container
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            tag_to_handler: HashMap::new(),
        }
    }

    /// The standard tag set
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register(&["h1", "h2", "h3", "h4", "h5", "h6"], block::heading_handler);
        registry.register(&["p"], block::paragraph_handler);
        registry.register(
            &[
                "div", "section", "article", "main", "header", "footer", "nav", "aside",
                "figure", "figcaption", "dl", "dt", "dd", "details", "summary", "address",
            ],
            block::container_handler,
        );
        registry.register(&["br"], block::line_break_handler);
        registry.register(&["hr"], block::rule_handler);
        registry.register(&["blockquote"], block::blockquote_handler);

        registry.register(&["ul", "ol"], list::list_handler);
        registry.register(&["li"], list::list_item_handler);

        registry.register(&["pre"], code::code_block_handler);
        registry.register(&["code", "kbd", "samp", "tt"], code::inline_code_handler);

        registry.register(&["strong", "b"], inline::bold_handler);
        registry.register(&["em", "i", "cite", "dfn"], inline::italic_handler);

        registry.register(&["a"], link::plain_link_handler);
        registry.register(&["img"], image::plain_image_handler);
        registry.register(&["table"], pipe_table_handler);

        registry
    }

    /// Route `tags` to `handler`, replacing any previous entry for them
    pub fn register<H>(&mut self, tags: &[&'static str], handler: H)
    where
        H: ElementHandler + 'static,
    {
        let index = self.handlers.len();
        self.handlers.push(Box::new(handler));
        for tag in tags {
            self.tag_to_handler.insert(tag, index);
        }
    }

    /// Handler for `tag`, if one is registered
    pub fn get(&self, tag: &str) -> Option<&dyn ElementHandler> {
        self.tag_to_handler
            .get(tag)
            .and_then(|&index| self.handlers.get(index))
            .map(|handler| handler.as_ref())
    }

    /// Whether `tag` has a handler
    pub fn contains(&self, tag: &str) -> bool {
        self.tag_to_handler.contains_key(tag)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Make sure the output ends with a blank line, unless it is empty
pub(crate) fn ensure_blank_line(output: &mut String) {
    if !output.is_empty() && !output.ends_with("\n\n") {
        if output.ends_with('\n') {
            output.push('\n');
        } else {
            output.push_str("\n\n");
        }
    }
}

/// Make sure the output ends with a newline, unless it is empty
pub(crate) fn ensure_newline(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

/// Split rendered content into leading gap, trimmed text and trailing gap
pub(crate) fn chomp(text: &str) -> (&'static str, String, &'static str) {
    let prefix = if text.starts_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    let suffix = if text.ends_with(char::is_whitespace) {
        " "
    } else {
        ""
    };
    let words: Vec<&str> = text.split_whitespace().collect();
    (prefix, words.join(" "), suffix)
}

/// Append `body` with its surrounding gaps, without doubling whitespace
pub(crate) fn push_padded(output: &mut String, prefix: &str, body: &str, suffix: &str) {
    if !prefix.is_empty() && !output.is_empty() && !output.ends_with(char::is_whitespace) {
        output.push_str(prefix);
    }
    output.push_str(body);
    output.push_str(suffix);
}

/// Append a word group in single-line mode, separated from what came before
pub(crate) fn push_spaced(output: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !output.is_empty() && !output.ends_with(char::is_whitespace) {
        output.push(' ');
    }
    output.push_str(text);
    output.push(' ');
}
