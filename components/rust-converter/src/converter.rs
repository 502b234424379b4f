//! Markdown rendering over the DOM tree
//!
//! `MarkdownConverter` walks an `RcDom` and asks a [`HandlerRegistry`] which
//! [`ElementHandler`] renders each element. The standard registry covers the
//! usual tag set (headings, paragraphs, lists, code, emphasis, plain links,
//! images and pipe tables); the converter then overrides three entries with
//! the Confluence-aware handlers:
//!
//! - `a`: scheme filtering, URI escaping, autolinks and titles
//! - `img`: inline-context alt text and data URI truncation
//! - `table`: nested table flattening and sanitized HTML passthrough
//!
//! Callers can register further overrides with
//! [`MarkdownConverter::register_handler`].
//!
//! # Render state
//!
//! Handlers receive a [`RenderState`] by value. It tracks the tree depth for
//! the nesting guard, whether the content is in an inline context (headings,
//! table cells and links), whether block elements must stay on one line, and
//! the current list nesting level.
//!
//! # Examples
//!
//! ```rust
//! use confluence_markdown_converter::converter::MarkdownConverter;
//! use confluence_markdown_converter::parser::parse_html;
//!
//! let dom = parse_html("<h1>Hello</h1><p>A <strong>bold</strong> move.</p>");
//! let markdown = MarkdownConverter::new().convert(&dom).expect("Conversion failed");
//! assert_eq!(markdown.trim(), "# Hello\n\nA **bold** move.");
//! ```

use std::fmt;
use std::str::FromStr;

use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom;
use crate::error::ConversionError;
use crate::handlers::image::ImageHandler;
use crate::handlers::link::LinkHandler;
use crate::handlers::{ElementHandler, HandlerRegistry};
use crate::security::{SanitizeAction, SecurityValidator};
use crate::table::TableHandler;

/// What to do with a table that contains other tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedTableHandling {
    /// Render the outer table as Markdown and append the nested tables as
    /// numbered blocks after it
    #[default]
    Append,
    /// Render the whole table as sanitized HTML
    Html,
}

impl FromStr for NestedTableHandling {
    type Err = ConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(NestedTableHandling::Append),
            "html" => Ok(NestedTableHandling::Html),
            other => Err(ConversionError::InvalidInput(format!(
                "Unknown nested table handling '{}', expected 'append' or 'html'",
                other
            ))),
        }
    }
}

impl fmt::Display for NestedTableHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestedTableHandling::Append => write!(f, "append"),
            NestedTableHandling::Html => write!(f, "html"),
        }
    }
}

/// Conversion options
///
/// Headings are always written in ATX (`#`) style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Render every table as sanitized HTML, nested or not
    pub preserve_tables_as_html: bool,
    /// Strategy for tables that contain other tables
    pub nested_table_handling: NestedTableHandling,
    /// Strip wrappers and non-structural attributes from HTML tables
    pub sanitize_tables_html: bool,
    /// Keep `data:` image sources instead of truncating them
    pub keep_data_uris: bool,
    /// Write `<href>` when the link text equals the href
    pub autolinks: bool,
    /// Use the href as the link title when the link has none
    pub default_title: bool,
    /// Parent tags under which inline-context images keep their Markdown form
    pub keep_inline_images_in: Vec<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            preserve_tables_as_html: false,
            nested_table_handling: NestedTableHandling::Append,
            sanitize_tables_html: true,
            keep_data_uris: false,
            autolinks: true,
            default_title: false,
            keep_inline_images_in: Vec::new(),
        }
    }
}

/// Per-node rendering context, passed down by value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Tree depth below the render root
    pub depth: usize,
    /// Inside a heading, table cell or link
    pub inline: bool,
    /// Block elements render as space-separated text
    pub single_line: bool,
    /// Number of enclosing lists
    pub list_depth: usize,
}

impl RenderState {
    /// State for the children of the current node
    pub fn descend(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    /// Switch to inline context
    pub fn as_inline(self) -> Self {
        Self {
            inline: true,
            single_line: true,
            ..self
        }
    }

    /// Keep block content on one line without entering inline context
    pub fn as_single_line(self) -> Self {
        Self {
            single_line: true,
            ..self
        }
    }

    /// State for a list nested in the current one
    pub fn nested_list(self) -> Self {
        Self {
            list_depth: self.list_depth + 1,
            ..self
        }
    }
}

/// HTML to Markdown converter
///
/// Holds no per-document state; one instance can convert any number of
/// documents.
pub struct MarkdownConverter {
    options: ConversionOptions,
    handlers: HandlerRegistry,
    security_validator: SecurityValidator,
}

impl MarkdownConverter {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self::with_options(ConversionOptions::default())
    }

    /// Create a converter with custom options
    ///
    /// ```rust
    /// use confluence_markdown_converter::converter::{
    ///     ConversionOptions, MarkdownConverter, NestedTableHandling,
    /// };
    ///
    /// let options = ConversionOptions {
    ///     nested_table_handling: NestedTableHandling::Html,
    ///     keep_data_uris: true,
    ///     ..Default::default()
    /// };
    /// let converter = MarkdownConverter::with_options(options);
    /// assert!(converter.options().keep_data_uris);
    /// ```
    pub fn with_options(options: ConversionOptions) -> Self {
        let mut handlers = HandlerRegistry::standard();
        handlers.register(&["a"], LinkHandler);
        handlers.register(&["img"], ImageHandler);
        handlers.register(&["table"], TableHandler);

        Self::with_registry(options, handlers)
    }

    /// Create a converter around an explicit handler registry
    pub fn with_registry(options: ConversionOptions, handlers: HandlerRegistry) -> Self {
        Self {
            options,
            handlers,
            security_validator: SecurityValidator::new(),
        }
    }

    /// Replace the handler for the given tags
    pub fn register_handler<H>(&mut self, tags: &[&'static str], handler: H)
    where
        H: ElementHandler + 'static,
    {
        self.handlers.register(tags, handler);
    }

    /// Active options
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Validator used for element skipping, link schemes and depth limits
    pub fn security(&self) -> &SecurityValidator {
        &self.security_validator
    }

    /// Convert a parsed document to Markdown
    ///
    /// Only the `<body>` subtree is rendered. The result is raw renderer
    /// output; whitespace normalization is left to
    /// [`crate::postprocess::postprocess`].
    ///
    /// # Errors
    ///
    /// `ConversionError::InternalError` when the tree nests deeper than the
    /// security validator allows, or whatever a registered handler reports.
    pub fn convert(&self, dom: &RcDom) -> Result<String, ConversionError> {
        let root = dom::find_body(&dom.document).unwrap_or_else(|| dom.document.clone());
        let mut output = String::new();
        self.render_children(&root, &mut output, RenderState::default())?;
        debug!("rendered {} bytes of markdown", output.len());
        Ok(output)
    }

    /// Render one node and its subtree
    pub fn render_node(
        &self,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError> {
        match node.data {
            NodeData::Document => self.render_children(node, output, state),
            NodeData::Element { ref name, .. } => {
                let tag = name.local.as_ref();
                if self.security_validator.check_element(tag) == SanitizeAction::Remove {
                    return Ok(());
                }
                self.security_validator
                    .validate_depth(state.depth)
                    .map_err(ConversionError::InternalError)?;

                match self.handlers.get(tag) {
                    Some(handler) => handler.handle(self, node, output, state),
                    None => self.render_children(node, output, state),
                }
            }
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                write_text(&text, output);
                Ok(())
            }
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => Ok(()),
        }
    }

    /// Render every child of `node` one level deeper
    pub fn render_children(
        &self,
        node: &Handle,
        output: &mut String,
        state: RenderState,
    ) -> Result<(), ConversionError> {
        let child_state = state.descend();
        for child in node.children.borrow().iter() {
            self.render_node(child, output, child_state)?;
        }
        Ok(())
    }

    /// Render the children of `node` into a fresh buffer
    pub fn render_to_string(
        &self,
        node: &Handle,
        state: RenderState,
    ) -> Result<String, ConversionError> {
        let mut buffer = String::new();
        self.render_children(node, &mut buffer, state)?;
        Ok(buffer)
    }

    /// Render the children of `node` in inline context, whitespace collapsed
    pub fn render_inline(
        &self,
        node: &Handle,
        state: RenderState,
    ) -> Result<String, ConversionError> {
        let rendered = self.render_to_string(node, state.as_inline())?;
        Ok(collapse_whitespace(&rendered))
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse runs of whitespace to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Backslash-escape `*` and `_` so literal text never turns into emphasis
///
/// ```rust
/// use confluence_markdown_converter::converter::escape_markdown;
///
/// assert_eq!(escape_markdown("snake_case * 2"), "snake\\_case \\* 2");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '*' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Append a text node, keeping word boundaries with the surrounding output
///
/// Preformatted and code content never comes through here; those handlers
/// read the raw text themselves.
fn write_text(text: &str, output: &mut String) {
    let normalized = escape_markdown(&collapse_whitespace(text));
    let needs_gap = !output.ends_with(char::is_whitespace);

    if normalized.is_empty() {
        if !text.is_empty() && needs_gap {
            output.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && needs_gap {
        output.push(' ');
    }
    output.push_str(&normalized);
    if text.ends_with(char::is_whitespace) {
        output.push(' ');
    }
}
