//! Element skipping, link scheme filtering and depth limits
//!
//! Confluence exports are converted, not displayed, so there is nothing to
//! sandbox. What matters is that:
//!
//! - Non-content elements (`<script>`, `<style>`, embedded objects) never
//!   leak their source text into the Markdown
//! - Links only keep an href when it points somewhere a reader can follow:
//!   `http`, `https`, `file` or a relative reference. Anything else
//!   (`javascript:`, `mailto:`, `data:`, ...) is rendered as plain text
//! - Pathologically deep trees fail cleanly instead of overflowing the stack
//!
//! html5ever is an HTML parser, not an XML parser, so entity expansion and
//! external DTD loading are not a concern.

/// Maximum allowed nesting depth for HTML elements
const MAX_NESTING_DEPTH: usize = 1000;

/// Elements whose whole subtree is dropped during rendering
const SKIPPED_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "iframe",
    "object",
    "embed",
    "applet",
    "link",
    "base",
    "meta",
];

/// Link schemes that keep their href
const ALLOWED_LINK_SCHEMES: &[&str] = &["http", "https", "file"];

/// Action to take for an element during rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Render the element
    Allow,
    /// Drop the element and all its children
    Remove,
}

/// Validator consulted by the renderer for every element and link
#[derive(Debug, Clone)]
pub struct SecurityValidator {
    max_depth: usize,
}

impl SecurityValidator {
    /// Create a validator with the default depth limit
    pub fn new() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Create a validator with a custom depth limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum nesting depth this validator accepts
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decide whether an element is rendered at all
    ///
    /// ```
    /// use confluence_markdown_converter::security::{SanitizeAction, SecurityValidator};
    ///
    /// let validator = SecurityValidator::new();
    /// assert_eq!(validator.check_element("script"), SanitizeAction::Remove);
    /// assert_eq!(validator.check_element("table"), SanitizeAction::Allow);
    /// ```
    pub fn check_element(&self, tag_name: &str) -> SanitizeAction {
        if SKIPPED_ELEMENTS
            .iter()
            .any(|skipped| skipped.eq_ignore_ascii_case(tag_name))
        {
            SanitizeAction::Remove
        } else {
            SanitizeAction::Allow
        }
    }

    /// Whether a link href may be emitted
    ///
    /// Relative references have no scheme and are always allowed.
    ///
    /// ```
    /// use confluence_markdown_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::new();
    /// assert!(validator.is_allowed_link("https://example.com/a b"));
    /// assert!(validator.is_allowed_link("/display/SPACE/Page"));
    /// assert!(!validator.is_allowed_link("javascript:alert(1)"));
    /// assert!(!validator.is_allowed_link("mailto:team@example.com"));
    /// ```
    pub fn is_allowed_link(&self, href: &str) -> bool {
        match url_scheme(href) {
            Some(scheme) => ALLOWED_LINK_SCHEMES.contains(&scheme.as_str()),
            None => true,
        }
    }

    /// Validate nesting depth to prevent stack overflow
    ///
    /// ```
    /// use confluence_markdown_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::with_max_depth(100);
    /// assert!(validator.validate_depth(100).is_ok());
    /// assert!(validator.validate_depth(101).is_err());
    /// ```
    pub fn validate_depth(&self, depth: usize) -> Result<(), String> {
        if depth > self.max_depth {
            Err(format!(
                "HTML nesting depth {} exceeds maximum allowed depth {}",
                depth, self.max_depth
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for SecurityValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased scheme of a URL, if it has one
///
/// A scheme is everything before the first `:` when that prefix starts with
/// an ASCII letter and only contains letters, digits, `+`, `-` or `.`.
pub fn url_scheme(url: &str) -> Option<String> {
    let colon = url.find(':')?;
    let candidate = &url[..colon];
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(candidate.to_ascii_lowercase())
    } else {
        None
    }
}
