//! Read-only helpers over the html5ever `RcDom` tree
//!
//! The renderer, table flattener and metadata extraction all need the same
//! handful of questions answered about a node: its tag, an attribute, its
//! element children, whether it sits inside some ancestor, and its text with
//! nested tables left out. Keeping them here avoids matching on `NodeData`
//! all over the crate.

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

/// Lowercase local tag name, `None` for non-element nodes
pub fn tag_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
        _ => None,
    }
}

/// Whether `node` is an element with local name `tag`
pub fn is_element(node: &Handle, tag: &str) -> bool {
    match node.data {
        NodeData::Element { ref name, .. } => name.local.as_ref().eq_ignore_ascii_case(tag),
        _ => false,
    }
}

/// Value of attribute `name`, if present
pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(name))
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Direct element children, in document order
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Direct element children with one of the given tag names
pub fn children_named(node: &Handle, tags: &[&str]) -> Vec<Handle> {
    element_children(node)
        .into_iter()
        .filter(|child| tags.iter().any(|tag| is_element(child, tag)))
        .collect()
}

/// Parent node, looked up through the weak back-reference
pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|weak| weak.upgrade());
    node.parent.set(weak);
    parent
}

/// Tag name of the parent element
pub fn parent_tag(node: &Handle) -> Option<String> {
    parent(node).and_then(|parent| tag_name(&parent))
}

/// Whether any ancestor of `node` is a `tag` element
pub fn has_ancestor(node: &Handle, tag: &str) -> bool {
    let mut current = parent(node);
    while let Some(ancestor) = current {
        if is_element(&ancestor, tag) {
            return true;
        }
        current = parent(&ancestor);
    }
    false
}

/// Whether a `<table>` appears anywhere below `node`
pub fn contains_table(node: &Handle) -> bool {
    node.children
        .borrow()
        .iter()
        .any(|child| is_element(child, "table") || contains_table(child))
}

/// Every table below `node` at any depth, in document order (a table comes
/// before the tables nested inside it)
pub fn descendant_tables(node: &Handle) -> Vec<Handle> {
    let mut tables = Vec::new();
    collect_tables(node, &mut tables);
    tables
}

fn collect_tables(node: &Handle, tables: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_element(child, "table") {
            tables.push(child.clone());
        }
        collect_tables(child, tables);
    }
}

/// Number of parent steps from `node` up to `ancestor`, `None` when
/// `ancestor` is not above `node`
pub fn levels_below(ancestor: &Handle, node: &Handle) -> Option<usize> {
    let mut levels = 0;
    let mut current = parent(node);
    while let Some(above) = current {
        levels += 1;
        if Rc::ptr_eq(&above, ancestor) {
            return Some(levels);
        }
        current = parent(&above);
    }
    None
}

/// Text content with every nested `<table>` subtree left out
///
/// Whitespace inside each text node is collapsed, empty ones are dropped,
/// the rest are joined with single spaces. Comments and the contents of
/// `script`/`style` do not count as text.
pub fn text_without_tables(node: &Handle) -> String {
    let mut pieces = Vec::new();
    collect_text(node, &mut pieces, false);
    pieces.join(" ")
}

/// Text content of the whole subtree, nested tables included, collapsed the
/// same way as [`text_without_tables`]
pub fn text_content(node: &Handle) -> String {
    let mut pieces = Vec::new();
    collect_text(node, &mut pieces, true);
    pieces.join(" ")
}

fn collect_text(node: &Handle, pieces: &mut Vec<String>, include_tables: bool) {
    for child in node.children.borrow().iter() {
        match child.data {
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                let words: Vec<&str> = text.split_whitespace().collect();
                if !words.is_empty() {
                    pieces.push(words.join(" "));
                }
            }
            NodeData::Element { ref name, .. } => {
                let tag = name.local.as_ref();
                let skipped = tag == "script" || tag == "style" || (tag == "table" && !include_tables);
                if !skipped {
                    collect_text(child, pieces, include_tables);
                }
            }
            _ => {}
        }
    }
}

/// Number of levels below `node` (0 for a leaf)
///
/// Walks the tree with an explicit stack so arbitrarily deep input cannot
/// overflow the call stack.
pub fn subtree_depth(node: &Handle) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(node.clone(), 0usize)];
    while let Some((current, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        for child in current.children.borrow().iter() {
            stack.push((child.clone(), depth + 1));
        }
    }
    deepest
}

/// Concatenated text of all descendants, untouched
///
/// Used for preformatted content where whitespace is significant.
pub fn raw_text(node: &Handle) -> String {
    let mut text = String::new();
    push_raw_text(node, &mut text);
    text
}

fn push_raw_text(node: &Handle, output: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => output.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                push_raw_text(child, output);
            }
        }
        _ => {}
    }
}

/// First element named `tag` in a depth-first, document-order walk
pub fn find_first(node: &Handle, tag: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if is_element(child, tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, tag) {
            return Some(found);
        }
    }
    None
}

/// The document's `<body>` element
pub fn find_body(document: &Handle) -> Option<Handle> {
    find_first(document, "body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn body_of(html: &str) -> Handle {
        let dom = parse_html(html);
        find_body(&dom.document).expect("body element")
    }

    #[test]
    fn test_tag_and_attributes() {
        let body = body_of(r#"<A HREF="x.html" Title="t">link</A>"#);
        let link = element_children(&body).remove(0);
        assert_eq!(tag_name(&link), Some("a".to_string()));
        assert!(is_element(&link, "A"));
        assert_eq!(attr(&link, "href"), Some("x.html".to_string()));
        assert_eq!(attr(&link, "title"), Some("t".to_string()));
        assert_eq!(attr(&link, "alt"), None);
    }

    #[test]
    fn test_parent_lookup_keeps_link() {
        let body = body_of("<pre><a href='x'>code</a></pre>");
        let pre = element_children(&body).remove(0);
        let link = element_children(&pre).remove(0);
        assert_eq!(parent_tag(&link), Some("pre".to_string()));
        // a second lookup still works after the weak ref was put back
        assert!(has_ancestor(&link, "pre"));
        assert!(has_ancestor(&link, "body"));
        assert!(!has_ancestor(&link, "table"));
    }

    #[test]
    fn test_text_without_tables() {
        let body = body_of(
            "<table><tr><td>  Outer\n text <b>bold</b><table><tr><td>inner</td></tr></table> tail </td></tr></table>",
        );
        let cell = find_first(&body, "td").expect("outer cell");
        assert_eq!(text_without_tables(&cell), "Outer text bold tail");
        assert!(contains_table(&cell));
    }

    #[test]
    fn test_text_content_and_depth() {
        let body = body_of("<table><tr><td>a<table><tr><td>b</td></tr></table></td></tr></table>");
        let table = find_first(&body, "table").expect("table");
        assert_eq!(text_content(&table), "a b");
        // table > tbody > tr > td > table > tbody > tr > td > text
        assert_eq!(subtree_depth(&table), 8);
    }

    #[test]
    fn test_descendant_tables_in_document_order() {
        let body = body_of(
            "<table><tr><td>\
               <div><table id='a'><tr><td><table id='deep'><tr><td>x</td></tr></table></td></tr></table></div>\
               <table id='b'><tr><td>y</td></tr></table>\
             </td></tr></table>",
        );
        let cell = find_first(&body, "td").expect("outer cell");
        let ids: Vec<_> = descendant_tables(&cell)
            .iter()
            .filter_map(|table| attr(table, "id"))
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "deep".to_string(), "b".to_string()]);

        let deep = find_first(&body, "td")
            .and_then(|cell| descendant_tables(&cell).into_iter().nth(1))
            .expect("deep table");
        // deep < td < tr < tbody < table#a < div < td
        assert_eq!(levels_below(&cell, &deep), Some(6));
        assert_eq!(levels_below(&deep, &cell), None);
    }

    #[test]
    fn test_children_named_and_raw_text() {
        let body = body_of("<ul><li>one</li><li>two\n  indented</li></ul>");
        let list = element_children(&body).remove(0);
        assert_eq!(children_named(&list, &["li"]).len(), 2);
        assert_eq!(raw_text(&list), "onetwo\n  indented");
    }
}
