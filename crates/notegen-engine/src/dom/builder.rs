//! Tree construction from markup tokens.
//!
//! Generated HTML is usually well formed, so this is a forgiving builder
//! rather than the full HTML5 algorithm: unmatched end tags are dropped,
//! unclosed elements are closed at the end of input, and the handful of
//! implied end tags that show up in practice (`<li>`, `<p>`, table cells)
//! are honoured.

use notegen_markup::{MarkupToken, is_void_element, tokenize};

use super::{Document, Element, NodeId, NodeKind};

/// Tags that close an open `<p>` when they start.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "blockquote", "div", "dl", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "ol", "p",
    "pre", "table", "ul",
];

/// Parse `html` and append the resulting nodes under `parent`.
pub(super) fn build_into(doc: &mut Document, parent: NodeId, html: &str) {
    // open[0] is the insertion root and is never popped
    let mut open: Vec<NodeId> = vec![parent];

    for token in tokenize(html) {
        match token {
            MarkupToken::StartTag(tag) => {
                close_implied(doc, &mut open, &tag.name);
                let element = Element {
                    name: tag.name,
                    attributes: tag
                        .attributes
                        .into_iter()
                        .map(|attribute| (attribute.name, attribute.value))
                        .collect(),
                };
                let leaf = tag.self_closing || is_void_element(&element.name);
                let id = doc.alloc(NodeKind::Element(element));
                doc.append_raw(current(&open), id);
                if !leaf {
                    open.push(id);
                }
            }
            MarkupToken::EndTag(name) => {
                if let Some(depth) = open
                    .iter()
                    .rposition(|id| doc.tag_name(*id) == Some(name.as_str()))
                    .filter(|depth| *depth > 0)
                {
                    open.truncate(depth);
                }
            }
            MarkupToken::Text(text) => append_text(doc, current(&open), &text),
            MarkupToken::RawText(text) => append_text(doc, current(&open), text),
            MarkupToken::Comment(body) => {
                let id = doc.alloc(NodeKind::Comment(body.to_string()));
                doc.append_raw(current(&open), id);
            }
            MarkupToken::Declaration(_) => {}
        }
    }
}

fn current(open: &[NodeId]) -> NodeId {
    open[open.len() - 1]
}

fn append_text(doc: &mut Document, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    let id = doc.alloc(NodeKind::Text(text.to_string()));
    doc.append_raw(parent, id);
}

fn close_implied(doc: &Document, open: &mut Vec<NodeId>, starting: &str) {
    let closes = |open_tag: &str| match starting {
        "li" => open_tag == "li",
        "td" | "th" => matches!(open_tag, "td" | "th"),
        "tr" => matches!(open_tag, "td" | "th" | "tr"),
        _ => open_tag == "p" && CLOSES_PARAGRAPH.contains(&starting),
    };

    while open.len() > 1 {
        match doc.tag_name(current(open)) {
            Some(tag) if closes(tag) => {
                open.pop();
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn unclosed_list_items_become_siblings() {
        let doc = Document::parse("<ul><li>a<li>b</ul>");
        assert_eq!(doc.to_html(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn heading_closes_open_paragraph() {
        let doc = Document::parse("<p>intro<h2>Next</h2>");
        assert_eq!(doc.to_html(), "<p>intro</p><h2>Next</h2>");
    }

    #[test]
    fn table_cells_close_each_other() {
        let doc = Document::parse("<table><tr><td>a<td>b<tr><td>c</table>");
        assert_eq!(
            doc.to_html(),
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>"
        );
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let doc = Document::parse("<p>a</span>b</p></div>");
        assert_eq!(doc.to_html(), "<p>ab</p>");
    }

    #[test]
    fn unclosed_elements_close_at_end_of_input() {
        let doc = Document::parse("<div><p>open");
        assert_eq!(doc.to_html(), "<div><p>open</p></div>");
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() {
        let doc = Document::parse("a<br>b<span/>c");
        assert_eq!(doc.to_html(), "a<br>b<span></span>c");
    }

    #[test]
    fn declarations_are_dropped_and_comments_kept() {
        let doc = Document::parse("<!DOCTYPE html><!-- keep --><p>x</p>");
        assert_eq!(doc.to_html(), "<!-- keep --><p>x</p>");
    }
}
