use notegen_engine::editing::table;
use notegen_engine::{Document, NodeId, NodeKind};

/// One display line and the top-level node it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub node: NodeId,
    pub text: String,
}

/// Render the document as plain text lines, one block per top-level node.
pub fn render_document(doc: &Document) -> Vec<RenderedLine> {
    let mut lines = Vec::new();
    for node in doc.children(doc.root()) {
        render_block(doc, *node, *node, &mut lines);
    }
    lines
}

fn render_block(doc: &Document, top: NodeId, node: NodeId, lines: &mut Vec<RenderedLine>) {
    let mut push = |text: String| lines.push(RenderedLine { node: top, text });

    match doc.kind(node) {
        Some(NodeKind::Text(text)) => {
            let text = collapse_whitespace(text);
            if !text.is_empty() {
                push(text);
            }
        }
        Some(NodeKind::Element(element)) => match element.name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = element.name[1..].parse::<usize>().unwrap_or(1);
                push(format!("{} {}", "#".repeat(level), inline_text(doc, node)));
                push(String::new());
            }
            "ul" | "ol" => {
                for (index, item) in doc.element_children(node).into_iter().enumerate() {
                    let marker = if element.name == "ol" {
                        format!("{}.", index + 1)
                    } else {
                        "•".to_string()
                    };
                    push(format!("{marker} {}", inline_text(doc, item)));
                }
                push(String::new());
            }
            "table" => {
                for row in table::rows(doc, node) {
                    let cells = table::cells(doc, row)
                        .into_iter()
                        .map(|cell| inline_text(doc, cell))
                        .collect::<Vec<_>>();
                    push(format!("| {} |", cells.join(" | ")));
                }
                push(String::new());
            }
            "br" | "hr" => push("---".to_string()),
            "img" => push(format!(
                "[image{}]",
                element
                    .attribute("alt")
                    .map(|alt| format!(": {alt}"))
                    .unwrap_or_default()
            )),
            _ => {
                let text = inline_text(doc, node);
                if !text.is_empty() {
                    push(text);
                    push(String::new());
                }
            }
        },
        _ => {}
    }
}

fn inline_text(doc: &Document, node: NodeId) -> String {
    collapse_whitespace(&doc.text_content(node))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(html: &str) -> Vec<String> {
        let doc = Document::parse(html);
        render_document(&doc).into_iter().map(|line| line.text).collect()
    }

    #[test]
    fn headings_lists_and_paragraphs() {
        assert_eq!(
            texts("<h2>Title</h2><p>Some  <b>bold</b>\n text</p><ol><li>a</li><li>b</li></ol>"),
            ["## Title", "", "Some bold text", "", "1. a", "2. b", ""]
        );
    }

    #[test]
    fn tables_render_as_rows() {
        assert_eq!(
            texts("<table><tr><th>K</th><th>V</th></tr><tr><td>a</td><td>1</td></tr></table>"),
            ["| K | V |", "| a | 1 |", ""]
        );
    }

    #[test]
    fn lines_point_back_at_their_block() {
        let doc = Document::parse("<h1>A</h1><p>b</p>");
        let lines = render_document(&doc);
        let blocks = doc.children(doc.root());
        assert_eq!(lines[0].node, blocks[0]);
        assert_eq!(lines[2].node, blocks[1]);
    }

    #[test]
    fn whitespace_between_blocks_is_skipped() {
        assert_eq!(texts("<p>a</p>\n\n<p>b</p>"), ["a", "", "b", ""]);
    }
}
