//! Export serialization.
//!
//! What leaves the editor (saved drafts, rendered output) is the document
//! without any editing state: no edit tags, no affordance buttons, and
//! `<font>` elements left behind by rich-text pasting turned into styled
//! spans.

use crate::dom::{Document, Serializer};
use crate::editing::EDIT_TAG_ATTRIBUTE;

/// Classes of elements that exist only while editing.
pub const EDITING_ONLY_CLASSES: &[&str] = &["ai-edit-trigger", "cell-actions", "no-print"];

pub fn export_serializer() -> Serializer {
    EDITING_ONLY_CLASSES.iter().fold(
        Serializer::raw()
            .strip_attribute(EDIT_TAG_ATTRIBUTE)
            .unwrap_font(),
        |serializer, class| serializer.drop_class(class),
    )
}

pub fn clean_html(doc: &Document) -> String {
    export_serializer().inner_html(doc, doc.root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_editing_state() {
        let doc = Document::parse(
            r#"<h2 data-edit-id="edit-1" class="title">A<button class="ai-edit-trigger">✨</button></h2><table><tr><td>x<div class="cell-actions"><button>+</button></div></td></tr></table><div class="no-print">hint</div>"#,
        );
        assert_eq!(
            clean_html(&doc),
            r#"<h2 class="title">A</h2><table><tr><td>x</td></tr></table>"#
        );
    }

    #[test]
    fn font_becomes_span_keeping_style() {
        let doc = Document::parse(r#"<p><font color="red" face="Arial" style="color: red">hot</font></p>"#);
        assert_eq!(
            clean_html(&doc),
            r#"<p><span style="color: red">hot</span></p>"#
        );
    }

    #[test]
    fn live_document_is_untouched() {
        let doc = Document::parse(r#"<p data-edit-id="edit-1">x</p>"#);
        clean_html(&doc);
        assert_eq!(doc.to_html(), r#"<p data-edit-id="edit-1">x</p>"#);
    }
}
