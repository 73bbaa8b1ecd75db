//! Row and column operations on tables inside the document.
//!
//! The header row is the first `thead > tr`, or failing that a leading row
//! made only of `th` cells. Every other `tr` of the table (not of a nested
//! table) is a body row.

use crate::dom::{Document, DomError, NodeId, NodeKind, Position};

pub const NEW_CELL_HTML: &str = "New data";
pub const NEW_HEADER_HTML: &str = "New Column";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("node {0:?} is not inside a table")]
    NotInTable(NodeId),
    #[error("node {0:?} is not a table row")]
    NotARow(NodeId),
    #[error("node {0:?} is not a table cell")]
    NotACell(NodeId),
    #[error("column {0} does not exist")]
    NoSuchColumn(usize),
    #[error(transparent)]
    Dom(#[from] DomError),
}

pub fn is_cell(doc: &Document, id: NodeId) -> bool {
    matches!(doc.tag_name(id), Some("td" | "th"))
}

/// The table `id` belongs to, `id` included.
pub fn table_of(doc: &Document, id: NodeId) -> Result<NodeId, TableError> {
    doc.closest(id, "table").ok_or(TableError::NotInTable(id))
}

/// Rows belonging to `table` itself, in document order.
pub fn rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    doc.elements_named(table, "tr")
        .into_iter()
        .filter(|row| doc.closest(*row, "table") == Some(table))
        .collect()
}

pub fn header_row(doc: &Document, table: NodeId) -> Option<NodeId> {
    let rows = rows(doc, table);
    rows.iter()
        .copied()
        .find(|row| doc.parent(*row).and_then(|p| doc.tag_name(p)) == Some("thead"))
        .or_else(|| {
            let first = *rows.first()?;
            let cells = cells(doc, first);
            let all_headers = !cells.is_empty() && cells.iter().all(|c| doc.tag_name(*c) == Some("th"));
            all_headers.then_some(first)
        })
}

pub fn body_rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    let header = header_row(doc, table);
    rows(doc, table)
        .into_iter()
        .filter(|row| Some(*row) != header)
        .collect()
}

/// Direct `td`/`th` children of a row.
pub fn cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    doc.element_children(row)
        .into_iter()
        .filter(|child| is_cell(doc, *child))
        .collect()
}

/// Body cells of column `index`; rows too short for it are skipped.
pub fn column_cells(doc: &Document, table: NodeId, index: usize) -> Vec<NodeId> {
    body_rows(doc, table)
        .into_iter()
        .filter_map(|row| cells(doc, row).get(index).copied())
        .collect()
}

pub fn column_header(doc: &Document, table: NodeId, index: usize) -> Option<String> {
    let header = header_row(doc, table)?;
    let cell = *cells(doc, header).get(index)?;
    Some(doc.text_content(cell).trim().to_string())
}

pub fn delete_row(doc: &mut Document, row: NodeId) -> Result<(), TableError> {
    if doc.tag_name(row) != Some("tr") {
        return Err(TableError::NotARow(row));
    }
    doc.remove(row)?;
    Ok(())
}

/// Insert a row after `row` with as many placeholder cells as `row` has.
pub fn insert_row_after(doc: &mut Document, row: NodeId) -> Result<NodeId, TableError> {
    if doc.tag_name(row) != Some("tr") {
        return Err(TableError::NotARow(row));
    }
    let count = cells(doc, row).len();
    let html = format!("<tr>{}</tr>", format!("<td>{NEW_CELL_HTML}</td>").repeat(count));
    let inserted = doc.insert_html(&html, Position::After(row))?;
    inserted
        .into_iter()
        .next()
        .ok_or(TableError::NotARow(row))
}

pub fn delete_column(doc: &mut Document, table: NodeId, index: usize) -> Result<(), TableError> {
    let mut targets = column_cells(doc, table, index);
    if let Some(header) = header_row(doc, table)
        && let Some(cell) = cells(doc, header).get(index)
    {
        targets.insert(0, *cell);
    }
    if targets.is_empty() {
        return Err(TableError::NoSuchColumn(index));
    }
    for cell in targets {
        doc.remove(cell)?;
    }
    Ok(())
}

/// Insert a placeholder column after column `index` in every row.
pub fn insert_column_after(doc: &mut Document, table: NodeId, index: usize) -> Result<(), TableError> {
    let header = header_row(doc, table);
    let all_rows = rows(doc, table);
    if all_rows.is_empty() {
        return Err(TableError::NoSuchColumn(index));
    }

    for row in all_rows {
        let (tag, html) = if Some(row) == header {
            ("th", NEW_HEADER_HTML)
        } else {
            ("td", NEW_CELL_HTML)
        };
        let row_cells = cells(doc, row);
        let position = match row_cells.get(index + 1) {
            Some(next) => Position::Before(*next),
            None => Position::AppendTo(row),
        };
        let cell = doc.insert_node(NodeKind::Element(crate::dom::Element::new(tag)), position)?;
        doc.set_inner_html(cell, html)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "<table><thead><tr><th>Year</th><th>Event</th></tr></thead><tbody><tr><td>1947</td><td>Independence</td></tr><tr><td>1950</td><td>Republic</td></tr></tbody></table>";

    fn table(doc: &Document) -> NodeId {
        doc.elements_named(doc.root(), "table")[0]
    }

    #[test]
    fn finds_header_and_body_rows() {
        let doc = Document::parse(TABLE);
        let table = table(&doc);
        let header = header_row(&doc, table).unwrap();
        assert_eq!(doc.text_content(header), "YearEvent");
        assert_eq!(body_rows(&doc, table).len(), 2);
        assert_eq!(column_header(&doc, table, 1).as_deref(), Some("Event"));
    }

    #[test]
    fn header_row_without_thead() {
        let doc = Document::parse("<table><tr><th>A</th></tr><tr><td>1</td></tr></table>");
        let table = table(&doc);
        assert_eq!(column_header(&doc, table, 0).as_deref(), Some("A"));
        assert_eq!(body_rows(&doc, table).len(), 1);
    }

    #[test]
    fn nested_table_rows_are_not_ours() {
        let doc = Document::parse(
            "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>",
        );
        let outer = table(&doc);
        assert_eq!(rows(&doc, outer).len(), 1);
    }

    #[test]
    fn column_cells_skip_short_rows() {
        let doc = Document::parse("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>");
        let cells = column_cells(&doc, table(&doc), 1);
        assert_eq!(cells.len(), 1);
        assert_eq!(doc.text_content(cells[0]), "b");
    }

    #[test]
    fn insert_and_delete_rows() {
        let mut doc = Document::parse(TABLE);
        let first = body_rows(&doc, table(&doc))[0];
        let new_row = insert_row_after(&mut doc, first).unwrap();
        assert_eq!(doc.text_content(new_row), "New dataNew data");
        assert_eq!(body_rows(&doc, table(&doc))[1], new_row);

        delete_row(&mut doc, new_row).unwrap();
        assert_eq!(doc.to_html(), TABLE);
    }

    #[test]
    fn insert_column_in_the_middle_and_at_the_end() {
        let mut doc = Document::parse(TABLE);
        let t = table(&doc);
        insert_column_after(&mut doc, t, 0).unwrap();
        assert_eq!(column_header(&doc, t, 1).as_deref(), Some("New Column"));
        assert_eq!(column_header(&doc, t, 2).as_deref(), Some("Event"));

        insert_column_after(&mut doc, t, 2).unwrap();
        assert_eq!(column_header(&doc, t, 3).as_deref(), Some("New Column"));
        assert_eq!(doc.text_content(column_cells(&doc, t, 3)[0]), "New data");
    }

    #[test]
    fn delete_column_removes_header_and_cells() {
        let mut doc = Document::parse(TABLE);
        let t = table(&doc);
        delete_column(&mut doc, t, 0).unwrap();
        assert_eq!(
            doc.to_html(),
            "<table><thead><tr><th>Event</th></tr></thead><tbody><tr><td>Independence</td></tr><tr><td>Republic</td></tr></tbody></table>"
        );
        assert_eq!(delete_column(&mut doc, t, 5), Err(TableError::NoSuchColumn(5)));
    }

    #[test]
    fn row_operations_reject_non_rows() {
        let mut doc = Document::parse(TABLE);
        let t = table(&doc);
        assert_eq!(delete_row(&mut doc, t), Err(TableError::NotARow(t)));
        assert_eq!(insert_row_after(&mut doc, t), Err(TableError::NotARow(t)));
    }
}
