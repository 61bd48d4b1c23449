// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory tree of a Word document's text-bearing nodes.
//
// Only paragraphs and tables are modelled. Paragraph, run, table, and row
// properties are carried as raw XML and written back verbatim; every other
// body element survives as a `Block::Raw` fragment.

/// A body-level (or cell-level) element.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Any other element (section properties, bookmarks, content controls),
    /// kept as the exact XML it was read from.
    Raw(String),
}

/// One paragraph, reduced to its plain text.
///
/// Runs are collapsed into one on write; the first run's properties are kept
/// so the paragraph keeps its dominant formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub(crate) open_tag: Option<String>,
    pub(crate) properties: Option<String>,
    pub(crate) run_properties: Option<String>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Raw `w:tblPr`, `w:tblGrid` and any other non-row children.
    pub(crate) properties: String,
    pub rows: Vec<Row>,
}

impl Table {
    /// Plain grid of single-paragraph cells.
    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = String>,
    {
        let rows = rows
            .into_iter()
            .map(|cells| Row {
                properties: String::new(),
                cells: cells
                    .into_iter()
                    .map(|text| Cell {
                        blocks: vec![Block::Paragraph(Paragraph::new(text))],
                    })
                    .collect(),
            })
            .collect();
        Self {
            properties: r#"<w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#
                .into(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub(crate) properties: String,
    pub cells: Vec<Cell>,
}

/// A table cell. Its `w:tcPr` is the leading `Block::Raw` when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub blocks: Vec<Block>,
}

/// A decoded `.docx` package.
#[derive(Debug, Clone)]
pub struct WordDocument {
    /// `word/document.xml` up to and including the opening `<w:body>` tag.
    pub(crate) head: String,
    pub body: Vec<Block>,
    /// Everything from the closing `</w:body>` tag on.
    pub(crate) tail: String,
    /// Every package entry in its original order. The `word/document.xml`
    /// entry is regenerated from `head`/`body`/`tail` on encode.
    pub(crate) package: Vec<(String, Vec<u8>)>,
}

impl WordDocument {
    /// Number of paragraphs anywhere in the document, table cells included.
    pub fn paragraph_count(&self) -> usize {
        let mut count = 0;
        visit_blocks(&self.body, &mut |block: &Block| {
            if matches!(block, Block::Paragraph(_)) {
                count += 1;
            }
        });
        count
    }

    /// Number of tables anywhere in the document, nested tables included.
    pub fn table_count(&self) -> usize {
        let mut count = 0;
        visit_blocks(&self.body, &mut |block: &Block| {
            if matches!(block, Block::Table(_)) {
                count += 1;
            }
        });
        count
    }

    /// Visit every paragraph in document order, descending into table cells
    /// at any nesting depth.
    pub fn for_each_paragraph_mut(&mut self, mut f: impl FnMut(&mut Paragraph)) {
        visit_paragraphs_mut(&mut self.body, &mut f);
    }

    /// Text of every paragraph in document order.
    pub fn plain_paragraphs(&self) -> Vec<String> {
        let mut out = Vec::new();
        visit_blocks(&self.body, &mut |block: &Block| {
            if let Block::Paragraph(p) = block {
                out.push(p.text.clone());
            }
        });
        out
    }
}

fn visit_blocks(blocks: &[Block], f: &mut impl FnMut(&Block)) {
    for block in blocks {
        f(block);
        if let Block::Table(table) = block {
            for cell in table.rows.iter().flat_map(|row| &row.cells) {
                visit_blocks(&cell.blocks, f);
            }
        }
    }
}

fn visit_paragraphs_mut(blocks: &mut [Block], f: &mut impl FnMut(&mut Paragraph)) {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => f(paragraph),
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|row| &mut row.cells) {
                    visit_paragraphs_mut(&mut cell.blocks, f);
                }
            }
            Block::Raw(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> WordDocument {
        let mut outer = Table::from_text_rows([vec!["a".to_string(), "b".to_string()]]);
        let inner = Table::from_text_rows([vec!["c".to_string()]]);
        outer.rows[0].cells[1].blocks.push(Block::Table(inner));
        let mut doc = WordDocument::from_paragraphs(["intro".to_string()]);
        doc.body.insert(1, Block::Table(outer));
        doc
    }

    #[test]
    fn counts_descend_into_nested_tables() {
        let doc = nested();
        assert_eq!(doc.table_count(), 2);
        assert_eq!(doc.paragraph_count(), 4);
    }

    #[test]
    fn paragraphs_are_visited_in_document_order() {
        let mut doc = nested();
        let mut seen = Vec::new();
        doc.for_each_paragraph_mut(|p| {
            seen.push(p.text.clone());
            p.text = p.text.to_uppercase();
        });
        assert_eq!(seen, vec!["intro", "a", "b", "c"]);
        assert_eq!(doc.plain_paragraphs(), vec!["INTRO", "A", "B", "C"]);
    }
}
