// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serialise the block tree back to WordprocessingML.

use quick_xml::escape::escape;

use super::model::{Block, Paragraph, Table};
use crate::pdf::PAGE_BREAK;

pub(crate) fn write_document_xml(head: &str, body: &[Block], tail: &str) -> String {
    let mut out = String::with_capacity(head.len() + tail.len() + body.len() * 128);
    out.push_str(head);
    write_blocks(&mut out, body);
    out.push_str(tail);
    out
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => write_paragraph(out, paragraph),
            Block::Table(table) => write_table(out, table),
            Block::Raw(xml) => out.push_str(xml),
        }
    }
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    out.push_str(paragraph.open_tag.as_deref().unwrap_or("<w:p>"));
    if let Some(properties) = &paragraph.properties {
        out.push_str(properties);
    }

    if !paragraph.text.is_empty() {
        out.push_str("<w:r>");
        if let Some(run_properties) = &paragraph.run_properties {
            out.push_str(run_properties);
        }
        write_run_text(out, &paragraph.text);
        out.push_str("</w:r>");
    }

    out.push_str("</w:p>");
}

/// Text nodes for one run; tabs and breaks become their own elements.
fn write_run_text(out: &mut String, text: &str) {
    let mut segment_start = 0;
    for (i, ch) in text.char_indices() {
        let element = match ch {
            '\t' => "<w:tab/>",
            '\n' => "<w:br/>",
            PAGE_BREAK => r#"<w:br w:type="page"/>"#,
            _ => continue,
        };
        write_text_node(out, &text[segment_start..i]);
        out.push_str(element);
        segment_start = i + ch.len_utf8();
    }
    write_text_node(out, &text[segment_start..]);
}

fn write_text_node(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape(text));
    out.push_str("</w:t>");
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<w:tbl>");
    out.push_str(&table.properties);
    for row in &table.rows {
        out.push_str("<w:tr>");
        out.push_str(&row.properties);
        for cell in &row.cells {
            out.push_str("<w:tc>");
            write_blocks(out, &cell.blocks);
            // A cell must end with a paragraph to be valid.
            if !matches!(cell.blocks.last(), Some(Block::Paragraph(_))) {
                out.push_str("<w:p/>");
            }
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}
