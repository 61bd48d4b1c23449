// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF renderer. Lays out plain paragraphs onto pages using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// The built-in Helvetica font only covers Latin-1, so anything outside it is
// printed as '?'. A form feed inside a paragraph forces a page break.

use hujjat_core::PaperSize;
use hujjat_core::error::Result;
use printpdf::{BuiltinFont, Mm, Op, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem};
use tracing::{debug, info, instrument};

/// Page break marker shared with the Word codec.
pub const PAGE_BREAK: char = '\u{c}';

const FONT_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_PT: f32 = 14.0;
const MARGIN_MM: f32 = 20.0;
const DOCUMENT_TITLE: &str = "Hujjat";

/// Lays out paragraphs in a simple top-to-bottom flow.
pub struct PdfRenderer {
    paper_size: PaperSize,
}

enum Line {
    Text(String),
    PageBreak,
}

impl PdfRenderer {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Render paragraphs, one after another, wrapping long lines and breaking
    /// pages automatically. An empty input yields a single blank page.
    #[instrument(skip_all, fields(paragraphs = paragraphs.len()))]
    pub fn render_paragraphs(&self, paragraphs: &[String]) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        info!(paper = ?self.paper_size, "Rendering PDF");

        let margin_pt: f32 = Mm(MARGIN_MM).into_pt().0;
        let usable_width_mm = page_w.0 - 2.0 * MARGIN_MM;

        // Average Helvetica glyph width is roughly 0.50 * font size,
        // converted to mm (1pt = 0.3528mm).
        let avg_char_width_mm: f32 = 0.50 * FONT_SIZE_PT * 0.3528;
        let max_chars_per_line = ((usable_width_mm / avg_char_width_mm) as usize).max(1);

        let page_h_pt = page_h.into_pt().0;
        let usable_height_pt = page_h_pt - 2.0 * margin_pt;
        let lines_per_page = ((usable_height_pt / LINE_HEIGHT_PT) as usize).max(1);

        let lines = layout(paragraphs, max_chars_per_line);

        let mut pages: Vec<PdfPage> = Vec::new();
        let mut ops: Vec<Op> = Vec::new();
        let mut line_idx: usize = 0;
        let mut break_pending = false;

        for line in &lines {
            let text = match line {
                Line::PageBreak => {
                    break_pending = line_idx > 0;
                    continue;
                }
                Line::Text(text) => text,
            };

            if break_pending || line_idx == lines_per_page {
                pages.push(PdfPage::new(page_w, page_h, std::mem::take(&mut ops)));
                line_idx = 0;
                break_pending = false;
            }

            let y_pt = page_h_pt - margin_pt - (line_idx as f32 * LINE_HEIGHT_PT);
            line_idx += 1;
            if text.is_empty() {
                continue;
            }

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(margin_pt),
                    y: Pt(y_pt),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(FONT_SIZE_PT),
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.clone())],
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::EndTextSection);
        }

        if line_idx > 0 || pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        let mut doc = printpdf::PdfDocument::new(DOCUMENT_TITLE);
        doc.with_pages(pages);

        debug!(
            total_lines = lines.len(),
            pages = doc.pages.len(),
            "Text layout complete"
        );

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        Ok(output)
    }
}

/// Flatten paragraphs into printable lines and explicit page breaks.
fn layout(paragraphs: &[String], max_width: usize) -> Vec<Line> {
    let mut lines = Vec::new();

    for paragraph in paragraphs {
        let printable = to_latin1(paragraph);
        if printable.trim().is_empty() && !printable.contains(PAGE_BREAK) {
            lines.push(Line::Text(String::new()));
            continue;
        }

        for (i, segment) in printable.split(PAGE_BREAK).enumerate() {
            if i > 0 {
                lines.push(Line::PageBreak);
            }
            if !segment.is_empty() {
                lines.extend(wrap_text(segment, max_width).into_iter().map(Line::Text));
            }
        }
    }

    lines
}

/// Map text onto what the built-in font can draw.
fn to_latin1(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            PAGE_BREAK | '\n' => Some(c.to_string()),
            '\t' => Some("    ".to_string()),
            c if c.is_control() => None,
            c if (c as u32) <= 0xFF => Some(c.to_string()),
            _ => Some("?".to_string()),
        })
        .collect()
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// line. Words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfDocument;

    fn page_count(bytes: &[u8]) -> usize {
        PdfDocument::from_bytes(bytes).unwrap().page_count()
    }

    #[test]
    fn empty_input_yields_one_blank_page() {
        let bytes = PdfRenderer::new(PaperSize::A4).render_paragraphs(&[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn form_feed_breaks_pages_without_trailing_blank() {
        let paragraphs = vec!["one\u{c}".to_string(), "two\u{c}".to_string(), "three".to_string()];
        let bytes = PdfRenderer::new(PaperSize::A5)
            .render_paragraphs(&paragraphs)
            .unwrap();
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn long_documents_overflow_onto_new_pages() {
        let paragraphs: Vec<String> = (0..200).map(|i| format!("Line {i}")).collect();
        let bytes = PdfRenderer::new(PaperSize::A4)
            .render_paragraphs(&paragraphs)
            .unwrap();
        assert!(page_count(&bytes) >= 3);
    }

    #[test]
    fn non_latin1_becomes_question_marks() {
        assert_eq!(to_latin1("Salom, дунё! é"), "Salom, ????! é");
        assert_eq!(to_latin1("a\tb"), "a    b");
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let lines = wrap_text("éééé ééé", 4);
        assert_eq!(lines, vec!["éééé", "ééé"]);
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }
}
