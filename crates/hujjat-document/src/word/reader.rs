// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `word/document.xml` parser built on quick-xml's pull reader.
//
// Elements are matched by local name so any namespace prefix works. Raw XML
// fragments (properties, unknown elements) are sliced straight out of the
// source text using the reader's byte positions.

use hujjat_core::error::{HujjatError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::model::{Block, Cell, Paragraph, Row, Table};
use crate::pdf::PAGE_BREAK;

/// Elements inside a paragraph whose text is not part of the visible flow
/// (drawings, text boxes, field instructions). Skipped wholesale.
const SKIPPED_IN_PARAGRAPH: [&[u8]; 6] = [
    b"drawing",
    b"pict",
    b"AlternateContent",
    b"object",
    b"instrText",
    b"delText",
];

/// Parsed `word/document.xml`: head, body blocks, tail.
pub(crate) struct ParsedBody {
    pub head: String,
    pub body: Vec<Block>,
    pub tail: String,
}

pub(crate) fn parse_document_xml(xml: &str) -> Result<ParsedBody> {
    BodyParser::new(xml).parse()
}

struct BodyParser<'a> {
    xml: &'a str,
    reader: Reader<&'a [u8]>,
}

impl<'a> BodyParser<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            xml,
            reader: Reader::from_str(xml),
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn slice(&self, start: usize, end: usize) -> Result<&'a str> {
        self.xml
            .get(start..end)
            .ok_or_else(|| HujjatError::Docx(format!("invalid XML span {start}..{end}")))
    }

    fn next(&mut self) -> Result<Event<'a>> {
        self.reader
            .read_event()
            .map_err(|e| HujjatError::Docx(format!("malformed document.xml: {e}")))
    }

    /// Consume the rest of an element whose start tag was just read.
    fn skip(&mut self, start: &BytesStart<'a>) -> Result<()> {
        self.reader
            .read_to_end(start.name())
            .map_err(|e| HujjatError::Docx(format!("malformed document.xml: {e}")))?;
        Ok(())
    }

    /// Raw XML of an element whose start tag began at `from`.
    fn capture(&mut self, from: usize, start: &BytesStart<'a>) -> Result<String> {
        self.skip(start)?;
        Ok(self.slice(from, self.position())?.to_owned())
    }

    fn parse(mut self) -> Result<ParsedBody> {
        loop {
            let from = self.position();
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"body" => {
                    let head = self.slice(0, self.position())?.to_owned();
                    let (body, body_end) = self.parse_blocks()?;
                    let tail = self.slice(body_end, self.xml.len())?.to_owned();
                    return Ok(ParsedBody { head, body, tail });
                }
                Event::Empty(e) if e.local_name().as_ref() == b"body" => {
                    let head = format!("{}<w:body>", self.slice(0, from)?);
                    let tail = format!("</w:body>{}", self.slice(self.position(), self.xml.len())?);
                    return Ok(ParsedBody {
                        head,
                        body: Vec::new(),
                        tail,
                    });
                }
                Event::Eof => {
                    return Err(HujjatError::Docx("document.xml has no <w:body>".into()));
                }
                _ => {}
            }
        }
    }

    /// Blocks up to the end tag of the enclosing container (`w:body` or
    /// `w:tc`). Returns the blocks and the byte offset of that end tag.
    fn parse_blocks(&mut self) -> Result<(Vec<Block>, usize)> {
        let mut blocks = Vec::new();
        loop {
            let from = self.position();
            match self.next()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"p" => {
                        let open_tag = self.slice(from, self.position())?.to_owned();
                        blocks.push(Block::Paragraph(self.parse_paragraph(open_tag)?));
                    }
                    b"tbl" => blocks.push(Block::Table(self.parse_table()?)),
                    _ => blocks.push(Block::Raw(self.capture(from, &e)?)),
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"p" {
                        let tag = self.slice(from, self.position())?;
                        blocks.push(Block::Paragraph(Paragraph {
                            open_tag: Some(opened(tag)),
                            ..Paragraph::default()
                        }));
                    } else {
                        blocks.push(Block::Raw(self.slice(from, self.position())?.to_owned()));
                    }
                }
                Event::End(_) => return Ok((blocks, from)),
                Event::Eof => return Err(HujjatError::Docx("unexpected end of document.xml".into())),
                _ => {}
            }
        }
    }

    /// Paragraph content after its start tag, through `</w:p>`.
    fn parse_paragraph(&mut self, open_tag: String) -> Result<Paragraph> {
        let mut paragraph = Paragraph {
            open_tag: Some(open_tag),
            ..Paragraph::default()
        };
        let mut depth = 0usize;
        let mut in_text = false;

        loop {
            let from = self.position();
            match self.next()? {
                Event::Start(e) => {
                    let local = e.local_name();
                    match local.as_ref() {
                        b"pPr" if depth == 0 => {
                            paragraph.properties = Some(self.capture(from, &e)?);
                        }
                        b"rPr" => {
                            let raw = self.capture(from, &e)?;
                            paragraph.run_properties.get_or_insert(raw);
                        }
                        name if SKIPPED_IN_PARAGRAPH.contains(&name) => self.skip(&e)?,
                        b"t" => {
                            in_text = true;
                            depth += 1;
                        }
                        _ => depth += 1,
                    }
                }
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => paragraph.text.push('\t'),
                    b"br" if is_page_break(&e) => paragraph.text.push(PAGE_BREAK),
                    b"br" | b"cr" => paragraph.text.push('\n'),
                    b"rPr" => {
                        let raw = self.slice(from, self.position())?.to_owned();
                        paragraph.run_properties.get_or_insert(raw);
                    }
                    _ => {}
                },
                Event::Text(t) if in_text => {
                    let text = t
                        .unescape()
                        .map_err(|e| HujjatError::Docx(format!("bad text node: {e}")))?;
                    paragraph.text.push_str(&text);
                }
                Event::CData(t) if in_text => {
                    paragraph.text.push_str(&String::from_utf8_lossy(&t));
                }
                Event::End(e) => {
                    if depth == 0 {
                        return Ok(paragraph);
                    }
                    if e.local_name().as_ref() == b"t" {
                        in_text = false;
                    }
                    depth -= 1;
                }
                Event::Eof => return Err(HujjatError::Docx("unterminated paragraph".into())),
                _ => {}
            }
        }
    }

    fn parse_table(&mut self) -> Result<Table> {
        let mut table = Table::default();
        loop {
            let from = self.position();
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"tr" => {
                    table.rows.push(self.parse_row()?);
                }
                Event::Start(e) => table.properties.push_str(&self.capture(from, &e)?),
                Event::Empty(_) => table
                    .properties
                    .push_str(self.slice(from, self.position())?),
                Event::End(_) => return Ok(table),
                Event::Eof => return Err(HujjatError::Docx("unterminated table".into())),
                _ => {}
            }
        }
    }

    fn parse_row(&mut self) -> Result<Row> {
        let mut row = Row::default();
        loop {
            let from = self.position();
            match self.next()? {
                Event::Start(e) if e.local_name().as_ref() == b"tc" => {
                    let (blocks, _) = self.parse_blocks()?;
                    row.cells.push(Cell { blocks });
                }
                Event::Empty(e) if e.local_name().as_ref() == b"tc" => {
                    row.cells.push(Cell::default());
                }
                Event::Start(e) => row.properties.push_str(&self.capture(from, &e)?),
                Event::Empty(_) => row.properties.push_str(self.slice(from, self.position())?),
                Event::End(_) => return Ok(row),
                Event::Eof => return Err(HujjatError::Docx("unterminated table row".into())),
                _ => {}
            }
        }
    }
}

/// `<w:p w:rsidR="1"/>` as the start tag `<w:p w:rsidR="1">`.
fn opened(empty_tag: &str) -> String {
    let inner = empty_tag.trim_end().trim_end_matches('>').trim_end_matches('/').trim_end();
    format!("{inner}>")
}

fn is_page_break(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .any(|a| a.key.local_name().as_ref() == b"type" && a.value.as_ref() == b"page")
}
