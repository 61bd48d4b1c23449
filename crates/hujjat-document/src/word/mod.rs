// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word (.docx) codec. The package is a ZIP archive; only
// `word/document.xml` is decoded, every other part is carried through.

pub mod model;
pub(crate) mod reader;
pub(crate) mod writer;

use std::io::{Cursor, Read, Write};

use hujjat_core::error::{HujjatError, Result};
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use model::{Block, Cell, Paragraph, Row, Table, WordDocument};

const DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const FRESH_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const FRESH_SECTION: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

const FRESH_TAIL: &str = "</w:body></w:document>";

impl WordDocument {
    /// Decode a `.docx` package from memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| HujjatError::Docx(format!("not a ZIP package: {e}")))?;

        let mut package = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| HujjatError::Docx(format!("failed to read entry {i}: {e}")))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;
            package.push((name, content));
        }

        let xml = package
            .iter()
            .find(|(name, _)| name == DOCUMENT_PART)
            .map(|(_, content)| content)
            .ok_or_else(|| HujjatError::Docx(format!("package has no {DOCUMENT_PART}")))?;
        let xml = std::str::from_utf8(xml)
            .map_err(|e| HujjatError::Docx(format!("{DOCUMENT_PART} is not UTF-8: {e}")))?;

        let parsed = reader::parse_document_xml(xml)?;
        let doc = Self {
            head: parsed.head,
            body: parsed.body,
            tail: parsed.tail,
            package,
        };

        debug!(
            entries = doc.package.len(),
            paragraphs = doc.paragraph_count(),
            tables = doc.table_count(),
            "Word document decoded"
        );
        Ok(doc)
    }

    /// A new single-section A4 document holding one paragraph per item.
    pub fn from_paragraphs(paragraphs: impl IntoIterator<Item = String>) -> Self {
        let mut body: Vec<Block> = paragraphs
            .into_iter()
            .map(|text| Block::Paragraph(Paragraph::new(text)))
            .collect();
        body.push(Block::Raw(FRESH_SECTION.into()));

        Self {
            head: FRESH_HEAD.into(),
            body,
            tail: FRESH_TAIL.into(),
            package: vec![
                ("[Content_Types].xml".into(), CONTENT_TYPES.as_bytes().to_vec()),
                ("_rels/.rels".into(), PACKAGE_RELS.as_bytes().to_vec()),
                (DOCUMENT_PART.into(), Vec::new()),
            ],
        }
    }

    /// Encode back to a `.docx` package.
    #[instrument(skip(self))]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document_xml = writer::write_document_xml(&self.head, &self.body, &self.tail);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, content) in &self.package {
            zip.start_file(name.as_str(), options)
                .map_err(|e| HujjatError::Docx(format!("failed to write {name}: {e}")))?;
            if name == DOCUMENT_PART {
                zip.write_all(document_xml.as_bytes())?;
            } else {
                zip.write_all(content)?;
            }
        }

        let output = zip
            .finish()
            .map_err(|e| HujjatError::Docx(format!("failed to finish package: {e}")))?
            .into_inner();

        debug!(output_bytes = output.len(), "Word document encoded");
        Ok(output)
    }
}
