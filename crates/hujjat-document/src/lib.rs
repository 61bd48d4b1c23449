// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// hujjat-document: the document transformation pipeline.
//
// Provides page-range parsing, Uzbek Cyrillic/Latin transliteration, PDF and
// Word codecs, format converters, and the three operations built on them:
// page extraction, whole-document transliteration, and plain conversion.

pub mod convert;
pub mod extract;
pub mod page_range;
pub mod pdf;
pub mod pipeline;
pub mod scratch;
pub mod source;
pub mod translit;
pub mod transliterate;
pub mod word;

// Re-export the primary types so callers can use `hujjat_document::Pipeline` etc.
pub use convert::{ConverterSet, PdfToWordConverter, WordToPdfConverter};
pub use extract::PageExtractor;
pub use page_range::PageSet;
pub use pdf::{PdfDocument, PdfRenderer};
pub use pipeline::{Pipeline, PipelineOutput};
pub use scratch::{Scratch, TempArtifact};
pub use source::SourceDocument;
pub use translit::transliterate;
pub use transliterate::DocumentTransliterator;
pub use word::WordDocument;
