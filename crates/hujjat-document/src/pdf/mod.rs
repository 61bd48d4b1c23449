// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: decoding, page selection, text extraction, and rendering.

pub mod reader;
pub mod writer;

pub use reader::PdfDocument;
pub use writer::{PAGE_BREAK, PdfRenderer};
