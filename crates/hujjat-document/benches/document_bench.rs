// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the hujjat-document crate: the transliteration
// rules in both directions, page-range parsing, and a full paragraph walk
// over a table-heavy Word document.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use hujjat_core::TransliterationDirection;
use hujjat_document::transliterate::rewrite_paragraphs;
use hujjat_document::word::{Block, Table};
use hujjat_document::{PageSet, WordDocument, transliterate};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

const CYRILLIC: &str = "Ўзбекистон Республикаси Вазирлар Маҳкамасининг қарори. \
    Шаҳар ҳокимлиги ёшлар билан ишлаш бўйича янги тадбирлар режасини тасдиқлади.";

/// One paragraph of realistic length in each direction.
fn bench_transliteration(c: &mut Criterion) {
    let latin = transliterate(CYRILLIC, TransliterationDirection::ToLatin);

    c.bench_function("to_latin (paragraph)", |b| {
        b.iter(|| transliterate(black_box(CYRILLIC), TransliterationDirection::ToLatin));
    });
    c.bench_function("to_cyrillic (paragraph)", |b| {
        b.iter(|| transliterate(black_box(&latin), TransliterationDirection::ToCyrillic));
    });
}

fn bench_page_range(c: &mut Criterion) {
    c.bench_function("page_range parse (mixed)", |b| {
        b.iter(|| PageSet::parse(black_box("1-5, 7, 10-12, abc, 40-1, 200-260, 3")));
    });
}

/// 200 body paragraphs plus a 20x4 table.
fn bench_document_walk(c: &mut Criterion) {
    let mut doc = WordDocument::from_paragraphs((0..200).map(|_| CYRILLIC.to_string()));
    let rows = (0..20).map(|_| (0..4).map(|_| "Тошкент шаҳри".to_string()).collect::<Vec<_>>());
    doc.body.insert(100, Block::Table(Table::from_text_rows(rows)));

    c.bench_function("rewrite_paragraphs (200 paragraphs + table)", |b| {
        b.iter(|| {
            let mut copy = doc.clone();
            black_box(rewrite_paragraphs(&mut copy, TransliterationDirection::ToLatin));
        });
    });
}

criterion_group!(benches, bench_transliteration, bench_page_range, bench_document_walk);
criterion_main!(benches);
