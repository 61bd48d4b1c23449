// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page range expressions: "1-5, 7, 10-12" into a sorted, deduplicated set of
// 1-based page numbers. Malformed tokens are skipped, never reported.

use std::collections::BTreeSet;
use std::fmt;

/// Highest page number a range may expand to. Guards against expressions such
/// as `1-4000000000` allocating billions of entries.
pub const MAX_PAGE_NUMBER: u32 = 100_000;

/// Ordered set of distinct page numbers, ascending, all >= 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    pages: Vec<u32>,
}

impl PageSet {
    /// Parse a free-text range expression.
    ///
    /// An empty result means nothing valid was found; callers must report
    /// that to the user rather than proceeding.
    pub fn parse(expression: &str) -> Self {
        let mut pages = BTreeSet::new();

        for token in expression.split(',') {
            let token: String = token.chars().filter(|c| !c.is_whitespace()).collect();
            if token.is_empty() {
                continue;
            }

            if token.contains('-') {
                let mut parts = token.split('-');
                let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next())
                else {
                    continue;
                };
                let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) else {
                    continue;
                };
                if start <= end {
                    let end = end.min(MAX_PAGE_NUMBER);
                    pages.extend(start.max(1)..=end);
                }
            } else if let Ok(page) = token.parse::<u32>()
                && (1..=MAX_PAGE_NUMBER).contains(&page)
            {
                pages.insert(page);
            }
        }

        Self {
            pages: pages.into_iter().collect(),
        }
    }

    /// Build from arbitrary page numbers, enforcing the set invariants.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>) -> Self {
        let set: BTreeSet<u32> = pages.into_iter().filter(|p| *p >= 1).collect();
        Self {
            pages: set.into_iter().collect(),
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Pages that exist in a document of `total_pages` pages.
    pub fn within(&self, total_pages: usize) -> Vec<u32> {
        self.pages
            .iter()
            .copied()
            .filter(|p| (*p as usize) <= total_pages)
            .collect()
    }
}

impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{page}")?;
        }
        Ok(())
    }
}
