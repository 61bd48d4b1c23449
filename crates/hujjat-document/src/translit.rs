// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uzbek Cyrillic <-> Latin transliteration.
//
// Both directions are pure functions over one logical text unit (a paragraph
// or a cell paragraph). Characters without a mapping pass through unchanged.
//
// Latin -> Cyrillic resolves multi-character sequences first, using an
// ordered rule list applied in a single left-to-right scan. A rule may only
// match at a position if no earlier rule matches inside its span, so
// "yo'l" becomes "йўл" (o' wins over yo) and "Sha" becomes "Ша".

use hujjat_core::TransliterationDirection;

/// Apostrophe variants accepted after `o`/`g` in Latin input.
const APOSTROPHES: [char; 5] = ['\'', '\u{2019}', '\u{2018}', '\u{02BB}', '\u{02BC}'];

/// Overrides consulted before the general Cyrillic table: ц is written as a
/// bare `s` rather than `ts`.
const TO_LATIN_OVERRIDES: &[(char, &str)] = &[('ц', "s"), ('Ц', "S")];

const TO_LATIN: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"), ('ё', "yo"),
    ('ж', "j"), ('з', "z"), ('и', "i"), ('й', "y"), ('к', "k"), ('л', "l"), ('м', "m"),
    ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"), ('с', "s"), ('т', "t"), ('у', "u"),
    ('ф', "f"), ('х', "x"), ('ц', "ts"), ('ч', "ch"), ('ш', "sh"), ('щ', "sh"), ('ъ', "\u{2019}"),
    ('ы', "i"), ('ь', ""), ('э', "e"), ('ю', "yu"), ('я', "ya"), ('ў', "o'"), ('қ', "q"),
    ('ғ', "g'"), ('ҳ', "h"),
    ('А', "A"), ('Б', "B"), ('В', "V"), ('Г', "G"), ('Д', "D"), ('Е', "E"), ('Ё', "Yo"),
    ('Ж', "J"), ('З', "Z"), ('И', "I"), ('Й', "Y"), ('К', "K"), ('Л', "L"), ('М', "M"),
    ('Н', "N"), ('О', "O"), ('П', "P"), ('Р', "R"), ('С', "S"), ('Т', "T"), ('У', "U"),
    ('Ф', "F"), ('Х', "X"), ('Ц', "Ts"), ('Ч', "Ch"), ('Ш', "Sh"), ('Щ', "Sh"), ('Ъ', "\u{2019}"),
    ('Ы', "I"), ('Ь', ""), ('Э', "E"), ('Ю', "Yu"), ('Я', "Ya"), ('Ў', "O'"), ('Қ', "Q"),
    ('Ғ', "G'"), ('Ҳ', "H"),
];

/// One multi-character Latin rule. `second == None` means "any apostrophe".
struct Digraph {
    first: char,
    second: Option<char>,
    replacement: char,
}

const fn apostrophe(first: char, replacement: char) -> Digraph {
    Digraph {
        first,
        second: None,
        replacement,
    }
}

const fn pair(first: char, second: char, replacement: char) -> Digraph {
    Digraph {
        first,
        second: Some(second),
        replacement,
    }
}

/// Ordered, case-sensitive multi-character rules. Earlier rules win.
const TO_CYRILLIC_DIGRAPHS: &[Digraph] = &[
    apostrophe('O', 'Ў'),
    apostrophe('o', 'ў'),
    apostrophe('G', 'Ғ'),
    apostrophe('g', 'ғ'),
    pair('C', 'h', 'Ч'),
    pair('c', 'h', 'ч'),
    pair('S', 'h', 'Ш'),
    pair('s', 'h', 'ш'),
    pair('Y', 'u', 'Ю'),
    pair('y', 'u', 'ю'),
    pair('Y', 'a', 'Я'),
    pair('y', 'a', 'я'),
    pair('Y', 'o', 'Ё'),
    pair('y', 'o', 'ё'),
    pair('T', 's', 'Ц'),
    pair('t', 's', 'ц'),
];

const TO_CYRILLIC: &[(char, char)] = &[
    ('a', 'а'), ('b', 'б'), ('v', 'в'), ('g', 'г'), ('d', 'д'), ('e', 'е'), ('j', 'ж'),
    ('z', 'з'), ('i', 'и'), ('y', 'й'), ('k', 'к'), ('l', 'л'), ('m', 'м'), ('n', 'н'),
    ('o', 'о'), ('p', 'п'), ('r', 'р'), ('s', 'с'), ('t', 'т'), ('u', 'у'), ('f', 'ф'),
    ('x', 'х'), ('h', 'ҳ'), ('q', 'қ'),
    ('A', 'А'), ('B', 'Б'), ('V', 'В'), ('G', 'Г'), ('D', 'Д'), ('E', 'Е'), ('J', 'Ж'),
    ('Z', 'З'), ('I', 'И'), ('Y', 'Й'), ('K', 'К'), ('L', 'Л'), ('M', 'М'), ('N', 'Н'),
    ('O', 'О'), ('P', 'П'), ('R', 'Р'), ('S', 'С'), ('T', 'Т'), ('U', 'У'), ('F', 'Ф'),
    ('X', 'Х'), ('H', 'Ҳ'), ('Q', 'Қ'),
];

/// Rewrite `text` in the given direction.
pub fn transliterate(text: &str, direction: TransliterationDirection) -> String {
    match direction {
        TransliterationDirection::ToLatin => to_latin(text),
        TransliterationDirection::ToCyrillic => to_cyrillic(text),
    }
}

fn to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let mapped = lookup(TO_LATIN_OVERRIDES, ch).or_else(|| lookup(TO_LATIN, ch));
        match mapped {
            Some(latin) => out.push_str(latin),
            None => out.push(ch),
        }
    }
    out
}

fn to_cyrillic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        if let Some(rule) = digraph_at(&chars, i) {
            out.push(TO_CYRILLIC_DIGRAPHS[rule].replacement);
            i += 2;
            continue;
        }
        let ch = chars[i];
        match TO_CYRILLIC.iter().find(|(latin, _)| *latin == ch) {
            Some((_, cyrillic)) => out.push(*cyrillic),
            None => out.push(ch),
        }
        i += 1;
    }

    out
}

/// Index of the rule that applies at `i`, honouring rule priority against a
/// competing match that starts on the second character.
fn digraph_at(chars: &[char], i: usize) -> Option<usize> {
    let rule = first_match(chars, i, TO_CYRILLIC_DIGRAPHS.len())?;
    match first_match(chars, i + 1, rule) {
        Some(_) => None,
        None => Some(rule),
    }
}

/// First rule with index below `limit` matching at position `i`.
fn first_match(chars: &[char], i: usize, limit: usize) -> Option<usize> {
    let (first, second) = (*chars.get(i)?, *chars.get(i + 1)?);
    TO_CYRILLIC_DIGRAPHS[..limit].iter().position(|rule| {
        rule.first == first
            && match rule.second {
                Some(expected) => expected == second,
                None => APOSTROPHES.contains(&second),
            }
    })
}

fn lookup(table: &'static [(char, &'static str)], ch: char) -> Option<&'static str> {
    table.iter().find(|(c, _)| *c == ch).map(|(_, s)| *s)
}
