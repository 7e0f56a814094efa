// 🔤 Name Keys & Collation - Surname-first keys and locale-aware comparison

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Surname-first, case-folded sort key
///
/// "Eric Lu" → "lu, eric"; "Yunchan" → "yunchan"; "" → "".
/// The last whitespace-separated token is taken as the surname.
pub fn name_sort_key(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();

    match parts.split_last() {
        None => String::new(),
        Some((only, [])) => only.to_lowercase(),
        Some((last, rest)) => format!("{}, {}", last.to_lowercase(), rest.join(" ").to_lowercase()),
    }
}

/// Compare two strings the way a reader expects names and countries to sort
///
/// Primary: case and accents ignored ("Łukasz" next to "lukas").
/// Then case-folded text, then the raw text so the order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Case- and accent-folded form of `s`
///
/// Canonical decomposition splits "ễ" into "e" plus combining marks, which
/// are dropped. Letters with no decomposition ("ł", "ø", "ð") are mapped.
pub fn collation_key(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.as_str().nfd().filter(|c| !is_combining_mark(*c)) {
        match ch {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'þ' => out.push_str("th"),
            _ => out.push(fold_letter(ch)),
        }
    }
    out
}

fn is_combining_mark(ch: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&ch)
}

/// Stroked and dotless letters survive NFD untouched
fn fold_letter(ch: char) -> char {
    match ch {
        'đ' | 'ð' => 'd',
        'ħ' => 'h',
        'ı' => 'i',
        'ł' | 'ŀ' => 'l',
        'ø' => 'o',
        'ŧ' => 't',
        other => other,
    }
}

// ============================================================================
// TESTS
// ============================================================================
