//! Rule-based narration script: the leading sentences of the article.
//!
//! Sentence boundaries are found with a small punkt-style rule set tuned
//! for English news copy. A run of `.`, `!`, `?` or `…` (optionally
//! followed by closing quotes or brackets) and whitespace ends a sentence,
//! unless
//!
//! - the next word starts with a lowercase letter,
//! - the period ends a known abbreviation (`Mr.`, `Gov.`, `Jan.`, ...),
//! - the period ends a single-letter initial or a dotted acronym (`J.`, `U.S.`).

use once_cell::sync::Lazy;
use regex::Regex;

static BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[.!?…]+["'”’)\]]*\s+"#).unwrap());
static DOTTED_ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\p{L}\.)+\p{L}$").unwrap());

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "vs", "etc", "inc", "ltd",
    "co", "corp", "dept", "univ", "gen", "gov", "sen", "rep", "rev", "col", "lt", "sgt", "capt",
    "no", "vol", "fig", "approx", "est", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec",
];

/// Split text into sentences, trimmed, in order.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;

    for m in BOUNDARY.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        if !is_sentence_end(text, start, m.start(), m.end()) {
            continue;
        }
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Narration script: the first `max_sentences` sentences joined by spaces.
///
/// Whitespace runs inside a sentence, line breaks included, collapse to a
/// single space. Returns an empty string for empty or whitespace-only input.
pub fn summarize(body_text: &str, max_sentences: usize) -> String {
    split_sentences(body_text)
        .into_iter()
        .take(max_sentences)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `punct_start..next_start` is a boundary match; `start` is where the
/// current sentence began.
fn is_sentence_end(text: &str, start: usize, punct_start: usize, next_start: usize) -> bool {
    if let Some(next) = text[next_start..].chars().next() {
        if next.is_lowercase() {
            return false;
        }
    }

    let punct = &text[punct_start..next_start];
    if !punct.starts_with('.') || punct.trim_end().starts_with("..") {
        return true;
    }

    let token = text[start..punct_start]
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    if token.is_empty() {
        return true;
    }
    let single_letter = token.chars().count() == 1 && token.chars().all(char::is_alphabetic);
    !(single_letter || ABBREVIATIONS.contains(&token.as_str()) || DOTTED_ACRONYM.is_match(&token))
}
