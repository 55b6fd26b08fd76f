//! Recovering a word triple from free-text model output
//!
//! The service gives no format guarantee, so parsing runs in two phases:
//! a scan for labeled lines ("Word:", "Meaning:", "Example:"), then a
//! positional reading of the first three lines if any label was missing.

use crate::types::WordTriple;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Word,
    Meaning,
    Example,
}

/// Longest labels first so "example sentence" wins over "example"
const LABELS: &[(&str, Field)] = &[
    ("word of the day", Field::Word),
    ("example sentence", Field::Example),
    ("example", Field::Example),
    ("meaning", Field::Meaning),
    ("word", Field::Word),
];

/// Words longer than this many whitespace-separated tokens are prose, not a word
const MAX_WORD_TOKENS: usize = 4;

/// Parse a model response into a triple
///
/// Returns `None` when no plausible word could be recovered.
pub fn parse_response(text: &str) -> Option<WordTriple> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let triple = parse_labeled(&lines).or_else(|| parse_positional(&lines))?;
    if is_plausible_word(&triple.word) {
        Some(triple)
    } else {
        None
    }
}

fn parse_labeled(lines: &[&str]) -> Option<WordTriple> {
    let mut word = None;
    let mut meaning = None;
    let mut example = None;

    for line in lines {
        let Some((field, value)) = split_label(line) else {
            continue;
        };
        let slot = match field {
            Field::Word => &mut word,
            Field::Meaning => &mut meaning,
            Field::Example => &mut example,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    Some(WordTriple {
        word: clean_word(&word?),
        meaning: meaning?,
        example: example?,
    })
}

fn parse_positional(lines: &[&str]) -> Option<WordTriple> {
    if lines.len() < 3 {
        return None;
    }

    let value = |line: &str| -> String {
        let line = strip_list_marker(line);
        match line.split_once(':') {
            Some((_, rest)) => rest.trim().to_string(),
            None => line.trim().to_string(),
        }
    };

    Some(WordTriple {
        word: clean_word(&value(lines[0])),
        meaning: value(lines[1]),
        example: value(lines[2]),
    })
}

/// Match a known label at the start of `line` and return the value after it
fn split_label(line: &str) -> Option<(Field, &str)> {
    let body = strip_list_marker(line);

    for (label, field) in LABELS {
        let Some(head) = body.get(..label.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(label) {
            continue;
        }

        let rest = &body[label.len()..];
        // "Wordsmith: ..." is not a "Word" label
        if rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric())
        {
            continue;
        }

        let rest = trim_emphasis(rest);
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        let value = trim_emphasis(rest);
        if value.is_empty() {
            return None;
        }
        return Some((*field, value));
    }

    None
}

/// Drop bullet, quote and emphasis markers and a leading `1.` or `2)` ordinal
fn strip_list_marker(line: &str) -> &str {
    let is_marker = |c: char| matches!(c, '*' | '_' | '-' | '#' | '>') || c.is_whitespace();
    let body = line.trim_start_matches(is_marker);

    let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return body;
    }
    match body[digits..].strip_prefix(&['.', ')'][..]) {
        Some(rest) if rest.is_empty() || rest.starts_with(is_marker) => {
            rest.trim_start_matches(is_marker)
        }
        _ => body,
    }
}

fn trim_emphasis(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, '*' | '_') || c.is_whitespace())
}

fn clean_word(word: &str) -> String {
    word.trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '_' | '.' | '`') || c.is_whitespace())
        .to_string()
}

fn is_plausible_word(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && word.split_whitespace().count() <= MAX_WORD_TOKENS
}
