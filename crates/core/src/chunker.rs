//! Sentence-bounded splitting of long replies for progressive display.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::CHUNK_MAX_CHARS;

#[expect(clippy::unwrap_used, reason = "static regex pattern is valid")]
static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Splits `text` into chunks of at most [`CHUNK_MAX_CHARS`] characters.
///
/// Texts within the limit come back as a single chunk. Longer texts are cut at
/// sentence boundaries and sentences are packed greedily, joined by one space.
/// A sentence that alone exceeds the limit is kept whole.
#[must_use]
pub fn split_into_chunks(text: &str) -> Vec<String> {
    if text.chars().count() <= CHUNK_MAX_CHARS {
        return vec![text.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in sentences(text) {
        let sentence_len = sentence.chars().count();
        if current.is_empty() {
            current.push_str(sentence);
            current_len = sentence_len;
        } else if current_len + 1 + sentence_len <= CHUNK_MAX_CHARS {
            current.push(' ');
            current.push_str(sentence);
            current_len += 1 + sentence_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Sentences keep their terminal punctuation; the whitespace after it is dropped.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut start = 0usize;
    let mut pieces = Vec::new();
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // punctuation is a single ASCII byte
        pieces.push(&text[start..=boundary.start()]);
        start = boundary.end();
    }
    pieces.push(&text[start..]);
    pieces.into_iter().filter(|s| !s.is_empty())
}
