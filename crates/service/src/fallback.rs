//! Canned replies used when no provider answer is available.

use rand::Rng;
use rand::seq::SliceRandom as _;
use sofia_core::constants::{FALLBACK_ECHO_MAX_CHARS, FALLBACK_REPLIES, GREETING_REPLY};

const ELLIPSIS: &str = "...";

/// A random therapeutic prompt, prefixed with an echo of `input` when it is
/// not blank.
pub fn fallback_reply(input: &str) -> String {
    let mut rng = rand::thread_rng();
    fallback_reply_with(input, &mut rng)
}

pub fn fallback_reply_with<R: Rng + ?Sized>(input: &str, rng: &mut R) -> String {
    let prompt = FALLBACK_REPLIES.choose(rng).copied().unwrap_or(GREETING_REPLY);
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return prompt.to_owned();
    }
    format!("Você disse: \"{}\". {prompt}", echo(trimmed))
}

/// `text` capped at [`FALLBACK_ECHO_MAX_CHARS`] characters, ellipsis included.
fn echo(text: &str) -> String {
    if text.chars().count() <= FALLBACK_ECHO_MAX_CHARS {
        return text.to_owned();
    }
    let keep = FALLBACK_ECHO_MAX_CHARS - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
