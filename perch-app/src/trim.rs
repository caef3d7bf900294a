//! Sentence-preserving shortening of over-long descriptions.

/// Longest status the posting service accepts from us.
pub const MAX_STATUS_CHARS: usize = 275;

/// Number of characters (Unicode scalar values), not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Shorten `text` to the longest whole-sentence prefix that renders within
/// [`MAX_STATUS_CHARS`].
///
/// Sentences are split on `.`; the trailing fragment is discarded first
/// since the split leaves it truncated. Fragments are then dropped from the
/// end until the rejoined text plus its final `.` fits. Callers only invoke
/// this for text that is already over the limit. A very short or empty
/// result is accepted when nothing fits.
pub fn trim_status(text: &str) -> String {
    tracing::info!(chars = char_len(text), "text too long");

    let mut fragments: Vec<&str> = text.split('.').collect();
    fragments.pop();
    while char_len(&fragments.join(".")) + 1 > MAX_STATUS_CHARS {
        if fragments.pop().is_none() {
            break;
        }
    }
    let trimmed = fragments.join(".") + ".";

    tracing::info!(chars = char_len(&trimmed), "text trimmed");
    trimmed
}
