//! Splitting narration text into speakable chunks.
//!
//! Synthesis engines typically reject or mangle over-long utterances, so the
//! narration text is cut into sentence-bounded chunks before submission. The
//! splitter favors sentence integrity over strict length compliance: a single
//! sentence longer than the limit is kept whole rather than truncated.

use once_cell::sync::Lazy;
use regex::Regex;

/// The default soft limit on chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 200;

// A sentence runs up to terminal punctuation followed by whitespace or end
// of input; a tail without terminal punctuation counts as a sentence too, so
// no text is ever dropped.
static SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*?[.!?]+(?:\s|$)|.+$").unwrap());

/// A sentence-bounded slice of the narration text, submitted as one unit to
/// the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    text: String,
    offset: usize,
}

impl Chunk {
    /// The text of this chunk.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The character offset of this chunk's first character within the
    /// whitespace-normalized narration text.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The length of this chunk, in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this chunk contains no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Collapses whitespace runs into single spaces and trims the ends.
///
/// Chunk offsets are expressed in characters of this normalized form, which
/// is also what the aggregate progress computation measures against.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into ordered chunks no longer than `max_len` characters,
/// respecting sentence boundaries.
///
/// Sentences are accumulated greedily: the running buffer is flushed when
/// appending the next sentence would push it past `max_len` and the buffer
/// already holds at least one sentence. A sentence that alone exceeds
/// `max_len` becomes one oversized chunk. Text with no terminal punctuation
/// is treated as a single sentence. Empty or whitespace-only input yields no
/// chunks.
pub fn split_text(text: &str, max_len: usize) -> Vec<Chunk> {
    let text = normalize(text);
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_offset = 0;
    let mut offset = 0;

    for matched in SENTENCE.find_iter(&text) {
        let sentence = matched.as_str().trim_end();
        let sentence_len = sentence.chars().count();
        if sentence.is_empty() {
            continue;
        }

        let buffer_len = buffer.chars().count();
        if buffer_len > 0 && buffer_len + 1 + sentence_len > max_len {
            chunks.push(Chunk {
                text: std::mem::take(&mut buffer),
                offset: buffer_offset,
            });
        }

        if buffer.is_empty() {
            buffer_offset = offset;
            buffer.push_str(sentence);
        } else {
            buffer.push(' ');
            buffer.push_str(sentence);
        }
        // +1 for the separating space consumed by the sentence pattern.
        offset += sentence_len + 1;
    }

    if !buffer.is_empty() {
        chunks.push(Chunk {
            text: buffer,
            offset: buffer_offset,
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(Chunk::text).collect()
    }

    #[test]
    fn splits_at_sentence_boundaries() {
        let chunks = split_text("Hello world. This is a test.", 20);
        assert_eq!(texts(&chunks), vec!["Hello world.", "This is a test."]);
        assert_eq!(chunks[0].offset(), 0);
        assert_eq!(chunks[1].offset(), 13);
    }

    #[test]
    fn keeps_oversized_sentence_whole() {
        let chunks = split_text("abcdefgh", 5);
        assert_eq!(texts(&chunks), vec!["abcdefgh"]);
    }

    #[test]
    fn accumulates_short_sentences() {
        let chunks = split_text("One. Two. Three. Four.", 12);
        assert_eq!(texts(&chunks), vec!["One. Two.", "Three. Four."]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", 100).is_empty());
        assert!(split_text("   \n\t  ", 100).is_empty());
    }

    #[test]
    fn text_without_terminal_punctuation_is_one_sentence() {
        let chunks = split_text("no punctuation here at all", 10);
        assert_eq!(texts(&chunks), vec!["no punctuation here at all"]);
    }

    #[test]
    fn handles_exclamations_and_questions() {
        let chunks = split_text("Really?! Yes! Sure.", 10);
        assert_eq!(texts(&chunks), vec!["Really?!", "Yes! Sure."]);
    }

    #[test]
    fn joined_chunks_reproduce_normalized_text() {
        let text = "First  sentence. Second\nsentence! Third one? And a trailing fragment";
        let chunks = split_text(text, 25);
        let joined = chunks
            .iter()
            .map(Chunk::text)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(joined, normalize(text));
    }

    #[test]
    fn offsets_match_positions_in_normalized_text() {
        let text = "Alpha beta. Gamma delta epsilon. Zeta.";
        let normalized = normalize(text);
        for chunk in split_text(text, 15) {
            let at: String = normalized
                .chars()
                .skip(chunk.offset())
                .take(chunk.len())
                .collect();
            assert_eq!(at, chunk.text());
        }
    }

    #[test]
    fn no_chunk_exceeds_limit_unless_single_sentence() {
        let text = "Short one. Another short one. A noticeably longer sentence that stands alone here. Tail.";
        for chunk in split_text(text, 30) {
            if chunk.len() > 30 {
                // Oversized chunks must hold exactly one sentence.
                let inner = &chunk.text()[..chunk.text().len() - 1];
                assert!(!inner.contains(['.', '!', '?']));
            }
        }
    }
}
