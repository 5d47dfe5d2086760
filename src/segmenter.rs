// Sentence segmentation for read-aloud playback.
// Boundaries are runs of terminal punctuation; offsets always index the utterance text.

use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

/// 0-based byte offset into the utterance text
///
/// Sentence offsets and facility progress offsets share this one space;
/// the wrapper keeps them from being mixed up with sentence indices.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct TextOffset(pub usize);

impl TextOffset {
    pub fn new(offset: usize) -> Self {
        TextOffset(offset)
    }
}

impl From<TextOffset> for usize {
    fn from(offset: TextOffset) -> Self {
        offset.0
    }
}

/// One sentence of the utterance with its fixed location in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    pub text: String,
    pub start: TextOffset,
    pub end: TextOffset,
}

impl Sentence {
    /// True when `offset` falls within this sentence's half-open `[start, end)` range
    pub fn contains(&self, offset: TextOffset) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Splits prose into ordered sentences with exact utterance offsets
pub struct Segmenter {
    terminators: Regex,
}

impl Segmenter {
    pub fn new() -> Result<Self> {
        // One or more consecutive terminators count as a single boundary
        let terminators = Regex::new(r"[.!?]+")?;
        Ok(Self { terminators })
    }

    /// Segment `text` into sentences in first-occurrence order.
    ///
    /// Total over all inputs: text without terminal punctuation yields the whole
    /// trimmed text as a single sentence, and empty or whitespace-only input
    /// yields an empty list. Each sentence's offsets are located by searching
    /// strictly after the previous sentence's end, so repeated identical
    /// sentences keep their own positions.
    pub fn segment(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut chunk_start = 0;
        let mut search_from = 0;

        for mat in self.terminators.find_iter(text) {
            self.push_sentence(
                text,
                chunk_start,
                mat.end(),
                &mut search_from,
                &mut sentences,
            );
            chunk_start = mat.end();
        }

        // Trailing text after the last terminator still forms a sentence
        if chunk_start < text.len() {
            self.push_sentence(text, chunk_start, text.len(), &mut search_from, &mut sentences);
        }

        debug!(
            "Segmented {} bytes into {} sentences",
            text.len(),
            sentences.len()
        );
        sentences
    }

    /// Trim the chunk, locate it after `search_from`, and append it as a sentence
    fn push_sentence(
        &self,
        text: &str,
        chunk_start: usize,
        chunk_end: usize,
        search_from: &mut usize,
        sentences: &mut Vec<Sentence>,
    ) {
        let trimmed = text[chunk_start..chunk_end].trim();
        if trimmed.is_empty() {
            return;
        }

        // Everything between the previous sentence end and this chunk is
        // whitespace, so the first match is this occurrence and not an
        // earlier identical sentence.
        if let Some(rel) = text[*search_from..].find(trimmed) {
            let start = *search_from + rel;
            let end = start + trimmed.len();

            sentences.push(Sentence {
                index: sentences.len(),
                text: trimmed.to_string(),
                start: TextOffset(start),
                end: TextOffset(end),
            });
            *search_from = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> Segmenter {
        Segmenter::new().expect("terminator pattern should compile")
    }

    #[test]
    fn test_three_sentence_text() {
        let text = "Dogs are loyal. Cats are independent. Birds can fly.";
        let sentences = segmenter().segment(text);

        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text, "Dogs are loyal.");
        assert_eq!(sentences[1].text, "Cats are independent.");
        assert_eq!(sentences[2].text, "Birds can fly.");

        assert_eq!(sentences[0].start, TextOffset(0));
        assert_eq!(sentences[0].end, TextOffset(15));
        assert_eq!(sentences[1].start, TextOffset(16));
        assert_eq!(sentences[1].end, TextOffset(37));
        assert_eq!(sentences[2].end, TextOffset(text.len()));

        for (i, sentence) in sentences.iter().enumerate() {
            assert_eq!(sentence.index, i);
            assert_eq!(&text[sentence.start.0..sentence.end.0], sentence.text);
        }
    }

    #[test]
    fn test_terminator_runs_count_as_one_boundary() {
        let sentences = segmenter().segment("Wait... what?! Really.");

        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text, "Wait...");
        assert_eq!(sentences[1].text, "what?!");
        assert_eq!(sentences[2].text, "Really.");
    }

    #[test]
    fn test_no_terminal_punctuation_yields_single_sentence() {
        let sentences = segmenter().segment("  a fragment without an ending  ");

        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "a fragment without an ending");
        assert_eq!(sentences[0].start, TextOffset(2));
    }

    #[test]
    fn test_empty_and_whitespace_inputs() {
        assert!(segmenter().segment("").is_empty());
        assert!(segmenter().segment("   \n\t  ").is_empty());
    }

    #[test]
    fn test_bare_terminator_run_is_kept() {
        // Trimming strips whitespace only; the run itself survives as a sentence
        let sentences = segmenter().segment(" ... ");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "...");
    }

    #[test]
    fn test_repeated_sentences_get_distinct_offsets() {
        let text = "Yes. Yes. Yes.";
        let sentences = segmenter().segment(text);

        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].start, TextOffset(0));
        assert_eq!(sentences[1].start, TextOffset(5));
        assert_eq!(sentences[2].start, TextOffset(10));
        for sentence in &sentences {
            assert_eq!(sentence.text, "Yes.");
            assert_eq!(&text[sentence.start.0..sentence.end.0], "Yes.");
        }
    }

    #[test]
    fn test_offsets_never_overlap() {
        let text = "One. Two! Three? Four";
        let sentences = segmenter().segment(text);

        for pair in sentences.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let text = "  First sentence.   Second one!\n\nThird?  tail without end  ";
        let sentences = segmenter().segment(text);

        let mut rebuilt = String::new();
        let mut cursor = 0;
        for sentence in &sentences {
            rebuilt.push_str(&text[cursor..sentence.start.0]);
            rebuilt.push_str(&text[sentence.start.0..sentence.end.0]);
            cursor = sentence.end.0;
        }
        rebuilt.push_str(&text[cursor..]);

        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_text_offsets() {
        let text = "C'est fini. Voilà déjà la suite.";
        let sentences = segmenter().segment(text);

        assert_eq!(sentences.len(), 2);
        assert_eq!(&text[sentences[1].start.0..sentences[1].end.0], sentences[1].text);
    }
}
