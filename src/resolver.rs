// Maps approximate facility progress offsets back to sentence indices.
// The facility's offsets drift, repeat, and occasionally arrive out of order;
// resolution scans forward from the last known sentence and never seeks
// backwards.

use tracing::trace;

use crate::segmenter::{Sentence, TextOffset};

/// Resolve a progress offset to the sentence being spoken.
///
/// Scans from `hint` forward for the sentence whose `[start, end)` range
/// contains `offset`. When no sentence contains it (the facility may report a
/// position inside an inter-sentence gap or past the last sentence), the last
/// scanned sentence starting at or before `offset` wins. An offset that
/// regressed before the hinted sentence resolves to `hint` unchanged.
pub fn resolve(offset: TextOffset, sentences: &[Sentence], hint: usize) -> usize {
    if sentences.is_empty() {
        return hint;
    }
    let hint = hint.min(sentences.len() - 1);
    let mut fallback = None;

    for (index, sentence) in sentences.iter().enumerate().skip(hint) {
        if sentence.contains(offset) {
            trace!("Offset {} contained by sentence {}", offset.0, index);
            return index;
        }
        if sentence.start > offset {
            // Sentences are ordered; nothing further can match
            break;
        }
        fallback = Some(index);
    }

    let resolved = fallback.unwrap_or(hint);
    trace!("Offset {} resolved to sentence {} via fallback", offset.0, resolved);
    resolved
}
