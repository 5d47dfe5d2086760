// Simulated speech facility for the CLI driver.
// Emits word-boundary progress signals over a channel, paced by a
// words-per-minute budget scaled by the rate hint, with an extra pause after
// sentence-final words. No audio is produced.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::segmenter::TextOffset;
use crate::speech::{SpeechFacility, SpeechSettings, SpeechSignal};

const RUNNING: u8 = 0;
const PAUSED: u8 = 1;
const CANCELLED: u8 = 2;

const SENTENCE_PAUSE_MS: u64 = 250;
const PAUSE_POLL_MS: u64 = 10;

/// Word-paced facility that speaks silently into a signal channel
pub struct SimulatedSpeech {
    signals: mpsc::Sender<SpeechSignal>,
    control: Arc<AtomicU8>,
    wpm: u32,
    jitter: usize,
}

impl SimulatedSpeech {
    /// Create the facility and the receiver its signals arrive on.
    ///
    /// `wpm` is the speaking pace before rate scaling; `jitter` drifts each
    /// reported offset by up to that many bytes, alternating direction, to
    /// exercise resolver tolerance the way real synthesizers do.
    pub fn new(wpm: u32, jitter: usize) -> (Self, mpsc::Receiver<SpeechSignal>) {
        let (signals, receiver) = mpsc::channel(64);
        let facility = Self {
            signals,
            control: Arc::new(AtomicU8::new(CANCELLED)),
            wpm: wpm.max(1),
            jitter,
        };
        (facility, receiver)
    }
}

impl SpeechFacility for SimulatedSpeech {
    fn start(&mut self, text: &str, settings: &SpeechSettings) -> Result<()> {
        // At most one utterance: a fresh start abandons the previous emitter
        self.control.store(CANCELLED, Ordering::Relaxed);
        self.control = Arc::new(AtomicU8::new(RUNNING));

        let words = word_schedule(text);
        let text_len = text.len();
        let effective_wpm = (self.wpm as f32 * settings.rate).max(1.0);
        let word_delay = Duration::from_millis((60_000.0 / effective_wpm) as u64);
        let sentence_pause = Duration::from_millis(SENTENCE_PAUSE_MS);

        debug!(
            "Simulated utterance: {} words at {:.0} wpm effective",
            words.len(),
            effective_wpm
        );

        let control = Arc::clone(&self.control);
        let signals = self.signals.clone();
        let jitter = self.jitter;

        tokio::spawn(async move {
            for (i, (offset, ends_sentence)) in words.iter().copied().enumerate() {
                // Hold while paused, leave for good on cancel
                loop {
                    match control.load(Ordering::Relaxed) {
                        RUNNING => break,
                        PAUSED => tokio::time::sleep(Duration::from_millis(PAUSE_POLL_MS)).await,
                        _ => return,
                    }
                }

                // Alternate drift direction so both early and late offsets occur
                let reported = if i % 2 == 0 {
                    offset.saturating_sub(jitter)
                } else {
                    (offset + jitter).min(text_len)
                };
                if signals
                    .send(SpeechSignal::Progress(TextOffset(reported)))
                    .await
                    .is_err()
                {
                    return;
                }

                tokio::time::sleep(word_delay).await;
                if ends_sentence {
                    tokio::time::sleep(sentence_pause).await;
                }
            }

            if control.load(Ordering::Relaxed) == RUNNING {
                let _ = signals.send(SpeechSignal::End).await;
            }
        });

        Ok(())
    }

    fn pause_active(&mut self) -> Result<()> {
        self.control.store(PAUSED, Ordering::Relaxed);
        Ok(())
    }

    fn resume_active(&mut self) -> Result<()> {
        self.control.store(RUNNING, Ordering::Relaxed);
        Ok(())
    }

    fn cancel_active(&mut self) -> Result<()> {
        self.control.store(CANCELLED, Ordering::Relaxed);
        Ok(())
    }
}

/// Byte offset of each word start, flagged when the word ends a sentence
fn word_schedule(text: &str) -> Vec<(usize, bool)> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut last_char = ' ';

    for (pos, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(word_start) = start.take() {
                words.push((word_start, matches!(last_char, '.' | '!' | '?')));
            }
        } else {
            if start.is_none() {
                start = Some(pos);
            }
            last_char = ch;
        }
    }
    if let Some(word_start) = start {
        words.push((word_start, matches!(last_char, '.' | '!' | '?')));
    }
    words
}
