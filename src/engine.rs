// Playback state machine and read-aloud facade.
// Single-threaded and cooperative: every operation either completes
// synchronously or issues a facility request and returns; results arrive
// later as SpeechSignals. Local state is authoritative over facility latency.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::ContentHost;
use crate::highlight::{HighlightView, RenderSnapshot, SpanRef};
use crate::resolver::resolve;
use crate::segmenter::{Segmenter, Sentence, TextOffset};
use crate::speech::{SpeechFacility, SpeechSettings, SpeechSignal};

/// Errors surfaced to the command surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The host content has no playable text
    #[error("no readable content: host text is empty")]
    EmptyContent,
    /// No speech facility was supplied at construction
    #[error("speech facility unavailable")]
    FacilityUnavailable,
    /// The facility failed mid-speech; the engine has already reset to Idle
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Lifecycle state of the read-aloud engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Speaking => "speaking",
            PlaybackState::Paused => "paused",
        }
    }
}

/// Enable/disable and label contract for the three transport controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStates {
    pub play_enabled: bool,
    pub pause_enabled: bool,
    pub stop_enabled: bool,
    pub play_label: &'static str,
}

/// One play-through of the host content, from play() to the next Idle
struct PlaybackSession {
    sentences: Vec<Sentence>,
    spans: Vec<SpanRef>,
    view: HighlightView,
    snapshot: Option<RenderSnapshot>,
    current: usize,
}

/// Read-aloud engine facade: the only component the rest of the application
/// calls. Owns the facility, the content host, and the active session.
pub struct ReadAloudEngine<F: SpeechFacility, H: ContentHost> {
    facility: Option<F>,
    host: H,
    settings: SpeechSettings,
    segmenter: Segmenter,
    state: PlaybackState,
    session: Option<PlaybackSession>,
}

impl<F: SpeechFacility, H: ContentHost> ReadAloudEngine<F, H> {
    /// Construct the engine. `facility: None` produces a disabled engine
    /// whose commands all refuse or no-op.
    pub fn new(facility: Option<F>, host: H, settings: SpeechSettings) -> Result<Self> {
        if facility.is_none() {
            warn!("No speech facility available; read-aloud controls disabled");
        }
        Ok(Self {
            facility,
            host,
            settings,
            segmenter: Segmenter::new()?,
            state: PlaybackState::Idle,
            session: None,
        })
    }

    /// Start or resume playback.
    ///
    /// No-op while Speaking. From Paused, resumes the facility without
    /// re-segmenting. From Idle, builds a new session: segment, prepare and
    /// apply highlighting, start the facility, highlight sentence 0
    /// immediately (the first boundary signal may be delayed).
    pub fn play(&mut self) -> Result<(), EngineError> {
        match self.state {
            PlaybackState::Speaking => Ok(()),
            PlaybackState::Paused => {
                let facility = self
                    .facility
                    .as_mut()
                    .ok_or(EngineError::FacilityUnavailable)?;
                if let Err(err) = facility.resume_active() {
                    warn!("Resume request failed: {err}");
                }
                self.state = PlaybackState::Speaking;
                debug!("Resumed speaking at sentence {}", self.current_sentence());
                Ok(())
            }
            PlaybackState::Idle => self.start_session(),
        }
    }

    fn start_session(&mut self) -> Result<(), EngineError> {
        if self.facility.is_none() {
            return Err(EngineError::FacilityUnavailable);
        }

        let text = self.host.plain_text().to_string();
        let sentences = self.segmenter.segment(&text);
        if sentences.is_empty() {
            debug!("Rejecting play(): host content is empty or whitespace-only");
            return Err(EngineError::EmptyContent);
        }

        let (mut view, spans) = HighlightView::prepare(&text, &sentences);
        let snapshot = view.apply(&mut self.host);

        if let Some(facility) = self.facility.as_mut() {
            if let Err(err) = facility.start(&text, &self.settings) {
                warn!("Speech facility failed to start: {err}");
                HighlightView::restore(&mut self.host, snapshot);
                return Err(EngineError::Playback(err.to_string()));
            }
        }

        if let Some(&first) = spans.first() {
            view.highlight(first);
            view.sync(&mut self.host);
        }

        info!(
            "Read-aloud session started: {} sentences, {} bytes",
            sentences.len(),
            text.len()
        );
        self.session = Some(PlaybackSession {
            sentences,
            spans,
            view,
            snapshot: Some(snapshot),
            current: 0,
        });
        self.state = PlaybackState::Speaking;
        Ok(())
    }

    /// Pause playback; only meaningful while Speaking
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Speaking {
            return;
        }
        if let Some(facility) = self.facility.as_mut() {
            if let Err(err) = facility.pause_active() {
                warn!("Pause request failed: {err}");
            }
        }
        self.state = PlaybackState::Paused;
        debug!("Paused at sentence {}", self.current_sentence());
    }

    /// Stop playback, restore the original rendering, and reset to Idle.
    /// Idempotent: stopping an Idle engine does nothing.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.teardown(true);
        info!("Playback stopped; original rendering restored");
    }

    /// Deliver a facility signal to the engine.
    ///
    /// Progress signals move the highlight through the resolver; End is a
    /// natural stop(); Error resets to Idle and surfaces the reason.
    pub fn handle_signal(&mut self, signal: SpeechSignal) -> Result<(), EngineError> {
        match signal {
            SpeechSignal::Progress(offset) => {
                self.handle_progress(offset);
                Ok(())
            }
            SpeechSignal::End => {
                debug!("Facility reported end of utterance");
                self.stop();
                Ok(())
            }
            SpeechSignal::Error(reason) => {
                warn!("Facility reported playback error: {reason}");
                self.stop();
                Err(EngineError::Playback(reason))
            }
        }
    }

    fn handle_progress(&mut self, offset: TextOffset) {
        // Stale boundary callbacks may arrive after pause or stop; nothing is
        // being spoken, so they must not move the highlight.
        if self.state != PlaybackState::Speaking {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let resolved = resolve(offset, &session.sentences, session.current);
        if resolved == session.current {
            return;
        }

        if let Some(&old) = session.spans.get(session.current) {
            session.view.unhighlight(old);
        }
        if let Some(&new) = session.spans.get(resolved) {
            session.view.highlight(new);
        }
        session.view.sync(&mut self.host);

        debug!(
            "Boundary at offset {} moved highlight {} -> {}",
            offset.0, session.current, resolved
        );
        session.current = resolved;
    }

    /// The host content was replaced; no session may span two content loads.
    ///
    /// Tears down like stop() but discards the snapshot instead of restoring
    /// it: the captured rendering belongs to the replaced content.
    pub fn handle_content_replaced(&mut self) {
        if self.state != PlaybackState::Idle {
            debug!("Content replaced during playback; stopping active session");
            self.teardown(false);
        }
        self.session = None;
    }

    fn teardown(&mut self, restore_rendering: bool) {
        if let Some(facility) = self.facility.as_mut() {
            if let Err(err) = facility.cancel_active() {
                warn!("Cancel request failed: {err}");
            }
        }
        if let Some(mut session) = self.session.take() {
            session.view.clear_all();
            if restore_rendering {
                if let Some(snapshot) = session.snapshot.take() {
                    HighlightView::restore(&mut self.host, snapshot);
                }
            }
        }
        self.state = PlaybackState::Idle;
    }

    /// Current lifecycle state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the sentence currently highlighted; 0 when Idle
    pub fn current_sentence(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.current)
    }

    /// Sentence count of the active session; 0 when Idle
    pub fn sentence_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.sentences.len())
    }

    /// Sentence index currently emphasized in the view, if any
    pub fn highlighted_sentence(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.view.highlighted_index())
    }

    /// Button-state contract for the play/pause/stop controls
    pub fn controls(&self) -> ControlStates {
        if self.facility.is_none() {
            return ControlStates {
                play_enabled: false,
                pause_enabled: false,
                stop_enabled: false,
                play_label: "Play",
            };
        }
        match self.state {
            PlaybackState::Idle => ControlStates {
                play_enabled: true,
                pause_enabled: false,
                stop_enabled: false,
                play_label: "Play",
            },
            PlaybackState::Speaking => ControlStates {
                play_enabled: false,
                pause_enabled: true,
                stop_enabled: true,
                play_label: "Play",
            },
            PlaybackState::Paused => ControlStates {
                play_enabled: true,
                pause_enabled: false,
                stop_enabled: true,
                play_label: "Resume",
            },
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access for content swaps.
    ///
    /// Callers must deliver `handle_content_replaced` first; while a session
    /// is active the rendering surface belongs to the highlight view.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn facility(&self) -> Option<&F> {
        self.facility.as_ref()
    }
}
