// External speech facility boundary.
// The facility is best-effort and approximate: commands may fail, and
// progress offsets are only near the word actually being spoken. The engine's
// local state stays authoritative regardless.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::segmenter::TextOffset;

/// Rate, pitch, and volume hints forwarded to the speech facility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl SpeechSettings {
    pub const RATE_MIN: f32 = 0.5;
    pub const RATE_MAX: f32 = 3.0;
    pub const PITCH_MIN: f32 = 0.0;
    pub const PITCH_MAX: f32 = 2.0;
    pub const VOLUME_MIN: f32 = 0.0;
    pub const VOLUME_MAX: f32 = 1.0;

    /// Build settings with each hint clamped to its supported range
    pub fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate: rate.clamp(Self::RATE_MIN, Self::RATE_MAX),
            pitch: pitch.clamp(Self::PITCH_MIN, Self::PITCH_MAX),
            volume: volume.clamp(Self::VOLUME_MIN, Self::VOLUME_MAX),
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Signals emitted by the speech facility during playback
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechSignal {
    /// Approximate offset of the word currently being spoken
    Progress(TextOffset),
    /// The utterance finished naturally
    End,
    /// Playback failed mid-speech
    Error(String),
}

/// Commands understood by an external speech playback facility
///
/// At most one utterance is active at a time; `start` on an active facility
/// replaces the running utterance.
pub trait SpeechFacility {
    fn start(&mut self, text: &str, settings: &SpeechSettings) -> Result<()>;
    fn pause_active(&mut self) -> Result<()>;
    fn resume_active(&mut self) -> Result<()>;
    fn cancel_active(&mut self) -> Result<()>;
}

/// Facility commands observed by [`RecordingSpeech`]
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCommand {
    Start { text: String },
    Pause,
    Resume,
    Cancel,
}

/// Command-recording facility for tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    pub commands: Vec<SpeechCommand>,
    pub fail_next_start: bool,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of `Start` commands received
    pub fn starts(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SpeechCommand::Start { .. }))
            .count()
    }

    pub fn last_command(&self) -> Option<&SpeechCommand> {
        self.commands.last()
    }
}

impl SpeechFacility for RecordingSpeech {
    fn start(&mut self, text: &str, _settings: &SpeechSettings) -> Result<()> {
        if self.fail_next_start {
            self.fail_next_start = false;
            anyhow::bail!("synthesizer rejected utterance");
        }
        self.commands.push(SpeechCommand::Start {
            text: text.to_string(),
        });
        Ok(())
    }

    fn pause_active(&mut self) -> Result<()> {
        self.commands.push(SpeechCommand::Pause);
        Ok(())
    }

    fn resume_active(&mut self) -> Result<()> {
        self.commands.push(SpeechCommand::Resume);
        Ok(())
    }

    fn cancel_active(&mut self) -> Result<()> {
        self.commands.push(SpeechCommand::Cancel);
        Ok(())
    }
}
