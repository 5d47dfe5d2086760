// Session report persisted as JSON after a CLI run.
// Shape mirrors what the UI surfaces: how much was read, how the highlight
// tracked the utterance, and how the session ended.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::speech::SpeechSettings;

/// Summary of one read-aloud session
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Bytes of utterance text handed to the facility
    pub utterance_bytes: usize,
    /// Sentences the utterance segmented into
    pub sentence_count: usize,
    /// Boundary signals received from the facility
    pub boundary_signals: u64,
    /// Times the highlighted sentence actually changed
    pub highlight_changes: u64,
    /// Playback errors surfaced during the session
    pub playback_errors: u64,
    /// Engine state when the session ended
    pub final_state: String,
    /// Wall-clock session duration
    pub duration_ms: u64,
    /// Hints the facility was started with
    pub settings: SpeechSettings,
}

impl Default for SessionReport {
    fn default() -> Self {
        Self {
            utterance_bytes: 0,
            sentence_count: 0,
            boundary_signals: 0,
            highlight_changes: 0,
            playback_errors: 0,
            final_state: "idle".to_string(),
            duration_ms: 0,
            settings: SpeechSettings::default(),
        }
    }
}

impl SessionReport {
    /// Save the report as pretty-printed JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(path, content).await?;
        Ok(())
    }

    /// Load a previously saved report
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
