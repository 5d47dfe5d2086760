pub mod content;
pub mod engine;
pub mod highlight;
pub mod report;
pub mod resolver;
pub mod segmenter;
pub mod simulate;
pub mod speech;

// Re-export the engine surface most callers need
pub use content::{ContentHost, StaticContent};
pub use engine::{ControlStates, EngineError, PlaybackState, ReadAloudEngine};
pub use highlight::{HighlightView, RenderSnapshot, SpanRef};
pub use report::SessionReport;
pub use resolver::resolve;
pub use segmenter::{Segmenter, Sentence, TextOffset};
pub use simulate::SimulatedSpeech;
pub use speech::{SpeechFacility, SpeechSettings, SpeechSignal};
