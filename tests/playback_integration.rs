// End-to-end playback flows through the public engine surface
// WHY: the lifecycle contract (play/pause/stop, boundary tracking, teardown)
// is what the UI relies on; each flow here mirrors one user-visible behavior

use readalong::speech::{RecordingSpeech, SpeechCommand};
use readalong::{
    ContentHost, EngineError, PlaybackState, ReadAloudEngine, SpeechSettings, SpeechSignal,
    StaticContent, TextOffset,
};

const TEXT: &str = "Dogs are loyal. Cats are independent. Birds can fly.";

fn engine_with(text: &str) -> ReadAloudEngine<RecordingSpeech, StaticContent> {
    ReadAloudEngine::new(
        Some(RecordingSpeech::new()),
        StaticContent::new(text),
        SpeechSettings::default(),
    )
    .expect("engine should construct")
}

#[test]
fn test_full_session_tracks_boundaries_in_order() {
    let mut engine = engine_with(TEXT);
    let original_markup = engine.host().markup().to_string();

    engine.play().expect("play should start");
    assert_eq!(engine.sentence_count(), 3);
    assert_eq!(engine.highlighted_sentence(), Some(0));

    // Word-level boundaries walk the highlight through every sentence
    for (offset, expected) in [(0, 0), (5, 0), (16, 1), (25, 1), (38, 2), (48, 2)] {
        engine
            .handle_signal(SpeechSignal::Progress(TextOffset(offset)))
            .expect("progress should be absorbed");
        assert_eq!(engine.current_sentence(), expected, "offset {offset}");
        // At most one sentence is highlighted at any time
        assert_eq!(engine.host().markup().matches("ra-active").count(), 1);
    }

    engine
        .handle_signal(SpeechSignal::End)
        .expect("end should be absorbed");
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.host().markup(), original_markup);
}

#[test]
fn test_scenario_boundary_offset_resolves_to_second_sentence() {
    let mut engine = engine_with(TEXT);
    engine.play().expect("play should start");

    engine
        .handle_signal(SpeechSignal::Progress(TextOffset(20)))
        .expect("progress should be absorbed");
    assert_eq!(engine.current_sentence(), 1);
}

#[test]
fn test_scenario_whitespace_content_rejected() {
    let mut engine = engine_with("   ");
    assert_eq!(engine.play(), Err(EngineError::EmptyContent));
    assert_eq!(engine.state(), PlaybackState::Idle);
}

#[test]
fn test_scenario_pause_resume_preserves_position() {
    let mut engine = engine_with(TEXT);
    engine.play().expect("play should start");
    engine
        .handle_signal(SpeechSignal::Progress(TextOffset(20)))
        .expect("progress should be absorbed");
    assert_eq!(engine.current_sentence(), 1);

    engine.pause();
    assert_eq!(engine.state(), PlaybackState::Paused);

    engine.play().expect("resume should succeed");
    assert_eq!(engine.state(), PlaybackState::Speaking);
    assert_eq!(engine.current_sentence(), 1);
    assert_eq!(
        engine.facility().expect("facility should exist").starts(),
        1,
        "resume must not restart the utterance"
    );
}

#[test]
fn test_scenario_midspeech_error_resets_cleanly() {
    let mut engine = engine_with(TEXT);
    let original_markup = engine.host().markup().to_string();
    engine.play().expect("play should start");

    let result = engine.handle_signal(SpeechSignal::Error("synthesizer died".to_string()));
    assert_eq!(
        result,
        Err(EngineError::Playback("synthesizer died".to_string()))
    );
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.highlighted_sentence(), None);
    assert_eq!(engine.host().markup(), original_markup);
}

#[test]
fn test_scenario_content_replacement_starts_fresh_session() {
    let mut engine = engine_with(TEXT);
    engine.play().expect("play should start");
    assert_eq!(engine.sentence_count(), 3);

    engine.handle_content_replaced();
    assert_eq!(engine.state(), PlaybackState::Idle);

    engine
        .host_mut()
        .replace_text("Fresh article text. Just two sentences here.");
    engine.play().expect("play should start on new content");
    assert_eq!(engine.sentence_count(), 2);

    let facility = engine.facility().expect("facility should exist");
    assert_eq!(facility.starts(), 2);
    match facility.last_command() {
        Some(SpeechCommand::Start { text }) => {
            assert!(text.starts_with("Fresh article text."));
        }
        other => panic!("expected a start on the new content, got {other:?}"),
    }
}

#[test]
fn test_stop_twice_equals_stop_once() {
    let mut engine = engine_with(TEXT);
    engine.play().expect("play should start");

    engine.stop();
    let state_after_one = engine.state();
    let markup_after_one = engine.host().markup().to_string();
    let commands_after_one = engine.facility().expect("facility should exist").commands.len();

    engine.stop();
    assert_eq!(engine.state(), state_after_one);
    assert_eq!(engine.host().markup(), markup_after_one);
    assert_eq!(
        engine.facility().expect("facility should exist").commands.len(),
        commands_after_one
    );
}

#[test]
fn test_scroll_follows_the_highlight() {
    let mut engine = engine_with(TEXT);
    engine.play().expect("play should start");
    engine
        .handle_signal(SpeechSignal::Progress(TextOffset(20)))
        .expect("progress should be absorbed");
    engine
        .handle_signal(SpeechSignal::Progress(TextOffset(40)))
        .expect("progress should be absorbed");

    assert_eq!(
        engine.host().scroll_requests(),
        ["ra-sent-0", "ra-sent-1", "ra-sent-2"]
    );
}

#[test]
fn test_out_of_order_boundaries_never_move_highlight_backwards() {
    let mut engine = engine_with(TEXT);
    engine.play().expect("play should start");

    engine
        .handle_signal(SpeechSignal::Progress(TextOffset(40)))
        .expect("progress should be absorbed");
    assert_eq!(engine.current_sentence(), 2);

    // Late-arriving callbacks from earlier words are held, not replayed
    for stale in [0, 17, 30] {
        engine
            .handle_signal(SpeechSignal::Progress(TextOffset(stale)))
            .expect("stale progress should be absorbed");
        assert_eq!(engine.current_sentence(), 2);
    }
}

#[test]
fn test_button_states_through_a_full_cycle() {
    let mut engine = engine_with(TEXT);

    let idle = engine.controls();
    assert!(idle.play_enabled && !idle.pause_enabled && !idle.stop_enabled);

    engine.play().expect("play should start");
    let speaking = engine.controls();
    assert!(!speaking.play_enabled && speaking.pause_enabled && speaking.stop_enabled);
    assert_eq!(speaking.play_label, "Play");

    engine.pause();
    let paused = engine.controls();
    assert!(paused.play_enabled && !paused.pause_enabled && paused.stop_enabled);
    assert_eq!(paused.play_label, "Resume");

    engine.stop();
    assert_eq!(engine.controls(), idle);
}
