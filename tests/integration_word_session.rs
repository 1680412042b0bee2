use std::time::{Duration, SystemTime};

use typerun::config::Settings;
use typerun::lifecycle::{EndPolicy, SessionLifecycle};
use typerun::payload::{JsonlRunSink, RunSink};
use typerun::runtime::Key;
use typerun::sampler::{SamplerKind, SeriesSampler};
use typerun::session::{CompletedItem, SessionState};
use typerun::word_mode::WordCapture;

fn type_str(capture: &WordCapture, state: &mut SessionState, text: &str, now: SystemTime) {
    for c in text.chars() {
        capture.handle_key(state, Key::Char(c), now);
    }
}

// The end-to-end scenario from the product sign-off: targets ["ab","cd"],
// user types "ab cx " over two seconds.
#[test]
fn two_word_session_scores_seventy_five_percent() {
    let targets: Vec<String> = ["ab", "cd"].iter().map(|w| w.to_string()).collect();
    let capture = WordCapture::new(targets.clone());
    let mut state = SessionState::new();
    let mut lifecycle = SessionLifecycle::new(EndPolicy::WordCount { words: 2 });

    let start = SystemTime::UNIX_EPOCH;
    type_str(&capture, &mut state, "ab cx ", start);

    assert_eq!(
        state.completed(),
        &[
            CompletedItem::Word {
                text: "ab".into(),
                is_correct: true,
            },
            CompletedItem::Word {
                text: "cx".into(),
                is_correct: false,
            },
        ]
    );

    assert!(lifecycle.check_end(&state, start + Duration::from_secs(2)));
    let metrics = lifecycle.finalize(&state, &targets).unwrap();

    // a, b, c correct; x vs d incorrect.
    assert_eq!(metrics.characters.correct, 3);
    assert_eq!(metrics.characters.incorrect, 1);
    assert_eq!(metrics.characters.extra, 0);
    assert_eq!(metrics.characters.missed, 0);
    assert_eq!(metrics.accuracy, 75.0);
    assert_eq!(metrics.errors, 1);
    assert_eq!(metrics.duration_seconds, 2);
}

#[test]
fn backspace_reopen_recovers_a_committed_mistake() {
    let targets: Vec<String> = ["cat", "dog"].iter().map(|w| w.to_string()).collect();
    let capture = WordCapture::new(targets.clone());
    let mut state = SessionState::new();
    let now = SystemTime::UNIX_EPOCH;

    type_str(&capture, &mut state, "cxt ", now);
    assert_eq!(state.current_index(), 1);

    capture.handle_key(&mut state, Key::Backspace, now);
    assert!(state.completed().is_empty());
    assert_eq!(state.current_index(), 0);
    assert_eq!(state.current_input(), "cxt");
}

#[test]
fn sampler_and_lifecycle_share_one_state() {
    let targets: Vec<String> = ["one", "two", "three"].iter().map(|w| w.to_string()).collect();
    let capture = WordCapture::new(targets.clone());
    let mut state = SessionState::new();
    let mut sampler = SeriesSampler::new(SamplerKind::Words);
    let mut lifecycle = SessionLifecycle::new(EndPolicy::WordCount { words: 3 });

    let start = SystemTime::UNIX_EPOCH;
    type_str(&capture, &mut state, "one ", start);
    sampler.poll(&mut state, &targets, start + Duration::from_secs(1));
    type_str(&capture, &mut state, "two ", start);
    sampler.poll(&mut state, &targets, start + Duration::from_secs(2));
    type_str(&capture, &mut state, "three ", start);
    assert!(lifecycle.check_end(&state, start + Duration::from_secs(3)));

    assert_eq!(state.series().len(), 2);
    let metrics = lifecycle.finalize(&state, &targets).unwrap();
    assert_eq!(metrics.accuracy, 100.0);
    // Two points in the series; both positive and steady enough to keep
    // consistency inside its bounds.
    assert!((0.0..=100.0).contains(&metrics.consistency));
    assert_eq!(metrics.duration_seconds, 3);
}

#[test]
fn finished_run_lands_in_the_jsonl_log() {
    let targets: Vec<String> = ["ab"].iter().map(|w| w.to_string()).collect();
    let capture = WordCapture::new(targets.clone());
    let mut state = SessionState::new();
    let mut lifecycle = SessionLifecycle::new(EndPolicy::WordCount { words: 1 });

    let start = SystemTime::UNIX_EPOCH;
    type_str(&capture, &mut state, "ab ", start);
    assert!(lifecycle.check_end(&state, start + Duration::from_secs(1)));

    let metrics = lifecycle.finalize(&state, &targets).unwrap();
    let settings = Settings {
        mode: typerun::config::Mode::Words,
        ..Settings::default()
    };
    let payload = lifecycle.build_payload(&settings, &metrics, &state);
    assert_eq!(payload.config.word_count, Some(1));
    assert_eq!(payload.result.wpm, Some(metrics.wpm));

    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlRunSink::with_path(dir.path().join("runs.jsonl"));
    lifecycle.hand_off(&sink, &payload).unwrap();

    let contents = std::fs::read_to_string(dir.path().join("runs.jsonl")).unwrap();
    let value: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(value["mode"], "WORDS");
    assert_eq!(value["result"]["durationSeconds"], 1);
}
