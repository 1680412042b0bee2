use crate::code_breaker::break_code;
use crate::runtime::{EditEvent, Key};
use crate::session::{CompletedItem, SessionState};
use crate::word_mode::CaptureEvent;
use rand::Rng;
use std::time::SystemTime;

/// Unifies line endings to `\n`, right-trims every line and trims the
/// whole string. Structured editors auto-indent and insert matching
/// brackets; the incidental whitespace they add must not count as typing
/// errors when matching against the target snippet.
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Code-mode capture driver. Two entry points: `handle_key` for raw
/// character-by-character typing, `handle_edit` for editor-widget
/// content-change events. In fix mode each slot starts from a corrupted
/// copy of its target instead of an empty buffer.
#[derive(Debug, Clone)]
pub struct CodeCapture {
    targets: Vec<String>,
    /// Pre-corrupted starting buffers, one per target. `None` outside fix mode.
    seeds: Option<Vec<String>>,
}

impl CodeCapture {
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            seeds: None,
        }
    }

    /// Fix ("find the bug") sub-mode: every target gets a deliberately
    /// corrupted starting buffer up front, so re-seeding on advance is
    /// deterministic for the rest of the session.
    pub fn fix_mode<R: Rng>(targets: Vec<String>, rng: &mut R) -> Self {
        let seeds = targets.iter().map(|code| break_code(code, rng)).collect();
        Self {
            targets,
            seeds: Some(seeds),
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn is_fix_mode(&self) -> bool {
        self.seeds.is_some()
    }

    pub fn current_target<'a>(&'a self, state: &SessionState) -> &'a str {
        self.targets
            .get(state.current_index())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The starting buffer for slot `index`: corrupted in fix mode, empty
    /// otherwise.
    pub fn initial_buffer(&self, index: usize) -> &str {
        self.seeds
            .as_ref()
            .and_then(|seeds| seeds.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Loads the starting buffer for the current slot into the state.
    /// Call once per session before feeding fix-mode events.
    pub fn seed_current(&self, state: &mut SessionState) {
        let seed = self.initial_buffer(state.current_index()).to_string();
        state.set_current_input(seed);
    }

    /// Key-by-key variant: the buffer auto-commits the moment it reaches
    /// the target's exact character length, correct only if the full
    /// strings are equal at that point.
    pub fn handle_key(&self, state: &mut SessionState, key: Key, now: SystemTime) -> CaptureEvent {
        if state.current_index() >= self.targets.len() {
            return CaptureEvent::Ignored;
        }

        match key {
            Key::Backspace => {
                if state.pop_char() {
                    state.record_keystroke();
                    CaptureEvent::Edited
                } else {
                    CaptureEvent::Ignored
                }
            }
            Key::Char(c) => {
                let starting = !state.has_started();
                state.mark_started(now);
                state.push_char(c);
                state.record_keystroke();

                let target = &self.targets[state.current_index()];
                if state.current_input().chars().count() == target.chars().count() {
                    let submitted = state.current_input().to_string();
                    let is_correct = submitted == *target;
                    return self.commit(state, submitted, is_correct);
                }

                if starting {
                    CaptureEvent::Started
                } else {
                    CaptureEvent::Edited
                }
            }
        }
    }

    /// Editor-widget variant: on every content change, compare the
    /// normalized buffer to the normalized target and commit the moment
    /// they match. Keystrokes are counted from the change's actual diff
    /// size, one per inserted character and one per deleted range, not
    /// once per physical keypress.
    pub fn handle_edit(
        &self,
        state: &mut SessionState,
        edit: EditEvent,
        now: SystemTime,
    ) -> CaptureEvent {
        if state.current_index() >= self.targets.len() {
            return CaptureEvent::Ignored;
        }

        let starting = !state.has_started() && !edit.content.is_empty();
        if starting {
            state.mark_started(now);
        }

        state.record_keystrokes(edit.inserted_chars + edit.deleted_ranges);
        state.set_current_input(edit.content);

        let target = &self.targets[state.current_index()];
        if normalize(state.current_input()) == normalize(target) {
            // Matched: store the canonical target text, not the buffer with
            // its incidental whitespace.
            let submitted = target.clone();
            return self.commit(state, submitted, true);
        }

        if starting {
            CaptureEvent::Started
        } else {
            CaptureEvent::Edited
        }
    }

    fn commit(&self, state: &mut SessionState, submitted: String, is_correct: bool) -> CaptureEvent {
        state.push_completed(CompletedItem::Snippet {
            code: submitted,
            is_correct,
        });
        state.set_current_index(state.current_index() + 1);

        let next_buffer = self.initial_buffer(state.current_index()).to_string();
        state.set_current_input(next_buffer);

        CaptureEvent::Committed { is_correct }
    }
}
