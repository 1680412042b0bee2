use crate::runtime::Key;
use crate::session::{CompletedItem, SessionState};
use std::time::SystemTime;

/// What a key event did to the session, surfaced so the lifecycle layer
/// can observe the start transition and commits without re-reading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// First printable key of the session; `started_at` was just recorded.
    Started,
    /// A word was committed and the index advanced.
    Committed { is_correct: bool },
    /// The in-progress buffer changed.
    Edited,
    /// Backspace on an empty buffer reopened the previous committed word.
    Reopened,
    /// The event changed nothing.
    Ignored,
}

/// Free-text word-mode capture driver. Holds the immutable target sequence
/// and drives `SessionState` transitions from raw key events.
#[derive(Debug, Clone)]
pub struct WordCapture {
    targets: Vec<String>,
}

impl WordCapture {
    pub fn new(targets: Vec<String>) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn current_target<'a>(&'a self, state: &SessionState) -> &'a str {
        self.targets
            .get(state.current_index())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn handle_key(&self, state: &mut SessionState, key: Key, now: SystemTime) -> CaptureEvent {
        match key {
            Key::Char(' ') => self.commit_word(state),
            Key::Char(c) => self.buffer_char(state, c, now),
            Key::Backspace => self.backspace(state),
        }
    }

    fn buffer_char(&self, state: &mut SessionState, c: char, now: SystemTime) -> CaptureEvent {
        if state.current_index() >= self.targets.len() {
            return CaptureEvent::Ignored;
        }

        let starting = !state.has_started();
        state.mark_started(now);
        state.push_char(c);
        state.record_keystroke();

        if starting {
            CaptureEvent::Started
        } else {
            CaptureEvent::Edited
        }
    }

    /// Space commits the trimmed buffer against the current target.
    /// Correctness is exact string equality: a single typo marks the whole
    /// word incorrect, while the character breakdown still credits the
    /// individually correct characters. An empty trimmed buffer is ignored.
    fn commit_word(&self, state: &mut SessionState) -> CaptureEvent {
        if state.current_index() >= self.targets.len() {
            return CaptureEvent::Ignored;
        }

        let submitted = state.current_input().trim().to_string();
        if submitted.is_empty() {
            return CaptureEvent::Ignored;
        }

        let is_correct = submitted == self.targets[state.current_index()];
        state.push_completed(CompletedItem::Word {
            text: submitted,
            is_correct,
        });
        state.set_current_index(state.current_index() + 1);
        state.set_current_input(String::new());
        state.record_keystroke();

        CaptureEvent::Committed { is_correct }
    }

    /// Backspace drops the last buffered character; on an empty buffer it
    /// reopens the previous committed word (pops it, steps the index back
    /// and restores its text). This is how earlier mistakes get corrected.
    fn backspace(&self, state: &mut SessionState) -> CaptureEvent {
        if state.pop_char() {
            state.record_keystroke();
            return CaptureEvent::Edited;
        }

        match state.pop_completed() {
            Some(item) => {
                state.set_current_index(state.current_index().saturating_sub(1));
                state.set_current_input(item.text().to_string());
                state.record_keystroke();
                CaptureEvent::Reopened
            }
            None => CaptureEvent::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn capture(words: &[&str]) -> WordCapture {
        WordCapture::new(words.iter().map(|w| w.to_string()).collect())
    }

    fn type_str(capture: &WordCapture, state: &mut SessionState, text: &str) {
        for c in text.chars() {
            capture.handle_key(state, Key::Char(c), SystemTime::now());
        }
    }

    #[test]
    fn first_printable_key_starts_the_session() {
        let capture = capture(&["hello"]);
        let mut state = SessionState::new();

        let event = capture.handle_key(&mut state, Key::Char('h'), SystemTime::now());
        assert_eq!(event, CaptureEvent::Started);
        assert!(state.has_started());

        let event = capture.handle_key(&mut state, Key::Char('e'), SystemTime::now());
        assert_eq!(event, CaptureEvent::Edited);
    }

    #[test]
    fn typing_word_and_space_commits_correct_word() {
        let capture = capture(&["hello", "world"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "hello ");

        assert_eq!(
            state.completed(),
            &[CompletedItem::Word {
                text: "hello".into(),
                is_correct: true,
            }]
        );
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.current_input(), "");
    }

    #[test]
    fn single_typo_marks_whole_word_incorrect() {
        let capture = capture(&["hello"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "hellp ");

        assert_matches!(
            state.completed(),
            [CompletedItem::Word { is_correct: false, .. }]
        );
    }

    #[test]
    fn space_on_empty_buffer_is_ignored() {
        let capture = capture(&["hello"]);
        let mut state = SessionState::new();

        let event = capture.handle_key(&mut state, Key::Char(' '), SystemTime::now());
        assert_eq!(event, CaptureEvent::Ignored);
        assert_eq!(state.current_index(), 0);
        assert!(state.completed().is_empty());
    }

    #[test]
    fn backspace_removes_last_buffered_char() {
        let capture = capture(&["hello"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "he");
        let event = capture.handle_key(&mut state, Key::Backspace, SystemTime::now());

        assert_eq!(event, CaptureEvent::Edited);
        assert_eq!(state.current_input(), "h");
    }

    #[test]
    fn backspace_on_empty_buffer_reopens_previous_word() {
        let capture = capture(&["cat", "dog"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "cxt ");
        assert_eq!(state.current_index(), 1);

        let event = capture.handle_key(&mut state, Key::Backspace, SystemTime::now());
        assert_eq!(event, CaptureEvent::Reopened);
        assert!(state.completed().is_empty());
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current_input(), "cxt");
    }

    #[test]
    fn backspace_at_session_start_is_a_noop() {
        let capture = capture(&["cat"]);
        let mut state = SessionState::new();

        let event = capture.handle_key(&mut state, Key::Backspace, SystemTime::now());
        assert_eq!(event, CaptureEvent::Ignored);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current_input(), "");
    }

    #[test]
    fn reopen_then_fix_commits_corrected_word() {
        let capture = capture(&["cat", "dog"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "cxt ");
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now());
        // erase "xt", retype "at"
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now());
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now());
        type_str(&capture, &mut state, "at ");

        assert_eq!(
            state.completed(),
            &[CompletedItem::Word {
                text: "cat".into(),
                is_correct: true,
            }]
        );
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn keys_past_end_of_sequence_are_ignored() {
        let capture = capture(&["a"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "a ");
        assert_eq!(state.current_index(), 1);

        let event = capture.handle_key(&mut state, Key::Char('x'), SystemTime::now());
        assert_eq!(event, CaptureEvent::Ignored);
        assert_eq!(state.current_input(), "");
    }

    #[test]
    fn keystrokes_count_content_changing_events_only() {
        let capture = capture(&["ab"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "ab"); // 2 inserts
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now()); // deletes 'b'
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now()); // deletes 'a'
        // buffer empty, nothing committed: this one changes nothing
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now());

        assert_eq!(state.keystroke_count(), 4);
    }

    #[test]
    fn keystroke_count_survives_reopen() {
        let capture = capture(&["ab", "cd"]);
        let mut state = SessionState::new();

        type_str(&capture, &mut state, "ab ");
        let count = state.keystroke_count();
        capture.handle_key(&mut state, Key::Backspace, SystemTime::now());

        // monotonic: the pop itself counts, nothing is subtracted
        assert_eq!(state.keystroke_count(), count + 1);
    }
}
