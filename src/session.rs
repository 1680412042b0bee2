use crate::time_series::SeriesPoint;
use std::time::SystemTime;

/// An item the user has finished submitting, with its correctness flag.
/// `Word` carries the exact trimmed text committed for that slot; `Snippet`
/// carries the snippet text as matched.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletedItem {
    Word { text: String, is_correct: bool },
    Snippet { code: String, is_correct: bool },
}

impl CompletedItem {
    pub fn is_correct(&self) -> bool {
        match self {
            CompletedItem::Word { is_correct, .. } => *is_correct,
            CompletedItem::Snippet { is_correct, .. } => *is_correct,
        }
    }

    /// The submitted text, regardless of variant.
    pub fn text(&self) -> &str {
        match self {
            CompletedItem::Word { text, .. } => text,
            CompletedItem::Snippet { code, .. } => code,
        }
    }
}

/// The authoritative mutable record of one typing session.
///
/// Single-owner: all mutation funnels through the setters below, which keep
/// the aggregate consistent (series seconds strictly increasing, start
/// timestamp set at most once per generation, index never negative).
#[derive(Debug, Clone)]
pub struct SessionState {
    current_index: usize,
    current_input: String,
    completed: Vec<CompletedItem>,
    started_at: Option<SystemTime>,
    keystroke_count: u64,
    series: Vec<SeriesPoint>,
    generation: u64,
    revision: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_index: 0,
            current_input: String::new(),
            completed: Vec::new(),
            started_at: None,
            keystroke_count: 0,
            series: Vec::new(),
            generation: 0,
            revision: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn completed(&self) -> &[CompletedItem] {
        &self.completed
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn keystroke_count(&self) -> u64 {
        self.keystroke_count
    }

    pub fn series(&self) -> &[SeriesPoint] {
        &self.series
    }

    /// Bumped only by `reset`. Lets timers detect a stale session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bumped by every mutation. Reactive consumers compare revisions
    /// instead of subscribing to change callbacks.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whole seconds elapsed since the first keystroke, 0 if not started.
    pub fn elapsed_seconds(&self, now: SystemTime) -> u64 {
        match self.started_at {
            Some(started) => now
                .duration_since(started)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Records the session start. Set-once: later calls are ignored until
    /// the next `reset`.
    pub fn mark_started(&mut self, now: SystemTime) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.revision += 1;
        }
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
        self.revision += 1;
    }

    pub fn set_current_input(&mut self, input: String) {
        self.current_input = input;
        self.revision += 1;
    }

    pub fn push_char(&mut self, c: char) {
        self.current_input.push(c);
        self.revision += 1;
    }

    /// Drops the last buffered character, if any. Returns whether the
    /// buffer changed.
    pub fn pop_char(&mut self) -> bool {
        if self.current_input.pop().is_some() {
            self.revision += 1;
            true
        } else {
            false
        }
    }

    pub fn push_completed(&mut self, item: CompletedItem) {
        self.completed.push(item);
        self.revision += 1;
    }

    pub fn pop_completed(&mut self) -> Option<CompletedItem> {
        let item = self.completed.pop();
        if item.is_some() {
            self.revision += 1;
        }
        item
    }

    /// Keystroke count is monotonic: one per content-changing key event,
    /// never decremented, not even on backspace-reopen.
    pub fn record_keystroke(&mut self) {
        self.record_keystrokes(1);
    }

    pub fn record_keystrokes(&mut self, n: u64) {
        if n > 0 {
            self.keystroke_count += n;
            self.revision += 1;
        }
    }

    /// Appends one sample. A point whose `second` is not strictly greater
    /// than the last appended one is silently ignored, which keeps the
    /// series seconds strictly increasing.
    pub fn append_series_point(&mut self, point: SeriesPoint) -> bool {
        if let Some(last) = self.series.last() {
            if point.second <= last.second {
                return false;
            }
        }
        self.series.push(point);
        self.revision += 1;
        true
    }

    /// Reinitializes every field and bumps the generation so dependent
    /// timers know a fresh session has begun.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.current_input.clear();
        self.completed.clear();
        self.started_at = None;
        self.keystroke_count = 0;
        self.series.clear();
        self.generation += 1;
        self.revision += 1;
    }
}
