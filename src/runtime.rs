use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// A raw keyboard event forwarded by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
}

/// An editor-widget content change. `inserted_chars` and `deleted_ranges`
/// describe the actual diff, which may be larger than one keypress when
/// the widget auto-indents or inserts matching brackets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditEvent {
    pub content: String,
    pub inserted_chars: u64,
    pub deleted_ranges: u64,
}

impl EditEvent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            inserted_chars: 0,
            deleted_ranges: 0,
        }
    }

    pub fn inserted(mut self, chars: u64) -> Self {
        self.inserted_chars = chars;
        self
    }

    pub fn deleted(mut self, ranges: u64) -> Self {
        self.deleted_ranges = ranges;
        self
    }
}

/// Unified event type consumed by an engine-driving loop.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Key(Key),
    Edit(EditEvent),
    Tick,
}

/// Source of input events (key presses, editor changes). Production
/// embedders implement this at their UI boundary.
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if one arrives before the timeout expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError>;
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-backed event source for tests and headless embedding.
pub struct TestEventSource {
    rx: Receiver<EngineEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<EngineEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the engine one event at a time: input events pass through,
/// and an exhausted tick interval surfaces as `Tick` so samplers and
/// countdown checks run even while the user is idle.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the tick interval and returns the next event, or
    /// `Tick` on timeout.
    pub fn step(&self) -> EngineEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                EngineEvent::Tick
            }
        }
    }
}
