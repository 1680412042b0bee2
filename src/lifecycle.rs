use crate::config::Settings;
use crate::metrics::{self, MetricsInput, ResultsMetrics};
use crate::payload::{RunConfig, RunPayload, RunResult, RunSink};
use crate::session::SessionState;
use crate::util::round2;
use std::io;
use std::time::SystemTime;

/// Mode-specific termination policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// Fixed countdown from session start.
    Timer { seconds: u64 },
    /// Ends the instant this many words are committed.
    WordCount { words: usize },
    /// Ends the instant this many snippets are committed.
    SnippetCount { snippets: usize },
    /// Timer-bounded, operating over corrupted code snippets.
    FixTimer { seconds: u64 },
}

impl EndPolicy {
    fn timer_seconds(&self) -> Option<u64> {
        match self {
            EndPolicy::Timer { seconds } | EndPolicy::FixTimer { seconds } => Some(*seconds),
            _ => None,
        }
    }

    fn item_target(&self) -> Option<usize> {
        match self {
            EndPolicy::WordCount { words } => Some(*words),
            EndPolicy::SnippetCount { snippets } => Some(*snippets),
            _ => None,
        }
    }

    fn is_code_activity(&self) -> bool {
        matches!(
            self,
            EndPolicy::SnippetCount { .. } | EndPolicy::FixTimer { .. }
        )
    }
}

/// Owns the end-of-session decision and the final-metrics handoff.
/// Once ended, a session stays ended until `reset`; in particular a failed
/// persistence save never reopens it.
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    policy: EndPolicy,
    ended_at: Option<SystemTime>,
}

impl SessionLifecycle {
    pub fn new(policy: EndPolicy) -> Self {
        Self {
            policy,
            ended_at: None,
        }
    }

    pub fn policy(&self) -> EndPolicy {
        self.policy
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Countdown read model for timer policies: configured seconds before
    /// the first keystroke, wall-clock remainder once running, `None` for
    /// count policies.
    pub fn seconds_remaining(&self, state: &SessionState, now: SystemTime) -> Option<u64> {
        let total = self.policy.timer_seconds()?;
        if self.is_ended() {
            return Some(0);
        }
        if !state.has_started() {
            return Some(total);
        }
        Some(total.saturating_sub(state.elapsed_seconds(now)))
    }

    /// Polls the termination condition. Returns true on the transition
    /// into the ended state, false otherwise (including while ended).
    pub fn check_end(&mut self, state: &SessionState, now: SystemTime) -> bool {
        if self.is_ended() {
            return false;
        }

        let should_end = match self.policy {
            EndPolicy::Timer { seconds } | EndPolicy::FixTimer { seconds } => {
                state.has_started() && state.elapsed_seconds(now) >= seconds
            }
            EndPolicy::WordCount { words } => state.completed().len() >= words,
            EndPolicy::SnippetCount { snippets } => state.completed().len() >= snippets,
        };

        if should_end {
            self.ended_at = Some(now);
        }
        should_end
    }

    /// Timer policies freeze duration at the configured value so tick
    /// granularity cannot shift it; count policies use measured elapsed
    /// time rounded to the nearest second.
    pub fn duration_seconds(&self, state: &SessionState) -> u64 {
        if let Some(seconds) = self.policy.timer_seconds() {
            return seconds;
        }

        match (state.started_at(), self.ended_at) {
            (Some(started), Some(ended)) => {
                let millis = ended
                    .duration_since(started)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0);
                (millis + 500) / 1000
            }
            _ => 0,
        }
    }

    /// Final metrics over the frozen state. `None` until the session has
    /// ended.
    pub fn finalize(&self, state: &SessionState, targets: &[String]) -> Option<ResultsMetrics> {
        if !self.is_ended() {
            return None;
        }

        let open_target = targets.get(state.current_index()).map(String::as_str);
        let input = MetricsInput {
            completed: state.completed(),
            targets,
            duration_seconds: self.duration_seconds(state),
            series: state.series(),
            open_item: open_target.map(|target| (state.current_input(), target)),
            track_items_per_second: self.policy.is_code_activity(),
        };
        Some(metrics::results_metrics(&input))
    }

    /// Assembles the persistence payload from the frozen state, the final
    /// metrics and the active settings.
    pub fn build_payload(
        &self,
        settings: &Settings,
        metrics: &ResultsMetrics,
        state: &SessionState,
    ) -> RunPayload {
        let config = RunConfig {
            timer_seconds: self.policy.timer_seconds(),
            word_count: match self.policy {
                EndPolicy::WordCount { words } => Some(words),
                _ => None,
            },
            snippet_count: match self.policy {
                EndPolicy::SnippetCount { snippets } => Some(snippets),
                _ => None,
            },
        };

        let (items_completed, items_per_minute) = if self.policy.is_code_activity() {
            (
                Some(state.completed().len() as u64),
                metrics.items_per_second.map(|ips| round2(ips * 60.0)),
            )
        } else {
            (None, None)
        };

        RunPayload {
            activity: settings.activity,
            language: settings.language,
            mode: settings.mode,
            editor: settings.editor,
            config,
            result: RunResult {
                duration_seconds: metrics.duration_seconds,
                wpm: Some(metrics.wpm),
                raw_wpm: Some(metrics.raw_wpm),
                accuracy: Some(metrics.accuracy),
                errors: Some(metrics.errors),
                consistency: Some(metrics.consistency),
                items_completed,
                items_per_minute,
            },
            series: state.series().to_vec(),
        }
    }

    /// Hands the payload to the persistence collaborator. The session
    /// stays ended whatever the outcome; the caller decides whether a
    /// failure is worth logging.
    pub fn hand_off(&self, sink: &dyn RunSink, payload: &RunPayload) -> io::Result<()> {
        sink.save(payload)
    }

    /// The only way out of the ended state.
    pub fn reset(&mut self) {
        self.ended_at = None;
    }
}
