use crate::metrics;
use crate::session::SessionState;
use crate::time_series::SeriesPoint;
use std::time::SystemTime;

/// Whether per-second samples carry a completed-item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerKind {
    Words,
    Snippets,
}

/// Polls session state on a short fixed interval and appends one series
/// point per distinct elapsed whole second. Elapsed time is always derived
/// from the stored start timestamp, never from counting ticks, so the
/// sampler tolerates arbitrary scheduling delay.
#[derive(Debug, Clone)]
pub struct SeriesSampler {
    kind: SamplerKind,
    /// `(generation, second)` of the last appended sample. The generation
    /// half invalidates the watermark when the session is reset.
    watermark: Option<(u64, u64)>,
}

impl SeriesSampler {
    pub fn new(kind: SamplerKind) -> Self {
        Self {
            kind,
            watermark: None,
        }
    }

    /// One poll. No-op unless the session has started and a whole second
    /// has elapsed that was not sampled yet; idempotent within a second.
    pub fn poll(
        &mut self,
        state: &mut SessionState,
        targets: &[String],
        now: SystemTime,
    ) -> Option<SeriesPoint> {
        if !state.has_started() {
            self.watermark = None;
            return None;
        }

        let second = state.elapsed_seconds(now);
        if second == 0 {
            return None;
        }
        if self.watermark == Some((state.generation(), second)) {
            return None;
        }

        let committed = metrics::aggregate_breakdown(state.completed(), targets);
        let open_target = targets
            .get(state.current_index())
            .map(String::as_str)
            .unwrap_or("");
        let open = metrics::partial_breakdown(state.current_input(), open_target);
        let combined = committed.combine(open);

        let mut point = SeriesPoint::new(
            second,
            metrics::wpm(combined.correct, second as f64),
            metrics::raw_wpm(&combined, second as f64),
            metrics::error_count(&combined),
        );
        if self.kind == SamplerKind::Snippets {
            point = point.with_items_done(state.completed().len() as u64);
        }

        self.watermark = Some((state.generation(), second));
        if state.append_series_point(point) {
            Some(point)
        } else {
            None
        }
    }
}
