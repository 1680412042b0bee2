use crate::session::CompletedItem;
use crate::time_series::SeriesPoint;
use crate::util::{mean, round2, std_dev};
use itertools::{EitherOrBoth, Itertools};

/// Average word length used to normalize character throughput into WPM.
const BASE_WORD_LENGTH: f64 = 5.0;

/// Positional decomposition of typed vs. target characters for one
/// comparison. Deliberately not an edit distance: each position either
/// matches or it does not, and length mismatch becomes `extra` / `missed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharBreakdown {
    pub correct: u64,
    pub incorrect: u64,
    pub extra: u64,
    pub missed: u64,
}

impl CharBreakdown {
    pub fn combine(self, other: CharBreakdown) -> CharBreakdown {
        CharBreakdown {
            correct: self.correct + other.correct,
            incorrect: self.incorrect + other.incorrect,
            extra: self.extra + other.extra,
            missed: self.missed + other.missed,
        }
    }

    /// Characters the user actually produced, right or wrong.
    pub fn total_typed(&self) -> u64 {
        self.correct + self.incorrect + self.extra
    }
}

/// Final metrics for a session, recomputed on demand and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsMetrics {
    pub wpm: f64,
    pub raw_wpm: f64,
    pub accuracy: f64,
    pub errors: u64,
    pub consistency: f64,
    pub duration_seconds: u64,
    pub characters: CharBreakdown,
    pub items_per_second: Option<f64>,
}

/// Walks both strings position by position: equal chars count as correct,
/// unequal as incorrect; surplus typed chars are extra, unreached target
/// chars are missed.
pub fn compare_sequences(typed: &str, target: &str) -> CharBreakdown {
    let mut breakdown = CharBreakdown::default();

    for pair in typed.chars().zip_longest(target.chars()) {
        match pair {
            EitherOrBoth::Both(typed_char, target_char) => {
                if typed_char == target_char {
                    breakdown.correct += 1;
                } else {
                    breakdown.incorrect += 1;
                }
            }
            EitherOrBoth::Left(_) => breakdown.extra += 1,
            EitherOrBoth::Right(_) => breakdown.missed += 1,
        }
    }

    breakdown
}

/// Breakdown for the in-progress item: characters not yet reached are not
/// errors, so `missed` is forced to 0.
pub fn partial_breakdown(typed: &str, target: &str) -> CharBreakdown {
    CharBreakdown {
        missed: 0,
        ..compare_sequences(typed, target)
    }
}

/// Sums the positional comparison over every completed item against its
/// corresponding target. Targets beyond the completed range are not visited.
pub fn aggregate_breakdown(completed: &[CompletedItem], targets: &[String]) -> CharBreakdown {
    completed
        .iter()
        .enumerate()
        .fold(CharBreakdown::default(), |acc, (index, item)| {
            let target = targets.get(index).map(String::as_str).unwrap_or("");
            let submitted = match item {
                CompletedItem::Word { text, .. } => text.as_str(),
                CompletedItem::Snippet { code, .. } => code.as_str(),
            };
            acc.combine(compare_sequences(submitted, target))
        })
}

/// Correct characters normalized to 5-char words per minute. 0 when no
/// time has elapsed.
pub fn wpm(correct_chars: u64, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    round2(correct_chars as f64 / BASE_WORD_LENGTH / (elapsed_seconds / 60.0))
}

/// Throughput ignoring correctness: all characters typed (correct,
/// incorrect and extra) over elapsed time. This is the
/// characters-typed basis, applied identically in word and code sessions.
pub fn raw_wpm(breakdown: &CharBreakdown, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    round2(breakdown.total_typed() as f64 / BASE_WORD_LENGTH / (elapsed_seconds / 60.0))
}

/// Fidelity of keystrokes actually made. `missed` is excluded from the
/// denominator: accuracy measures what was typed, not completeness.
pub fn accuracy(breakdown: &CharBreakdown) -> f64 {
    let total_typed = breakdown.total_typed();
    if total_typed == 0 {
        return 0.0;
    }
    round2(breakdown.correct as f64 / total_typed as f64 * 100.0)
}

pub fn error_count(breakdown: &CharBreakdown) -> u64 {
    breakdown.incorrect + breakdown.extra + breakdown.missed
}

/// 100 minus the coefficient of variation of the WPM series, clamped to
/// [0, 100]. Fewer than two points is treated as perfectly consistent.
pub fn consistency(series: &[SeriesPoint]) -> f64 {
    if series.len() < 2 {
        return 100.0;
    }

    let values: Vec<f64> = series.iter().map(|point| point.wpm).collect();
    let series_mean = match mean(&values) {
        Some(m) if m != 0.0 => m,
        _ => return 0.0,
    };
    let deviation = std_dev(&values).unwrap_or(0.0);
    let ratio = deviation / series_mean;

    round2((100.0 - ratio * 100.0).clamp(0.0, 100.0))
}

/// Everything the final-results computation needs, borrowed from frozen
/// session state.
#[derive(Debug, Clone, Copy)]
pub struct MetricsInput<'a> {
    pub completed: &'a [CompletedItem],
    pub targets: &'a [String],
    pub duration_seconds: u64,
    pub series: &'a [SeriesPoint],
    /// `(current_input, current_target)` when an item is still open.
    pub open_item: Option<(&'a str, &'a str)>,
    /// Record `items_per_second` (snippet-count sessions).
    pub track_items_per_second: bool,
}

/// Composes the breakdown of every committed item with the partial
/// breakdown of the open buffer, then derives all final figures. Pure:
/// identical inputs always yield identical output.
pub fn results_metrics(input: &MetricsInput) -> ResultsMetrics {
    let committed = aggregate_breakdown(input.completed, input.targets);
    let open = match input.open_item {
        Some((typed, target)) => partial_breakdown(typed, target),
        None => CharBreakdown::default(),
    };
    let characters = committed.combine(open);
    let duration = input.duration_seconds as f64;

    let items_per_second = if input.track_items_per_second {
        if duration > 0.0 {
            Some(round2(input.completed.len() as f64 / duration))
        } else {
            Some(0.0)
        }
    } else {
        None
    };

    ResultsMetrics {
        wpm: wpm(characters.correct, duration),
        raw_wpm: raw_wpm(&characters, duration),
        accuracy: accuracy(&characters),
        errors: error_count(&characters),
        consistency: consistency(input.series),
        duration_seconds: input.duration_seconds,
        characters,
        items_per_second,
    }
}
