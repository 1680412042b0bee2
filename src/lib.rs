// Library surface for the typing-session engine.
// Presentation, persistence transports and snippet generation live in the
// embedding application; this crate only owns session state and computation.
pub mod code_breaker;
pub mod code_mode;
pub mod config;
pub mod lifecycle;
pub mod metrics;
pub mod payload;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod time_series;
pub mod util;
pub mod word_mode;

/// Poll cadence of the per-second series sampler, in milliseconds.
pub const SAMPLE_INTERVAL_MS: u64 = 200;

/// Poll cadence of the countdown / end-of-session check, in milliseconds.
pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
