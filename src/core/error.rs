//! Error taxonomy for the wrapper.
//!
//! Every failure surfaces immediately; there is no retry and no degraded
//! mode. A failed [`run`](crate::Engine::run) leaves every output channel
//! empty; nothing partial is ever observable.

use thiserror::Error;

use crate::backend::EngineError;

/// Errors reported by [`Engine`](crate::Engine) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally empty or malformed input detected before the engine
    /// is invoked. No state has been mutated.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input population.
        message: String,
    },
    /// Out-of-range or unrecognized configuration detected before the
    /// engine is invoked.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Which setting was rejected, and why.
        message: String,
    },
    /// An internal hole-detection assumption was broken: the engine
    /// claimed two triangles were neighbors but they share no edge.
    /// Indicates a non-closed or inconsistently oriented boundary, or an
    /// engine inconsistency. Not locally recoverable.
    #[error("invariant violation: {message}")]
    InvariantViolation {
        /// Which invariant failed.
        message: String,
    },
    /// The engine itself rejected the geometry. Opaque to the wrapper and
    /// propagated as-is; no partial output is valid.
    #[error("engine failure: {source}")]
    EngineFailure {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },
}
