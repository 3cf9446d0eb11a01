use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core.
///
/// Construction-time validation failures are `InvalidParam` and are never
/// retried; the caller must supply corrected parameters. `MathError` and
/// `InvariantViolation` are fatal mid-simulation conditions and must abort
/// the run rather than be masked.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical pathology (e.g., degenerate contact normal).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Physical-model invariant broken mid-run (empty event queue, non-finite
    /// predicted time, zero combined colliding mass).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
