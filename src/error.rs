use thiserror::Error;

/// Errors surfaced to callers of the dispatch engine.
///
/// Solver-side failures (missing backend, infeasible, unbounded, timed out)
/// are deliberately absent from this taxonomy: they degrade to a baseline
/// dispatch plan instead of failing the call. Only malformed input and
/// invalid configuration are rejected.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
