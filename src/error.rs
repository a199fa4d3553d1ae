use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced to callers of the engine.
///
/// Invalid arguments are the only error class that escapes: malformed log
/// entries are skipped per entry, degenerate numeric cases resolve to a 0.0
/// similarity, and an empty corpus or empty history resolves to an empty or
/// fallback result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
