use thiserror::Error;

/// Error type returned by every public operation on [`crate::Store`].
///
/// Mirrors the taxonomy in the design: precondition violations, duplicate
/// keys, not-found lookups, and I/O / corruption failures are distinct
/// variants rather than all being funneled through `io::Error`.
#[derive(Debug, Error)]
pub enum IsamError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(i32),

    #[error("key not found: {0}")]
    NotFound(i32),

    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IsamError>;
