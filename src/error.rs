use thiserror::Error;

use crate::CompileError;

/// Unified error type covering compilation and I/O.
///
/// Returned by convenience methods like [`Grammar::from_abnf()`](crate::Grammar::from_abnf)
/// and [`Grammar::from_file()`](crate::Grammar::from_file).
#[derive(Debug, Error)]
pub enum SabnfError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
