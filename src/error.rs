use std::io;
use thiserror::Error;

/// Failure modes of a single encode call.
///
/// A failed encode may leave the output buffer partially written; the
/// caller owns discarding or resetting it before the next record.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A field value could not be serialized to JSON. The underlying
    /// error is passed through untouched.
    #[error("value serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The buffer writer could not satisfy a write request.
    #[error("buffer writer failed: {0}")]
    Writer(#[from] io::Error),
}

impl EncodeError {
    /// `serde_json` reports writer failures as its own error type;
    /// unwrap those back into `Writer` so the taxonomy stays honest.
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        match err.io_error_kind() {
            Some(kind) => EncodeError::Writer(kind.into()),
            None => EncodeError::Serialization(err),
        }
    }
}
