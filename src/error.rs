use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by stores and collections.
///
/// Missing keys are not errors for `get`, `delete` and `contains`; only the
/// single-key [`Collection::get_one`](crate::Collection::get_one) lookup
/// reports absence, via [`Error::KeyNotFound`].
#[derive(Debug, Error)]
pub enum Error {
    /// The database file could not be opened or created.
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Single-key lookup on a key that does not exist.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A value could not be encoded, or a stored blob could not be decoded.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// Collection name is not a valid identifier.
    #[error("invalid collection name: {0:?}")]
    InvalidName(String),

    /// Any other error reported by the underlying SQLite engine.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
