use thiserror::Error;

/// Errors surfaced by color parsing and history persistence.
///
/// None of these is fatal to a running session: the in-memory state is
/// always left usable when one is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The text is not a `#rrggbb` color.
    #[error("invalid color {0:?}: expected '#' followed by six hex digits")]
    InvalidColorFormat(String),

    /// The stored history could not be decoded and was discarded.
    #[error("stored color history is corrupt and was discarded: {0}")]
    CorruptPersistedState(#[from] serde_json::Error),

    /// The storage backend could not be read or written.
    #[error("color history storage is unavailable: {0}")]
    PersistenceUnavailable(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
