use thiserror::Error;

/// Failure conditions raised while parsing, building, or querying.
#[derive(Error, Debug)]
pub enum VerbumError {
    /// The input ran out before the expected structure was found.
    #[error("end of input: {0}")]
    EndOfInput(String),

    /// An operation was attempted in a lifecycle state that forbids it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Stored or collected data does not match what was expected.
    #[error("data integrity: {0}")]
    DataIntegrity(String),

    #[error("could not find {book}:{chapter}:{verse} in database")]
    NotFound { book: u32, chapter: u32, verse: u32 },

    #[error("unknown encoding label: {0}")]
    Encoding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, VerbumError>;

impl VerbumError {
    pub(crate) fn end_of_input(msg: impl Into<String>) -> Self {
        Self::EndOfInput(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub(crate) fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
