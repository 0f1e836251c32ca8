use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Card identifier errors
    #[error("Card identifier out of range: {value} (must be 0-65535)")]
    IdOutOfRange { value: i64 },

    #[error("Invalid card identifier: {0}")]
    InvalidId(String),

    #[error("Invalid block length: expected {expected} bytes, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    // Library errors
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Empty URI derived from path: {0}")]
    EmptyUri(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
