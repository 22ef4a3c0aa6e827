use thiserror::Error;

#[derive(Error, Debug)]
pub enum MasroofError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid date '{value}' (expected {expected})")]
    InvalidDate {
        value: String,
        expected: &'static str,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MasroofError>;
