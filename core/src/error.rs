use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
