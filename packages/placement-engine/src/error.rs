use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The candidate pool is exhausted; the caller ends the assessment.
    #[error("no items available")]
    NoItemsAvailable,
    #[error("invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },
    #[error("duplicate item id: {0}")]
    DuplicateItem(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("answer submitted for {got} while {expected} is pending")]
    UnexpectedItem { expected: String, got: String },
    #[error("no item is pending an answer")]
    NoPendingItem,
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
