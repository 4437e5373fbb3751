use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("id mismatch: path id {path} does not match body id {body}")]
    IdMismatch { path: i32, body: i32 },
    #[error("A customer with the same Id already exists.")]
    DuplicateId(i32),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{} {} not found", entity, id)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput(_) => 1001,
            ServiceError::IdMismatch { .. } => 1002,
            ServiceError::DuplicateId(_) => 1003,
            ServiceError::NotFound(_) => 1004,
            ServiceError::Store(_) => 1200,
        }
    }
}
