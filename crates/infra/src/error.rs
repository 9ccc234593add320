use thiserror::Error;

use crate::models::RequestStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: String },

    #[error("cannot move a {from} request to {to}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },

    #[error("{0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn not_found(collection: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
