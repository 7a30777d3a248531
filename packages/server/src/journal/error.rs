use common::storage::StorageError;
use sea_orm::DbErr;

/// Failure of a journal lifecycle operation.
///
/// `NotFound` and `NotOwner` are kept apart for logging; the HTTP layer renders
/// them identically.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("{0}")]
    Validation(String),
    #[error("journal not found")]
    NotFound,
    #[error("journal belongs to another user")]
    NotOwner,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("document store failure: {0}")]
    Database(#[from] DbErr),
}
