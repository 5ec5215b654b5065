use athenaeum_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint on email or student id was hit.
    #[error("a user with the same email or student id already exists")]
    Duplicate,
    #[error("stored record could not be decoded: {0}")]
    Corrupt(String),
    #[error("store backend failure: {0}")]
    Backend(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Backend(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::duplicate_identity(),
            StoreError::Corrupt(_) => AppError::internal(err),
            StoreError::Backend(_) => AppError::unavailable(err),
        }
    }
}
