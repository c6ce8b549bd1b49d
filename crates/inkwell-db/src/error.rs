use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The `users.username` UNIQUE constraint rejected an insert.
    #[error("username already exists")]
    DuplicateUsername,

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
