use bounce_core::types::CheckId;

/// Errors from any record store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("Check not found: {0}")]
    NotFound(CheckId),

    /// The backend could not be reached or is not configured.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error object.
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    /// The backend answered with something that is not a valid record.
    #[error("Backend returned a malformed record: {0}")]
    Corrupt(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Cache slot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache slot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

/// Coarse classification used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    NotFound,
    Unavailable,
    /// Reached the backend but it failed or answered nonsense.
    Backend,
    Internal,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Unavailable(_) | StoreError::Io(_) => StoreErrorKind::Unavailable,
            StoreError::Rejected(_) | StoreError::Corrupt(_) | StoreError::Json(_) => {
                StoreErrorKind::Backend
            }
            StoreError::Http(err) if err.is_decode() => StoreErrorKind::Backend,
            StoreError::Http(_) => StoreErrorKind::Unavailable,
            StoreError::Database(err) => database_kind(err),
            // A migration that could not reach the database is an outage,
            // not a broken schema.
            StoreError::Migrate(sqlx::migrate::MigrateError::Execute(err)) => {
                match database_kind(err) {
                    StoreErrorKind::Unavailable => StoreErrorKind::Unavailable,
                    _ => StoreErrorKind::Internal,
                }
            }
            StoreError::Migrate(_) | StoreError::Config(_) => StoreErrorKind::Internal,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind() == StoreErrorKind::Unavailable
    }
}

fn database_kind(err: &sqlx::Error) -> StoreErrorKind {
    match err {
        sqlx::Error::RowNotFound => StoreErrorKind::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Protocol(_) => StoreErrorKind::Unavailable,
        _ => StoreErrorKind::Backend,
    }
}
