use thiserror::Error;

/// Failure of the durable cache store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("cache entry headers: {0}")]
    Headers(#[from] serde_json::Error),
    #[error("cache directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache state dir: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("unknown cache generation {0:?}")]
    UnknownGeneration(String),
    #[error("cache generation {0:?} is not ready")]
    NotReady(String),
}
