use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),
    #[error("duplicate identity: {0}")]
    Duplicate(String),
    #[error("corrupt {table} row {id}: {message}")]
    Corrupt {
        table: &'static str,
        id: i64,
        message: String,
    },
    #[error("failed to encode reference embedding: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create image directory {path}: {source}")]
    ImageDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Turn UNIQUE violations into [`StoreError::Duplicate`], pass everything else through.
    pub(crate) fn classify(err: tokio_rusqlite::Error) -> Self {
        match &err {
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message))
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::Duplicate(
                    message
                        .clone()
                        .unwrap_or_else(|| "unique constraint violated".to_string()),
                )
            }
            _ => StoreError::Database(err),
        }
    }
}
