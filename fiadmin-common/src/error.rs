//! Errors raised while loading config and reading the catalog

use thiserror::Error;

use crate::db::models::ReferenceKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Version file, config file or database directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Reference row exists but its Source/Analytic row does not
    #[error("{kind:?} record missing for reference {reference_id}")]
    MissingSubtype {
        reference_id: i64,
        kind: ReferenceKind,
    },
}
