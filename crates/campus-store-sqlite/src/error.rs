//! Error type for `campus-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Validation failures and malformed stored values caught by core parsing.
  #[error("core error: {0}")]
  Core(#[from] campus_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored column that does not decode into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
