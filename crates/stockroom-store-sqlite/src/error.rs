//! Error type for `stockroom-store-sqlite`.

use stockroom_core::Entity;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stockroom_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("{entity} named {name:?} already exists")]
  DuplicateName { entity: Entity, name: String },

  /// A write referenced a row that does not exist.
  #[error("referenced {entity} does not exist: {id}")]
  MissingReference { entity: Entity, id: Uuid },

  #[error("category {id} is still referenced by {items} item(s)")]
  CategoryInUse { id: Uuid, items: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for stockroom_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(inner) => inner,
      Error::DuplicateName { .. }
      | Error::MissingReference { .. }
      | Error::CategoryInUse { .. } => Self::Validation(err.to_string()),
      other => Self::storage(other),
    }
  }
}
