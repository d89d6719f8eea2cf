//! Error types for `stockroom-core`.
//!
//! Every backend error converts into [`Error`], which carries the three kinds
//! callers distinguish: a missing row, rejected input, and a storage failure.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The kind of record an [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Category,
  Store,
  Item,
  Stock,
  Purchase,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Category => "category",
      Self::Store => "store",
      Self::Item => "item",
      Self::Stock => "stock",
      Self::Purchase => "purchase",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: Uuid },

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: Entity, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  /// An item's on-hand lots add up to more than an `i64` holds.
  pub fn quantity_overflow(item_id: Uuid) -> Self {
    Self::Validation(format!(
      "total quantity of item {item_id} is out of range"
    ))
  }

  pub fn storage(
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
  ) -> Self {
    Self::Storage(source.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
