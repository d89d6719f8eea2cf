//! Catalogue records: categories, store locations, and the items they group.
//!
//! An item belongs to at most one category and is bought at most at one
//! store. Both references are optional; a store reference is cleared when the
//! store is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub category_id: Uuid,
  /// Unique across all categories.
  pub name:        String,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::InventoryStore::add_category`] and
/// [`crate::store::InventoryStore::update_category`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
  pub name: String,
}

impl NewCategory {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }

  pub fn validate(&self) -> Result<()> { require_name("category", &self.name) }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A shop or warehouse location items are bought at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
  pub store_id:   Uuid,
  /// Unique across all stores.
  pub name:       String,
  pub location:   Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStore {
  pub name:     String,
  #[serde(default)]
  pub location: Option<String>,
}

impl NewStore {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), location: None }
  }

  pub fn validate(&self) -> Result<()> { require_name("store", &self.name) }
}

// ─── Item ────────────────────────────────────────────────────────────────────

/// A product tracked by the inventory. Quantities live on its stock lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub item_id:     Uuid,
  pub name:        String,
  /// Unit price in minor currency units.
  pub price:       i64,
  pub note:        Option<String>,
  /// The item is low on stock once its total quantity is at or below this.
  pub threshold:   i64,
  pub has_expiry:  bool,
  pub category_id: Option<Uuid>,
  pub store_id:    Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
  pub name:        String,
  #[serde(default)]
  pub price:       i64,
  #[serde(default)]
  pub note:        Option<String>,
  #[serde(default)]
  pub threshold:   i64,
  #[serde(default)]
  pub has_expiry:  bool,
  #[serde(default)]
  pub category_id: Option<Uuid>,
  #[serde(default)]
  pub store_id:    Option<Uuid>,
}

impl NewItem {
  /// Convenience constructor with every optional field left empty.
  pub fn new(name: impl Into<String>, threshold: i64) -> Self {
    Self {
      name: name.into(),
      price: 0,
      note: None,
      threshold,
      has_expiry: false,
      category_id: None,
      store_id: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_name("item", &self.name)?;
    if self.threshold < 0 {
      return Err(Error::validation(format!(
        "item threshold must not be negative (got {})",
        self.threshold
      )));
    }
    Ok(())
  }
}

fn require_name(kind: &str, name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::validation(format!("{kind} name must not be empty")));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_names_are_rejected() {
    assert!(NewCategory::new("  ").validate().is_err());
    assert!(NewStore::new("").validate().is_err());
    assert!(NewItem::new("\t", 1).validate().is_err());
    assert!(NewCategory::new("Condiments").validate().is_ok());
  }

  #[test]
  fn negative_threshold_is_rejected() {
    let err = NewItem::new("Soy sauce", -1).validate().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(NewItem::new("Soy sauce", 0).validate().is_ok());
  }
}
