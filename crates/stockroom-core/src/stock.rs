//! Stock lots and their computed status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One batch of an item with its own quantity and optional expiry date.
/// An item may hold many lots at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
  pub stock_id:    Uuid,
  pub item_id:     Uuid,
  /// Lots with a quantity of zero or less are ignored by every total and
  /// alert view.
  pub quantity:    i64,
  pub expiry_date: Option<NaiveDate>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Stock {
  pub fn is_on_hand(&self) -> bool { self.quantity > 0 }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStock {
  pub item_id:     Uuid,
  pub quantity:    i64,
  #[serde(default)]
  pub expiry_date: Option<NaiveDate>,
}

impl NewStock {
  pub fn new(item_id: Uuid, quantity: i64) -> Self {
    Self { item_id, quantity, expiry_date: None }
  }

  pub fn expiring(mut self, date: NaiveDate) -> Self {
    self.expiry_date = Some(date);
    self
  }
}

/// Display status of a lot, in precedence order: expiry beats quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
  Normal,
  LowStock,
  Expiring,
  Expired,
}

impl StockStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Normal => "NORMAL",
      Self::LowStock => "LOW_STOCK",
      Self::Expiring => "EXPIRING",
      Self::Expired => "EXPIRED",
    }
  }
}

impl std::fmt::Display for StockStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_serialises_as_screaming_snake_case() {
    let json = serde_json::to_string(&StockStatus::LowStock).unwrap();
    assert_eq!(json, "\"LOW_STOCK\"");
    let back: StockStatus = serde_json::from_str("\"EXPIRING\"").unwrap();
    assert_eq!(back, StockStatus::Expiring);
    assert_eq!(StockStatus::Expired.to_string(), "EXPIRED");
  }
}
