//! Purchase history: a record of each time an item was bought.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseHistory {
  pub purchase_id:  Uuid,
  pub item_id:      Uuid,
  /// Where the purchase was made; cleared if that store is deleted.
  pub store_id:     Option<Uuid>,
  pub quantity:     i64,
  pub total_price:  Option<i64>,
  pub expiry_date:  Option<NaiveDate>,
  pub purchased_at: DateTime<Utc>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`crate::store::InventoryStore::add_purchase`].
/// `purchased_at` defaults to the time the record is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
  pub item_id:      Uuid,
  #[serde(default)]
  pub store_id:     Option<Uuid>,
  pub quantity:     i64,
  #[serde(default)]
  pub total_price:  Option<i64>,
  #[serde(default)]
  pub expiry_date:  Option<NaiveDate>,
  #[serde(default)]
  pub purchased_at: Option<DateTime<Utc>>,
}

impl NewPurchase {
  pub fn new(item_id: Uuid, quantity: i64) -> Self {
    Self {
      item_id,
      store_id: None,
      quantity,
      total_price: None,
      expiry_date: None,
      purchased_at: None,
    }
  }
}
