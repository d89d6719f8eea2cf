//! The `InventoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `stockroom-store-sqlite`). Higher layers (`stockroom-api`, the alert
//! service) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  alert::StockLedger,
  catalog::{Category, Item, NewCategory, NewItem, NewStore, Store},
  purchase::{NewPurchase, PurchaseHistory},
  stock::{NewStock, Stock},
};

/// Abstraction over an inventory storage backend.
///
/// Every method is one unit of work: a backend must apply all of its writes
/// or none of them. Updates replace the whole record by id and return `None`
/// when the id does not exist; deletes report whether a row was removed.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait InventoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Categories ────────────────────────────────────────────────────────

  fn add_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  fn get_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn update_category(
    &self,
    id: Uuid,
    input: NewCategory,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  /// Delete a category. Fails with a validation error while any item still
  /// references it.
  fn delete_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Exact, case-sensitive name lookup.
  fn find_category_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + 'a;

  /// Case-insensitive substring match on the name.
  fn search_categories<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + 'a;

  // ── Stores ────────────────────────────────────────────────────────────

  fn add_store(
    &self,
    input: NewStore,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  fn get_store(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  fn list_stores(
    &self,
  ) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send + '_;

  fn update_store(
    &self,
    id: Uuid,
    input: NewStore,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  /// Delete a store without leaving dangling references.
  ///
  /// In a single transaction: clear the store reference on every item (and
  /// purchase record) pointing at it, then delete the store row. Returns the
  /// number of items detached, or `None` if the store does not exist, in
  /// which case nothing is changed.
  fn delete_store(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + '_;

  fn find_store_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + 'a;

  fn search_stores<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send + 'a;

  fn search_stores_by_location<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send + 'a;

  // ── Items ─────────────────────────────────────────────────────────────

  fn add_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  fn get_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  fn list_items(
    &self,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  fn update_item(
    &self,
    id: Uuid,
    input: NewItem,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// Delete an item together with all of its stock lots and purchase
  /// records.
  fn delete_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_items_by_category(
    &self,
    category_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  fn list_items_by_store(
    &self,
    store_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  fn list_items_without_store(
    &self,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  fn search_items<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  fn list_items_by_expiry_flag(
    &self,
    has_expiry: bool,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  /// Items whose threshold is strictly below `threshold`.
  fn list_items_by_threshold_less_than(
    &self,
    threshold: i64,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  /// Clear the store reference on every item pointing at `store_id`.
  /// Returns the number of items changed.
  fn set_store_null_for_items_with_store(
    &self,
    store_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Stock ─────────────────────────────────────────────────────────────

  fn add_stock(
    &self,
    input: NewStock,
  ) -> impl Future<Output = Result<Stock, Self::Error>> + Send + '_;

  fn get_stock(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Stock>, Self::Error>> + Send + '_;

  fn list_stock(
    &self,
  ) -> impl Future<Output = Result<Vec<Stock>, Self::Error>> + Send + '_;

  fn update_stock(
    &self,
    id: Uuid,
    input: NewStock,
  ) -> impl Future<Output = Result<Option<Stock>, Self::Error>> + Send + '_;

  fn delete_stock(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_stock_by_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Stock>, Self::Error>> + Send + '_;

  /// Lots of one item sorted by expiry date. Lots without an expiry date
  /// come last in either direction.
  fn list_stock_by_item_ordered_by_expiry(
    &self,
    item_id: Uuid,
    ascending: bool,
  ) -> impl Future<Output = Result<Vec<Stock>, Self::Error>> + Send + '_;

  /// Sum of `quantity` over the item's lots with a positive quantity, or
  /// `None` when there is no such lot.
  fn sum_positive_quantity_by_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  /// Read a consistent snapshot of stock lots and their items' thresholds,
  /// restricted to one item when `item_id` is set.
  fn stock_ledger(
    &self,
    item_id: Option<Uuid>,
  ) -> impl Future<Output = Result<StockLedger, Self::Error>> + Send + '_;

  /// Read one lot together with the ledger of its item, in one snapshot.
  /// `None` when the lot does not exist.
  fn stock_with_ledger(
    &self,
    stock_id: Uuid,
  ) -> impl Future<Output = Result<Option<(Stock, StockLedger)>, Self::Error>>
  + Send
  + '_;

  // ── Purchase history ──────────────────────────────────────────────────

  fn add_purchase(
    &self,
    input: NewPurchase,
  ) -> impl Future<Output = Result<PurchaseHistory, Self::Error>> + Send + '_;

  fn get_purchase(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PurchaseHistory>, Self::Error>> + Send + '_;

  fn list_purchases(
    &self,
  ) -> impl Future<Output = Result<Vec<PurchaseHistory>, Self::Error>> + Send + '_;

  fn update_purchase(
    &self,
    id: Uuid,
    input: NewPurchase,
  ) -> impl Future<Output = Result<Option<PurchaseHistory>, Self::Error>> + Send + '_;

  fn delete_purchase(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Purchases of one item, most recent `purchased_at` first.
  fn list_purchases_by_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PurchaseHistory>, Self::Error>> + Send + '_;

  /// Purchases of one item that carry an expiry date, soonest first.
  fn list_purchases_by_item_with_expiry(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PurchaseHistory>, Self::Error>> + Send + '_;

  /// Purchases with `start <= purchased_at <= end`.
  fn list_purchases_between(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<PurchaseHistory>, Self::Error>> + Send + '_;

  /// Purchases whose expiry date is strictly before `date`.
  fn list_purchases_expiring_before(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<PurchaseHistory>, Self::Error>> + Send + '_;
}
