//! JSON REST API for Stockroom.
//!
//! Exposes an axum [`Router`] backed by any
//! [`stockroom_core::store::InventoryStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stockroom_api::api_router(store.clone(), clock))
//! ```

pub mod categories;
pub mod error;
pub mod items;
pub mod purchases;
pub mod stocks;
pub mod stores;

use std::sync::Arc;

use axum::{Router, routing::get};
use stockroom_core::{clock::Clock, store::InventoryStore};

pub use error::ApiError;

/// Shared handler state: the backend plus the clock expiry checks read.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub clock: Arc<dyn Clock>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      clock: Arc::clone(&self.clock),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Router<()>
where
  S: InventoryStore + 'static,
{
  Router::new()
    // Categories
    .route(
      "/categories",
      get(categories::list::<S>).post(categories::create::<S>),
    )
    .route("/categories/search", get(categories::search::<S>))
    .route("/categories/name/{name}", get(categories::by_name::<S>))
    .route("/categories/exists/{name}", get(categories::exists::<S>))
    .route(
      "/categories/{id}",
      get(categories::get_one::<S>)
        .put(categories::update::<S>)
        .delete(categories::delete::<S>),
    )
    // Stores
    .route("/stores", get(stores::list::<S>).post(stores::create::<S>))
    .route("/stores/search", get(stores::search::<S>))
    .route("/stores/location", get(stores::by_location::<S>))
    .route("/stores/name/{name}", get(stores::by_name::<S>))
    .route("/stores/exists/{name}", get(stores::exists::<S>))
    .route(
      "/stores/{id}",
      get(stores::get_one::<S>)
        .put(stores::update::<S>)
        .delete(stores::delete::<S>),
    )
    // Items
    .route("/items", get(items::list::<S>).post(items::create::<S>))
    .route("/items/search", get(items::search::<S>))
    .route("/items/category/{id}", get(items::by_category::<S>))
    .route("/items/store/none", get(items::without_store::<S>))
    .route("/items/store/{id}", get(items::by_store::<S>))
    .route("/items/expiry/{has_expiry}", get(items::by_expiry_flag::<S>))
    .route("/items/threshold/{threshold}", get(items::by_threshold::<S>))
    .route(
      "/items/{id}",
      get(items::get_one::<S>)
        .put(items::update::<S>)
        .delete(items::delete::<S>),
    )
    // Stock
    .route("/stocks", get(stocks::list::<S>).post(stocks::create::<S>))
    .route("/stocks/alerts/low-stock", get(stocks::low_stock::<S>))
    .route(
      "/stocks/alerts/low-stock/{item_id}",
      get(stocks::low_stock_for_item::<S>),
    )
    .route("/stocks/alerts/expiring", get(stocks::expiring::<S>))
    .route("/stocks/alerts/expired", get(stocks::expired::<S>))
    .route("/stocks/item/{item_id}", get(stocks::by_item::<S>))
    .route(
      "/stocks/item/{item_id}/expiry-ordered",
      get(stocks::by_item_expiry_ordered::<S>),
    )
    .route(
      "/stocks/item/{item_id}/total-quantity",
      get(stocks::total_quantity::<S>),
    )
    .route("/stocks/{id}/status", get(stocks::status::<S>))
    .route(
      "/stocks/{id}",
      get(stocks::get_one::<S>)
        .put(stocks::update::<S>)
        .delete(stocks::delete::<S>),
    )
    // Purchases
    .route(
      "/purchases",
      get(purchases::list::<S>).post(purchases::create::<S>),
    )
    .route("/purchases/period", get(purchases::period::<S>))
    .route("/purchases/expiring", get(purchases::expiring_before::<S>))
    .route("/purchases/item/{item_id}", get(purchases::by_item::<S>))
    .route(
      "/purchases/item/{item_id}/with-expiry",
      get(purchases::by_item_with_expiry::<S>),
    )
    .route(
      "/purchases/{id}",
      get(purchases::get_one::<S>)
        .put(purchases::update::<S>)
        .delete(purchases::delete::<S>),
    )
    .with_state(ApiState { store, clock })
}
