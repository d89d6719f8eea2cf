//! Stock alerting over an [`InventoryStore`].
//!
//! These functions pair a backend read with the pure rules in
//! [`crate::alert`]. Each view reads one [`StockLedger`] snapshot so that
//! totals and filtered lots agree.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Entity, Error, Result,
  alert::{self, StockLedger},
  clock::Clock,
  stock::{Stock, StockStatus},
  store::InventoryStore,
};

/// Total on-hand quantity for an item, or `None` when it has no lot with a
/// positive quantity.
pub async fn total_quantity<S>(store: &S, item_id: Uuid) -> Result<Option<i64>>
where
  S: InventoryStore,
{
  store
    .sum_positive_quantity_by_item(item_id)
    .await
    .map_err(backend)
}

/// Classify one stock lot.
///
/// The lot, its item's threshold and the item's total come from one
/// snapshot. The total only matters when the expiry checks do not decide.
pub async fn stock_status<S, C>(
  store: &S,
  clock: &C,
  stock_id: Uuid,
) -> Result<StockStatus>
where
  S: InventoryStore,
  C: Clock + ?Sized,
{
  let today = clock.today();
  let (stock, ledger) = store
    .stock_with_ledger(stock_id)
    .await
    .map_err(backend)?
    .ok_or_else(|| Error::not_found(Entity::Stock, stock_id))?;

  if let Some(status) = alert::expiry_status(stock.expiry_date, today) {
    return Ok(status);
  }
  if ledger.threshold(stock.item_id).is_none() {
    return Err(Error::not_found(Entity::Item, stock.item_id));
  }
  ledger.status(&stock, today)
}

/// Low-stock alerts across every item; one entry per qualifying lot.
pub async fn low_stock_alerts<S>(store: &S) -> Result<Vec<Stock>>
where
  S: InventoryStore,
{
  let alerts = ledger(store, None).await?.low_stock_alerts()?;
  tracing::debug!(count = alerts.len(), "low-stock scan");
  Ok(alerts)
}

/// Low-stock alerts for a single item. An unknown item has no alerts.
pub async fn low_stock_alerts_for_item<S>(
  store: &S,
  item_id: Uuid,
) -> Result<Vec<Stock>>
where
  S: InventoryStore,
{
  let alerts = ledger(store, Some(item_id))
    .await?
    .low_stock_alerts_for_item(item_id)?;
  tracing::debug!(%item_id, count = alerts.len(), "low-stock scan for item");
  Ok(alerts)
}

/// Lots expiring within `days_ahead` days (inclusive), expired ones included.
/// A negative look-ahead is rejected.
pub async fn expiring_stocks<S, C>(
  store: &S,
  clock: &C,
  days_ahead: i64,
) -> Result<Vec<Stock>>
where
  S: InventoryStore,
  C: Clock + ?Sized,
{
  let days_ahead = u32::try_from(days_ahead).map_err(|_| {
    Error::validation(format!(
      "days_ahead must be between 0 and {} (got {days_ahead})",
      u32::MAX
    ))
  })?;
  let today: NaiveDate = clock.today();
  let alerts = ledger(store, None).await?.expiring(today, days_ahead);
  tracing::debug!(days_ahead, count = alerts.len(), "expiring scan");
  Ok(alerts)
}

/// Lots whose expiry date has passed.
pub async fn expired_stocks<S, C>(store: &S, clock: &C) -> Result<Vec<Stock>>
where
  S: InventoryStore,
  C: Clock + ?Sized,
{
  let today = clock.today();
  let alerts = ledger(store, None).await?.expired(today);
  tracing::debug!(count = alerts.len(), "expired scan");
  Ok(alerts)
}

async fn ledger<S>(store: &S, item_id: Option<Uuid>) -> Result<StockLedger>
where
  S: InventoryStore,
{
  store.stock_ledger(item_id).await.map_err(backend)
}

fn backend<E: Into<Error>>(err: E) -> Error { err.into() }
