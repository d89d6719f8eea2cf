//! Stock aggregation, classification, and alert scanning.
//!
//! Everything here is a pure function of a set of stock lots, per-item
//! thresholds, and a calendar date. Storage access lives in
//! [`crate::service`]; this module only decides which lots qualify.
//!
//! Two expiry windows are in play:
//!
//! - [`classify`] treats a lot as expiring when its date falls in
//!   `[today, today + 3)`, so a lot expiring in exactly three days is
//!   still `NORMAL`.
//! - [`StockLedger::expiring`] includes every lot with
//!   `expiry_date <= today + days_ahead`, so the same lot *is* listed by a
//!   three-day scan.

use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::{
  Error, Result,
  stock::{Stock, StockStatus},
};

/// Width of the classifier's expiring window, in days.
pub const EXPIRING_WINDOW_DAYS: u32 = 3;

/// Default look-ahead for [`StockLedger::expiring`].
pub const DEFAULT_DAYS_AHEAD: u32 = 3;

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Total on-hand quantity of `item_id` across `lots`.
///
/// Only lots with a positive quantity count. Returns `None`, not zero, when
/// the item has no such lot: an unstocked item cannot be compared against its
/// threshold. A sum beyond `i64` is an error, never a wrapped value.
pub fn total_quantity<'a>(
  lots: impl IntoIterator<Item = &'a Stock>,
  item_id: Uuid,
) -> Result<Option<i64>> {
  lots
    .into_iter()
    .filter(|s| s.item_id == item_id && s.is_on_hand())
    .try_fold(None, |total, s| accumulate(total, s.quantity, item_id).map(Some))
}

/// Add one lot's quantity to a running total, failing on overflow.
pub fn accumulate(total: Option<i64>, quantity: i64, item_id: Uuid) -> Result<i64> {
  match total {
    None => Ok(quantity),
    Some(total) => total
      .checked_add(quantity)
      .ok_or_else(|| Error::quantity_overflow(item_id)),
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// The expiry part of the classifier: `EXPIRED` before today, `EXPIRING`
/// inside the three-day window, otherwise `None`.
pub fn expiry_status(
  expiry_date: Option<NaiveDate>,
  today: NaiveDate,
) -> Option<StockStatus> {
  let expiry = expiry_date?;
  if expiry < today {
    Some(StockStatus::Expired)
  } else if expiry < add_days(today, EXPIRING_WINDOW_DAYS) {
    Some(StockStatus::Expiring)
  } else {
    None
  }
}

/// `true` when the total is known and at or below the threshold.
pub fn is_low_stock(total: Option<i64>, threshold: i64) -> bool {
  total.is_some_and(|t| t <= threshold)
}

/// Classify one lot. First match wins: expired, expiring, low stock, normal.
///
/// `total` is the item's aggregate from [`total_quantity`]; it only matters
/// when the expiry checks do not match.
pub fn classify(
  stock: &Stock,
  threshold: i64,
  total: Option<i64>,
  today: NaiveDate,
) -> StockStatus {
  expiry_status(stock.expiry_date, today).unwrap_or(
    if is_low_stock(total, threshold) {
      StockStatus::LowStock
    } else {
      StockStatus::Normal
    },
  )
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
  date
    .checked_add_days(Days::new(u64::from(days)))
    .unwrap_or(NaiveDate::MAX)
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A snapshot of stock lots together with the thresholds of their items.
///
/// Backends build one in a single read so that every alert view sees totals
/// consistent with the lots it filters.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
  lots:       Vec<Stock>,
  thresholds: HashMap<Uuid, i64>,
  totals:     HashMap<Uuid, i64>,
  /// Items whose on-hand total does not fit in an `i64`.
  overflowed: HashSet<Uuid>,
}

impl StockLedger {
  pub fn new(lots: Vec<Stock>, thresholds: HashMap<Uuid, i64>) -> Self {
    let mut totals: HashMap<Uuid, i64> = HashMap::new();
    let mut overflowed = HashSet::new();
    for lot in lots.iter().filter(|s| s.is_on_hand()) {
      if overflowed.contains(&lot.item_id) {
        continue;
      }
      let running = totals.get(&lot.item_id).copied();
      match accumulate(running, lot.quantity, lot.item_id) {
        Ok(total) => {
          totals.insert(lot.item_id, total);
        }
        Err(_) => {
          totals.remove(&lot.item_id);
          overflowed.insert(lot.item_id);
        }
      }
    }
    Self { lots, thresholds, totals, overflowed }
  }

  pub fn lots(&self) -> &[Stock] { &self.lots }

  /// The item's on-hand total, or an error when it overflows.
  pub fn total_quantity(&self, item_id: Uuid) -> Result<Option<i64>> {
    if self.overflowed.contains(&item_id) {
      return Err(Error::quantity_overflow(item_id));
    }
    Ok(self.totals.get(&item_id).copied())
  }

  pub fn threshold(&self, item_id: Uuid) -> Option<i64> {
    self.thresholds.get(&item_id).copied()
  }

  /// Status of `stock` against this snapshot's totals.
  ///
  /// The total is only consulted when the expiry checks do not decide.
  pub fn status(&self, stock: &Stock, today: NaiveDate) -> Result<StockStatus> {
    if let Some(status) = expiry_status(stock.expiry_date, today) {
      return Ok(status);
    }
    let Some(threshold) = self.threshold(stock.item_id) else {
      return Ok(StockStatus::Normal);
    };
    let total = self.total_quantity(stock.item_id)?;
    Ok(classify(stock, threshold, total, today))
  }

  /// Every on-hand lot whose item total is at or below the item threshold.
  ///
  /// One entry per lot: an item with three qualifying lots yields three.
  pub fn low_stock_alerts(&self) -> Result<Vec<Stock>> {
    self.low_stock_where(|_| true)
  }

  /// [`Self::low_stock_alerts`] restricted to one item.
  pub fn low_stock_alerts_for_item(&self, item_id: Uuid) -> Result<Vec<Stock>> {
    self.low_stock_where(|lot| lot.item_id == item_id)
  }

  /// On-hand lots expiring on or before `today + days_ahead`, including
  /// those already expired.
  pub fn expiring(&self, today: NaiveDate, days_ahead: u32) -> Vec<Stock> {
    let target = add_days(today, days_ahead);
    self.filter_on_hand(|lot| lot.expiry_date.is_some_and(|d| d <= target))
  }

  /// On-hand lots whose expiry date is strictly before today.
  pub fn expired(&self, today: NaiveDate) -> Vec<Stock> {
    self.filter_on_hand(|lot| lot.expiry_date.is_some_and(|d| d < today))
  }

  fn low_stock_where(&self, keep: impl Fn(&Stock) -> bool) -> Result<Vec<Stock>> {
    let mut alerts = Vec::new();
    for lot in self.lots.iter().filter(|lot| lot.is_on_hand() && keep(lot)) {
      if self.lot_is_low(lot)? {
        alerts.push(lot.clone());
      }
    }
    Ok(alerts)
  }

  fn lot_is_low(&self, lot: &Stock) -> Result<bool> {
    let Some(threshold) = self.threshold(lot.item_id) else {
      return Ok(false);
    };
    Ok(is_low_stock(self.total_quantity(lot.item_id)?, threshold))
  }

  fn filter_on_hand(&self, keep: impl Fn(&Stock) -> bool) -> Vec<Stock> {
    self
      .lots
      .iter()
      .filter(|lot| lot.is_on_hand() && keep(*lot))
      .cloned()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

  fn days(n: i64) -> NaiveDate {
    today() + chrono::Duration::days(n)
  }

  fn lot(item_id: Uuid, quantity: i64, expiry: Option<NaiveDate>) -> Stock {
    Stock {
      stock_id: Uuid::new_v4(),
      item_id,
      quantity,
      expiry_date: expiry,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn ledger(lots: Vec<Stock>, thresholds: &[(Uuid, i64)]) -> StockLedger {
    StockLedger::new(lots, thresholds.iter().copied().collect())
  }

  // ── Aggregation ───────────────────────────────────────────────────────────

  #[test]
  fn total_is_none_without_positive_lots() {
    let item = Uuid::new_v4();
    assert_eq!(total_quantity(Vec::<Stock>::new().iter(), item).unwrap(), None);

    let lots = vec![lot(item, 0, None), lot(item, -4, None)];
    assert_eq!(total_quantity(&lots, item).unwrap(), None);
    assert_eq!(ledger(lots, &[(item, 5)]).total_quantity(item).unwrap(), None);
  }

  #[test]
  fn total_sums_positive_lots_of_one_item() {
    let item = Uuid::new_v4();
    let other = Uuid::new_v4();
    let lots = vec![
      lot(item, 3, None),
      lot(item, 4, Some(days(10))),
      lot(item, -2, None),
      lot(other, 100, None),
    ];
    assert_eq!(total_quantity(&lots, item).unwrap(), Some(7));
    assert_eq!(ledger(lots, &[]).total_quantity(item).unwrap(), Some(7));
  }

  #[test]
  fn total_past_i64_max_is_an_error() {
    let item = Uuid::new_v4();
    let other = Uuid::new_v4();
    let lots = vec![
      lot(item, i64::MAX, Some(days(-1))),
      lot(item, 1, Some(days(1))),
      lot(other, 2, None),
    ];
    assert!(matches!(
      total_quantity(&lots, item),
      Err(Error::Validation(_))
    ));

    let book = ledger(lots.clone(), &[(item, 5), (other, 1)]);
    assert!(matches!(book.total_quantity(item), Err(Error::Validation(_))));
    assert!(matches!(book.low_stock_alerts(), Err(Error::Validation(_))));
    assert!(book.low_stock_alerts_for_item(other).unwrap().is_empty());
    assert_eq!(book.total_quantity(other).unwrap(), Some(2));

    // Expiry views and expiry-decided statuses never need the total.
    assert_eq!(book.expired(today()), vec![lots[0].clone()]);
    assert_eq!(book.expiring(today(), 3).len(), 2);
    assert_eq!(book.status(&lots[1], today()).unwrap(), StockStatus::Expiring);
    let undated = lot(item, 1, None);
    assert!(book.status(&undated, today()).is_err());
  }

  // ── Classification ────────────────────────────────────────────────────────

  #[test]
  fn expired_beats_plentiful_stock() {
    let item = Uuid::new_v4();
    let stock = lot(item, 1000, Some(days(-1)));
    assert_eq!(classify(&stock, 1, Some(1000), today()), StockStatus::Expired);
  }

  #[test]
  fn expiring_window_is_half_open() {
    let item = Uuid::new_v4();
    for offset in 0..3 {
      let stock = lot(item, 50, Some(days(offset)));
      assert_eq!(
        classify(&stock, 1, Some(50), today()),
        StockStatus::Expiring,
        "offset {offset}"
      );
    }
    let boundary = lot(item, 50, Some(days(3)));
    assert_eq!(classify(&boundary, 1, Some(50), today()), StockStatus::Normal);
  }

  #[test]
  fn low_stock_needs_a_known_total() {
    let item = Uuid::new_v4();
    let stock = lot(item, 2, None);
    assert_eq!(classify(&stock, 3, Some(2), today()), StockStatus::LowStock);
    assert_eq!(classify(&stock, 3, Some(3), today()), StockStatus::LowStock);
    assert_eq!(classify(&stock, 3, Some(4), today()), StockStatus::Normal);
    assert_eq!(classify(&stock, 3, None, today()), StockStatus::Normal);
  }

  #[test]
  fn boundary_lot_is_normal_but_listed_by_three_day_scan() {
    let item = Uuid::new_v4();
    let boundary = lot(item, 10, Some(days(3)));
    let book = ledger(vec![boundary.clone()], &[(item, 1)]);

    assert_eq!(book.status(&boundary, today()).unwrap(), StockStatus::Normal);
    assert_eq!(book.expiring(today(), DEFAULT_DAYS_AHEAD), vec![boundary]);
  }

  // ── Scanning ──────────────────────────────────────────────────────────────

  #[test]
  fn low_stock_includes_item_under_threshold_only() {
    let low = Uuid::new_v4();
    let fine = Uuid::new_v4();
    let low_lot = lot(low, 2, None);
    let book = ledger(
      vec![low_lot.clone(), lot(fine, 5, None)],
      &[(low, 3), (fine, 2)],
    );
    assert_eq!(book.low_stock_alerts().unwrap(), vec![low_lot]);
  }

  #[test]
  fn low_stock_yields_one_row_per_lot() {
    let item = Uuid::new_v4();
    let a = lot(item, 1, None);
    let b = lot(item, 1, Some(days(20)));
    let book = ledger(vec![a.clone(), b.clone()], &[(item, 3)]);

    assert_eq!(book.low_stock_alerts().unwrap(), vec![a.clone(), b.clone()]);
    assert_eq!(book.low_stock_alerts_for_item(item).unwrap(), vec![a, b]);
  }

  #[test]
  fn empty_lots_never_alert() {
    let item = Uuid::new_v4();
    let book = ledger(
      vec![
        lot(item, 0, Some(days(-5))),
        lot(item, -1, Some(days(1))),
      ],
      &[(item, 10)],
    );
    assert!(book.low_stock_alerts().unwrap().is_empty());
    assert!(book.low_stock_alerts_for_item(item).unwrap().is_empty());
    assert!(book.expiring(today(), 30).is_empty());
    assert!(book.expired(today()).is_empty());
  }

  #[test]
  fn zero_lot_does_not_count_toward_low_stock_rows() {
    let item = Uuid::new_v4();
    let on_hand = lot(item, 2, None);
    let book = ledger(vec![on_hand.clone(), lot(item, 0, None)], &[(item, 3)]);
    assert_eq!(book.low_stock_alerts().unwrap(), vec![on_hand]);
  }

  #[test]
  fn unknown_item_yields_empty_alerts() {
    let book = ledger(vec![], &[]);
    assert!(book.low_stock_alerts_for_item(Uuid::new_v4()).unwrap().is_empty());
  }

  #[test]
  fn expiring_scan_is_inclusive_and_includes_expired() {
    let item = Uuid::new_v4();
    let past = lot(item, 1, Some(days(-2)));
    let soon = lot(item, 1, Some(days(5)));
    let later = lot(item, 1, Some(days(6)));
    let never = lot(item, 1, None);
    let book = ledger(vec![past.clone(), soon.clone(), later, never], &[]);

    assert_eq!(book.expiring(today(), 5), vec![past.clone(), soon]);
    assert_eq!(book.expired(today()), vec![past]);
  }

  #[test]
  fn expired_excludes_today() {
    let item = Uuid::new_v4();
    let book = ledger(vec![lot(item, 1, Some(today()))], &[]);
    assert!(book.expired(today()).is_empty());
  }

  #[test]
  fn scans_are_idempotent() {
    let item = Uuid::new_v4();
    let book = ledger(
      vec![lot(item, 1, Some(days(1))), lot(item, 1, Some(days(-1)))],
      &[(item, 5)],
    );
    assert_eq!(book.low_stock_alerts().unwrap(), book.low_stock_alerts().unwrap());
    assert_eq!(book.expiring(today(), 3), book.expiring(today(), 3));
    assert_eq!(book.expired(today()), book.expired(today()));
  }
}
