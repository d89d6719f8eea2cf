//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width so
//! that text ordering matches time ordering. Calendar dates are `YYYY-MM-DD`.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::Row;
use stockroom_core::{
  catalog::{Category, Item, Store},
  purchase::PurchaseHistory,
  stock::Stock,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store persists.
pub fn now() -> DateTime<Utc> { stored_precision(Utc::now()) }

/// Drop sub-microsecond digits so a value survives a round trip unchanged.
pub fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.trunc_subsecs(6)
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build a `%keyword%` pattern for `LIKE ... ESCAPE '\'`, escaping the
/// wildcard characters in `keyword`.
pub fn like_pattern(keyword: &str) -> String {
  let mut out = String::with_capacity(keyword.len() + 2);
  out.push('%');
  for c in keyword.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A row read as raw column values, decoded into a domain type afterwards.
pub trait RawRow: Sized {
  const TABLE: &'static str;
  /// Column list, in the order [`RawRow::from_row`] reads them.
  const COLUMNS: &'static str;
  type Domain;

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
  fn decode(self) -> Result<Self::Domain>;
}

pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
  pub created_at:  String,
}

impl RawRow for RawCategory {
  const TABLE: &'static str = "categories";
  const COLUMNS: &'static str = "category_id, name, created_at";
  type Domain = Category;

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      category_id: row.get(0)?,
      name:        row.get(1)?,
      created_at:  row.get(2)?,
    })
  }

  fn decode(self) -> Result<Category> {
    Ok(Category {
      category_id: decode_uuid(&self.category_id)?,
      name:        self.name,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawStore {
  pub store_id:   String,
  pub name:       String,
  pub location:   Option<String>,
  pub created_at: String,
}

impl RawRow for RawStore {
  const TABLE: &'static str = "stores";
  const COLUMNS: &'static str = "store_id, name, location, created_at";
  type Domain = Store;

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      store_id:   row.get(0)?,
      name:       row.get(1)?,
      location:   row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  fn decode(self) -> Result<Store> {
    Ok(Store {
      store_id:   decode_uuid(&self.store_id)?,
      name:       self.name,
      location:   self.location,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawItem {
  pub item_id:     String,
  pub name:        String,
  pub price:       i64,
  pub note:        Option<String>,
  pub threshold:   i64,
  pub has_expiry:  bool,
  pub category_id: Option<String>,
  pub store_id:    Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawRow for RawItem {
  const TABLE: &'static str = "items";
  const COLUMNS: &'static str = "item_id, name, price, note, threshold, \
                                 has_expiry, category_id, store_id, \
                                 created_at, updated_at";
  type Domain = Item;

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:     row.get(0)?,
      name:        row.get(1)?,
      price:       row.get(2)?,
      note:        row.get(3)?,
      threshold:   row.get(4)?,
      has_expiry:  row.get(5)?,
      category_id: row.get(6)?,
      store_id:    row.get(7)?,
      created_at:  row.get(8)?,
      updated_at:  row.get(9)?,
    })
  }

  fn decode(self) -> Result<Item> {
    Ok(Item {
      item_id:     decode_uuid(&self.item_id)?,
      name:        self.name,
      price:       self.price,
      note:        self.note,
      threshold:   self.threshold,
      has_expiry:  self.has_expiry,
      category_id: decode_opt_uuid(self.category_id)?,
      store_id:    decode_opt_uuid(self.store_id)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawStock {
  pub stock_id:    String,
  pub item_id:     String,
  pub quantity:    i64,
  pub expiry_date: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawRow for RawStock {
  const TABLE: &'static str = "stocks";
  const COLUMNS: &'static str =
    "stock_id, item_id, quantity, expiry_date, created_at, updated_at";
  type Domain = Stock;

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      stock_id:    row.get(0)?,
      item_id:     row.get(1)?,
      quantity:    row.get(2)?,
      expiry_date: row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  fn decode(self) -> Result<Stock> {
    Ok(Stock {
      stock_id:    decode_uuid(&self.stock_id)?,
      item_id:     decode_uuid(&self.item_id)?,
      quantity:    self.quantity,
      expiry_date: decode_opt_date(self.expiry_date)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawPurchase {
  pub purchase_id:  String,
  pub item_id:      String,
  pub store_id:     Option<String>,
  pub quantity:     i64,
  pub total_price:  Option<i64>,
  pub expiry_date:  Option<String>,
  pub purchased_at: String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawRow for RawPurchase {
  const TABLE: &'static str = "purchase_histories";
  const COLUMNS: &'static str = "purchase_id, item_id, store_id, quantity, \
                                 total_price, expiry_date, purchased_at, \
                                 created_at, updated_at";
  type Domain = PurchaseHistory;

  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      purchase_id:  row.get(0)?,
      item_id:      row.get(1)?,
      store_id:     row.get(2)?,
      quantity:     row.get(3)?,
      total_price:  row.get(4)?,
      expiry_date:  row.get(5)?,
      purchased_at: row.get(6)?,
      created_at:   row.get(7)?,
      updated_at:   row.get(8)?,
    })
  }

  fn decode(self) -> Result<PurchaseHistory> {
    Ok(PurchaseHistory {
      purchase_id:  decode_uuid(&self.purchase_id)?,
      item_id:      decode_uuid(&self.item_id)?,
      store_id:     decode_opt_uuid(self.store_id)?,
      quantity:     self.quantity,
      total_price:  self.total_price,
      expiry_date:  decode_opt_date(self.expiry_date)?,
      purchased_at: decode_dt(&self.purchased_at)?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("soy"), "%soy%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
  }

  #[test]
  fn timestamps_keep_text_order() {
    let early = decode_dt("2024-06-15T10:00:00Z").unwrap();
    let late = decode_dt("2024-06-15T10:00:00.5Z").unwrap();
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }
}
