//! [`SqliteStore`]: the SQLite implementation of [`InventoryStore`].

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, Params, Transaction, params};
use uuid::Uuid;

use stockroom_core::{
  Entity,
  alert::{self, StockLedger},
  catalog::{Category, Item, NewCategory, NewItem, NewStore, Store},
  purchase::{NewPurchase, PurchaseHistory},
  stock::{NewStock, Stock},
  store::InventoryStore,
};

use crate::{
  Error, Result,
  encode::{
    RawCategory, RawItem, RawPurchase, RawRow, RawStock, RawStore, decode_uuid,
    encode_date, encode_dt, encode_uuid, like_pattern, now, stored_precision,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An inventory store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` inside one transaction on the connection thread.
  ///
  /// The transaction commits only if `op` succeeds; on error it is dropped,
  /// which rolls back every statement `op` executed.
  async fn run<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = op(&tx);
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?
  }

  /// Execute raw SQL against the connection. Tests use this to install
  /// triggers that simulate backend failures.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helpers ───────────────────────────────────────────────────────────

fn select_all<R: RawRow>(
  conn: &Connection,
  clause: &str,
  params: impl Params,
) -> Result<Vec<R::Domain>> {
  let sql = format!("SELECT {} FROM {} {clause}", R::COLUMNS, R::TABLE);
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params, R::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(R::decode).collect()
}

fn select_one<R: RawRow>(
  conn: &Connection,
  clause: &str,
  params: impl Params,
) -> Result<Option<R::Domain>> {
  let sql = format!("SELECT {} FROM {} {clause}", R::COLUMNS, R::TABLE);
  conn
    .query_row(&sql, params, R::from_row)
    .optional()?
    .map(R::decode)
    .transpose()
}

fn table_of(entity: Entity) -> (&'static str, &'static str) {
  match entity {
    Entity::Category => ("categories", "category_id"),
    Entity::Store => ("stores", "store_id"),
    Entity::Item => ("items", "item_id"),
    Entity::Stock => ("stocks", "stock_id"),
    Entity::Purchase => ("purchase_histories", "purchase_id"),
  }
}

fn exists(conn: &Connection, entity: Entity, id: Uuid) -> Result<bool> {
  let (table, key) = table_of(entity);
  let sql = format!("SELECT 1 FROM {table} WHERE {key} = ?1");
  Ok(
    conn
      .query_row(&sql, params![encode_uuid(id)], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Fail with [`Error::MissingReference`] if `id` is set but has no row.
fn require(conn: &Connection, entity: Entity, id: Option<Uuid>) -> Result<()> {
  match id {
    Some(id) if !exists(conn, entity, id)? => {
      Err(Error::MissingReference { entity, id })
    }
    _ => Ok(()),
  }
}

/// Fail with [`Error::DuplicateName`] if another row (not `except`) already
/// uses `name`.
fn ensure_name_free(
  conn: &Connection,
  entity: Entity,
  name: &str,
  except: Option<Uuid>,
) -> Result<()> {
  let (table, key) = table_of(entity);
  let sql = format!("SELECT 1 FROM {table} WHERE name = ?1 AND {key} IS NOT ?2");
  let taken = conn
    .query_row(&sql, params![name, except.map(encode_uuid)], |_| Ok(()))
    .optional()?
    .is_some();
  if taken {
    return Err(Error::DuplicateName { entity, name: name.to_owned() });
  }
  Ok(())
}

/// Clear the store reference on every item pointing at `store_id`.
fn detach_store_from_items(conn: &Connection, store_id: Uuid) -> Result<usize> {
  Ok(conn.execute(
    "UPDATE items SET store_id = NULL WHERE store_id = ?1",
    params![encode_uuid(store_id)],
  )?)
}

/// Sum of the positive lot quantities of `item_id`, `None` without any.
///
/// Summed in Rust so an out-of-range total fails the same way as in
/// [`StockLedger`].
fn positive_total(conn: &Connection, item_id: Uuid) -> Result<Option<i64>> {
  let mut stmt =
    conn.prepare("SELECT quantity FROM stocks WHERE item_id = ?1 AND quantity > 0")?;
  let quantities = stmt
    .query_map(params![encode_uuid(item_id)], |r| r.get::<_, i64>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  let mut total = None;
  for quantity in quantities {
    total = Some(alert::accumulate(total, quantity, item_id)?);
  }
  Ok(total)
}

/// Lots and thresholds of every item, or of one item when `item_id` is set.
fn read_ledger(conn: &Connection, item_id: Option<Uuid>) -> Result<StockLedger> {
  let key = item_id.map(encode_uuid);
  let lots = select_all::<RawStock>(
    conn,
    "WHERE ?1 IS NULL OR item_id = ?1 ORDER BY rowid",
    params![key],
  )?;

  let mut stmt = conn.prepare(
    "SELECT item_id, threshold FROM items WHERE ?1 IS NULL OR item_id = ?1",
  )?;
  let rows = stmt
    .query_map(params![key], |r| {
      Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  let thresholds = rows
    .into_iter()
    .map(|(id, threshold)| Ok((decode_uuid(&id)?, threshold)))
    .collect::<Result<HashMap<_, _>>>()?;

  Ok(StockLedger::new(lots, thresholds))
}

fn build_item(
  item_id: Uuid,
  input: NewItem,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
) -> Item {
  Item {
    item_id,
    name: input.name,
    price: input.price,
    note: input.note,
    threshold: input.threshold,
    has_expiry: input.has_expiry,
    category_id: input.category_id,
    store_id: input.store_id,
    created_at,
    updated_at,
  }
}

fn build_purchase(
  purchase_id: Uuid,
  input: NewPurchase,
  purchased_at: DateTime<Utc>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
) -> PurchaseHistory {
  PurchaseHistory {
    purchase_id,
    item_id: input.item_id,
    store_id: input.store_id,
    quantity: input.quantity,
    total_price: input.total_price,
    expiry_date: input.expiry_date,
    purchased_at,
    created_at,
    updated_at,
  }
}

// ─── InventoryStore impl ─────────────────────────────────────────────────────

impl InventoryStore for SqliteStore {
  type Error = Error;

  // ── Categories ────────────────────────────────────────────────────────────

  async fn add_category(&self, input: NewCategory) -> Result<Category> {
    input.validate()?;
    let category = Category {
      category_id: Uuid::new_v4(),
      name:        input.name,
      created_at:  now(),
    };

    let row = category.clone();
    self
      .run(move |tx| {
        ensure_name_free(tx, Entity::Category, &row.name, None)?;
        tx.execute(
          "INSERT INTO categories (category_id, name, created_at) VALUES (?1, ?2, ?3)",
          params![encode_uuid(row.category_id), row.name, encode_dt(row.created_at)],
        )?;
        Ok(())
      })
      .await?;

    Ok(category)
  }

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    self
      .run(move |tx| {
        select_one::<RawCategory>(tx, "WHERE category_id = ?1", params![encode_uuid(id)])
      })
      .await
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    self
      .run(|tx| select_all::<RawCategory>(tx, "ORDER BY rowid", []))
      .await
  }

  async fn update_category(
    &self,
    id:    Uuid,
    input: NewCategory,
  ) -> Result<Option<Category>> {
    input.validate()?;
    self
      .run(move |tx| {
        let key = encode_uuid(id);
        let Some(existing) =
          select_one::<RawCategory>(tx, "WHERE category_id = ?1", params![key])?
        else {
          return Ok(None);
        };
        ensure_name_free(tx, Entity::Category, &input.name, Some(id))?;
        tx.execute(
          "UPDATE categories SET name = ?2 WHERE category_id = ?1",
          params![key, input.name],
        )?;
        Ok(Some(Category { name: input.name, ..existing }))
      })
      .await
  }

  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    self
      .run(move |tx| {
        let key = encode_uuid(id);
        let items: i64 = tx.query_row(
          "SELECT COUNT(*) FROM items WHERE category_id = ?1",
          params![key],
          |r| r.get(0),
        )?;
        if items > 0 {
          return Err(Error::CategoryInUse { id, items: items as u64 });
        }
        Ok(tx.execute("DELETE FROM categories WHERE category_id = ?1", params![key])? > 0)
      })
      .await
  }

  async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
    let name = name.to_owned();
    self
      .run(move |tx| select_one::<RawCategory>(tx, "WHERE name = ?1", params![name]))
      .await
  }

  async fn search_categories(&self, keyword: &str) -> Result<Vec<Category>> {
    let pattern = like_pattern(keyword);
    self
      .run(move |tx| {
        select_all::<RawCategory>(
          tx,
          "WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name",
          params![pattern],
        )
      })
      .await
  }

  // ── Stores ────────────────────────────────────────────────────────────────

  async fn add_store(&self, input: NewStore) -> Result<Store> {
    input.validate()?;
    let store = Store {
      store_id:   Uuid::new_v4(),
      name:       input.name,
      location:   input.location,
      created_at: now(),
    };

    let row = store.clone();
    self
      .run(move |tx| {
        ensure_name_free(tx, Entity::Store, &row.name, None)?;
        tx.execute(
          "INSERT INTO stores (store_id, name, location, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![
            encode_uuid(row.store_id),
            row.name,
            row.location,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(store)
  }

  async fn get_store(&self, id: Uuid) -> Result<Option<Store>> {
    self
      .run(move |tx| {
        select_one::<RawStore>(tx, "WHERE store_id = ?1", params![encode_uuid(id)])
      })
      .await
  }

  async fn list_stores(&self) -> Result<Vec<Store>> {
    self
      .run(|tx| select_all::<RawStore>(tx, "ORDER BY rowid", []))
      .await
  }

  async fn update_store(&self, id: Uuid, input: NewStore) -> Result<Option<Store>> {
    input.validate()?;
    self
      .run(move |tx| {
        let key = encode_uuid(id);
        let Some(existing) =
          select_one::<RawStore>(tx, "WHERE store_id = ?1", params![key])?
        else {
          return Ok(None);
        };
        ensure_name_free(tx, Entity::Store, &input.name, Some(id))?;
        tx.execute(
          "UPDATE stores SET name = ?2, location = ?3 WHERE store_id = ?1",
          params![key, input.name, input.location],
        )?;
        Ok(Some(Store {
          name: input.name,
          location: input.location,
          ..existing
        }))
      })
      .await
  }

  async fn delete_store(&self, id: Uuid) -> Result<Option<u64>> {
    let detached = self
      .run(move |tx| {
        if !exists(tx, Entity::Store, id)? {
          return Ok(None);
        }
        let items = detach_store_from_items(tx, id)?;
        let key = encode_uuid(id);
        tx.execute(
          "UPDATE purchase_histories SET store_id = NULL WHERE store_id = ?1",
          params![key],
        )?;
        tx.execute("DELETE FROM stores WHERE store_id = ?1", params![key])?;
        Ok(Some(items as u64))
      })
      .await?;

    if let Some(items) = detached {
      tracing::info!(store_id = %id, items, "deleted store and detached its items");
    }
    Ok(detached)
  }

  async fn find_store_by_name(&self, name: &str) -> Result<Option<Store>> {
    let name = name.to_owned();
    self
      .run(move |tx| select_one::<RawStore>(tx, "WHERE name = ?1", params![name]))
      .await
  }

  async fn search_stores(&self, keyword: &str) -> Result<Vec<Store>> {
    let pattern = like_pattern(keyword);
    self
      .run(move |tx| {
        select_all::<RawStore>(
          tx,
          "WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name",
          params![pattern],
        )
      })
      .await
  }

  async fn search_stores_by_location(&self, keyword: &str) -> Result<Vec<Store>> {
    let pattern = like_pattern(keyword);
    self
      .run(move |tx| {
        select_all::<RawStore>(
          tx,
          "WHERE location LIKE ?1 ESCAPE '\\' ORDER BY name",
          params![pattern],
        )
      })
      .await
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn add_item(&self, input: NewItem) -> Result<Item> {
    input.validate()?;
    let at = now();
    let item = build_item(Uuid::new_v4(), input, at, at);

    let row = item.clone();
    self
      .run(move |tx| {
        require(tx, Entity::Category, row.category_id)?;
        require(tx, Entity::Store, row.store_id)?;
        tx.execute(
          "INSERT INTO items (
             item_id, name, price, note, threshold, has_expiry,
             category_id, store_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          params![
            encode_uuid(row.item_id),
            row.name,
            row.price,
            row.note,
            row.threshold,
            row.has_expiry,
            row.category_id.map(encode_uuid),
            row.store_id.map(encode_uuid),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
    self
      .run(move |tx| {
        select_one::<RawItem>(tx, "WHERE item_id = ?1", params![encode_uuid(id)])
      })
      .await
  }

  async fn list_items(&self) -> Result<Vec<Item>> {
    self
      .run(|tx| select_all::<RawItem>(tx, "ORDER BY rowid", []))
      .await
  }

  async fn update_item(&self, id: Uuid, input: NewItem) -> Result<Option<Item>> {
    input.validate()?;
    self
      .run(move |tx| {
        let key = encode_uuid(id);
        let Some(existing) =
          select_one::<RawItem>(tx, "WHERE item_id = ?1", params![key])?
        else {
          return Ok(None);
        };
        let item = build_item(id, input, existing.created_at, now());
        require(tx, Entity::Category, item.category_id)?;
        require(tx, Entity::Store, item.store_id)?;
        tx.execute(
          "UPDATE items SET
             name = ?2, price = ?3, note = ?4, threshold = ?5, has_expiry = ?6,
             category_id = ?7, store_id = ?8, updated_at = ?9
           WHERE item_id = ?1",
          params![
            key,
            item.name,
            item.price,
            item.note,
            item.threshold,
            item.has_expiry,
            item.category_id.map(encode_uuid),
            item.store_id.map(encode_uuid),
            encode_dt(item.updated_at),
          ],
        )?;
        Ok(Some(item))
      })
      .await
  }

  async fn delete_item(&self, id: Uuid) -> Result<bool> {
    // Stock lots and purchase records belong to the item and go with it.
    let removed = self
      .run(move |tx| {
        let key = encode_uuid(id);
        let stocks =
          tx.execute("DELETE FROM stocks WHERE item_id = ?1", params![key])?;
        let purchases = tx.execute(
          "DELETE FROM purchase_histories WHERE item_id = ?1",
          params![key],
        )?;
        let deleted =
          tx.execute("DELETE FROM items WHERE item_id = ?1", params![key])? > 0;
        Ok(deleted.then_some((stocks, purchases)))
      })
      .await?;

    if let Some((stocks, purchases)) = removed {
      tracing::info!(item_id = %id, stocks, purchases, "deleted item with its stock and purchases");
    }
    Ok(removed.is_some())
  }

  async fn list_items_by_category(&self, category_id: Uuid) -> Result<Vec<Item>> {
    self
      .run(move |tx| {
        select_all::<RawItem>(
          tx,
          "WHERE category_id = ?1 ORDER BY rowid",
          params![encode_uuid(category_id)],
        )
      })
      .await
  }

  async fn list_items_by_store(&self, store_id: Uuid) -> Result<Vec<Item>> {
    self
      .run(move |tx| {
        select_all::<RawItem>(
          tx,
          "WHERE store_id = ?1 ORDER BY rowid",
          params![encode_uuid(store_id)],
        )
      })
      .await
  }

  async fn list_items_without_store(&self) -> Result<Vec<Item>> {
    self
      .run(|tx| select_all::<RawItem>(tx, "WHERE store_id IS NULL ORDER BY rowid", []))
      .await
  }

  async fn search_items(&self, keyword: &str) -> Result<Vec<Item>> {
    let pattern = like_pattern(keyword);
    self
      .run(move |tx| {
        select_all::<RawItem>(
          tx,
          "WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name",
          params![pattern],
        )
      })
      .await
  }

  async fn list_items_by_expiry_flag(&self, has_expiry: bool) -> Result<Vec<Item>> {
    self
      .run(move |tx| {
        select_all::<RawItem>(
          tx,
          "WHERE has_expiry = ?1 ORDER BY rowid",
          params![has_expiry],
        )
      })
      .await
  }

  async fn list_items_by_threshold_less_than(
    &self,
    threshold: i64,
  ) -> Result<Vec<Item>> {
    self
      .run(move |tx| {
        select_all::<RawItem>(
          tx,
          "WHERE threshold < ?1 ORDER BY rowid",
          params![threshold],
        )
      })
      .await
  }

  async fn set_store_null_for_items_with_store(&self, store_id: Uuid) -> Result<u64> {
    let items = self
      .run(move |tx| detach_store_from_items(tx, store_id))
      .await?;
    Ok(items as u64)
  }

  // ── Stock ─────────────────────────────────────────────────────────────────

  async fn add_stock(&self, input: NewStock) -> Result<Stock> {
    let at = now();
    let stock = Stock {
      stock_id:    Uuid::new_v4(),
      item_id:     input.item_id,
      quantity:    input.quantity,
      expiry_date: input.expiry_date,
      created_at:  at,
      updated_at:  at,
    };

    let row = stock.clone();
    self
      .run(move |tx| {
        require(tx, Entity::Item, Some(row.item_id))?;
        tx.execute(
          "INSERT INTO stocks (
             stock_id, item_id, quantity, expiry_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            encode_uuid(row.stock_id),
            encode_uuid(row.item_id),
            row.quantity,
            row.expiry_date.map(encode_date),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        positive_total(tx, row.item_id)?;
        Ok(())
      })
      .await?;

    Ok(stock)
  }

  async fn get_stock(&self, id: Uuid) -> Result<Option<Stock>> {
    self
      .run(move |tx| {
        select_one::<RawStock>(tx, "WHERE stock_id = ?1", params![encode_uuid(id)])
      })
      .await
  }

  async fn list_stock(&self) -> Result<Vec<Stock>> {
    self
      .run(|tx| select_all::<RawStock>(tx, "ORDER BY rowid", []))
      .await
  }

  async fn update_stock(&self, id: Uuid, input: NewStock) -> Result<Option<Stock>> {
    self
      .run(move |tx| {
        let key = encode_uuid(id);
        let Some(existing) =
          select_one::<RawStock>(tx, "WHERE stock_id = ?1", params![key])?
        else {
          return Ok(None);
        };
        require(tx, Entity::Item, Some(input.item_id))?;
        let stock = Stock {
          stock_id:    id,
          item_id:     input.item_id,
          quantity:    input.quantity,
          expiry_date: input.expiry_date,
          created_at:  existing.created_at,
          updated_at:  now(),
        };
        tx.execute(
          "UPDATE stocks SET item_id = ?2, quantity = ?3, expiry_date = ?4, updated_at = ?5
           WHERE stock_id = ?1",
          params![
            key,
            encode_uuid(stock.item_id),
            stock.quantity,
            stock.expiry_date.map(encode_date),
            encode_dt(stock.updated_at),
          ],
        )?;
        positive_total(tx, stock.item_id)?;
        Ok(Some(stock))
      })
      .await
  }

  async fn delete_stock(&self, id: Uuid) -> Result<bool> {
    self
      .run(move |tx| {
        Ok(tx.execute("DELETE FROM stocks WHERE stock_id = ?1", params![encode_uuid(id)])? > 0)
      })
      .await
  }

  async fn list_stock_by_item(&self, item_id: Uuid) -> Result<Vec<Stock>> {
    self
      .run(move |tx| {
        select_all::<RawStock>(
          tx,
          "WHERE item_id = ?1 ORDER BY rowid",
          params![encode_uuid(item_id)],
        )
      })
      .await
  }

  async fn list_stock_by_item_ordered_by_expiry(
    &self,
    item_id:   Uuid,
    ascending: bool,
  ) -> Result<Vec<Stock>> {
    let direction = if ascending { "ASC" } else { "DESC" };
    self
      .run(move |tx| {
        select_all::<RawStock>(
          tx,
          &format!(
            "WHERE item_id = ?1
             ORDER BY expiry_date IS NULL, expiry_date {direction}, rowid"
          ),
          params![encode_uuid(item_id)],
        )
      })
      .await
  }

  async fn sum_positive_quantity_by_item(&self, item_id: Uuid) -> Result<Option<i64>> {
    self.run(move |tx| positive_total(tx, item_id)).await
  }

  async fn stock_ledger(&self, item_id: Option<Uuid>) -> Result<StockLedger> {
    self.run(move |tx| read_ledger(tx, item_id)).await
  }

  async fn stock_with_ledger(
    &self,
    stock_id: Uuid,
  ) -> Result<Option<(Stock, StockLedger)>> {
    self
      .run(move |tx| {
        let Some(stock) = select_one::<RawStock>(
          tx,
          "WHERE stock_id = ?1",
          params![encode_uuid(stock_id)],
        )?
        else {
          return Ok(None);
        };
        let ledger = read_ledger(tx, Some(stock.item_id))?;
        Ok(Some((stock, ledger)))
      })
      .await
  }

  // ── Purchase history ──────────────────────────────────────────────────────

  async fn add_purchase(&self, input: NewPurchase) -> Result<PurchaseHistory> {
    let at = now();
    let purchased_at = input.purchased_at.map(stored_precision).unwrap_or(at);
    let purchase = build_purchase(Uuid::new_v4(), input, purchased_at, at, at);

    let row = purchase.clone();
    self
      .run(move |tx| {
        require(tx, Entity::Item, Some(row.item_id))?;
        require(tx, Entity::Store, row.store_id)?;
        tx.execute(
          "INSERT INTO purchase_histories (
             purchase_id, item_id, store_id, quantity, total_price,
             expiry_date, purchased_at, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          params![
            encode_uuid(row.purchase_id),
            encode_uuid(row.item_id),
            row.store_id.map(encode_uuid),
            row.quantity,
            row.total_price,
            row.expiry_date.map(encode_date),
            encode_dt(row.purchased_at),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(purchase)
  }

  async fn get_purchase(&self, id: Uuid) -> Result<Option<PurchaseHistory>> {
    self
      .run(move |tx| {
        select_one::<RawPurchase>(tx, "WHERE purchase_id = ?1", params![encode_uuid(id)])
      })
      .await
  }

  async fn list_purchases(&self) -> Result<Vec<PurchaseHistory>> {
    self
      .run(|tx| select_all::<RawPurchase>(tx, "ORDER BY rowid", []))
      .await
  }

  async fn update_purchase(
    &self,
    id:    Uuid,
    input: NewPurchase,
  ) -> Result<Option<PurchaseHistory>> {
    self
      .run(move |tx| {
        let key = encode_uuid(id);
        let Some(existing) =
          select_one::<RawPurchase>(tx, "WHERE purchase_id = ?1", params![key])?
        else {
          return Ok(None);
        };
        let purchased_at = input
          .purchased_at
          .map(stored_precision)
          .unwrap_or(existing.purchased_at);
        let purchase =
          build_purchase(id, input, purchased_at, existing.created_at, now());
        require(tx, Entity::Item, Some(purchase.item_id))?;
        require(tx, Entity::Store, purchase.store_id)?;
        tx.execute(
          "UPDATE purchase_histories SET
             item_id = ?2, store_id = ?3, quantity = ?4, total_price = ?5,
             expiry_date = ?6, purchased_at = ?7, updated_at = ?8
           WHERE purchase_id = ?1",
          params![
            key,
            encode_uuid(purchase.item_id),
            purchase.store_id.map(encode_uuid),
            purchase.quantity,
            purchase.total_price,
            purchase.expiry_date.map(encode_date),
            encode_dt(purchase.purchased_at),
            encode_dt(purchase.updated_at),
          ],
        )?;
        Ok(Some(purchase))
      })
      .await
  }

  async fn delete_purchase(&self, id: Uuid) -> Result<bool> {
    self
      .run(move |tx| {
        Ok(
          tx.execute(
            "DELETE FROM purchase_histories WHERE purchase_id = ?1",
            params![encode_uuid(id)],
          )? > 0,
        )
      })
      .await
  }

  async fn list_purchases_by_item(&self, item_id: Uuid) -> Result<Vec<PurchaseHistory>> {
    self
      .run(move |tx| {
        select_all::<RawPurchase>(
          tx,
          "WHERE item_id = ?1 ORDER BY purchased_at DESC, rowid DESC",
          params![encode_uuid(item_id)],
        )
      })
      .await
  }

  async fn list_purchases_by_item_with_expiry(
    &self,
    item_id: Uuid,
  ) -> Result<Vec<PurchaseHistory>> {
    self
      .run(move |tx| {
        select_all::<RawPurchase>(
          tx,
          "WHERE item_id = ?1 AND expiry_date IS NOT NULL
           ORDER BY expiry_date ASC, rowid",
          params![encode_uuid(item_id)],
        )
      })
      .await
  }

  async fn list_purchases_between(
    &self,
    start: DateTime<Utc>,
    end:   DateTime<Utc>,
  ) -> Result<Vec<PurchaseHistory>> {
    if start > end {
      return Err(
        stockroom_core::Error::validation(format!(
          "start {start} is after end {end}"
        ))
        .into(),
      );
    }
    let (start, end) = (encode_dt(start), encode_dt(end));
    self
      .run(move |tx| {
        select_all::<RawPurchase>(
          tx,
          "WHERE purchased_at >= ?1 AND purchased_at <= ?2
           ORDER BY purchased_at, rowid",
          params![start, end],
        )
      })
      .await
  }

  async fn list_purchases_expiring_before(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<PurchaseHistory>> {
    let date = encode_date(date);
    self
      .run(move |tx| {
        select_all::<RawPurchase>(
          tx,
          "WHERE expiry_date IS NOT NULL AND expiry_date < ?1
           ORDER BY expiry_date, rowid",
          params![date],
        )
      })
      .await
  }
}
