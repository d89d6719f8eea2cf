//! SQL schema for the Stockroom SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! No foreign key cascades: the store clears or deletes dependent rows
//! explicitly so each cascade is visible in `store.rs`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stores (
    store_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    location    TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    item_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    price       INTEGER NOT NULL DEFAULT 0,
    note        TEXT,
    threshold   INTEGER NOT NULL CHECK (threshold >= 0),
    has_expiry  INTEGER NOT NULL DEFAULT 0,
    category_id TEXT REFERENCES categories(category_id),
    store_id    TEXT REFERENCES stores(store_id),   -- cleared before a store is deleted
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- One row per lot; an item may hold many lots with different expiry dates.
CREATE TABLE IF NOT EXISTS stocks (
    stock_id    TEXT PRIMARY KEY,
    item_id     TEXT NOT NULL REFERENCES items(item_id),
    quantity    INTEGER NOT NULL,
    expiry_date TEXT,                               -- YYYY-MM-DD or NULL
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS purchase_histories (
    purchase_id  TEXT PRIMARY KEY,
    item_id      TEXT NOT NULL REFERENCES items(item_id),
    store_id     TEXT REFERENCES stores(store_id),
    quantity     INTEGER NOT NULL,
    total_price  INTEGER,
    expiry_date  TEXT,
    purchased_at TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS items_category_idx     ON items(category_id);
CREATE INDEX IF NOT EXISTS items_store_idx        ON items(store_id);
CREATE INDEX IF NOT EXISTS stocks_item_idx        ON stocks(item_id);
CREATE INDEX IF NOT EXISTS purchases_item_idx     ON purchase_histories(item_id);
CREATE INDEX IF NOT EXISTS purchases_store_idx    ON purchase_histories(store_id);
CREATE INDEX IF NOT EXISTS purchases_purchased_idx ON purchase_histories(purchased_at);

PRAGMA user_version = 1;
";
