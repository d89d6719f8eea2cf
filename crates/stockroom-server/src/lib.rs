//! HTTP server assembly for Stockroom.
//!
//! Nests the JSON API from [`stockroom_api`] under `/api` and wraps it in a
//! request tracing layer. The binary in `main.rs` supplies configuration and
//! the SQLite store.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use stockroom_core::{clock::Clock, store::InventoryStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STOCKROOM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn app<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Router
where
  S: InventoryStore + 'static,
{
  Router::new()
    .nest("/api", stockroom_api::api_router(store, clock))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::NaiveDate;
  use serde_json::{Value, json};
  use stockroom_core::{
    catalog::{NewItem, NewStore},
    clock::FixedClock,
    stock::NewStock,
  };
  use stockroom_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

  struct Harness {
    store: Arc<SqliteStore>,
    clock: Arc<dyn Clock>,
  }

  impl Harness {
    async fn new() -> Self {
      let store = SqliteStore::open_in_memory().await.unwrap();
      Self {
        store: Arc::new(store),
        clock: Arc::new(FixedClock(today())),
      }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
      let mut builder = Request::builder().method(method).uri(uri);
      let body = match body {
        Some(json) => {
          builder = builder.header(header::CONTENT_TYPE, "application/json");
          Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
      };
      let req = builder.body(body).unwrap();
      app(self.store.clone(), self.clock.clone())
        .oneshot(req)
        .await
        .unwrap()
    }

    async fn get(&self, uri: &str) -> Response { self.send("GET", uri, None).await }
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Not found ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_records_are_404() {
    let h = Harness::new().await;
    let id = Uuid::new_v4();

    for uri in [
      format!("/api/items/{id}"),
      format!("/api/stocks/{id}"),
      format!("/api/stocks/{id}/status"),
      format!("/api/categories/{id}"),
      format!("/api/purchases/{id}"),
    ] {
      let resp = h.get(&uri).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let resp = h.get("/api/stores/name/Nowhere").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Nowhere"));
  }

  #[tokio::test]
  async fn deleting_missing_rows_is_404() {
    let h = Harness::new().await;
    let id = Uuid::new_v4();
    let resp = h.send("DELETE", &format!("/api/stores/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = h.send("DELETE", &format!("/api/items/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Catalogue ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn category_create_and_lookup() {
    let h = Harness::new().await;

    let resp = h
      .send("POST", "/api/categories", Some(json!({ "name": "Dairy" })))
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;

    let resp = h.get("/api/categories/name/Dairy").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["category_id"], created["category_id"]);

    assert_eq!(json_body(h.get("/api/categories/exists/Dairy").await).await, json!(true));
    assert_eq!(json_body(h.get("/api/categories/exists/Bakery").await).await, json!(false));

    let found = json_body(h.get("/api/categories/search?keyword=dai").await).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn invalid_input_is_400() {
    let h = Harness::new().await;

    let resp = h
      .send("POST", "/api/items", Some(json!({ "name": "Rice", "threshold": -1 })))
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = h
      .send("POST", "/api/stores", Some(json!({ "name": "Market" })))
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = h
      .send("POST", "/api/stores", Some(json!({ "name": "Market" })))
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = h
      .send(
        "POST",
        "/api/stocks",
        Some(json!({ "item_id": Uuid::new_v4(), "quantity": 1 })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn reversed_period_and_overflowing_stock_are_400() {
    let h = Harness::new().await;

    let resp = h
      .get("/api/purchases/period?start=2024-06-30T00:00:00Z&end=2024-06-01T00:00:00Z")
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("after"));

    let milk = h.store.add_item(NewItem::new("Milk", 1)).await.unwrap();
    h.store
      .add_stock(NewStock::new(milk.item_id, i64::MAX))
      .await
      .unwrap();
    let resp = h
      .send(
        "POST",
        "/api/stocks",
        Some(json!({ "item_id": milk.item_id, "quantity": 1 })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let total = h
      .get(&format!("/api/stocks/item/{}/total-quantity", milk.item_id))
      .await;
    assert_eq!(json_body(total).await, json!(i64::MAX));
  }

  #[tokio::test]
  async fn category_in_use_is_400() {
    let h = Harness::new().await;
    let created = json_body(
      h.send("POST", "/api/categories", Some(json!({ "name": "Dairy" })))
        .await,
    )
    .await;
    let category_id = created["category_id"].as_str().unwrap().to_owned();
    let resp = h
      .send(
        "POST",
        "/api/items",
        Some(json!({ "name": "Milk", "threshold": 1, "category_id": category_id })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = h
      .send("DELETE", &format!("/api/categories/{category_id}"), None)
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn deleting_store_detaches_items() {
    let h = Harness::new().await;
    let shop = h.store.add_store(NewStore::new("Corner shop")).await.unwrap();
    let mut bread = NewItem::new("Bread", 1);
    bread.store_id = Some(shop.store_id);
    let bread = h.store.add_item(bread).await.unwrap();

    let resp = h
      .send("DELETE", &format!("/api/stores/{}", shop.store_id), None)
      .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let item = json_body(h.get(&format!("/api/items/{}", bread.item_id)).await).await;
    assert_eq!(item["store_id"], Value::Null);
    let orphans = json_body(h.get("/api/items/store/none").await).await;
    assert_eq!(orphans.as_array().unwrap().len(), 1);
  }

  // ── Stock ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn total_quantity_is_null_without_stock() {
    let h = Harness::new().await;
    let item = h.store.add_item(NewItem::new("Rice", 2)).await.unwrap();
    let uri = format!("/api/stocks/item/{}/total-quantity", item.item_id);

    let resp = h.get(&uri).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, Value::Null);

    h.store.add_stock(NewStock::new(item.item_id, 4)).await.unwrap();
    assert_eq!(json_body(h.get(&uri).await).await, json!(4));
  }

  #[tokio::test]
  async fn stock_status_is_a_screaming_string() {
    let h = Harness::new().await;
    let item = h.store.add_item(NewItem::new("Milk", 1)).await.unwrap();
    let soon = today().succ_opt().unwrap();
    let lot = h
      .store
      .add_stock(NewStock::new(item.item_id, 10).expiring(soon))
      .await
      .unwrap();

    let resp = h.get(&format!("/api/stocks/{}/status", lot.stock_id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!("EXPIRING"));
  }

  #[tokio::test]
  async fn expiring_alerts_validate_days_ahead() {
    let h = Harness::new().await;
    let item = h.store.add_item(NewItem::new("Milk", 1)).await.unwrap();
    let in_five_days = today() + chrono::Duration::days(5);
    h.store
      .add_stock(NewStock::new(item.item_id, 1).expiring(in_five_days))
      .await
      .unwrap();

    let resp = h.get("/api/stocks/alerts/expiring?days_ahead=-1").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let default_window = json_body(h.get("/api/stocks/alerts/expiring").await).await;
    assert!(default_window.as_array().unwrap().is_empty());

    let wide = json_body(h.get("/api/stocks/alerts/expiring?daysAhead=5").await).await;
    assert_eq!(wide.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn low_stock_alerts_list_each_lot() {
    let h = Harness::new().await;
    let soy = h.store.add_item(NewItem::new("Soy sauce", 3)).await.unwrap();
    h.store.add_stock(NewStock::new(soy.item_id, 1)).await.unwrap();
    h.store.add_stock(NewStock::new(soy.item_id, 1)).await.unwrap();

    let all = json_body(h.get("/api/stocks/alerts/low-stock").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let unknown = json_body(
      h.get(&format!("/api/stocks/alerts/low-stock/{}", Uuid::new_v4()))
        .await,
    )
    .await;
    assert!(unknown.as_array().unwrap().is_empty());
  }
}
