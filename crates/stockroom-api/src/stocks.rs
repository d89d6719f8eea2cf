//! Handlers for `/stocks` endpoints, including the alert views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`/`POST` | `/stocks` | Body: [`NewStock`] |
//! | `GET`/`PUT`/`DELETE` | `/stocks/{id}` | |
//! | `GET`  | `/stocks/{id}/status` | `"NORMAL"`, `"LOW_STOCK"`, `"EXPIRING"` or `"EXPIRED"` |
//! | `GET`  | `/stocks/item/{item_id}` | |
//! | `GET`  | `/stocks/item/{item_id}/expiry-ordered` | `?ascending=` defaults to `true` |
//! | `GET`  | `/stocks/item/{item_id}/total-quantity` | Integer, or `null` without on-hand stock |
//! | `GET`  | `/stocks/alerts/low-stock[/{item_id}]` | One entry per lot |
//! | `GET`  | `/stocks/alerts/expiring` | `?days_ahead=` defaults to 3 |
//! | `GET`  | `/stocks/alerts/expired` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stockroom_core::{
  Entity,
  alert::DEFAULT_DAYS_AHEAD,
  service,
  stock::{NewStock, Stock, StockStatus},
  store::InventoryStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::{ApiError, backend, deleted, found},
};

// ─── CRUD ─────────────────────────────────────────────────────────────────────

pub async fn list<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  Ok(Json(state.store.list_stock().await.map_err(backend)?))
}

pub async fn get_one<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Stock>, ApiError> {
  let stock = state.store.get_stock(id).await.map_err(backend)?;
  Ok(Json(found(stock, Entity::Stock, id)?))
}

pub async fn create<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewStock>,
) -> Result<impl IntoResponse, ApiError> {
  let stock = state.store.add_stock(body).await.map_err(backend)?;
  Ok((StatusCode::CREATED, Json(stock)))
}

pub async fn update<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewStock>,
) -> Result<Json<Stock>, ApiError> {
  let stock = state.store.update_stock(id, body).await.map_err(backend)?;
  Ok(Json(found(stock, Entity::Stock, id)?))
}

pub async fn delete<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let removed = state.store.delete_stock(id).await.map_err(backend)?;
  deleted(removed, Entity::Stock, id)
}

// ─── Per item ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OrderParams {
  #[serde(default = "ascending_by_default")]
  pub ascending: bool,
}

fn ascending_by_default() -> bool { true }

pub async fn by_item<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  let lots = state
    .store
    .list_stock_by_item(item_id)
    .await
    .map_err(backend)?;
  Ok(Json(lots))
}

/// `GET /stocks/item/{item_id}/expiry-ordered[?ascending=false]`
pub async fn by_item_expiry_ordered<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(item_id): Path<Uuid>,
  Query(params): Query<OrderParams>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  let lots = state
    .store
    .list_stock_by_item_ordered_by_expiry(item_id, params.ascending)
    .await
    .map_err(backend)?;
  Ok(Json(lots))
}

/// `GET /stocks/item/{item_id}/total-quantity`
pub async fn total_quantity<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(item_id): Path<Uuid>,
) -> Result<Json<Option<i64>>, ApiError> {
  let total = service::total_quantity(state.store.as_ref(), item_id).await?;
  Ok(Json(total))
}

/// `GET /stocks/{id}/status`
pub async fn status<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StockStatus>, ApiError> {
  let status =
    service::stock_status(state.store.as_ref(), state.clock.as_ref(), id)
      .await?;
  Ok(Json(status))
}

// ─── Alerts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExpiringParams {
  #[serde(alias = "daysAhead")]
  pub days_ahead: Option<i64>,
}

/// `GET /stocks/alerts/low-stock`
pub async fn low_stock<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  Ok(Json(service::low_stock_alerts(state.store.as_ref()).await?))
}

/// `GET /stocks/alerts/low-stock/{item_id}`
pub async fn low_stock_for_item<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  let alerts =
    service::low_stock_alerts_for_item(state.store.as_ref(), item_id).await?;
  Ok(Json(alerts))
}

/// `GET /stocks/alerts/expiring[?days_ahead=N]`
pub async fn expiring<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ExpiringParams>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  let days_ahead = params.days_ahead.unwrap_or(i64::from(DEFAULT_DAYS_AHEAD));
  let alerts = service::expiring_stocks(
    state.store.as_ref(),
    state.clock.as_ref(),
    days_ahead,
  )
  .await?;
  Ok(Json(alerts))
}

/// `GET /stocks/alerts/expired`
pub async fn expired<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Stock>>, ApiError> {
  let alerts =
    service::expired_stocks(state.store.as_ref(), state.clock.as_ref()).await?;
  Ok(Json(alerts))
}
