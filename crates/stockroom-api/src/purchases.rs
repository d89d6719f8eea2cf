//! Handlers for `/purchases` endpoints.
//!
//! `period` takes RFC 3339 timestamps (`?start=...&end=...`, both inclusive);
//! `expiring` takes a calendar date (`?before=YYYY-MM-DD`, exclusive).

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use stockroom_core::{
  Entity,
  purchase::{NewPurchase, PurchaseHistory},
  store::InventoryStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::{ApiError, backend, deleted, found},
};

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BeforeParams {
  pub before: NaiveDate,
}

pub async fn list<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<PurchaseHistory>>, ApiError> {
  Ok(Json(state.store.list_purchases().await.map_err(backend)?))
}

pub async fn get_one<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PurchaseHistory>, ApiError> {
  let purchase = state.store.get_purchase(id).await.map_err(backend)?;
  Ok(Json(found(purchase, Entity::Purchase, id)?))
}

/// `POST /purchases`: `purchased_at` defaults to now when omitted.
pub async fn create<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPurchase>,
) -> Result<impl IntoResponse, ApiError> {
  let purchase = state.store.add_purchase(body).await.map_err(backend)?;
  Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn update<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewPurchase>,
) -> Result<Json<PurchaseHistory>, ApiError> {
  let purchase = state
    .store
    .update_purchase(id, body)
    .await
    .map_err(backend)?;
  Ok(Json(found(purchase, Entity::Purchase, id)?))
}

pub async fn delete<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let removed = state.store.delete_purchase(id).await.map_err(backend)?;
  deleted(removed, Entity::Purchase, id)
}

/// `GET /purchases/item/{item_id}`: newest first.
pub async fn by_item<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<PurchaseHistory>>, ApiError> {
  let purchases = state
    .store
    .list_purchases_by_item(item_id)
    .await
    .map_err(backend)?;
  Ok(Json(purchases))
}

pub async fn by_item_with_expiry<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(item_id): Path<Uuid>,
) -> Result<Json<Vec<PurchaseHistory>>, ApiError> {
  let purchases = state
    .store
    .list_purchases_by_item_with_expiry(item_id)
    .await
    .map_err(backend)?;
  Ok(Json(purchases))
}

/// `GET /purchases/period?start=...&end=...`: 400 when `start` is after
/// `end`.
pub async fn period<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<PeriodParams>,
) -> Result<Json<Vec<PurchaseHistory>>, ApiError> {
  let purchases = state
    .store
    .list_purchases_between(params.start, params.end)
    .await
    .map_err(backend)?;
  Ok(Json(purchases))
}

/// `GET /purchases/expiring?before=YYYY-MM-DD`
pub async fn expiring_before<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<BeforeParams>,
) -> Result<Json<Vec<PurchaseHistory>>, ApiError> {
  let purchases = state
    .store
    .list_purchases_expiring_before(params.before)
    .await
    .map_err(backend)?;
  Ok(Json(purchases))
}
