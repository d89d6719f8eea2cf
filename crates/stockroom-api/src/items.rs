//! Handlers for `/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`/`POST` | `/items` | Body: [`NewItem`]; threshold must not be negative |
//! | `GET`/`PUT`/`DELETE` | `/items/{id}` | `DELETE` also removes stock and purchases |
//! | `GET`  | `/items/category/{id}` | |
//! | `GET`  | `/items/store/{id}` | |
//! | `GET`  | `/items/store/none` | Items without a store |
//! | `GET`  | `/items/search?name=` | |
//! | `GET`  | `/items/expiry/{bool}` | |
//! | `GET`  | `/items/threshold/{n}` | Threshold strictly below `n` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stockroom_core::{
  Entity,
  catalog::{Item, NewItem},
  store::InventoryStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::{ApiError, backend, deleted, found},
};

#[derive(Debug, Deserialize)]
pub struct NameParams {
  pub name: String,
}

pub async fn list<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Item>>, ApiError> {
  Ok(Json(state.store.list_items().await.map_err(backend)?))
}

pub async fn get_one<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Item>, ApiError> {
  let item = state.store.get_item(id).await.map_err(backend)?;
  Ok(Json(found(item, Entity::Item, id)?))
}

pub async fn create<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewItem>,
) -> Result<impl IntoResponse, ApiError> {
  let item = state.store.add_item(body).await.map_err(backend)?;
  Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewItem>,
) -> Result<Json<Item>, ApiError> {
  let item = state.store.update_item(id, body).await.map_err(backend)?;
  Ok(Json(found(item, Entity::Item, id)?))
}

pub async fn delete<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let removed = state.store.delete_item(id).await.map_err(backend)?;
  deleted(removed, Entity::Item, id)
}

pub async fn by_category<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = state
    .store
    .list_items_by_category(category_id)
    .await
    .map_err(backend)?;
  Ok(Json(items))
}

pub async fn by_store<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(store_id): Path<Uuid>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = state
    .store
    .list_items_by_store(store_id)
    .await
    .map_err(backend)?;
  Ok(Json(items))
}

pub async fn without_store<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = state
    .store
    .list_items_without_store()
    .await
    .map_err(backend)?;
  Ok(Json(items))
}

/// `GET /items/search?name=...`
pub async fn search<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<NameParams>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = state
    .store
    .search_items(&params.name)
    .await
    .map_err(backend)?;
  Ok(Json(items))
}

pub async fn by_expiry_flag<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(has_expiry): Path<bool>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = state
    .store
    .list_items_by_expiry_flag(has_expiry)
    .await
    .map_err(backend)?;
  Ok(Json(items))
}

pub async fn by_threshold<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(threshold): Path<i64>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = state
    .store
    .list_items_by_threshold_less_than(threshold)
    .await
    .map_err(backend)?;
  Ok(Json(items))
}
