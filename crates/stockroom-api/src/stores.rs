//! Handlers for `/stores` endpoints.
//!
//! `DELETE /stores/{id}` detaches every item from the store before removing
//! it; both steps commit together or not at all.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stockroom_core::{
  Entity,
  catalog::{NewStore, Store},
  store::InventoryStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  categories::KeywordParams,
  error::{ApiError, backend, found, found_named},
};

#[derive(Debug, Deserialize)]
pub struct LocationParams {
  pub location: String,
}

pub async fn list<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Store>>, ApiError> {
  Ok(Json(state.store.list_stores().await.map_err(backend)?))
}

pub async fn get_one<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Store>, ApiError> {
  let store = state.store.get_store(id).await.map_err(backend)?;
  Ok(Json(found(store, Entity::Store, id)?))
}

/// `POST /stores`: returns 201 + the stored [`Store`].
pub async fn create<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewStore>,
) -> Result<impl IntoResponse, ApiError> {
  let store = state.store.add_store(body).await.map_err(backend)?;
  Ok((StatusCode::CREATED, Json(store)))
}

pub async fn update<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewStore>,
) -> Result<Json<Store>, ApiError> {
  let store = state.store.update_store(id, body).await.map_err(backend)?;
  Ok(Json(found(store, Entity::Store, id)?))
}

/// `DELETE /stores/{id}`: 204 once the store is gone, 404 if it never
/// existed.
pub async fn delete<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let detached = state.store.delete_store(id).await.map_err(backend)?;
  found(detached, Entity::Store, id)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /stores/search?keyword=...`
pub async fn search<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<KeywordParams>,
) -> Result<Json<Vec<Store>>, ApiError> {
  let stores = state
    .store
    .search_stores(&params.keyword)
    .await
    .map_err(backend)?;
  Ok(Json(stores))
}

/// `GET /stores/location?location=...`
pub async fn by_location<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<LocationParams>,
) -> Result<Json<Vec<Store>>, ApiError> {
  let stores = state
    .store
    .search_stores_by_location(&params.location)
    .await
    .map_err(backend)?;
  Ok(Json(stores))
}

pub async fn by_name<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Store>, ApiError> {
  let store = state.store.find_store_by_name(&name).await.map_err(backend)?;
  Ok(Json(found_named(store, Entity::Store, &name)?))
}

pub async fn exists<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
  let store = state.store.find_store_by_name(&name).await.map_err(backend)?;
  Ok(Json(store.is_some()))
}
