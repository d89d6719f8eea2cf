//! Handlers for `/categories` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories` | All categories |
//! | `POST` | `/categories` | Body: [`NewCategory`]; returns 201 |
//! | `GET`/`PUT`/`DELETE` | `/categories/{id}` | `DELETE` is refused while items use it |
//! | `GET`  | `/categories/search?keyword=` | Case-insensitive substring match |
//! | `GET`  | `/categories/name/{name}` | Exact name |
//! | `GET`  | `/categories/exists/{name}` | `true` / `false` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stockroom_core::{
  Entity,
  catalog::{Category, NewCategory},
  store::InventoryStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::{ApiError, backend, deleted, found, found_named},
};

#[derive(Debug, Deserialize)]
pub struct KeywordParams {
  pub keyword: String,
}

/// `GET /categories`
pub async fn list<S: InventoryStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Category>>, ApiError> {
  let categories = state.store.list_categories().await.map_err(backend)?;
  Ok(Json(categories))
}

/// `GET /categories/{id}`
pub async fn get_one<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
  let category = state.store.get_category(id).await.map_err(backend)?;
  Ok(Json(found(category, Entity::Category, id)?))
}

/// `POST /categories`
pub async fn create<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewCategory>,
) -> Result<impl IntoResponse, ApiError> {
  let category = state.store.add_category(body).await.map_err(backend)?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /categories/{id}`
pub async fn update<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewCategory>,
) -> Result<Json<Category>, ApiError> {
  let category = state
    .store
    .update_category(id, body)
    .await
    .map_err(backend)?;
  Ok(Json(found(category, Entity::Category, id)?))
}

/// `DELETE /categories/{id}`
pub async fn delete<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let removed = state.store.delete_category(id).await.map_err(backend)?;
  deleted(removed, Entity::Category, id)
}

/// `GET /categories/search?keyword=...`
pub async fn search<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<KeywordParams>,
) -> Result<Json<Vec<Category>>, ApiError> {
  let categories = state
    .store
    .search_categories(&params.keyword)
    .await
    .map_err(backend)?;
  Ok(Json(categories))
}

/// `GET /categories/name/{name}`
pub async fn by_name<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Category>, ApiError> {
  let category = state
    .store
    .find_category_by_name(&name)
    .await
    .map_err(backend)?;
  Ok(Json(found_named(category, Entity::Category, &name)?))
}

/// `GET /categories/exists/{name}`
pub async fn exists<S: InventoryStore>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
  let category = state
    .store
    .find_category_by_name(&name)
    .await
    .map_err(backend)?;
  Ok(Json(category.is_some()))
}
