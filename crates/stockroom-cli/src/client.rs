//! Async HTTP client wrapping the Stockroom JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use stockroom_core::{
  catalog::Item,
  stock::{Stock, StockStatus},
};
use uuid::Uuid;

/// Connection settings for the Stockroom API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the Stockroom JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    tracing::debug!(path, "GET");
    let resp = self
      .client
      .get(self.url(path))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    let resp = check(path, resp).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising response of GET {path}"))
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  /// `GET /api/items`
  pub async fn list_items(&self) -> Result<Vec<Item>> {
    self.get_json("/items", &[]).await
  }

  // ── Stock ─────────────────────────────────────────────────────────────────

  /// `GET /api/stocks/{id}/status`
  pub async fn stock_status(&self, stock_id: Uuid) -> Result<StockStatus> {
    self
      .get_json(&format!("/stocks/{stock_id}/status"), &[])
      .await
  }

  /// `GET /api/stocks/item/{item_id}/total-quantity`
  pub async fn total_quantity(&self, item_id: Uuid) -> Result<Option<i64>> {
    self
      .get_json(&format!("/stocks/item/{item_id}/total-quantity"), &[])
      .await
  }

  /// `GET /api/stocks/alerts/low-stock[/{item_id}]`
  pub async fn low_stock(&self, item_id: Option<Uuid>) -> Result<Vec<Stock>> {
    let path = match item_id {
      Some(id) => format!("/stocks/alerts/low-stock/{id}"),
      None => "/stocks/alerts/low-stock".to_string(),
    };
    self.get_json(&path, &[]).await
  }

  /// `GET /api/stocks/alerts/expiring?days_ahead=N`
  pub async fn expiring(&self, days_ahead: i64) -> Result<Vec<Stock>> {
    self
      .get_json("/stocks/alerts/expiring", &[(
        "days_ahead",
        days_ahead.to_string(),
      )])
      .await
  }

  /// `GET /api/stocks/alerts/expired`
  pub async fn expired(&self) -> Result<Vec<Stock>> {
    self.get_json("/stocks/alerts/expired", &[]).await
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(path: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|body| body["error"].as_str().map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("GET {path} → {status} {message}"))
}
