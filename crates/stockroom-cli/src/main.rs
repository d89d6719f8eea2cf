//! `stockroom`: command-line client for a running Stockroom server.
//!
//! # Usage
//!
//! ```text
//! stockroom --url http://localhost:8080 low-stock
//! stockroom --config ~/.config/stockroom/config.toml expiring --days 7
//! stockroom status 3f2c...
//! ```

mod client;

use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use stockroom_core::{alert::DEFAULT_DAYS_AHEAD, stock::Stock};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "stockroom", about = "Inspect stock levels on a Stockroom server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the stockroom server (default: http://localhost:8080).
  #[arg(long, env = "STOCKROOM_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Lots whose item total is at or below its threshold.
  LowStock {
    /// Restrict to one item.
    #[arg(long)]
    item: Option<Uuid>,
  },
  /// Lots expiring within the given number of days, expired ones included.
  Expiring {
    #[arg(long, default_value_t = i64::from(DEFAULT_DAYS_AHEAD), allow_negative_numbers = true)]
    days: i64,
  },
  /// Lots past their expiry date.
  Expired,
  /// Classify one stock lot.
  Status { stock_id: Uuid },
  /// Total on-hand quantity of an item.
  Total { item_id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

/// CLI flag (or `STOCKROOM_URL`) over config file over the default.
fn resolve_url(flag: Option<String>, file: &ConfigFile) -> String {
  flag
    .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(ApiConfig {
    base_url: resolve_url(args.url, &file_cfg),
  })?;

  match args.command {
    Command::LowStock { item } => {
      let lots = client.low_stock(item).await?;
      print_lots(&client, &lots).await?;
    }
    Command::Expiring { days } => {
      let lots = client.expiring(days).await?;
      print_lots(&client, &lots).await?;
    }
    Command::Expired => {
      let lots = client.expired().await?;
      print_lots(&client, &lots).await?;
    }
    Command::Status { stock_id } => {
      println!("{}", client.stock_status(stock_id).await?);
    }
    Command::Total { item_id } => match client.total_quantity(item_id).await? {
      Some(total) => println!("{total}"),
      None => println!("no stock on hand"),
    },
  }

  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

async fn print_lots(client: &ApiClient, lots: &[Stock]) -> Result<()> {
  if lots.is_empty() {
    println!("no matching lots");
    return Ok(());
  }
  let names: HashMap<Uuid, String> = client
    .list_items()
    .await?
    .into_iter()
    .map(|item| (item.item_id, item.name))
    .collect();
  for lot in lots {
    let name = names.get(&lot.item_id).map_or("?", String::as_str);
    println!("{}", format_lot(lot, name));
  }
  Ok(())
}

fn format_lot(lot: &Stock, item_name: &str) -> String {
  let expiry = lot
    .expiry_date
    .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
  format!(
    "{}  {:<24} qty {:>5}  expires {}",
    lot.stock_id, item_name, lot.quantity, expiry
  )
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Utc};

  use super::*;

  #[test]
  fn url_flag_beats_config_file() {
    let file = ConfigFile { url: "http://pantry:9000".into() };
    assert_eq!(
      resolve_url(Some("http://cli:1".into()), &file),
      "http://cli:1"
    );
    assert_eq!(resolve_url(None, &file), "http://pantry:9000");
    assert_eq!(resolve_url(None, &ConfigFile::default()), DEFAULT_URL);
  }

  #[test]
  fn config_file_parses() {
    let cfg: ConfigFile = toml::from_str("url = \"http://pantry:9000\"").unwrap();
    assert_eq!(cfg.url, "http://pantry:9000");
  }

  #[test]
  fn lot_line_shows_expiry_or_dash() {
    let mut lot = Stock {
      stock_id:    Uuid::nil(),
      item_id:     Uuid::nil(),
      quantity:    2,
      expiry_date: None,
      created_at:  Utc::now(),
      updated_at:  Utc::now(),
    };
    assert!(format_lot(&lot, "Milk").ends_with("expires -"));

    lot.expiry_date = NaiveDate::from_ymd_opt(2024, 6, 18);
    let line = format_lot(&lot, "Milk");
    assert!(line.contains("Milk"));
    assert!(line.ends_with("expires 2024-06-18"));
  }
}
