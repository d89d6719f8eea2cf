//! Core types and trait definitions for the Stockroom inventory backend.
//!
//! This crate has no HTTP or database dependencies. All other crates depend
//! on it; storage backends implement [`store::InventoryStore`] and the
//! alerting rules in [`alert`] run over whatever a backend returns.

#![allow(async_fn_in_trait)]

pub mod alert;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod purchase;
pub mod service;
pub mod stock;
pub mod store;

pub use error::{Entity, Error, Result};
