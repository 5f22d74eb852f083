//! sopline-core: the data-access layer of the SOP training service.
//!
//! The hosted database client is replaced by an in-memory [`RecordStore`]
//! seeded with development fixtures. [`Client`] exposes the same call shape
//! as the hosted client, so code written against it runs unchanged against
//! the mock.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern, `anyhow::Result` in config loading.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod auth;
pub mod billing;
pub mod client;
pub mod config;
pub mod error;
pub mod invite;
pub mod model;
pub mod progress;
pub mod query;
pub mod store;

pub use client::{Client, connect};
pub use error::{ClientError, DecodeError, ErrorCode, StoreError};
pub use query::{QueryBuilder, QueryResponse};
pub use store::{RecordStore, Row, Table};
