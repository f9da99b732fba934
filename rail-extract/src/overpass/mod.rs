//! Overpass API client.
//!
//! This module provides an HTTP client for the public Overpass API, which
//! answers read-only Overpass QL queries over OpenStreetMap data.
//!
//! Key characteristics of the public instances:
//! - They are shared and rate limited: a 429 means "slow down", a 5xx
//!   means the instance is overloaded and another mirror should be tried
//! - Queries carry a server-side `[timeout:N]`; a query that runs out of
//!   time still answers 200, with a `remark` and partial elements
//! - Queries are idempotent, so any attempt can be repeated safely

mod client;
mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod query;
mod transport;
mod types;

pub use client::{ClientConfig, DEFAULT_ENDPOINTS, QueryClient};
pub use error::OverpassError;
pub use transport::{HttpReply, HttpTransport, Transport};
pub use types::{Element, ElementType, LatLon, OverpassResponse};
