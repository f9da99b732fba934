//! Domain types for railway and station extraction.
//!
//! This module contains the validated geographic and output types shared
//! by the collectors and the run coordinator. Types enforce their
//! invariants at construction time.

mod bbox;
mod country;
mod error;
pub mod geo;
mod segment;
mod station;

pub use bbox::BoundingBox;
pub use country::{CountrySpec, SizeClass, countries, find_country};
pub use error::DomainError;
pub use segment::{RailwayKind, RailwaySegment};
pub use station::{Station, StationKind, compare_by_name};
