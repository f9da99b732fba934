//! Railway and station extraction from OpenStreetMap.
//!
//! Fetches railway track geometry and station points for a fixed table of
//! countries from public Overpass API servers, normalises them, and writes
//! compact per-country JSON files plus a manifest.

pub mod collect;
pub mod config;
pub mod domain;
pub mod manifest;
pub mod overpass;
pub mod run;
pub mod tiling;
