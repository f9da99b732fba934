//! Overpass API response DTOs.
//!
//! These types map to the JSON emitted by `[out:json]` queries. Which
//! geometry fields are present depends on the output directive: nodes carry
//! `lat`/`lon`, `out geom` adds `geometry` to ways, and `out center` adds
//! `center` to ways and relations.

use std::collections::HashMap;

use serde::Deserialize;

/// Top-level response of an `[out:json]` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    /// Matched elements, in the order the server emitted them.
    #[serde(default)]
    pub elements: Vec<Element>,

    /// Server remark, set when the query hit a runtime error such as
    /// its own timeout. The element list is then incomplete.
    pub remark: Option<String>,
}

/// OSM element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// A single element from the response.
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementType,

    /// OSM id, stable across queries and unique per element type.
    pub id: i64,

    #[serde(default)]
    pub tags: HashMap<String, String>,

    /// Node latitude.
    pub lat: Option<f64>,

    /// Node longitude.
    pub lon: Option<f64>,

    /// Way geometry from `out geom`.
    #[serde(default)]
    pub geometry: Vec<LatLon>,

    /// Computed centroid from `out center`.
    pub center: Option<LatLon>,
}

impl Element {
    /// Look up a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Look up a tag value, treating blank strings as absent.
    pub fn non_empty_tag(&self, key: &str) -> Option<&str> {
        self.tag(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Representative point: node position, else computed center.
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.map(|c| (c.lat, c.lon)),
        }
    }

    /// Way geometry as `(lat, lon)` tuples.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.geometry.iter().map(|p| (p.lat, p.lon))
    }
}
