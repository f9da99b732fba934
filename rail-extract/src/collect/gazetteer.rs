//! Town gazetteer for resolving unnamed stations.

use crate::domain::geo::haversine_km;
use crate::overpass::{Element, ElementType};

/// A named populated place.
#[derive(Debug, Clone, PartialEq)]
pub struct Town {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Named towns of one country, searched by great-circle distance.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    towns: Vec<Town>,
}

impl Gazetteer {
    pub fn new(towns: Vec<Town>) -> Self {
        Self { towns }
    }

    /// Build from `place=*` nodes, preferring English names.
    ///
    /// Nodes without a position or a name are skipped.
    pub fn from_elements(elements: &[Element]) -> Self {
        let towns = elements
            .iter()
            .filter(|e| e.kind == ElementType::Node)
            .filter_map(|e| {
                let (lat, lon) = e.point()?;
                let name = e.non_empty_tag("name:en").or_else(|| e.non_empty_tag("name"))?;
                Some(Town {
                    name: name.to_string(),
                    lat,
                    lon,
                })
            })
            .collect();
        Self { towns }
    }

    pub fn len(&self) -> usize {
        self.towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }

    /// Closest town within `radius_km`, if any.
    pub fn nearest_within(&self, lat: f64, lon: f64, radius_km: f64) -> Option<&Town> {
        self.towns
            .iter()
            .map(|t| (t, haversine_km(lat, lon, t.lat, t.lon)))
            .filter(|(_, d)| *d <= radius_km)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(t, _)| t)
    }

    /// Whether any town lies within `radius_km`.
    pub fn any_within(&self, lat: f64, lon: f64, radius_km: f64) -> bool {
        self.towns
            .iter()
            .any(|t| haversine_km(lat, lon, t.lat, t.lon) <= radius_km)
    }
}
