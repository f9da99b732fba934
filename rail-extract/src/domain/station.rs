//! Station output record.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Kind of stopping point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    Station,
    Halt,
    Stop,
    ServiceStation,
}

impl StationKind {
    /// Map a `railway=*` tag value to a kind, if it names a stopping point.
    pub fn from_railway_tag(tag: &str) -> Option<Self> {
        match tag {
            "station" => Some(StationKind::Station),
            "halt" => Some(StationKind::Halt),
            "stop" => Some(StationKind::Stop),
            "service_station" => Some(StationKind::ServiceStation),
            _ => None,
        }
    }
}

/// A station, as written to `stations/<country>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: i64,
    /// Latitude rounded to 5 decimals
    pub lat: f64,
    /// Longitude rounded to 5 decimals
    pub lon: f64,
    /// Display name, never empty
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_local: Option<String>,
    #[serde(rename = "type")]
    pub kind: StationKind,
}

/// Output ordering for stations: case-insensitive by name.
///
/// Names are compared by their lowercase form; equal lowercase names fall
/// back to the exact name and then the id so the order is total.
pub fn compare_by_name(a: &Station, b: &Station) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
