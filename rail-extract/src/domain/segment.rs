//! Railway segment output record.

use serde::{Deserialize, Serialize};

use super::geo::round_coord;

/// Controlled vocabulary for the `railway=*` tag of a track segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RailwayKind {
    Rail,
    NarrowGauge,
    LightRail,
    Construction,
    Proposed,
    Subway,
    Tram,
    Disused,
    Abandoned,
    Preserved,
}

impl RailwayKind {
    /// Map a raw tag value to a kind.
    ///
    /// Missing or unrecognised values default to [`RailwayKind::Rail`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("narrow_gauge") => RailwayKind::NarrowGauge,
            Some("light_rail") => RailwayKind::LightRail,
            Some("construction") => RailwayKind::Construction,
            Some("proposed") => RailwayKind::Proposed,
            Some("subway") => RailwayKind::Subway,
            Some("tram") => RailwayKind::Tram,
            Some("disused") => RailwayKind::Disused,
            Some("abandoned") => RailwayKind::Abandoned,
            Some("preserved") => RailwayKind::Preserved,
            _ => RailwayKind::Rail,
        }
    }

    /// The OSM tag value for this kind.
    pub fn as_tag(self) -> &'static str {
        match self {
            RailwayKind::Rail => "rail",
            RailwayKind::NarrowGauge => "narrow_gauge",
            RailwayKind::LightRail => "light_rail",
            RailwayKind::Construction => "construction",
            RailwayKind::Proposed => "proposed",
            RailwayKind::Subway => "subway",
            RailwayKind::Tram => "tram",
            RailwayKind::Disused => "disused",
            RailwayKind::Abandoned => "abandoned",
            RailwayKind::Preserved => "preserved",
        }
    }
}

/// A railway track segment, as written to `railways/<country>.json`.
///
/// The id is the OSM way id. Ids are only unique within one country file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailwaySegment {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RailwayKind,
    /// `[lat, lon]` pairs rounded to 5 decimals, at least two of them.
    pub coords: Vec<[f64; 2]>,
}

impl RailwaySegment {
    /// Build a segment from raw points, rounding each coordinate.
    ///
    /// Returns `None` for degenerate geometry with fewer than two points.
    pub fn from_points<I>(id: i64, kind: RailwayKind, points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let coords: Vec<[f64; 2]> = points
            .into_iter()
            .map(|(lat, lon)| [round_coord(lat), round_coord(lon)])
            .collect();

        if coords.len() < 2 {
            return None;
        }

        Some(Self { id, kind, coords })
    }
}
