//! Overpass QL query builders.

use crate::domain::{BoundingBox, RailwayKind};

/// `station=*` values that mark metro-style stations, never main line.
pub const URBAN_STATIONS: &[&str] = &["subway", "light_rail", "monorail"];

/// Anchored alternation over [`URBAN_STATIONS`].
fn urban_pattern() -> String {
    format!("^({})$", URBAN_STATIONS.join("|"))
}

/// Query header selecting JSON output with a server-side timeout.
fn header(timeout_secs: u64) -> String {
    format!("[out:json][timeout:{timeout_secs}];")
}

/// Anchored alternation over railway kinds, e.g. `^(rail|tram)$`.
fn kinds_pattern(kinds: &[RailwayKind]) -> String {
    let tags: Vec<&str> = kinds.iter().map(|k| k.as_tag()).collect();
    format!("^({})$", tags.join("|"))
}

/// Ways with an allowed `railway=*` value inside one tile, with geometry.
pub fn railways(tile: &BoundingBox, kinds: &[RailwayKind], timeout_secs: u64) -> String {
    format!(
        "{}way[\"railway\"~\"{}\"]({});out geom;",
        header(timeout_secs),
        kinds_pattern(kinds),
        tile.to_overpass()
    )
}

/// Main-line stations inside a box.
///
/// Selects `railway=station` and `public_transport=station` + `train=yes`,
/// skipping metro-style stations. Ways are reported with their center.
pub fn major_stations(bbox: &BoundingBox, timeout_secs: u64) -> String {
    let b = bbox.to_overpass();
    format!(
        "{}(\
node[\"railway\"=\"station\"][\"station\"!~\"{u}\"]({b});\
way[\"railway\"=\"station\"][\"station\"!~\"{u}\"]({b});\
node[\"public_transport\"=\"station\"][\"train\"=\"yes\"][\"station\"!~\"{u}\"]({b});\
way[\"public_transport\"=\"station\"][\"train\"=\"yes\"][\"station\"!~\"{u}\"]({b});\
);out center;",
        header(timeout_secs),
        u = urban_pattern(),
    )
}

/// Stations, halts, stops and station buildings inside a box.
///
/// Extends [`major_stations`] with minor stopping points, buildings tagged
/// `building=train_station`, and any railway feature whose name matches
/// `name_pattern` case-insensitively. An empty pattern skips the name match.
pub fn all_stations(bbox: &BoundingBox, name_pattern: &str, timeout_secs: u64) -> String {
    let b = bbox.to_overpass();
    let mut query = format!(
        "{}(\
node[\"railway\"~\"^(station|halt|stop|service_station)$\"][\"station\"!~\"{u}\"]({b});\
way[\"railway\"~\"^(station|halt)$\"][\"station\"!~\"{u}\"]({b});\
node[\"public_transport\"=\"station\"][\"train\"=\"yes\"][\"station\"!~\"{u}\"]({b});\
way[\"public_transport\"=\"station\"][\"train\"=\"yes\"][\"station\"!~\"{u}\"]({b});\
node[\"building\"=\"train_station\"]({b});\
way[\"building\"=\"train_station\"]({b});",
        header(timeout_secs),
        u = urban_pattern(),
    );
    if !name_pattern.is_empty() {
        query.push_str(&format!(
            "node[\"railway\"][\"name\"~\"{name_pattern}\",i][\"station\"!~\"{u}\"]({b});",
            u = urban_pattern(),
        ));
    }
    query.push_str(");out center;");
    query
}

/// Cities and towns inside a box, for resolving unnamed stations.
pub fn towns(bbox: &BoundingBox, timeout_secs: u64) -> String {
    format!(
        "{}node[\"place\"~\"^(city|town)$\"]({});out;",
        header(timeout_secs),
        bbox.to_overpass()
    )
}
