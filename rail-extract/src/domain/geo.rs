//! Coordinate rounding and great-circle distance.

/// Mean Earth radius used for haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal places kept in output coordinates (~1.1 m).
pub const OUTPUT_DECIMALS: i32 = 5;

/// Decimal places of the station deduplication bucket (~11 m).
pub const BUCKET_DECIMALS: i32 = 4;

/// Round a value to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a coordinate to output precision.
pub fn round_coord(value: f64) -> f64 {
    round_to(value, OUTPUT_DECIMALS)
}

/// Integer bucket key for a point at 4-decimal precision.
///
/// Using scaled integers avoids hashing floats while keeping the same
/// bucket boundaries as rounding to 4 decimals.
pub fn bucket_key(lat: f64, lon: f64) -> (i64, i64) {
    let factor = 10f64.powi(BUCKET_DECIMALS);
    ((lat * factor).round() as i64, (lon * factor).round() as i64)
}

/// Great-circle distance between two points in kilometres (haversine).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
