//! Country definitions and the static country table.

use std::fmt;

use serde::Serialize;

use super::bbox::BoundingBox;

/// Size classification controlling query tiling granularity.
///
/// Larger countries get smaller tiles, since a single query over a large
/// raw area risks hitting the remote service's timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeClass {
    /// Tile edge length in degrees for this class.
    pub fn tile_size_deg(self) -> f64 {
        match self {
            SizeClass::Small => 10.0,
            SizeClass::Medium => 5.0,
            SizeClass::Large => 3.0,
            SizeClass::ExtraLarge => 2.0,
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
            SizeClass::ExtraLarge => "extra-large",
        };
        f.write_str(s)
    }
}

/// A country to extract.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySpec {
    /// Lowercase key used in file names and on the command line
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 code
    pub code: &'static str,
    pub bbox: BoundingBox,
    pub size: SizeClass,
}

impl CountrySpec {
    /// Tile size for this country's railway queries.
    pub fn tile_size_deg(&self) -> f64 {
        self.size.tile_size_deg()
    }
}

/// Raw table rows: key, name, code, [south, west, north, east], size.
const COUNTRY_TABLE: &[(&str, &str, &str, [f64; 4], SizeClass)] = &[
    ("turkey", "Turkey", "TR", [35.8, 25.6, 42.2, 44.9], SizeClass::ExtraLarge),
    ("greece", "Greece", "GR", [34.8, 19.3, 41.8, 29.7], SizeClass::Medium),
    ("bulgaria", "Bulgaria", "BG", [41.2, 22.3, 44.3, 28.7], SizeClass::Medium),
    ("georgia", "Georgia", "GE", [41.0, 40.0, 43.6, 46.8], SizeClass::Small),
    ("armenia", "Armenia", "AM", [38.8, 43.4, 41.3, 46.7], SizeClass::Small),
    ("azerbaijan", "Azerbaijan", "AZ", [38.3, 44.7, 41.9, 50.6], SizeClass::Small),
    ("iran", "Iran", "IR", [25.0, 44.0, 39.8, 63.4], SizeClass::ExtraLarge),
    ("iraq", "Iraq", "IQ", [29.0, 38.7, 37.4, 48.7], SizeClass::Large),
    ("syria", "Syria", "SY", [32.3, 35.7, 37.4, 42.4], SizeClass::Medium),
    ("lebanon", "Lebanon", "LB", [33.0, 35.1, 34.7, 36.7], SizeClass::Small),
    ("jordan", "Jordan", "JO", [29.1, 34.9, 33.4, 39.4], SizeClass::Small),
    ("israel", "Israel", "IL", [29.4, 34.2, 33.4, 35.9], SizeClass::Small),
    ("egypt", "Egypt", "EG", [22.0, 24.7, 31.7, 36.9], SizeClass::Large),
    ("saudi_arabia", "Saudi Arabia", "SA", [16.3, 34.5, 32.2, 55.7], SizeClass::ExtraLarge),
    ("ukraine", "Ukraine", "UA", [44.3, 22.1, 52.4, 40.2], SizeClass::Large),
    ("romania", "Romania", "RO", [43.6, 20.2, 48.3, 29.7], SizeClass::Medium),
];

/// All configured countries, in table order.
pub fn countries() -> Vec<CountrySpec> {
    COUNTRY_TABLE
        .iter()
        .filter_map(|(key, name, code, bounds, size)| {
            let bbox = BoundingBox::try_from(*bounds).ok()?;
            Some(CountrySpec {
                key: *key,
                name: *name,
                code: *code,
                bbox,
                size: *size,
            })
        })
        .collect()
}

/// Look up a country by key.
pub fn find_country(key: &str) -> Option<CountrySpec> {
    countries().into_iter().find(|c| c.key == key)
}
