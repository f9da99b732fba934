//! Geographic bounding box.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A latitude/longitude rectangle in degrees.
///
/// Guaranteed by construction to have `south < north` and `west < east`.
/// Serializes as the array `[south, west, north, east]`, the same order
/// Overpass QL expects inside a bbox filter.
///
/// # Examples
///
/// ```
/// use rail_extract::domain::BoundingBox;
///
/// let bbox = BoundingBox::new(47.2, 5.8, 55.1, 15.1).unwrap();
/// assert_eq!(bbox.to_overpass(), "47.2,5.8,55.1,15.1");
///
/// // Inverted edges are rejected
/// assert!(BoundingBox::new(10.0, 0.0, 5.0, 1.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl BoundingBox {
    /// Create a bounding box, validating edge order.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, DomainError> {
        if ![south, west, north, east].iter().all(|v| v.is_finite()) {
            return Err(DomainError::NonFiniteBound);
        }
        if south >= north {
            return Err(DomainError::LatitudeOrder { south, north });
        }
        if west >= east {
            return Err(DomainError::LongitudeOrder { west, east });
        }
        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    /// Format as an Overpass QL bbox filter body: `south,west,north,east`.
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }

    /// Returns the bounds as `[south, west, north, east]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.south, self.west, self.north, self.east]
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = DomainError;

    fn try_from([south, west, north, east]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(south, west, north, east)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox[{}, {}, {}, {}]",
            self.south, self.west, self.north, self.east
        )
    }
}
