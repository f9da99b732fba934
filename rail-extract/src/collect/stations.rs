//! Station collection and normalization.
//!
//! Stations are queried over the whole country box in one go. Under the
//! extended policy a second query loads a town gazetteer, which names
//! stations that carry no name of their own and screens out generic
//! station buildings far from any town.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::gazetteer::Gazetteer;
use super::lexicon::StationLexicon;
use crate::config::StationPolicy;
use crate::domain::geo::{bucket_key, round_coord};
use crate::domain::{CountrySpec, Station, StationKind, compare_by_name};
use crate::overpass::{Element, QueryClient, Transport, query};

/// Radius for naming an unnamed station after a town.
pub const TOWN_NAME_RADIUS_KM: f64 = 5.0;

/// Radius within which a bare station building must have a town.
pub const BUILDING_TOWN_RADIUS_KM: f64 = 10.0;

/// A normalized station together with the bucket of its raw position.
///
/// The bucket is taken from the unrounded coordinates, so two features
/// sharing a 4-decimal key always collide even when their 5-decimal output
/// coordinates round apart.
#[derive(Debug, Clone, PartialEq)]
pub struct StationCandidate {
    pub bucket: (i64, i64),
    pub station: Station,
}

impl StationCandidate {
    /// Candidate for a station found at the raw point `(lat, lon)`.
    pub fn at(lat: f64, lon: f64, station: Station) -> Self {
        Self {
            bucket: bucket_key(lat, lon),
            station,
        }
    }
}

/// Stations keyed by 4-decimal coordinate bucket.
///
/// On a bucket collision a candidate with a station-like name replaces one
/// without; otherwise the first candidate stays. Owned by a single run.
#[derive(Debug)]
pub struct StationAccumulator<'a> {
    lexicon: &'a StationLexicon,
    buckets: HashMap<(i64, i64), Station>,
}

impl<'a> StationAccumulator<'a> {
    pub fn new(lexicon: &'a StationLexicon) -> Self {
        Self {
            lexicon,
            buckets: HashMap::new(),
        }
    }

    /// Insert a candidate. Returns whether it is now the bucket's station.
    pub fn insert(&mut self, candidate: StationCandidate) -> bool {
        let StationCandidate { bucket, station } = candidate;
        match self.buckets.entry(bucket) {
            Entry::Vacant(slot) => {
                slot.insert(station);
                true
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if self.lexicon.matches(&station.name) && !self.lexicon.matches(&current.name) {
                    debug!("replacing {:?} with {:?}", current.name, station.name);
                    slot.insert(station);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Stations sorted by name, case-insensitively.
    pub fn into_sorted(self) -> Vec<Station> {
        let mut stations: Vec<Station> = self.buckets.into_values().collect();
        stations.sort_by(compare_by_name);
        stations
    }
}

/// Turns raw elements into station candidates under a policy.
#[derive(Debug, Clone, Copy)]
pub struct StationNormalizer<'a> {
    policy: StationPolicy,
    gazetteer: &'a Gazetteer,
}

impl<'a> StationNormalizer<'a> {
    pub fn new(policy: StationPolicy, gazetteer: &'a Gazetteer) -> Self {
        Self { policy, gazetteer }
    }

    /// Build a station from an element, or `None` if it should be dropped.
    pub fn normalize(&self, element: &Element) -> Option<Station> {
        self.candidate(element).map(|c| c.station)
    }

    /// Like [`normalize`](Self::normalize), keeping the raw-position bucket.
    pub fn candidate(&self, element: &Element) -> Option<StationCandidate> {
        let (lat, lon) = element.point()?;

        if element
            .tag("station")
            .is_some_and(|v| query::URBAN_STATIONS.contains(&v))
        {
            return None;
        }

        let kind = self.kind(element)?;

        if self.is_bare_building(element)
            && !self.gazetteer.any_within(lat, lon, BUILDING_TOWN_RADIUS_KM)
        {
            debug!("dropping station building {} far from any town", element.id);
            return None;
        }

        let (name, name_local) = self.resolve_name(element, lat, lon)?;

        let station = Station {
            id: element.id,
            lat: round_coord(lat),
            lon: round_coord(lon),
            name,
            name_local,
            kind,
        };
        Some(StationCandidate::at(lat, lon, station))
    }

    /// Stopping-point kind, or `None` if the policy excludes the element.
    fn kind(&self, element: &Element) -> Option<StationKind> {
        let railway = element.tag("railway").and_then(StationKind::from_railway_tag);
        let train_station = element.tag("public_transport") == Some("station")
            && element.tag("train") == Some("yes");

        match self.policy {
            StationPolicy::Major => match railway {
                Some(StationKind::Station) => Some(StationKind::Station),
                None if train_station => Some(StationKind::Station),
                _ => None,
            },
            // Name-matched railway features and station buildings
            // count as stations.
            StationPolicy::Extended => Some(railway.unwrap_or(StationKind::Station)),
        }
    }

    /// A `building=train_station` with no railway or transit tagging.
    fn is_bare_building(&self, element: &Element) -> bool {
        self.policy == StationPolicy::Extended
            && element.tag("building") == Some("train_station")
            && element.tag("railway").is_none()
            && element.tag("public_transport").is_none()
    }

    /// Display name and optional local name.
    ///
    /// Tag names are preferred in the order `name:en`, `name`, `ref`. The
    /// extended policy falls back to `"<Town> Station"` for the nearest
    /// town within [`TOWN_NAME_RADIUS_KM`].
    fn resolve_name(
        &self,
        element: &Element,
        lat: f64,
        lon: f64,
    ) -> Option<(String, Option<String>)> {
        let local = element.non_empty_tag("name");

        if let Some(english) = element.non_empty_tag("name:en") {
            let local = local.filter(|l| *l != english).map(str::to_string);
            return Some((english.to_string(), local));
        }
        if let Some(name) = local {
            return Some((name.to_string(), None));
        }
        if let Some(reference) = element.non_empty_tag("ref") {
            return Some((reference.to_string(), None));
        }

        if self.policy == StationPolicy::Extended
            && let Some(town) = self.gazetteer.nearest_within(lat, lon, TOWN_NAME_RADIUS_KM)
        {
            return Some((format!("{} Station", town.name), None));
        }
        None
    }
}

/// Collects stations for a country.
pub struct StationCollector<'a, T> {
    client: &'a QueryClient<T>,
    policy: StationPolicy,
    lexicon: &'a StationLexicon,
    query_delay: Duration,
}

impl<'a, T: Transport> StationCollector<'a, T> {
    pub fn new(
        client: &'a QueryClient<T>,
        policy: StationPolicy,
        lexicon: &'a StationLexicon,
        query_delay: Duration,
    ) -> Self {
        Self {
            client,
            policy,
            lexicon,
            query_delay,
        }
    }

    /// Query the whole country box and return deduplicated stations,
    /// sorted by name.
    pub async fn collect(&self, country: &CountrySpec) -> Vec<Station> {
        let timeout = self.client.config().server_timeout_secs();

        let q = match self.policy {
            StationPolicy::Major => query::major_stations(&country.bbox, timeout),
            StationPolicy::Extended => {
                query::all_stations(&country.bbox, &self.lexicon.overpass_pattern(), timeout)
            }
        };

        info!("{}: fetching stations ({:?} policy)", country.name, self.policy);
        let elements = match self.client.execute(&q).await {
            Some(response) => response.elements,
            None => {
                warn!("{}: station query failed on all endpoints", country.name);
                Vec::new()
            }
        };

        let gazetteer = match self.policy {
            StationPolicy::Extended if !elements.is_empty() => {
                tokio::time::sleep(self.query_delay).await;
                self.fetch_towns(country).await
            }
            _ => Gazetteer::default(),
        };

        let normalizer = StationNormalizer::new(self.policy, &gazetteer);
        let mut acc = StationAccumulator::new(self.lexicon);
        let mut dropped = 0usize;
        for element in &elements {
            match normalizer.candidate(element) {
                Some(candidate) => {
                    acc.insert(candidate);
                }
                None => dropped += 1,
            }
        }

        info!(
            "{}: {} stations ({} candidates, {} dropped)",
            country.name,
            acc.len(),
            elements.len(),
            dropped
        );
        acc.into_sorted()
    }

    async fn fetch_towns(&self, country: &CountrySpec) -> Gazetteer {
        let timeout = self.client.config().server_timeout_secs();
        match self.client.execute(&query::towns(&country.bbox, timeout)).await {
            Some(response) => {
                let gazetteer = Gazetteer::from_elements(&response.elements);
                debug!("{}: {} towns in gazetteer", country.name, gazetteer.len());
                gazetteer
            }
            None => {
                warn!(
                    "{}: town query failed, unnamed stations will be dropped",
                    country.name
                );
                Gazetteer::default()
            }
        }
    }
}
