//! Run coordination.
//!
//! A run extracts the requested phases for each requested country in turn,
//! writes their output files, and merges the results into the manifest. A
//! failure for one country is recorded against it and the run moves on.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::collect::{RailwayCollector, StationCollector};
use crate::config::ExtractConfig;
use crate::domain::{CountrySpec, countries, find_country};
use crate::manifest::{Manifest, ManifestEntry, ManifestError, timestamp_now};
use crate::overpass::{QueryClient, Transport};

/// Errors that abort one country's extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which datasets to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Railways,
    Stations,
    #[default]
    All,
}

impl Mode {
    pub fn includes_railways(self) -> bool {
        matches!(self, Mode::Railways | Mode::All)
    }

    pub fn includes_stations(self) -> bool {
        matches!(self, Mode::Stations | Mode::All)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "railways" => Ok(Mode::Railways),
            "stations" => Ok(Mode::Stations),
            "all" => Ok(Mode::All),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Railways => write!(f, "railways"),
            Mode::Stations => write!(f, "stations"),
            Mode::All => write!(f, "all"),
        }
    }
}

/// Split command arguments into a mode and country keys.
///
/// The first argument is taken as the mode when it names one; everything
/// else is a country key.
pub fn parse_targets(args: &[String]) -> (Mode, Vec<String>) {
    match args.split_first() {
        Some((first, rest)) => match first.parse::<Mode>() {
            Ok(mode) => (mode, rest.to_vec()),
            Err(_) => (Mode::default(), args.to_vec()),
        },
        None => (Mode::default(), Vec::new()),
    }
}

/// Resolve country keys against the table.
///
/// No keys means every country. Unknown keys are warned about and dropped;
/// a repeated key is extracted once, at its first position.
pub fn select_countries(keys: &[String]) -> Vec<CountrySpec> {
    if keys.is_empty() {
        return countries();
    }
    let mut seen = HashSet::new();
    keys.iter()
        .filter(|key| seen.insert(key.as_str()))
        .filter_map(|key| {
            let found = find_country(key);
            if found.is_none() {
                warn!("unknown country key {key:?}, skipping");
            }
            found
        })
        .collect()
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryOutcome {
    pub key: String,
    pub name: String,
    pub railways: Option<usize>,
    pub railways_kb: Option<f64>,
    pub stations: Option<usize>,
    pub stations_kb: Option<f64>,
    pub error: Option<String>,
}

impl CountryOutcome {
    fn from_entry(key: &str, entry: &ManifestEntry) -> Self {
        Self {
            key: key.to_string(),
            name: entry.name.clone(),
            railways: entry.railways,
            railways_kb: entry.railways_kb,
            stations: entry.stations,
            stations_kb: entry.stations_kb,
            error: entry.error.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for CountryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(e) = &self.error {
            return write!(f, "✗ {} ({}): {}", self.name, self.key, e);
        }
        write!(f, "✓ {} ({})", self.name, self.key)?;
        if let Some(n) = self.railways {
            write!(f, " railways={n}")?;
            if let Some(kb) = self.railways_kb {
                write!(f, " ({kb:.1} KB)")?;
            }
        }
        if let Some(n) = self.stations {
            write!(f, " stations={n}")?;
            if let Some(kb) = self.stations_kb {
                write!(f, " ({kb:.1} KB)")?;
            }
        }
        Ok(())
    }
}

/// Result of a run, one outcome per requested country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub outcomes: Vec<CountryOutcome>,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        write!(
            f,
            "{} countries, {} failed",
            self.outcomes.len(),
            self.failures()
        )
    }
}

/// Inserts the inter-query delay before every phase but the first.
struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    async fn wait(&mut self) {
        if self.started {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

/// Drives extraction runs over a query client.
pub struct Runner<T> {
    client: QueryClient<T>,
    config: ExtractConfig,
}

impl<T: Transport> Runner<T> {
    pub fn new(transport: T, config: ExtractConfig) -> Self {
        let client = QueryClient::new(transport, config.client.clone());
        Self { client, config }
    }

    pub fn client(&self) -> &QueryClient<T> {
        &self.client
    }

    /// Extract `mode` for each country and persist the merged manifest.
    ///
    /// Only a manifest write failure is returned as an error.
    pub async fn run(
        &self,
        mode: Mode,
        countries: &[CountrySpec],
    ) -> Result<RunSummary, ManifestError> {
        let manifest_path = self.config.manifest_path();
        let mut manifest = Manifest::load_or_new(&manifest_path);
        let mut pacer = Pacer::new(self.config.inter_query_delay);
        let mut summary = RunSummary::default();

        if countries.is_empty() {
            warn!("no countries to extract");
        }

        for country in countries {
            let entry = manifest.entry_mut(country);
            match self.extract_country(mode, country, entry, &mut pacer).await {
                Ok(()) => entry.error = None,
                Err(e) => {
                    error!("{}: extraction failed: {e}", country.name);
                    entry.error = Some(e.to_string());
                }
            }
            summary
                .outcomes
                .push(CountryOutcome::from_entry(country.key, entry));
        }

        manifest.touch();
        manifest.save(&manifest_path)?;
        info!("manifest written to {}", manifest_path.display());
        Ok(summary)
    }

    async fn extract_country(
        &self,
        mode: Mode,
        country: &CountrySpec,
        entry: &mut ManifestEntry,
        pacer: &mut Pacer,
    ) -> Result<(), ExtractError> {
        if mode.includes_railways() {
            pacer.wait().await;
            let collector = RailwayCollector::new(
                &self.client,
                self.config.railway_policy.kinds(),
                self.config.inter_query_delay,
            );
            let segments = collector.collect(country).await;
            let bytes = write_compact(&self.config.railways_path(country.key), &segments)?;
            entry.record_railways(segments.len(), bytes, timestamp_now());
        }

        if mode.includes_stations() {
            pacer.wait().await;
            let collector = StationCollector::new(
                &self.client,
                self.config.station_policy,
                &self.config.lexicon,
                self.config.inter_query_delay,
            );
            let stations = collector.collect(country).await;
            let bytes = write_compact(&self.config.stations_path(country.key), &stations)?;
            entry.record_stations(stations.len(), bytes, timestamp_now());
        }

        Ok(())
    }
}

/// Write `value` as compact JSON, creating parent directories. Returns the
/// number of bytes written.
fn write_compact<V: Serialize + ?Sized>(path: &Path, value: &V) -> Result<u64, ExtractError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec(value)?;
    std::fs::write(path, &json)?;
    Ok(json.len() as u64)
}
