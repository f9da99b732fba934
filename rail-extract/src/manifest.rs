//! Output manifest.
//!
//! The manifest indexes what each run produced per country. It is merged
//! across runs: an existing file is read back and only the countries touched
//! by the current run are updated.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{BoundingBox, CountrySpec};

/// Errors loading or saving the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Current UTC time as an ISO-8601 timestamp with second precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Per-country record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    pub code: String,
    pub bbox: BoundingBox,

    /// Number of railway segments written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub railways: Option<usize>,

    /// Number of stations written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stations: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub railways_kb: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stations_kb: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub railways_extracted_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stations_extracted_at: Option<String>,

    /// Set when the last run for this country failed. Supersedes the
    /// success fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ManifestEntry {
    /// A fresh entry with no output recorded.
    pub fn new(country: &CountrySpec) -> Self {
        Self {
            name: country.name.to_string(),
            code: country.code.to_string(),
            bbox: country.bbox,
            railways: None,
            stations: None,
            railways_kb: None,
            stations_kb: None,
            railways_extracted_at: None,
            stations_extracted_at: None,
            error: None,
        }
    }

    /// Record a written railway file.
    pub fn record_railways(&mut self, count: usize, bytes: u64, at: String) {
        self.railways = Some(count);
        self.railways_kb = Some(kilobytes(bytes));
        self.railways_extracted_at = Some(at);
    }

    /// Record a written station file.
    pub fn record_stations(&mut self, count: usize, bytes: u64, at: String) {
        self.stations = Some(count);
        self.stations_kb = Some(kilobytes(bytes));
        self.stations_extracted_at = Some(at);
    }
}

/// Size in kilobytes, rounded to one decimal.
fn kilobytes(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 10.0).round() / 10.0
}

/// The persisted index of all extracted countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// When the manifest was last written
    pub generated: String,

    /// Entries keyed by country key, in key order
    #[serde(default)]
    pub countries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// An empty manifest stamped with the current time.
    pub fn new() -> Self {
        Self {
            generated: timestamp_now(),
            countries: BTreeMap::new(),
        }
    }

    /// Read a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Read a manifest, starting empty if it is missing or unreadable.
    pub fn load_or_new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::new();
        }
        match Self::load(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("ignoring unreadable manifest {}: {e}", path.display());
                Self::new()
            }
        }
    }

    /// Write the manifest as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Entry for a country, created if absent.
    ///
    /// Static fields are refreshed from the country table so renamed or
    /// resized countries are reflected on the next run.
    pub fn entry_mut(&mut self, country: &CountrySpec) -> &mut ManifestEntry {
        let entry = self
            .countries
            .entry(country.key.to_string())
            .or_insert_with(|| ManifestEntry::new(country));
        entry.name = country.name.to_string();
        entry.code = country.code.to_string();
        entry.bbox = country.bbox;
        entry
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.countries.get(key)
    }

    /// Stamp the manifest with the current time.
    pub fn touch(&mut self) {
        self.generated = timestamp_now();
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}
