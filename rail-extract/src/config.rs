//! Extraction configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::collect::StationLexicon;
use crate::domain::RailwayKind;
use crate::overpass::ClientConfig;

/// Default pause between tiles and between extraction phases.
const DEFAULT_INTER_QUERY_DELAY: Duration = Duration::from_secs(5);

/// Default output directory.
const DEFAULT_OUT_DIR: &str = "data";

/// Which `railway=*` values count as track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RailwayPolicy {
    /// Operational main-line track plus planned lines.
    #[default]
    Mainline,
    /// Adds urban rail and historic track.
    Permissive,
}

impl RailwayPolicy {
    /// Railway kinds selected by this policy.
    pub fn kinds(self) -> &'static [RailwayKind] {
        match self {
            RailwayPolicy::Mainline => &[
                RailwayKind::Rail,
                RailwayKind::NarrowGauge,
                RailwayKind::LightRail,
                RailwayKind::Construction,
                RailwayKind::Proposed,
            ],
            RailwayPolicy::Permissive => &[
                RailwayKind::Rail,
                RailwayKind::NarrowGauge,
                RailwayKind::LightRail,
                RailwayKind::Construction,
                RailwayKind::Proposed,
                RailwayKind::Subway,
                RailwayKind::Tram,
                RailwayKind::Disused,
                RailwayKind::Abandoned,
                RailwayKind::Preserved,
            ],
        }
    }
}

/// Which stopping points are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StationPolicy {
    /// Named main-line stations only.
    #[default]
    Major,
    /// Halts, stops and station buildings too, with town-based naming.
    Extended,
}

/// Configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Root directory for `railways/`, `stations/` and `manifest.json`
    pub out_dir: PathBuf,

    /// Pause between tiles of a country and after each phase.
    /// Keeps the load on shared public servers polite.
    pub inter_query_delay: Duration,

    pub railway_policy: RailwayPolicy,

    pub station_policy: StationPolicy,

    /// Station words used by the extended policy and the tie-break
    pub lexicon: StationLexicon,

    /// Overpass endpoints, retries and timeouts
    pub client: ClientConfig,

    /// User agent sent to Overpass
    pub user_agent: String,
}

impl ExtractConfig {
    /// Create a config writing under `out_dir` with default settings.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            inter_query_delay: DEFAULT_INTER_QUERY_DELAY,
            railway_policy: RailwayPolicy::default(),
            station_policy: StationPolicy::default(),
            lexicon: StationLexicon::default(),
            client: ClientConfig::default(),
            user_agent: format!("rail-extract/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_inter_query_delay(mut self, delay: Duration) -> Self {
        self.inter_query_delay = delay;
        self
    }

    pub fn with_railway_policy(mut self, policy: RailwayPolicy) -> Self {
        self.railway_policy = policy;
        self
    }

    pub fn with_station_policy(mut self, policy: StationPolicy) -> Self {
        self.station_policy = policy;
        self
    }

    pub fn with_lexicon(mut self, lexicon: StationLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Path of a country's railway file.
    pub fn railways_path(&self, key: &str) -> PathBuf {
        self.out_dir.join("railways").join(format!("{key}.json"))
    }

    /// Path of a country's station file.
    pub fn stations_path(&self, key: &str) -> PathBuf {
        self.out_dir.join("stations").join(format!("{key}.json"))
    }

    /// Path of the run manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.out_dir.join("manifest.json")
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUT_DIR)
    }
}
