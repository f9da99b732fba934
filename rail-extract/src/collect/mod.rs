//! Railway and station collectors.
//!
//! Collectors drive the Overpass client for one country and turn raw
//! elements into output records. All deduplication state lives in
//! accumulators owned by a single `collect` call, so collections never
//! share state.

mod gazetteer;
mod lexicon;
mod railways;
mod stations;

pub use gazetteer::{Gazetteer, Town};
pub use lexicon::{LanguageTokens, LexiconError, StationLexicon};
pub use railways::{RailwayCollector, SegmentAccumulator};
pub use stations::{
    BUILDING_TOWN_RADIUS_KM, StationAccumulator, StationCandidate, StationCollector,
    StationNormalizer, TOWN_NAME_RADIUS_KM,
};
