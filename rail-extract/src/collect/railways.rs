//! Railway track collection across tiles.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{CountrySpec, RailwayKind, RailwaySegment};
use crate::overpass::{Element, ElementType, QueryClient, Transport, query};
use crate::tiling;

/// Unique segments gathered during one country's collection.
///
/// Adjacent tiles return the same boundary-crossing way with the same id,
/// so ids already seen are skipped. Owned by a single collection run.
#[derive(Debug, Default)]
pub struct SegmentAccumulator {
    seen: HashSet<i64>,
    segments: Vec<RailwaySegment>,
}

impl SegmentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a way element. Returns whether a new segment was recorded.
    ///
    /// Non-ways, repeated ids, and ways with fewer than two points are
    /// ignored. A degenerate way does not mark its id as seen, so a later
    /// copy with full geometry still counts.
    pub fn add(&mut self, element: &Element) -> bool {
        if element.kind != ElementType::Way || self.seen.contains(&element.id) {
            return false;
        }

        let kind = RailwayKind::from_tag(element.tag("railway"));
        match RailwaySegment::from_points(element.id, kind, element.points()) {
            Some(segment) => {
                self.seen.insert(element.id);
                self.segments.push(segment);
                true
            }
            None => false,
        }
    }

    /// Add every element of a response; returns how many were new.
    pub fn extend<'e>(&mut self, elements: impl IntoIterator<Item = &'e Element>) -> usize {
        elements.into_iter().filter(|e| self.add(e)).count()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in insertion order.
    pub fn into_segments(self) -> Vec<RailwaySegment> {
        self.segments
    }
}

/// Collects railway segments for a country, tile by tile.
pub struct RailwayCollector<'a, T> {
    client: &'a QueryClient<T>,
    kinds: &'a [RailwayKind],
    tile_delay: Duration,
}

impl<'a, T: Transport> RailwayCollector<'a, T> {
    pub fn new(
        client: &'a QueryClient<T>,
        kinds: &'a [RailwayKind],
        tile_delay: Duration,
    ) -> Self {
        Self {
            client,
            kinds,
            tile_delay,
        }
    }

    /// Query every tile of the country and return unique segments.
    ///
    /// A tile whose query fails on every endpoint is skipped; the result
    /// then covers the rest of the country.
    pub async fn collect(&self, country: &CountrySpec) -> Vec<RailwaySegment> {
        let tiles = tiling::plan(&country.bbox, country.tile_size_deg());
        let timeout = self.client.config().server_timeout_secs();
        let mut acc = SegmentAccumulator::new();

        info!(
            "{}: fetching railways in {} tile(s) ({} country)",
            country.name,
            tiles.len(),
            country.size
        );

        for (i, tile) in tiles.iter().enumerate() {
            info!("{}: railway tile {}/{}", country.name, i + 1, tiles.len());

            let q = query::railways(tile, self.kinds, timeout);
            match self.client.execute(&q).await {
                Some(response) => {
                    let added = acc.extend(&response.elements);
                    debug!(
                        "{}: tile {} returned {} ways, {} new",
                        country.name,
                        i + 1,
                        response.elements.len(),
                        added
                    );
                }
                None => warn!(
                    "{}: railway tile {} failed on all endpoints, skipping",
                    country.name,
                    i + 1
                ),
            }

            if i + 1 < tiles.len() {
                tokio::time::sleep(self.tile_delay).await;
            }
        }

        info!("{}: {} railway segments", country.name, acc.len());
        acc.into_segments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RailwayPolicy;
    use crate::domain::{BoundingBox, SizeClass};
    use crate::overpass::mock::{MockTransport, elements_body, node_json, way_json};
    use crate::overpass::{ClientConfig, HttpReply, OverpassResponse};
    use tokio::time::Instant;

    fn element(json: &str) -> Element {
        serde_json::from_str(json).unwrap()
    }

    fn country(bbox: [f64; 4], size: SizeClass) -> CountrySpec {
        CountrySpec {
            key: "testland",
            name: "Testland",
            code: "TL",
            bbox: BoundingBox::try_from(bbox).unwrap(),
            size,
        }
    }

    fn client(transport: MockTransport) -> QueryClient<MockTransport> {
        QueryClient::new(
            transport,
            ClientConfig::new()
                .with_endpoints(["https://a.test/api", "https://b.test/api"])
                .with_retry_delay(Duration::from_secs(1)),
        )
    }

    #[test]
    fn same_way_twice_yields_one_segment() {
        let way = element(&way_json(10, Some("rail"), &[(1.0, 1.0), (1.5, 1.5)]));
        let mut acc = SegmentAccumulator::new();

        assert!(acc.add(&way));
        assert!(!acc.add(&way));

        let segments = acc.into_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 10);
    }

    #[test]
    fn skips_degenerate_and_non_ways() {
        let mut acc = SegmentAccumulator::new();
        assert!(!acc.add(&element(&way_json(1, Some("rail"), &[(1.0, 1.0)]))));
        assert!(!acc.add(&element(&node_json(2, 1.0, 1.0, &[("railway", "rail")]))));
        assert!(acc.is_empty());

        // A later full copy of the degenerate way is accepted
        assert!(acc.add(&element(&way_json(1, Some("rail"), &[(1.0, 1.0), (2.0, 2.0)]))));
    }

    #[test]
    fn missing_tag_defaults_to_rail_and_rounds() {
        let mut acc = SegmentAccumulator::new();
        acc.add(&element(&way_json(
            3,
            None,
            &[(12.123456789, 45.0), (12.2, 45.987654321)],
        )));
        let seg = &acc.into_segments()[0];
        assert_eq!(seg.kind, RailwayKind::Rail);
        assert_eq!(seg.coords, vec![[12.12346, 45.0], [12.2, 45.98765]]);
    }

    #[test]
    fn insertion_order_kept() {
        let response: OverpassResponse = serde_json::from_str(&elements_body(&[
            way_json(30, Some("rail"), &[(0.0, 0.0), (0.1, 0.1)]),
            way_json(10, Some("tram"), &[(0.0, 0.0), (0.1, 0.1)]),
            way_json(20, Some("proposed"), &[(0.0, 0.0), (0.1, 0.1)]),
        ]))
        .unwrap();
        let mut acc = SegmentAccumulator::new();
        assert_eq!(acc.extend(&response.elements), 3);
        let ids: Vec<_> = acc.into_segments().iter().map(|s| s.id).collect();
        assert_eq!(ids, [30, 10, 20]);
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_way_from_two_tiles_counted_once() {
        // Every tile returns the same crossing way plus one of its own
        let transport = MockTransport::new(|_, body| {
            let own = if body.contains("(0,0,") { 1 } else { 2 };
            Ok(HttpReply::ok(elements_body(&[
                way_json(99, Some("rail"), &[(5.0, 5.0), (5.0, 7.0)]),
                way_json(own, Some("narrow_gauge"), &[(1.0, 1.0), (1.0, 2.0)]),
            ])))
        });
        let client = client(transport);
        let kinds = RailwayPolicy::Mainline.kinds();
        let collector = RailwayCollector::new(&client, kinds, Duration::from_secs(5));

        // 10 x 6 degrees at 5 degree tiles: two rows, two columns
        let segments = collector
            .collect(&country([0.0, 0.0, 10.0, 6.0], SizeClass::Medium))
            .await;

        let ids: Vec<_> = segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, [99, 1, 2]);
        assert_eq!(client.transport().call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_between_tiles_only() {
        let transport = MockTransport::new(|_, _| Ok(HttpReply::ok(elements_body(&[]))));
        let client = client(transport);
        let collector =
            RailwayCollector::new(&client, RailwayPolicy::Mainline.kinds(), Duration::from_secs(5));

        let start = Instant::now();
        collector
            .collect(&country([0.0, 0.0, 10.0, 6.0], SizeClass::Medium))
            .await;

        // Four tiles, three gaps
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tile_is_skipped_and_run_continues() {
        // The first tile's query fails with 500 on every endpoint
        let transport = MockTransport::new(|_, body| {
            if body.contains("(0,0,") {
                Ok(HttpReply::status(500))
            } else {
                Ok(HttpReply::ok(elements_body(&[way_json(
                    7,
                    Some("rail"),
                    &[(6.0, 1.0), (7.0, 1.0)],
                )])))
            }
        });
        let client = client(transport);
        let collector =
            RailwayCollector::new(&client, RailwayPolicy::Mainline.kinds(), Duration::ZERO);

        let segments = collector
            .collect(&country([0.0, 0.0, 10.0, 4.0], SizeClass::Medium))
            .await;

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 7);
        // Two endpoints for the failing tile, one for the second
        assert_eq!(client.transport().call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn small_country_is_one_query() {
        let transport = MockTransport::new(|_, _| Ok(HttpReply::ok(elements_body(&[]))));
        let client = client(transport);
        let collector =
            RailwayCollector::new(&client, RailwayPolicy::Permissive.kinds(), Duration::ZERO);

        let segments = collector
            .collect(&country([33.0, 35.1, 34.7, 36.7], SizeClass::Small))
            .await;

        assert!(segments.is_empty());
        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("(33,35.1,34.7,36.7)"));
        assert!(calls[0].1.contains("subway|tram|disused|abandoned|preserved"));
    }
}
