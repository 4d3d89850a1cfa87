// Tests for the crawl controller, driven by a scripted page source

use castgraph_core::crawl::{CrawlConfig, CrawlController, CrawlState, CrawlStats};
use castgraph_core::frontier::FrontierScheduler;
use castgraph_core::graph::GraphStore;
use castgraph_core::model::EntityKind;
use castgraph_core::weight::EdgeWeightPolicy;
use castgraph_scanner::error::Result as ScanResult;
use castgraph_scanner::{PageRecord, PageSource, ScanError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves canned records by link. Unknown links fail like a 404.
#[derive(Default)]
struct ScriptedSource {
    pages: HashMap<String, PageRecord>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn page(mut self, record: PageRecord) -> Self {
        self.pages.insert(record.url.clone(), record);
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl PageSource for ScriptedSource {
    async fn fetch_and_extract(&self, link: &str, _kind: EntityKind) -> ScanResult<PageRecord> {
        self.fetched.lock().unwrap().push(link.to_string());
        self.pages
            .get(link)
            .cloned()
            .ok_or_else(|| ScanError::HttpStatus {
                url: link.to_string(),
                status: 404,
            })
    }
}

fn config(actors: usize, movies: usize) -> CrawlConfig {
    CrawlConfig::default()
        .with_thresholds(actors, movies)
        .without_delay()
}

async fn crawl(
    source: ScriptedSource,
    config: CrawlConfig,
    seed: &str,
    kind: EntityKind,
) -> CrawlController<ScriptedSource> {
    let mut controller = CrawlController::new(source, config);
    controller.seed(seed, kind);
    controller.run().await.unwrap();
    controller
}

// ============================================================================
// Termination Tests
// ============================================================================

#[tokio::test]
async fn test_actor_and_movie_until_satisfied() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_secondary(100).with_links(["/wiki/M"]))
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]));

    let controller = crawl(source, config(1, 1), "/wiki/A", EntityKind::Actor).await;
    let graph = controller.graph();

    assert_eq!(controller.state(), CrawlState::Satisfied);
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.relation_count(), 1);
    assert_eq!(graph.weight("A", "M"), Some(5));
    assert_eq!(graph.weight("M", "A"), Some(5));
    assert_eq!(graph.get_vertex("A").unwrap().secondary, 100);
    assert_eq!(graph.get_vertex("M").unwrap().year(), Some(2000));
}

#[tokio::test]
async fn test_failed_seed_drains_empty() {
    let source = ScriptedSource::default();

    let controller = crawl(source, config(1, 1), "/wiki/Missing", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Drained);
    assert!(controller.graph().is_empty());
    assert!(controller.frontier().is_exhausted());
    assert_eq!(controller.stats().requests_issued, 1);
    assert_eq!(controller.stats().links_abandoned, 1);
}

#[tokio::test]
async fn test_zero_thresholds_satisfied_without_fetching() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40));

    let controller = crawl(source, config(0, 0), "/wiki/A", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Satisfied);
    assert!(controller.graph().is_empty());
    assert_eq!(controller.stats().requests_issued, 0);
}

#[tokio::test]
async fn test_thresholds_unreachable_drains() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M"]))
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]));

    let controller = crawl(source, config(10, 10), "/wiki/A", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Drained);
    assert_eq!(controller.graph().len(), 2);
    assert_eq!(controller.stats().actors_ingested, 1);
    assert_eq!(controller.stats().movies_ingested, 1);
}

// ============================================================================
// Ingestion Tests
// ============================================================================

#[tokio::test]
async fn test_two_links_same_identity_ingested_once() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M"]))
        .page(
            PageRecord::movie("/wiki/M", "M", 2000, 200)
                .with_links(["/wiki/A_(actor)", "/wiki/A"]),
        )
        .page(PageRecord::actor("/wiki/A_(actor)", "A", 40).with_links(["/wiki/M"]));

    let controller = crawl(source, config(2, 1), "/wiki/A", EntityKind::Actor).await;
    let graph = controller.graph();

    assert_eq!(controller.state(), CrawlState::Drained);
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.vertices_of(EntityKind::Actor).count(), 1);
    assert_eq!(controller.stats().actors_ingested, 1);
    assert_eq!(graph.relation_count(), 1);
    assert_eq!(controller.stats().relations_added, graph.relation_count());
    assert_eq!(
        controller
            .frontier()
            .resolve_if_visited("/wiki/A_(actor)", EntityKind::Actor),
        Some("A")
    );
}

#[tokio::test]
async fn test_kinds_alternate_and_links_resolve() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M1", "/wiki/M2"]))
        .page(PageRecord::movie("/wiki/M1", "M1", 2000, 400).with_links(["/wiki/A", "/wiki/B"]))
        .page(PageRecord::actor("/wiki/B", "B", 20).with_links(["/wiki/M1", "/wiki/M2"]))
        .page(PageRecord::movie("/wiki/M2", "M2", 2001, 100).with_links(["/wiki/A", "/wiki/B"]));

    let controller = crawl(source, config(100, 100), "/wiki/A", EntityKind::Actor).await;
    let graph = controller.graph();

    assert_eq!(controller.state(), CrawlState::Drained);
    assert_eq!(
        controller.source().fetched(),
        vec!["/wiki/A", "/wiki/M1", "/wiki/B", "/wiki/M2"]
    );
    assert_eq!(graph.relation_count(), 4);
    assert_eq!(graph.weight("A", "M1"), Some(10));
    assert_eq!(graph.weight("B", "M1"), Some(20));
    assert_eq!(graph.weight("A", "M2"), Some(2));
    assert_eq!(graph.weight("B", "M2"), Some(5));
    assert_eq!(controller.stats().relations_added, 4);
}

#[tokio::test]
async fn test_movie_seed_fetched_first() {
    let source = ScriptedSource::default()
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]))
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M"]));

    let controller = crawl(source, config(1, 1), "/wiki/M", EntityKind::Movie).await;

    assert_eq!(controller.state(), CrawlState::Satisfied);
    assert_eq!(controller.source().fetched(), vec!["/wiki/M", "/wiki/A"]);
    assert_eq!(controller.graph().weight("A", "M"), Some(5));
}

#[tokio::test]
async fn test_page_without_links_is_ingested() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/Loner", "Loner", 30));

    let controller = crawl(source, config(1, 1), "/wiki/Loner", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Drained);
    assert!(controller.graph().contains("Loner"));
    assert!(controller.graph().neighbors("Loner").is_empty());
}

#[tokio::test]
async fn test_failed_link_abandoned_and_crawl_continues() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/Broken", "/wiki/M"]))
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]));

    let controller = crawl(source, config(1, 1), "/wiki/A", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Satisfied);
    assert_eq!(controller.stats().links_abandoned, 1);
    assert_eq!(controller.frontier().abandoned_count(EntityKind::Movie), 1);
    assert!(controller.graph().contains("M"));
}

#[tokio::test]
async fn test_kind_mismatch_abandons_link() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/NotAMovie"]))
        .page(PageRecord::actor("/wiki/NotAMovie", "B", 50));

    let controller = crawl(source, config(1, 1), "/wiki/A", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Drained);
    assert!(!controller.graph().contains("B"));
    assert_eq!(controller.stats().links_abandoned, 1);
}

#[tokio::test]
async fn test_identity_collision_abandons_link() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/Heat_(actor)", "Heat", 40).with_links(["/wiki/Heat"]))
        .page(PageRecord::movie("/wiki/Heat", "Heat", 1995, 187_000_000));

    let controller = crawl(source, config(1, 1), "/wiki/Heat_(actor)", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Drained);
    assert_eq!(controller.graph().len(), 1);
    assert!(controller.graph().get_vertex("Heat").unwrap().is_actor());
    assert_eq!(controller.stats().movies_ingested, 0);
}

#[tokio::test]
async fn test_zero_age_relation_skipped() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 0).with_links(["/wiki/M"]))
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]));

    let controller = crawl(source, config(1, 1), "/wiki/A", EntityKind::Actor).await;

    assert_eq!(controller.state(), CrawlState::Satisfied);
    assert_eq!(controller.graph().len(), 2);
    assert_eq!(controller.graph().relation_count(), 0);
    assert_eq!(controller.stats().relations_skipped, 1);
}

#[tokio::test]
async fn test_unit_weight_policy() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M"]))
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]));

    let config = config(1, 1).with_weight_policy(EdgeWeightPolicy::Unit);
    let controller = crawl(source, config, "/wiki/A", EntityKind::Actor).await;

    assert_eq!(controller.graph().weight("A", "M"), Some(1));
}

// ============================================================================
// Controller Wiring Tests
// ============================================================================

#[tokio::test]
async fn test_progress_callback_sees_each_ingestion() {
    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M"]))
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/A"]));

    let seen: Arc<Mutex<Vec<(String, CrawlStats)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut controller = CrawlController::new(source, config(1, 1)).with_progress_callback(
        Arc::new(move |stats: &CrawlStats, identity: &str| {
            sink.lock().unwrap().push((identity.to_string(), stats.clone()));
        }),
    );
    controller.seed("/wiki/A", EntityKind::Actor);
    let report = controller.run().await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, "A");
    assert_eq!(seen[0].1.actors_ingested, 1);
    assert_eq!(seen[1].0, "M");
    assert_eq!(seen[1].1.movies_ingested, 1);
    assert_eq!(report.state, CrawlState::Satisfied);
    assert_eq!(report.stats.requests_issued, 2);
}

#[tokio::test]
async fn test_crawl_into_existing_graph() {
    let mut graph = GraphStore::new();
    graph.add_vertex(EntityKind::Movie, "Old", 1980, 1_000).unwrap();

    let source = ScriptedSource::default()
        .page(PageRecord::actor("/wiki/A", "A", 40));

    let mut controller = CrawlController::new(source, config(1, 0)).with_graph(graph);
    controller.seed("/wiki/A", EntityKind::Actor);
    controller.run().await.unwrap();

    let graph = controller.into_graph();
    assert!(graph.contains("Old"));
    assert!(graph.contains("A"));
}

#[tokio::test]
async fn test_seed_twice_is_ignored() {
    let mut controller = CrawlController::new(ScriptedSource::default(), config(1, 1));
    assert!(controller.seed("/wiki/A", EntityKind::Actor));
    assert!(!controller.seed("/wiki/A", EntityKind::Actor));
    assert_eq!(controller.frontier().pending(EntityKind::Actor), 1);
}

#[tokio::test]
async fn test_crawl_from_preseeded_frontier() {
    let mut frontier = FrontierScheduler::new();
    frontier.enqueue("/wiki/M", EntityKind::Movie);
    frontier.abandon("/wiki/Dead", EntityKind::Actor);

    let source = ScriptedSource::default()
        .page(PageRecord::movie("/wiki/M", "M", 2000, 200).with_links(["/wiki/Dead", "/wiki/A"]))
        .page(PageRecord::actor("/wiki/A", "A", 40).with_links(["/wiki/M"]));

    let mut controller = CrawlController::new(source, config(1, 1)).with_frontier(frontier);
    let report = controller.run().await.unwrap();

    assert_eq!(report.state, CrawlState::Satisfied);
    assert_eq!(controller.source().fetched(), vec!["/wiki/M", "/wiki/A"]);
    assert!(!controller.graph().contains("Dead"));
    assert_eq!(controller.graph().weight("A", "M"), Some(5));
    assert_eq!(report.stats.relations_added, 1);
}
