use crate::error::{GraphError, Result};
use crate::frontier::FrontierScheduler;
use crate::graph::GraphStore;
use crate::model::EntityKind;
use crate::weight::EdgeWeightPolicy;
use castgraph_scanner::{PageRecord, PageSource};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_ACTOR_THRESHOLD: usize = 250;
pub const DEFAULT_MOVIE_THRESHOLD: usize = 125;

/// Options for configuring a crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Minimum actor vertices before the crawl may stop
    pub actor_threshold: usize,
    /// Minimum movie vertices before the crawl may stop
    pub movie_threshold: usize,
    /// Politeness delay bounds, sampled uniformly before every fetch
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub weight_policy: EdgeWeightPolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            actor_threshold: DEFAULT_ACTOR_THRESHOLD,
            movie_threshold: DEFAULT_MOVIE_THRESHOLD,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(2),
            weight_policy: EdgeWeightPolicy::GrossPerAge,
        }
    }
}

impl CrawlConfig {
    pub fn with_thresholds(mut self, actors: usize, movies: usize) -> Self {
        self.actor_threshold = actors;
        self.movie_threshold = movies;
        self
    }

    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }

    pub fn without_delay(self) -> Self {
        self.with_delay(Duration::ZERO, Duration::ZERO)
    }

    pub fn with_weight_policy(mut self, policy: EdgeWeightPolicy) -> Self {
        self.weight_policy = policy;
        self
    }

    fn politeness_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::rng().random_range(self.min_delay..=self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlState {
    Running,
    /// Both frontiers ran dry
    Drained,
    /// Both thresholds were reached
    Satisfied,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub actors_ingested: usize,
    pub movies_ingested: usize,
    pub requests_issued: usize,
    pub links_abandoned: usize,
    pub relations_added: usize,
    pub relations_skipped: usize,
}

impl CrawlStats {
    pub fn ingested(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Actor => self.actors_ingested,
            EntityKind::Movie => self.movies_ingested,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub state: CrawlState,
    pub stats: CrawlStats,
    pub elapsed: Duration,
}

/// Callback invoked after each successful ingestion with the running stats
/// and the identity just ingested
pub type ProgressCallback = Arc<dyn Fn(&CrawlStats, &str) + Send + Sync>;

/// Drives the fetch, extract, ingest, enqueue loop over two frontiers,
/// alternating entity kinds so the walk stays bipartite-balanced.
pub struct CrawlController<S> {
    source: S,
    config: CrawlConfig,
    graph: GraphStore,
    frontier: FrontierScheduler,
    stats: CrawlStats,
    state: CrawlState,
    last_kind: Option<EntityKind>,
    started: Instant,
    progress_callback: Option<ProgressCallback>,
}

impl<S: PageSource> CrawlController<S> {
    pub fn new(source: S, config: CrawlConfig) -> Self {
        Self {
            source,
            config,
            graph: GraphStore::new(),
            frontier: FrontierScheduler::new(),
            stats: CrawlStats::default(),
            state: CrawlState::Running,
            last_kind: None,
            started: Instant::now(),
            progress_callback: None,
        }
    }

    /// Crawl into an existing graph instead of an empty one.
    pub fn with_graph(mut self, graph: GraphStore) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_frontier(mut self, frontier: FrontierScheduler) -> Self {
        self.frontier = frontier;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Queue the starting link. The first fetch prefers its kind.
    pub fn seed(&mut self, link: &str, kind: EntityKind) -> bool {
        self.last_kind = Some(kind.opposite());
        self.frontier.enqueue(link, kind)
    }

    /// Run until both thresholds are met or both frontiers are empty.
    ///
    /// Fetch and extraction failures never end the run; the offending link
    /// is abandoned. Only an inconsistency between the visited maps and the
    /// graph is returned as an error.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        self.started = Instant::now();
        self.state = CrawlState::Running;
        info!(
            "Starting crawl: {} actors / {} movies wanted, weight policy {}",
            self.config.actor_threshold, self.config.movie_threshold, self.config.weight_policy
        );

        loop {
            info!(
                "{} actors found, {} movies found",
                self.stats.actors_ingested, self.stats.movies_ingested
            );

            if self.thresholds_met() {
                self.state = CrawlState::Satisfied;
                break;
            }

            let preferred = self.last_kind.map_or(EntityKind::Actor, EntityKind::opposite);
            let Some((link, kind)) = self.frontier.next_link(preferred) else {
                self.state = CrawlState::Drained;
                break;
            };

            self.throttle().await;

            match self.source.fetch_and_extract(&link, kind).await {
                Ok(record) => self.ingest(&link, kind, record)?,
                Err(e) => {
                    warn!("Abandoning {} link {}: {}", kind, link, e);
                    self.abandon(&link, kind);
                }
            }
        }

        let report = self.report();
        info!(
            "Crawl finished ({:?}): {} actors, {} movies, {} relations after {} requests",
            report.state,
            report.stats.actors_ingested,
            report.stats.movies_ingested,
            self.graph.relation_count(),
            report.stats.requests_issued
        );
        Ok(report)
    }

    fn thresholds_met(&self) -> bool {
        self.stats.actors_ingested >= self.config.actor_threshold
            && self.stats.movies_ingested >= self.config.movie_threshold
    }

    async fn throttle(&mut self) {
        self.stats.requests_issued += 1;
        let elapsed = self.started.elapsed().as_secs_f64().max(f64::EPSILON);
        info!(
            "Request number {}; request frequency {:.2} requests/sec",
            self.stats.requests_issued,
            self.stats.requests_issued as f64 / elapsed
        );

        let delay = self.config.politeness_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn abandon(&mut self, link: &str, kind: EntityKind) {
        self.frontier.abandon(link, kind);
        self.stats.links_abandoned += 1;
        debug!(
            "{} actor / {} movie links still queued",
            self.frontier.pending(EntityKind::Actor),
            self.frontier.pending(EntityKind::Movie)
        );
    }

    fn ingest(&mut self, link: &str, kind: EntityKind, record: PageRecord) -> Result<()> {
        if record.kind != kind {
            warn!(
                "Abandoning {}: expected a {} page, extractor returned a {}",
                link, kind, record.kind
            );
            self.abandon(link, kind);
            return Ok(());
        }

        let identity = record.identity;
        let is_new = !self.graph.contains(&identity);
        let added = self
            .graph
            .add_vertex(kind, &identity, record.primary, record.secondary)
            .map(|_| ());
        match added {
            Ok(()) => {}
            Err(e @ GraphError::DuplicateIdentity { .. }) => {
                warn!("Abandoning {}: {}", link, e);
                self.abandon(link, kind);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        if is_new {
            match kind {
                EntityKind::Actor => self.stats.actors_ingested += 1,
                EntityKind::Movie => self.stats.movies_ingested += 1,
            }
            info!("Ingested {} '{}' from {}", kind, identity, link);
        } else {
            debug!("{} '{}' reached again via {}", kind, identity, link);
        }
        self.frontier.mark_visited(link, kind, &identity);

        let neighbor_kind = kind.opposite();
        for outbound in &record.outbound_links {
            match self.frontier.resolve_if_visited(outbound, neighbor_kind) {
                Some(neighbor) => {
                    let neighbor = neighbor.to_string();
                    self.relate(&identity, &neighbor)?;
                }
                None => {
                    if self.frontier.enqueue(outbound, neighbor_kind) {
                        debug!("Queued {} link {}", neighbor_kind, outbound);
                    }
                }
            }
        }

        self.last_kind = Some(kind);
        if let Some(ref callback) = self.progress_callback {
            callback(&self.stats, &identity);
        }
        Ok(())
    }

    fn relate(&mut self, identity: &str, neighbor: &str) -> Result<()> {
        let weight = {
            let vertex = self
                .graph
                .get_vertex(identity)
                .ok_or_else(|| GraphError::UnknownIdentity(identity.to_string()))?;
            let other = self
                .graph
                .get_vertex(neighbor)
                .ok_or_else(|| GraphError::UnknownIdentity(neighbor.to_string()))?;
            self.config.weight_policy.weight_between(vertex, other)
        };

        match weight {
            Ok(weight) => {
                let is_new = self.graph.weight(identity, neighbor).is_none();
                self.graph.add_relation(identity, neighbor, weight)?;
                if is_new {
                    self.stats.relations_added += 1;
                }
                info!(
                    "Adding an edge between '{}' and '{}' with weight {}",
                    identity, neighbor, weight
                );
            }
            Err(e @ GraphError::DegenerateWeight { .. }) => {
                warn!("Skipping relation: {}", e);
                self.stats.relations_skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            state: self.state,
            stats: self.stats.clone(),
            elapsed: self.started.elapsed(),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn frontier(&self) -> &FrontierScheduler {
        &self.frontier
    }

    pub fn into_graph(self) -> GraphStore {
        self.graph
    }
}
