use crate::model::EntityKind;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Default, Clone)]
struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    /// link -> identity of the vertex it was ingested as
    visited: HashMap<String, String>,
    abandoned: HashSet<String>,
}

impl Frontier {
    fn is_known(&self, link: &str) -> bool {
        self.visited.contains_key(link) || self.queued.contains(link) || self.abandoned.contains(link)
    }

    fn pop(&mut self) -> Option<String> {
        let link = self.queue.pop_front()?;
        self.queued.remove(&link);
        Some(link)
    }
}

/// Two FIFO frontiers, one per entity kind, plus the visited maps used for
/// dedup and for turning links to already-ingested pages into relations.
#[derive(Debug, Default, Clone)]
pub struct FrontierScheduler {
    actors: Frontier,
    movies: Frontier,
}

impl FrontierScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn frontier(&self, kind: EntityKind) -> &Frontier {
        match kind {
            EntityKind::Actor => &self.actors,
            EntityKind::Movie => &self.movies,
        }
    }

    fn frontier_mut(&mut self, kind: EntityKind) -> &mut Frontier {
        match kind {
            EntityKind::Actor => &mut self.actors,
            EntityKind::Movie => &mut self.movies,
        }
    }

    /// Queue `link` unless it was already ingested, abandoned, or queued.
    /// Returns whether the link was added.
    pub fn enqueue(&mut self, link: &str, kind: EntityKind) -> bool {
        let frontier = self.frontier_mut(kind);
        if frontier.is_known(link) {
            return false;
        }
        frontier.queued.insert(link.to_string());
        frontier.queue.push_back(link.to_string());
        true
    }

    /// Record that `link` was ingested as `identity`. Returns false if the
    /// link was already recorded, in which case the first mapping is kept.
    pub fn mark_visited(&mut self, link: &str, kind: EntityKind, identity: &str) -> bool {
        let frontier = self.frontier_mut(kind);
        if frontier.visited.contains_key(link) {
            debug!("{} link {} was already marked visited", kind, link);
            return false;
        }
        frontier.queued.remove(link);
        frontier
            .visited
            .insert(link.to_string(), identity.to_string());
        true
    }

    /// Give up on `link` for the rest of the run.
    pub fn abandon(&mut self, link: &str, kind: EntityKind) {
        let frontier = self.frontier_mut(kind);
        if frontier.queued.remove(link) {
            frontier.queue.retain(|queued| queued != link);
        }
        frontier.abandoned.insert(link.to_string());
    }

    pub fn resolve_if_visited(&self, link: &str, kind: EntityKind) -> Option<&str> {
        self.frontier(kind).visited.get(link).map(String::as_str)
    }

    /// Dequeue from the preferred kind's frontier, falling back to the other.
    pub fn next_link(&mut self, preferred: EntityKind) -> Option<(String, EntityKind)> {
        if let Some(link) = self.frontier_mut(preferred).pop() {
            return Some((link, preferred));
        }
        let other = preferred.opposite();
        self.frontier_mut(other).pop().map(|link| (link, other))
    }

    pub fn pending(&self, kind: EntityKind) -> usize {
        self.frontier(kind).queue.len()
    }

    pub fn visited_count(&self, kind: EntityKind) -> usize {
        self.frontier(kind).visited.len()
    }

    pub fn abandoned_count(&self, kind: EntityKind) -> usize {
        self.frontier(kind).abandoned.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.actors.queue.is_empty() && self.movies.queue.is_empty()
    }
}
