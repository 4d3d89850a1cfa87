// Read-only queries over a crawled graph

use crate::graph::GraphStore;
use crate::model::{EntityKind, Vertex};
use std::collections::HashSet;

/// Any-match filter: a vertex passes if its identity contains one of
/// `names`, or its primary attribute is in `primary`, or its secondary
/// attribute is in `secondary`. An empty filter passes everything.
#[derive(Debug, Clone, Default)]
pub struct VertexFilter {
    pub names: Vec<String>,
    pub primary: Vec<i64>,
    pub secondary: Vec<i64>,
}

impl VertexFilter {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.primary.is_empty() && self.secondary.is_empty()
    }

    pub fn matches(&self, vertex: &Vertex) -> bool {
        self.is_empty()
            || self.names.iter().any(|name| vertex.identity.contains(name.as_str()))
            || self.primary.contains(&vertex.primary)
            || self.secondary.contains(&vertex.secondary)
    }
}

pub struct Query<'a> {
    graph: &'a GraphStore,
}

impl<'a> Query<'a> {
    pub fn new(graph: &'a GraphStore) -> Self {
        Self { graph }
    }

    fn of_kind(&self, identity: &str, kind: EntityKind) -> Option<&'a Vertex> {
        self.graph.get_vertex(identity).filter(|v| v.kind == kind)
    }

    /// Box-office gross of a movie.
    pub fn gross(&self, movie: &str) -> Option<i64> {
        self.of_kind(movie, EntityKind::Movie).map(Vertex::gross)
    }

    /// Movies the actor appears in, or `None` for an unknown actor.
    pub fn movies_of(&self, actor: &str) -> Option<Vec<&'a str>> {
        self.of_kind(actor, EntityKind::Actor)?;
        Some(
            self.graph
                .neighbors(actor)
                .into_iter()
                .map(|(v, _)| v.identity.as_str())
                .collect(),
        )
    }

    /// Cast of a movie, or `None` for an unknown movie.
    pub fn actors_in(&self, movie: &str) -> Option<Vec<&'a str>> {
        self.of_kind(movie, EntityKind::Movie)?;
        Some(
            self.graph
                .neighbors(movie)
                .into_iter()
                .map(|(v, _)| v.identity.as_str())
                .collect(),
        )
    }

    /// Actors ranked by the total weight of their relations.
    pub fn top_actors(&self, num: usize) -> Vec<(&'a str, i64)> {
        let totals: Vec<(&'a str, i64)> = self
            .graph
            .vertices_of(EntityKind::Actor)
            .map(|actor| {
                let total: i64 = self
                    .graph
                    .neighbors(&actor.identity)
                    .iter()
                    .map(|(_, weight)| *weight)
                    .fold(0i64, i64::saturating_add);
                (actor.identity.as_str(), total)
            })
            .collect();
        ranked(totals, num)
    }

    pub fn oldest_actors(&self, num: usize) -> Vec<(&'a str, i64)> {
        let ages: Vec<(&'a str, i64)> = self
            .graph
            .vertices_of(EntityKind::Actor)
            .map(|actor| (actor.identity.as_str(), actor.primary))
            .collect();
        ranked(ages, num)
    }

    pub fn movies_in_year(&self, year: i64) -> Vec<&'a str> {
        self.graph
            .vertices_of(EntityKind::Movie)
            .filter(|movie| movie.primary == year)
            .map(|movie| movie.identity.as_str())
            .collect()
    }

    /// Distinct actors appearing in any movie released in `year`.
    pub fn actors_in_year(&self, year: i64) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut actors = Vec::new();
        for movie in self.movies_in_year(year) {
            for (actor, _) in self.graph.neighbors(movie) {
                if seen.insert(actor.identity.as_str()) {
                    actors.push(actor.identity.as_str());
                }
            }
        }
        actors
    }

    pub fn filter(&self, kind: EntityKind, filter: &VertexFilter) -> Vec<&'a Vertex> {
        self.graph
            .vertices_of(kind)
            .filter(|v| filter.matches(v))
            .collect()
    }

    pub fn filter_actors(&self, names: &[String], ages: &[i64], grosses: &[i64]) -> Vec<&'a Vertex> {
        let filter = VertexFilter {
            names: names.to_vec(),
            primary: ages.to_vec(),
            secondary: grosses.to_vec(),
        };
        self.filter(EntityKind::Actor, &filter)
    }

    pub fn filter_movies(&self, names: &[String], years: &[i64], grosses: &[i64]) -> Vec<&'a Vertex> {
        let filter = VertexFilter {
            names: names.to_vec(),
            primary: years.to_vec(),
            secondary: grosses.to_vec(),
        };
        self.filter(EntityKind::Movie, &filter)
    }
}

/// Sort descending by value, ties by name, and keep the first `num`.
pub(crate) fn ranked<K: Ord>(mut entries: Vec<(K, i64)>, num: usize) -> Vec<(K, i64)> {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(num);
    entries
}
