use crate::graph::GraphStore;
use crate::model::EntityKind;
use crate::query::ranked;
use std::collections::{BTreeMap, HashMap, HashSet};

pub struct Analyze<'a> {
    graph: &'a GraphStore,
}

impl<'a> Analyze<'a> {
    pub fn new(graph: &'a GraphStore) -> Self {
        Self { graph }
    }

    /// Actors with the most distinct co-stars across all crawled movies.
    pub fn hub_actors(&self, num: usize) -> Vec<(&'a str, i64)> {
        let mut co_stars: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();

        for movie in self.graph.vertices_of(EntityKind::Movie) {
            let cast: Vec<&'a str> = self
                .graph
                .neighbors(&movie.identity)
                .into_iter()
                .map(|(actor, _)| actor.identity.as_str())
                .collect();

            for &actor in &cast {
                let entry = co_stars.entry(actor).or_default();
                entry.extend(cast.iter().copied().filter(|&other| other != actor));
            }
        }

        let counts: Vec<(&'a str, i64)> = co_stars
            .into_iter()
            .map(|(actor, others)| (actor, others.len() as i64))
            .collect();
        ranked(counts, num)
    }

    /// Total gross of the movies each actor appears in, summed per actor
    /// age, for the `num` highest-grossing ages.
    pub fn gross_by_age(&self, num: usize) -> Vec<(i64, i64)> {
        let mut by_age: BTreeMap<i64, i64> = BTreeMap::new();

        for actor in self.graph.vertices_of(EntityKind::Actor) {
            let gross: i64 = self
                .graph
                .neighbors(&actor.identity)
                .iter()
                .map(|(movie, _)| movie.gross())
                .fold(0i64, i64::saturating_add);
            let total = by_age.entry(actor.primary).or_insert(0);
            *total = total.saturating_add(gross);
        }

        ranked(by_age.into_iter().collect(), num)
    }
}
