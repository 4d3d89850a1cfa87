// Weighted bipartite graph of actors and movies

use crate::error::{GraphError, Result};
use crate::model::{EntityKind, Vertex};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

/// Identity-keyed graph store.
///
/// Relations are single undirected edges, so the weight seen from either
/// endpoint is always the same and removing a vertex drops every relation
/// that touched it. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: StableUnGraph<Vertex, i64>,
    index: HashMap<String, NodeIndex>,
    order: Vec<NodeIndex>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    /// Add a vertex, or return the existing one if `identity` is already
    /// present with the same kind. A different kind is a collision.
    pub fn add_vertex(
        &mut self,
        kind: EntityKind,
        identity: &str,
        primary: i64,
        secondary: i64,
    ) -> Result<&Vertex> {
        if let Some(&idx) = self.index.get(identity) {
            let existing = self.graph[idx].kind;
            if existing != kind {
                return Err(GraphError::DuplicateIdentity {
                    identity: identity.to_string(),
                    existing,
                    attempted: kind,
                });
            }
            return Ok(&self.graph[idx]);
        }

        let idx = self
            .graph
            .add_node(Vertex::new(kind, identity, primary, secondary));
        self.index.insert(identity.to_string(), idx);
        self.order.push(idx);
        debug!("Added {} vertex '{}'", kind, identity);

        Ok(&self.graph[idx])
    }

    /// Relate an actor and a movie. A second call for the same pair
    /// overwrites the weight.
    pub fn add_relation(&mut self, a: &str, b: &str, weight: i64) -> Result<()> {
        let ia = self.node(a)?;
        let ib = self.node(b)?;

        if ia == ib {
            return Err(GraphError::InvalidRelation(format!(
                "'{}' cannot be related to itself",
                a
            )));
        }
        if self.graph[ia].kind == self.graph[ib].kind {
            return Err(GraphError::InvalidRelation(format!(
                "'{}' and '{}' are both {}s",
                a, b, self.graph[ia].kind
            )));
        }

        self.graph.update_edge(ia, ib, weight);
        debug!("Related '{}' and '{}' with weight {}", a, b, weight);
        Ok(())
    }

    pub fn get_vertex(&self, identity: &str) -> Option<&Vertex> {
        self.index.get(identity).map(|&idx| &self.graph[idx])
    }

    /// Remove a vertex together with every relation that touched it.
    pub fn remove_vertex(&mut self, identity: &str) -> Option<Vertex> {
        let idx = self.index.remove(identity)?;
        self.order.retain(|&i| i != idx);
        self.graph.remove_node(idx)
    }

    /// Overwrite a vertex's attributes. `None` keeps the current value.
    pub fn update_attributes(
        &mut self,
        identity: &str,
        primary: Option<i64>,
        secondary: Option<i64>,
    ) -> Result<&Vertex> {
        let idx = self.node(identity)?;
        let vertex = &mut self.graph[idx];
        if let Some(primary) = primary {
            vertex.primary = primary;
        }
        if let Some(secondary) = secondary {
            vertex.secondary = secondary;
        }
        Ok(&self.graph[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.order.iter().map(move |&idx| &self.graph[idx])
    }

    pub fn vertices_of(&self, kind: EntityKind) -> impl Iterator<Item = &Vertex> + '_ {
        self.iter().filter(move |v| v.kind == kind)
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<i64> {
        let ia = *self.index.get(a)?;
        let ib = *self.index.get(b)?;
        self.graph
            .find_edge(ia, ib)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Neighbors of `identity` with their relation weights, ordered by
    /// neighbor identity. Empty if the identity is unknown.
    pub fn neighbors(&self, identity: &str) -> Vec<(&Vertex, i64)> {
        let Some(&idx) = self.index.get(identity) else {
            return Vec::new();
        };

        let mut neighbors: Vec<(&Vertex, i64)> = self
            .graph
            .edges(idx)
            .map(|edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (&self.graph[other], *edge.weight())
            })
            .collect();
        neighbors.sort_by(|a, b| a.0.identity.cmp(&b.0.identity));
        neighbors
    }

    /// Adjacency of `identity` as (neighbor identity, weight) pairs.
    pub fn adjacency(&self, identity: &str) -> Vec<(String, i64)> {
        self.neighbors(identity)
            .into_iter()
            .map(|(v, w)| (v.identity.clone(), w))
            .collect()
    }

    fn node(&self, identity: &str) -> Result<NodeIndex> {
        self.index
            .get(identity)
            .copied()
            .ok_or_else(|| GraphError::UnknownIdentity(identity.to_string()))
    }
}
