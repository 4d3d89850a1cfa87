// Graph snapshots and their JSON file encoding

use crate::error::{PersistError, Result};
use crate::graph::GraphStore;
use crate::model::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub kind: EntityKind,
    pub identity: String,
    pub primary: i64,
    pub secondary: i64,
    /// (neighbor identity, weight)
    #[serde(default)]
    pub adjacency: Vec<(String, i64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub crawled_at: DateTime<Utc>,
    pub vertices: Vec<VertexRecord>,
}

impl GraphStore {
    pub fn snapshot(&self) -> GraphSnapshot {
        let vertices = self
            .iter()
            .map(|vertex| VertexRecord {
                kind: vertex.kind,
                identity: vertex.identity.clone(),
                primary: vertex.primary,
                secondary: vertex.secondary,
                adjacency: self.adjacency(&vertex.identity),
            })
            .collect();

        GraphSnapshot {
            crawled_at: Utc::now(),
            vertices,
        }
    }

    /// Rebuild a store from a snapshot. Every adjacency entry must name a
    /// vertex present in the snapshot.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self> {
        let mut graph = GraphStore::new();
        for record in &snapshot.vertices {
            graph.add_vertex(record.kind, &record.identity, record.primary, record.secondary)?;
        }
        for record in &snapshot.vertices {
            for (neighbor, weight) in &record.adjacency {
                graph.add_relation(&record.identity, neighbor, *weight)?;
            }
        }
        Ok(graph)
    }
}

pub fn save(path: &Path, snapshot: &GraphSnapshot) -> std::result::Result<(), PersistError> {
    info!("Saving {} vertices to {}", snapshot.vertices.len(), path.display());
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load(path: &Path) -> std::result::Result<GraphSnapshot, PersistError> {
    info!("Loading snapshot from {}", path.display());
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Load a snapshot file straight into a graph store.
pub fn load_graph(path: &Path) -> std::result::Result<GraphStore, PersistError> {
    let snapshot = load(path)?;
    Ok(GraphStore::from_snapshot(&snapshot)?)
}
