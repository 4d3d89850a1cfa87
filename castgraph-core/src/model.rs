use serde::{Deserialize, Serialize};

pub use castgraph_scanner::EntityKind;

/// An actor or a movie. Adjacency lives in the `GraphStore`, which keeps
/// it symmetric; the vertex itself only carries identity and attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub kind: EntityKind,
    pub identity: String,
    /// Age for an actor, release year for a movie.
    pub primary: i64,
    /// Cumulative gross for an actor, box-office gross for a movie.
    pub secondary: i64,
}

impl Vertex {
    pub fn new(kind: EntityKind, identity: impl Into<String>, primary: i64, secondary: i64) -> Self {
        Self {
            kind,
            identity: identity.into(),
            primary,
            secondary,
        }
    }

    pub fn is_actor(&self) -> bool {
        self.kind == EntityKind::Actor
    }

    pub fn is_movie(&self) -> bool {
        self.kind == EntityKind::Movie
    }

    pub fn age(&self) -> Option<i64> {
        self.is_actor().then_some(self.primary)
    }

    pub fn year(&self) -> Option<i64> {
        self.is_movie().then_some(self.primary)
    }

    pub fn gross(&self) -> i64 {
        self.secondary
    }
}
