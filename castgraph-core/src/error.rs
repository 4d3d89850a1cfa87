use castgraph_scanner::EntityKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("identity '{identity}' already exists as {existing}, cannot add it as {attempted}")]
    DuplicateIdentity {
        identity: String,
        existing: EntityKind,
        attempted: EntityKind,
    },

    #[error("unknown identity '{0}'")]
    UnknownIdentity(String),

    #[error("invalid relation: {0}")]
    InvalidRelation(String),

    #[error("degenerate weight between movie '{movie}' and actor '{actor}' (divisor {divisor})")]
    DegenerateWeight {
        movie: String,
        actor: String,
        divisor: i64,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Failures while saving or loading a graph snapshot.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Snapshot is inconsistent: {0}")]
    Graph(#[from] GraphError),
}
