use crate::model::EntityKind;
use crate::snapshot::{GraphSnapshot, VertexRecord};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, params};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// SQLite store of crawl runs, each holding one graph snapshot.
pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub id: String,
    pub crawled_at: DateTime<Utc>,
    pub seed_link: Option<String>,
    pub vertex_count: usize,
    pub relation_count: usize,
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS crawl_runs (
    id TEXT PRIMARY KEY,
    crawled_at INTEGER NOT NULL,    -- unix millis
    seed_link TEXT,
    vertex_count INTEGER NOT NULL,
    relation_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS vertices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL,
    position INTEGER NOT NULL,      -- insertion order within the run
    kind TEXT NOT NULL CHECK(kind IN ('actor', 'movie')),
    identity TEXT NOT NULL,
    primary_value INTEGER NOT NULL,
    secondary_value INTEGER NOT NULL,

    FOREIGN KEY(run_id) REFERENCES crawl_runs(id) ON DELETE CASCADE,
    UNIQUE(run_id, identity)
);

CREATE INDEX IF NOT EXISTS idx_vertices_run ON vertices(run_id, position);

-- One row per undirected relation
CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL,
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    weight INTEGER NOT NULL,

    FOREIGN KEY(run_id) REFERENCES crawl_runs(id) ON DELETE CASCADE,
    UNIQUE(run_id, source, target)
);

CREATE INDEX IF NOT EXISTS idx_relations_run ON relations(run_id);
            ",
        )?;
        Ok(())
    }

    /// Store a snapshot as a new run and return the run id.
    pub fn save_snapshot(&mut self, snapshot: &GraphSnapshot, seed_link: Option<&str>) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();

        // Each relation shows up in both endpoints' adjacency; keep one.
        let relations: Vec<(&str, &str, i64)> = snapshot
            .vertices
            .iter()
            .flat_map(|v| {
                v.adjacency
                    .iter()
                    .filter(move |(neighbor, _)| v.identity.as_str() < neighbor.as_str())
                    .map(move |(neighbor, weight)| (v.identity.as_str(), neighbor.as_str(), *weight))
            })
            .collect();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO crawl_runs (id, crawled_at, seed_link, vertex_count, relation_count) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &run_id,
                snapshot.crawled_at.timestamp_millis(),
                seed_link,
                snapshot.vertices.len() as i64,
                relations.len() as i64,
            ],
        )?;

        {
            let mut insert_vertex = tx.prepare(
                "INSERT INTO vertices (run_id, position, kind, identity, primary_value, secondary_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, vertex) in snapshot.vertices.iter().enumerate() {
                insert_vertex.execute(params![
                    &run_id,
                    position as i64,
                    vertex.kind.as_str(),
                    &vertex.identity,
                    vertex.primary,
                    vertex.secondary,
                ])?;
            }

            let mut insert_relation = tx.prepare(
                "INSERT OR REPLACE INTO relations (run_id, source, target, weight) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (source, target, weight) in &relations {
                insert_relation.execute(params![&run_id, source, target, weight])?;
            }
        }

        tx.commit()?;
        Ok(run_id)
    }

    pub fn latest_run_id(&self) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT id FROM crawl_runs ORDER BY crawled_at DESC, rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, crawled_at, seed_link, vertex_count, relation_count
             FROM crawl_runs ORDER BY crawled_at DESC, rowid DESC",
        )?;

        let runs = stmt
            .query_map([], |row| {
                Ok(RunSummary {
                    id: row.get(0)?,
                    crawled_at: from_millis(row.get(1)?),
                    seed_link: row.get(2)?,
                    vertex_count: row.get::<_, i64>(3)? as usize,
                    relation_count: row.get::<_, i64>(4)? as usize,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(runs)
    }

    /// Rebuild the snapshot stored under `run_id`, in the order its vertices were saved.
    pub fn load_snapshot(&self, run_id: &str) -> Result<Option<GraphSnapshot>> {
        let crawled_at: Option<i64> = self
            .conn
            .query_row(
                "SELECT crawled_at FROM crawl_runs WHERE id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(crawled_at) = crawled_at else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT kind, identity, primary_value, secondary_value
             FROM vertices WHERE run_id = ?1 ORDER BY position",
        )?;
        let mut vertices = stmt
            .query_map(params![run_id], |row| {
                let kind: String = row.get(0)?;
                let kind = kind.parse::<EntityKind>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into())
                })?;
                Ok(VertexRecord {
                    kind,
                    identity: row.get(1)?,
                    primary: row.get(2)?,
                    secondary: row.get(3)?,
                    adjacency: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        let positions: HashMap<String, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.identity.clone(), i))
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT source, target, weight FROM relations WHERE run_id = ?1 ORDER BY id",
        )?;
        let relations = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<Result<Vec<_>>>()?;

        for (source, target, weight) in relations {
            if let (Some(&s), Some(&t)) = (positions.get(&source), positions.get(&target)) {
                vertices[s].adjacency.push((target, weight));
                vertices[t].adjacency.push((source, weight));
            }
        }
        for vertex in &mut vertices {
            vertex.adjacency.sort();
        }

        Ok(Some(GraphSnapshot {
            crawled_at: from_millis(crawled_at),
            vertices,
        }))
    }

    pub fn load_latest_snapshot(&self) -> Result<Option<GraphSnapshot>> {
        match self.latest_run_id()? {
            Some(run_id) => self.load_snapshot(&run_id),
            None => Ok(None),
        }
    }

    pub fn delete_run(&self, run_id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM crawl_runs WHERE id = ?1", params![run_id])?;
        Ok(deleted > 0)
    }
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}
