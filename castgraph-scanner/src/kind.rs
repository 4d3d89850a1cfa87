use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of page the crawler visits. Every vertex in the graph is
/// exactly one of these, and relations only ever join opposite kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Actor,
    Movie,
}

impl EntityKind {
    pub fn opposite(self) -> Self {
        match self {
            EntityKind::Actor => EntityKind::Movie,
            EntityKind::Movie => EntityKind::Actor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Actor => "actor",
            EntityKind::Movie => "movie",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "actor" => Ok(EntityKind::Actor),
            "movie" | "film" => Ok(EntityKind::Movie),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}
