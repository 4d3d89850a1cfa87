use crate::error::{GraphError, Result};
use crate::model::{EntityKind, Vertex};
use std::fmt;
use std::str::FromStr;

/// How the weight of an actor–movie relation is derived.
///
/// A crawl run uses exactly one policy for every relation it records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeWeightPolicy {
    /// Movie gross divided by actor age, truncated toward zero.
    #[default]
    GrossPerAge,
    /// Every relation weighs 1.
    Unit,
}

impl EdgeWeightPolicy {
    pub fn compute_weight(&self, movie: &Vertex, actor: &Vertex) -> Result<i64> {
        if movie.kind != EntityKind::Movie || actor.kind != EntityKind::Actor {
            return Err(GraphError::InvalidRelation(format!(
                "weight needs a movie and an actor, got {} '{}' and {} '{}'",
                movie.kind, movie.identity, actor.kind, actor.identity
            )));
        }

        match self {
            EdgeWeightPolicy::GrossPerAge => {
                let age = actor.primary;
                if age <= 0 {
                    return Err(GraphError::DegenerateWeight {
                        movie: movie.identity.clone(),
                        actor: actor.identity.clone(),
                        divisor: age,
                    });
                }
                Ok(movie.secondary / age)
            }
            EdgeWeightPolicy::Unit => Ok(1),
        }
    }

    /// Same as `compute_weight`, but accepts the two endpoints in either order.
    pub fn weight_between(&self, a: &Vertex, b: &Vertex) -> Result<i64> {
        match a.kind {
            EntityKind::Movie => self.compute_weight(a, b),
            EntityKind::Actor => self.compute_weight(b, a),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeWeightPolicy::GrossPerAge => "gross-per-age",
            EdgeWeightPolicy::Unit => "unit",
        }
    }
}

impl fmt::Display for EdgeWeightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeWeightPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gross-per-age" => Ok(EdgeWeightPolicy::GrossPerAge),
            "unit" => Ok(EdgeWeightPolicy::Unit),
            other => Err(format!("unknown weight policy '{}'", other)),
        }
    }
}
