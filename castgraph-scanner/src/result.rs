use serde::{Deserialize, Serialize};

use crate::kind::EntityKind;

/// Structured record extracted from one page.
///
/// `primary` is the actor's age or the movie's release year; `secondary` is
/// the actor's cumulative gross or the movie's box-office gross.
/// `outbound_links` point at pages of the opposite kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub kind: EntityKind,
    pub identity: String,
    pub primary: i64,
    pub secondary: i64,
    pub outbound_links: Vec<String>,
}

impl PageRecord {
    pub fn actor(url: impl Into<String>, name: impl Into<String>, age: i64) -> Self {
        Self {
            url: url.into(),
            kind: EntityKind::Actor,
            identity: name.into(),
            primary: age,
            secondary: 0,
            outbound_links: Vec::new(),
        }
    }

    pub fn movie(url: impl Into<String>, title: impl Into<String>, year: i64, gross: i64) -> Self {
        Self {
            url: url.into(),
            kind: EntityKind::Movie,
            identity: title.into(),
            primary: year,
            secondary: gross,
            outbound_links: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, secondary: i64) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outbound_links = links.into_iter().map(Into::into).collect();
        self
    }
}
