// Watermark: the creation timestamp at or below which every document counts as notified.
//
// Responsibilities
// - Decide whether a document timestamp is new (strictly after the watermark).
// - Advance to the newest timestamp seen, never backwards.
//
// Text form
// - RFC 3339 in UTC with a `Z` suffix and the sub-second digits that are present.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }

    /// Equal timestamps are treated as already delivered.
    pub fn admits(&self, created_at: DateTime<Utc>) -> bool {
        created_at > self.0
    }

    pub fn advance(self, created_at: DateTime<Utc>) -> Self {
        Self(self.0.max(created_at))
    }

    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(text.trim()).map(|at| Self(at.with_timezone(&Utc)))
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Where the watermark starts when nothing has been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialWatermark {
    /// Ignore everything that already exists.
    #[default]
    Now,
    /// Notify every document already in the store.
    Epoch,
}

impl InitialWatermark {
    pub fn resolve(self, now: DateTime<Utc>) -> Watermark {
        match self {
            InitialWatermark::Now => Watermark::new(now),
            InitialWatermark::Epoch => Watermark::new(DateTime::UNIX_EPOCH),
        }
    }
}
