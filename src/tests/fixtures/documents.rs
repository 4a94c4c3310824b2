// Shared test fixtures for documents and timestamps.
// Compiled into the crate only during tests (cfg(test) in src/lib.rs).

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::modules::notifications::core::document::Document;

/// 2024-01-01T00:00:00Z shifted by `offset` seconds.
pub fn at_second(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset)
}

/// A titled document created `offset` seconds after 2024-01-01T00:00:00Z.
pub fn document(id: &str, offset: Option<i64>) -> Document {
    Document::new(id, Some(format!("Title {id}")), offset.map(at_second))
}
