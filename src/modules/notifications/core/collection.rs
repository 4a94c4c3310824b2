use std::fmt;

/// A Firestore collection watched for new documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    News,
    Events,
    Files,
}

/// Collections are drained one after the other in this order on every tick.
pub const PRIORITY_ORDER: [Collection; 3] = [Collection::News, Collection::Events, Collection::Files];

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::News => "news",
            Collection::Events => "events",
            Collection::Files => "files",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod collection_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_drain_news_before_events_before_files() {
        assert_eq!(
            PRIORITY_ORDER.map(|c| c.as_str()),
            ["news", "events", "files"]
        );
    }

    #[rstest]
    #[case(Collection::News, "news")]
    #[case(Collection::Events, "events")]
    #[case(Collection::Files, "files")]
    fn it_should_display_the_firestore_collection_id(#[case] collection: Collection, #[case] id: &str) {
        assert_eq!(collection.to_string(), id);
    }
}
