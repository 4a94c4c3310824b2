// Pure selection of the documents a tick has to notify.
//
// Purpose
// - Given the watermark and one collection's documents, pick those created strictly after the watermark.
//
// Responsibilities
// - Skip documents without a creation timestamp. They are never retried.
// - Keep the store's ascending order.
// - Never perform input or output.

use chrono::{DateTime, Utc};

use crate::modules::notifications::core::document::Document;
use crate::modules::notifications::core::watermark::Watermark;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub document: &'a Document,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection<'a> {
    pub candidates: Vec<Candidate<'a>>,
    pub skipped_without_timestamp: usize,
    pub already_notified: usize,
}

pub fn select_new<'a>(watermark: &Watermark, documents: &'a [Document]) -> Selection<'a> {
    let mut selection = Selection::default();
    for document in documents {
        match document.created_at {
            None => selection.skipped_without_timestamp += 1,
            Some(created_at) if watermark.admits(created_at) => {
                selection.candidates.push(Candidate {
                    document,
                    created_at,
                })
            }
            Some(_) => selection.already_notified += 1,
        }
    }
    selection
}
