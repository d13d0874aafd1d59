//! In-memory listing of stored tracks.
//!
//! The index is an owned value: whoever owns track storage rebuilds it from
//! the stored summaries and keeps it in step with writes through `upsert`
//! and `remove`.

use std::cmp::Reverse;

use chrono::{DateTime, FixedOffset};

use crate::gpx_types::{TrackOverview, TrackSummary};

/// Point-less overviews, newest start time first.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    entries: Vec<TrackOverview>,
}

impl TrackIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from scratch.
    ///
    /// Tracks without a parsable start time sort after all dated tracks;
    /// equal keys keep their input order.
    pub fn rebuild<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a TrackSummary>,
    {
        let mut index = Self {
            entries: summaries.into_iter().map(TrackSummary::overview).collect(),
        };
        index.sort();
        tracing::debug!(tracks = index.entries.len(), "rebuilt track index");
        index
    }

    /// Insert a summary, replacing any entry with the same id.
    pub fn upsert(&mut self, summary: &TrackSummary) {
        let overview = summary.overview();
        match self.entries.iter_mut().find(|e| e.id == overview.id) {
            Some(existing) => *existing = overview,
            None => self.entries.push(overview),
        }
        self.sort();
    }

    /// Remove the entry with `id`. Returns whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&TrackOverview> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackOverview> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        self.entries.sort_by_cached_key(|e| Reverse(start_instant(e)));
    }
}

fn start_instant(entry: &TrackOverview) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(entry.start_time.as_deref()?).ok()
}
