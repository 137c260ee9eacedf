//! Per-list query cache.
//!
//! Each wine list has its own entry. Only the coordinator writes to it; the
//! public surface is read-only snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::domain::{CachedWine, Wine, WineListId};

/// Read-only view of one cache entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub data: Option<Vec<CachedWine>>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_error: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl QueryState {
    pub fn rows(&self) -> &[CachedWine] {
        self.data.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct QueryEntry {
    data: Option<Vec<CachedWine>>,
    inflight: usize,
    generation: u64,
    error: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<WineListId, QueryEntry>,
}

/// Handle returned when a fetch starts; the result is only accepted while the
/// entry's generation still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    list_id: WineListId,
    generation: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, list_id: WineListId) -> QueryState {
        let Some(entry) = self.entries.get(&list_id) else {
            return QueryState::default();
        };
        QueryState {
            data: entry.data.clone(),
            is_loading: entry.data.is_none() && entry.inflight > 0,
            is_fetching: entry.inflight > 0,
            is_error: entry.error.is_some(),
            error: entry.error.clone(),
            updated_at: entry.updated_at,
        }
    }

    pub fn collection(&self, list_id: WineListId) -> Option<&[CachedWine]> {
        self.entries.get(&list_id)?.data.as_deref()
    }

    pub(crate) fn begin_fetch(&mut self, list_id: WineListId) -> FetchTicket {
        let entry = self.entries.entry(list_id).or_default();
        entry.inflight += 1;
        FetchTicket {
            list_id,
            generation: entry.generation,
        }
    }

    /// Stores a fetch result. Returns false when the fetch was cancelled
    /// after it started, in which case nothing is written.
    pub(crate) fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Wine>, String>,
    ) -> bool {
        let entry = self.entries.entry(ticket.list_id).or_default();
        if entry.generation != ticket.generation {
            return false;
        }
        entry.inflight = entry.inflight.saturating_sub(1);
        match result {
            Ok(wines) => {
                entry.data = Some(wines.into_iter().map(CachedWine::from).collect());
                entry.error = None;
                entry.updated_at = Some(Utc::now());
            }
            Err(message) => entry.error = Some(message),
        }
        true
    }

    /// Invalidates every fetch currently in flight for the list. Returns
    /// whether any was outstanding.
    pub(crate) fn cancel(&mut self, list_id: WineListId) -> bool {
        let entry = self.entries.entry(list_id).or_default();
        entry.generation += 1;
        std::mem::take(&mut entry.inflight) > 0
    }

    pub(crate) fn snapshot(&self, list_id: WineListId) -> Option<Vec<CachedWine>> {
        self.entries.get(&list_id)?.data.clone()
    }

    pub(crate) fn restore(&mut self, list_id: WineListId, snapshot: Option<Vec<CachedWine>>) {
        self.entries.entry(list_id).or_default().data = snapshot;
    }

    /// Edits the list's rows in place. An entry without data starts empty.
    pub(crate) fn modify<R>(
        &mut self,
        list_id: WineListId,
        f: impl FnOnce(&mut Vec<CachedWine>) -> R,
    ) -> R {
        let entry = self.entries.entry(list_id).or_default();
        f(entry.data.get_or_insert_with(Vec::new))
    }
}
