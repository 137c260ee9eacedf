use std::sync::Arc;

use shared::domain::{
    CachedWine, PendingToken, Wine, WineDraft, WineId, WineListId, WinePatch, WineServerId,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod cache;
pub mod edits;
pub mod error;
pub mod transport;
pub mod validation;

pub use cache::{QueryCache, QueryState};
pub use edits::EditSession;
pub use error::{CoordinatorError, Operation};
pub use transport::{HttpWineApi, MissingWineApi, WineApi, DEFAULT_API_BASE_URL};
pub use validation::ValidationErrors;

use validation::prepare_new_wine;

pub type Result<T, E = CoordinatorError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    CollectionChanged {
        list_id: WineListId,
    },
    MutationSettled {
        list_id: WineListId,
        operation: Operation,
        ok: bool,
    },
    Error(String),
}

/// Owns the wine cache and mediates every change to it.
///
/// Mutations write their expected effect into the cache first, undo it if the
/// server rejects the request, and always refetch the list once settled so the
/// cache converges on what the server holds.
pub struct WineListClient {
    api: Arc<dyn WineApi>,
    cache: Mutex<QueryCache>,
    events: broadcast::Sender<CacheEvent>,
}

impl WineListClient {
    pub fn new(base_url: impl Into<String>) -> Arc<Self> {
        Self::new_with_api(Arc::new(HttpWineApi::new(base_url)))
    }

    pub fn new_with_api(api: Arc<dyn WineApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            cache: Mutex::new(QueryCache::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub async fn query_state(&self, list_id: WineListId) -> QueryState {
        self.cache.lock().await.state(list_id)
    }

    pub async fn collection(&self, list_id: WineListId) -> Vec<CachedWine> {
        self.cache
            .lock()
            .await
            .collection(list_id)
            .map(<[CachedWine]>::to_vec)
            .unwrap_or_default()
    }

    /// Loads the list into the cache. Does nothing without a list id.
    pub async fn fetch_wines(
        &self,
        list_id: Option<WineListId>,
    ) -> Result<Option<Vec<CachedWine>>> {
        let Some(list_id) = list_id else {
            debug!("wines: fetch skipped without list id");
            return Ok(None);
        };

        let ticket = self.cache.lock().await.begin_fetch(list_id);
        let result = self.api.list_wines(list_id).await;

        let mut cache = self.cache.lock().await;
        match result {
            Ok(wines) => {
                let rows = wines.len();
                if !cache.finish_fetch(ticket, Ok(wines)) {
                    debug!(list_id = list_id.0, "wines: discarded superseded fetch");
                    return Ok(cache.collection(list_id).map(<[CachedWine]>::to_vec));
                }
                let collection = cache.collection(list_id).map(<[CachedWine]>::to_vec);
                drop(cache);
                info!(list_id = list_id.0, rows, "wines: fetched collection");
                self.emit_changed(list_id);
                Ok(collection)
            }
            Err(err) => {
                cache.finish_fetch(ticket, Err(err.to_string()));
                drop(cache);
                warn!(list_id = list_id.0, error = %err, "wines: fetch failed");
                Err(CoordinatorError::transport(Operation::Fetch, err))
            }
        }
    }

    /// Stops in-flight fetches for the list from writing their results.
    pub async fn cancel_queries(&self, list_id: WineListId) {
        if self.cache.lock().await.cancel(list_id) {
            debug!(list_id = list_id.0, "wines: cancelled in-flight fetch");
        }
    }

    /// Validates the draft, shows it as a pending row, and asks the server to
    /// create it. The pending row is removed again if the request fails.
    pub async fn create_wine(&self, list_id: WineListId, draft: WineDraft) -> Result<Wine> {
        let new_wine = prepare_new_wine(draft, list_id).map_err(CoordinatorError::Validation)?;

        let token = PendingToken::generate();
        {
            let mut cache = self.cache.lock().await;
            cache.cancel(list_id);
            cache.modify(list_id, |rows| {
                rows.push(CachedWine::pending(token.clone(), new_wine.clone()))
            });
        }
        self.emit_changed(list_id);
        debug!(list_id = list_id.0, token = %token, "wines: appended pending row");

        let result = self.api.create_wine(list_id, &new_wine).await;
        if let Err(err) = &result {
            let pending = WineId::Pending(token);
            self.cache
                .lock()
                .await
                .modify(list_id, |rows| rows.retain(|row| row.id != pending));
            self.emit_changed(list_id);
            warn!(
                list_id = list_id.0,
                error = %err,
                "wines: create failed, removed pending row"
            );
        }

        self.settle(list_id, Operation::Create, result.is_ok()).await;
        let created = result.map_err(|err| CoordinatorError::transport(Operation::Create, err))?;
        info!(list_id = list_id.0, wine_id = created.id.0, "wines: created");
        Ok(created)
    }

    /// Saves every pending edit in one request. The session is cleared only
    /// when the server accepted the edits.
    pub async fn save_edits(
        &self,
        list_id: WineListId,
        session: &mut EditSession,
    ) -> Result<usize> {
        if session.has_errors() {
            return Err(CoordinatorError::UnresolvedValidation);
        }
        let sent = self.update_wines(list_id, session.pending_patches()).await?;
        session.clear();
        Ok(sent)
    }

    /// Applies `patches` to the cached rows, sends them, and restores the
    /// exact previous collection if the server rejects them.
    pub async fn update_wines(
        &self,
        list_id: WineListId,
        patches: Vec<WinePatch>,
    ) -> Result<usize> {
        if patches.is_empty() {
            return Ok(0);
        }

        let snapshot = {
            let mut cache = self.cache.lock().await;
            if cache.cancel(list_id) {
                debug!(list_id = list_id.0, "wines: cancelled fetch before optimistic update");
            }
            let snapshot = cache.snapshot(list_id);
            cache.modify(list_id, |rows| apply_patches(rows, &patches));
            snapshot
        };
        self.emit_changed(list_id);

        let result = self.api.update_wines(&patches).await;
        if let Err(err) = &result {
            self.cache.lock().await.restore(list_id, snapshot);
            self.emit_changed(list_id);
            warn!(list_id = list_id.0, error = %err, "wines: update failed, rolled back");
        }

        self.settle(list_id, Operation::Update, result.is_ok()).await;
        result.map_err(|err| CoordinatorError::transport(Operation::Update, err))?;
        info!(list_id = list_id.0, rows = patches.len(), "wines: updated");
        Ok(patches.len())
    }

    /// Removes the row from the cache right away, then deletes it on the
    /// server. A rejected delete puts the row back where it was.
    pub async fn delete_wine(&self, list_id: WineListId, wine_id: WineServerId) -> Result<()> {
        let target = WineId::Assigned(wine_id);
        let removed = {
            let mut cache = self.cache.lock().await;
            cache.cancel(list_id);
            cache.modify(list_id, |rows| {
                let index = rows.iter().position(|row| row.id == target)?;
                Some((index, rows.remove(index)))
            })
        };
        self.emit_changed(list_id);

        let result = self.api.delete_wine(wine_id).await;
        if let Err(err) = &result {
            if let Some((index, row)) = removed {
                self.cache.lock().await.modify(list_id, |rows| {
                    if !rows.iter().any(|existing| existing.id == row.id) {
                        rows.insert(index.min(rows.len()), row);
                    }
                });
                self.emit_changed(list_id);
            }
            warn!(
                list_id = list_id.0,
                wine_id = wine_id.0,
                error = %err,
                "wines: delete failed, restored row"
            );
        }

        self.settle(list_id, Operation::Delete, result.is_ok()).await;
        result.map_err(|err| CoordinatorError::transport(Operation::Delete, err))?;
        info!(list_id = list_id.0, wine_id = wine_id.0, "wines: deleted");
        Ok(())
    }

    /// Refetches after a mutation. A failed refetch is reported as an event
    /// and never replaces the mutation's own outcome.
    async fn settle(&self, list_id: WineListId, operation: Operation, ok: bool) {
        let _ = self.events.send(CacheEvent::MutationSettled {
            list_id,
            operation,
            ok,
        });
        if let Err(err) = self.fetch_wines(Some(list_id)).await {
            let _ = self.events.send(CacheEvent::Error(format!(
                "failed to refetch wine list {} after {operation}: {err}",
                list_id.0
            )));
        }
    }

    fn emit_changed(&self, list_id: WineListId) {
        let _ = self.events.send(CacheEvent::CollectionChanged { list_id });
    }
}

fn apply_patches(rows: &mut [CachedWine], patches: &[WinePatch]) {
    for patch in patches {
        let target = WineId::Assigned(patch.id);
        if let Some(row) = rows.iter_mut().find(|row| row.id == target) {
            patch.apply_to(&mut row.fields);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
