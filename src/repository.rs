//! Client-side mirror of one remote table, scoped to the current principal.
//!
//! The cache is only ever changed after the store answers successfully: there
//! are no optimistic writes and so nothing to roll back. A failed call leaves
//! the cache exactly as it was and records the failure message.
//!
//! Calls are neither queued nor serialised. The state lock is never held
//! across a store call, so overlapping mutations are applied in the order
//! their responses arrive (last writer wins at the cache layer).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::StoreError;
use crate::models::OwnerId;
use crate::store::{LedgerStore, Record};

struct CacheState<R> {
    owner: OwnerId,
    /// Bumped on every principal switch; responses tagged with an older
    /// generation are dropped.
    generation: u64,
    rows: Vec<R>,
    loads_in_flight: usize,
    error: Option<String>,
}

pub struct Repository<S, R> {
    store: Arc<S>,
    state: Arc<RwLock<CacheState<R>>>,
    timeout: Duration,
}

impl<S, R> Clone for Repository<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            timeout: self.timeout,
        }
    }
}

impl<S, R> Repository<S, R>
where
    S: LedgerStore,
    R: Record,
{
    pub fn new(store: Arc<S>, owner: OwnerId) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(CacheState {
                owner,
                generation: 0,
                rows: Vec::new(),
                loads_in_flight: 0,
                error: None,
            })),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Bound every store call by `timeout`. Expiry is reported as
    /// [`StoreError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn owner(&self) -> OwnerId {
        self.state.read().await.owner.clone()
    }

    /// Snapshot of the cache, in cache order.
    pub async fn records(&self) -> Vec<R> {
        self.state.read().await.rows.clone()
    }

    pub async fn find(&self, id: &str) -> Option<R> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|row| row.id() == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.rows.is_empty()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loads_in_flight > 0
    }

    /// Message of the last failed operation, cleared by the next success.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }

    /// Current owner and generation, read once before a store call.
    async fn scope(&self) -> (OwnerId, u64) {
        let state = self.state.read().await;
        (state.owner.clone(), state.generation)
    }

    /// Record a failure unless the principal changed while the call was out.
    async fn fail(&self, generation: u64, op: &str, err: StoreError) -> StoreError {
        let mut state = self.state.write().await;
        if state.generation == generation {
            state.error = Some(err.to_string());
        }
        tracing::warn!(table = R::TABLE, owner = %state.owner, "{} failed: {}", op, err);
        err
    }

    /// Replace the cache with every row the current principal owns.
    ///
    /// On failure the previous contents are kept (empty on a first load) and
    /// the error is both recorded and returned.
    pub async fn list(&self) -> Result<(), StoreError> {
        let (owner, generation) = {
            let mut state = self.state.write().await;
            state.loads_in_flight += 1;
            (state.owner.clone(), state.generation)
        };

        let result = self.bounded(self.store.select_owned::<R>(&owner)).await;

        let mut state = self.state.write().await;
        // A switch resets the counter, so only the current generation's
        // loads are counted.
        if state.generation != generation {
            tracing::debug!(table = R::TABLE, %owner, "discarding list for previous owner");
            return Ok(());
        }
        state.loads_in_flight -= 1;

        match result {
            Ok(mut rows) => {
                let before = rows.len();
                rows.retain(|row| row.owner() == &owner);
                if rows.len() != before {
                    tracing::warn!(
                        table = R::TABLE,
                        %owner,
                        dropped = before - rows.len(),
                        "store returned rows of another owner"
                    );
                }
                tracing::debug!(table = R::TABLE, %owner, count = rows.len(), "listed records");
                state.rows = rows;
                state.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(table = R::TABLE, %owner, "list failed: {}", err);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Create a row for the current principal and put the stored row at the
    /// front of the cache. The cache is not re-sorted.
    pub async fn add(&self, new: &R::New) -> Result<R, StoreError> {
        let (owner, generation) = self.scope().await;

        let row = match self.bounded(self.store.insert::<R>(&owner, new)).await {
            Ok(row) => row,
            Err(err) => return Err(self.fail(generation, "add", err).await),
        };

        let mut state = self.state.write().await;
        if state.generation == generation {
            state.rows.insert(0, row.clone());
            state.error = None;
            tracing::debug!(table = R::TABLE, %owner, id = row.id(), "added record");
        } else {
            tracing::debug!(table = R::TABLE, %owner, "discarding add for previous owner");
        }
        Ok(row)
    }

    /// Apply `patch` to the row `id` and replace the cached row with the one
    /// the store returns.
    pub async fn update(&self, id: &str, patch: &R::Patch) -> Result<R, StoreError> {
        let (owner, generation) = self.scope().await;

        let row = match self.bounded(self.store.update::<R>(&owner, id, patch)).await {
            Ok(row) => row,
            Err(err) => return Err(self.fail(generation, "update", err).await),
        };

        let mut state = self.state.write().await;
        if state.generation == generation {
            if let Some(cached) = state.rows.iter_mut().find(|cached| cached.id() == id) {
                *cached = row.clone();
            }
            state.error = None;
            tracing::debug!(table = R::TABLE, %owner, id, "updated record");
        } else {
            tracing::debug!(table = R::TABLE, %owner, id, "discarding update for previous owner");
        }
        Ok(row)
    }

    /// Delete the row `id` and drop it from the cache.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let (owner, generation) = self.scope().await;

        if let Err(err) = self.bounded(self.store.delete::<R>(&owner, id)).await {
            return Err(self.fail(generation, "remove", err).await);
        }

        let mut state = self.state.write().await;
        if state.generation == generation {
            state.rows.retain(|cached| cached.id() != id);
            state.error = None;
            tracing::debug!(table = R::TABLE, %owner, id, "removed record");
        } else {
            tracing::debug!(table = R::TABLE, %owner, id, "discarding remove for previous owner");
        }
        Ok(())
    }

    /// Point the repository at another principal and fetch its rows.
    ///
    /// The cache is cleared before fetching, so a failed fetch leaves it
    /// empty rather than showing the previous principal's rows.
    pub async fn switch_owner(&self, owner: OwnerId) -> Result<(), StoreError> {
        {
            let mut state = self.state.write().await;
            if state.owner == owner {
                return Ok(());
            }
            tracing::info!(table = R::TABLE, from = %state.owner, to = %owner, "switching owner");
            state.owner = owner;
            state.generation += 1;
            state.loads_in_flight = 0;
            state.rows.clear();
            state.error = None;
        }
        self.list().await
    }
}
