use std::sync::Arc;
use std::time::Duration;

use time::Date;

use crate::aggregation;
use crate::error::LedgerError;
use crate::models::{Direction, LedgerEntry, LedgerEntryPatch, NewLedgerEntry, OwnerId, Status};
use crate::repository::Repository;
use crate::store::LedgerStore;
use crate::utils::{validate_ledger_entry_patch, validate_new_ledger_entry};

/// Money lent to or borrowed from other people, for one principal.
///
/// Status moves freely in both directions: [`set_status`](Self::set_status)
/// can reopen a completed entry.
pub struct LendBorrowLedger<S> {
    repo: Repository<S, LedgerEntry>,
}

impl<S> Clone for LendBorrowLedger<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<S: LedgerStore> LendBorrowLedger<S> {
    pub fn new(store: Arc<S>, owner: OwnerId) -> Self {
        Self {
            repo: Repository::new(store, owner),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            repo: self.repo.with_timeout(timeout),
        }
    }

    pub fn repository(&self) -> &Repository<S, LedgerEntry> {
        &self.repo
    }

    pub async fn list(&self) -> Result<(), LedgerError> {
        Ok(self.repo.list().await?)
    }

    pub async fn add(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        validate_new_ledger_entry(&entry)?;
        Ok(self.repo.add(&entry).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: LedgerEntryPatch,
    ) -> Result<LedgerEntry, LedgerError> {
        validate_ledger_entry_patch(&patch)?;
        Ok(self.repo.update(id, &patch).await?)
    }

    pub async fn remove(&self, id: &str) -> Result<(), LedgerError> {
        Ok(self.repo.remove(id).await?)
    }

    /// Change only the status of `id`. No transition is refused.
    pub async fn set_status(&self, id: &str, status: Status) -> Result<LedgerEntry, LedgerError> {
        let reopening = status == Status::Pending
            && self
                .repo
                .find(id)
                .await
                .is_some_and(|entry| entry.status == Status::Completed);
        if reopening {
            tracing::debug!(id, "reopening completed entry");
        }
        Ok(self.repo.update(id, &LedgerEntryPatch::status(status)).await?)
    }

    pub async fn mark_completed(&self, id: &str) -> Result<LedgerEntry, LedgerError> {
        self.set_status(id, Status::Completed).await
    }

    pub async fn mark_pending(&self, id: &str) -> Result<LedgerEntry, LedgerError> {
        self.set_status(id, Status::Pending).await
    }

    pub async fn switch_owner(&self, owner: OwnerId) -> Result<(), LedgerError> {
        Ok(self.repo.switch_owner(owner).await?)
    }

    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.repo.records().await
    }

    pub async fn is_loading(&self) -> bool {
        self.repo.is_loading().await
    }

    pub async fn error(&self) -> Option<String> {
        self.repo.error().await
    }

    /// Entries in one direction, or all of them for `None`.
    pub async fn by_direction(&self, direction: Option<Direction>) -> Vec<LedgerEntry> {
        self.repo
            .records()
            .await
            .into_iter()
            .filter(|entry| direction.is_none_or(|direction| entry.direction == direction))
            .collect()
    }

    /// The first `count` pending entries in cache order.
    pub async fn pending(&self, count: usize) -> Vec<LedgerEntry> {
        self.repo
            .records()
            .await
            .into_iter()
            .filter(LedgerEntry::is_pending)
            .take(count)
            .collect()
    }

    /// Pending entries whose due date is before `today`.
    pub async fn overdue(&self, today: Date) -> Vec<LedgerEntry> {
        self.repo
            .records()
            .await
            .into_iter()
            .filter(|entry| entry.is_pending() && entry.due_date.is_some_and(|due| due < today))
            .collect()
    }

    pub async fn total_pending(&self, direction: Direction) -> f64 {
        aggregation::total_by_direction(
            &self.repo.records().await,
            direction,
            Some(Status::Pending),
        )
    }

    pub async fn pending_count(&self) -> usize {
        aggregation::pending_count(&self.repo.records().await)
    }

    pub async fn net_balance(&self) -> f64 {
        aggregation::net_balance(&self.repo.records().await)
    }
}
