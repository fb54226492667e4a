#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use finance_ledger::models::{Category, Direction, NewExpense, NewLedgerEntry, OwnerId};
use finance_ledger::utils::parse_date;
use finance_ledger::{LedgerStore, LibsqlStore, Record, StoreError};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use tokio::sync::Notify;

/// Timestamp [`StampingStore`] writes into every row it returns.
pub const SERVER_STAMP: OffsetDateTime = datetime!(2030-01-01 12:00 UTC);

#[derive(Clone)]
pub struct TestConfig {
    pub temp_dir_path: String,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let temp_dir_path = temp_dir.path().to_string_lossy().to_string();
        std::mem::forget(temp_dir);
        Ok(Self { temp_dir_path })
    }

    pub fn data_path(&self) -> String {
        self.temp_dir_path.clone()
    }
}

pub async fn setup_store() -> anyhow::Result<Arc<LibsqlStore>> {
    let test_config = TestConfig::new()?;
    let store = LibsqlStore::open(&test_config.data_path())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize ledger database: {}", e))?;
    Ok(Arc::new(store))
}

pub fn alice() -> OwnerId {
    OwnerId::from("alice")
}

pub fn bob() -> OwnerId {
    OwnerId::from("bob")
}

pub fn new_expense(category: Category, amount: f64, date: &str, description: &str) -> NewExpense {
    NewExpense {
        category,
        amount,
        date: parse_date(date).expect("valid test date"),
        description: description.to_string(),
    }
}

pub fn new_entry(
    counterparty: &str,
    amount: f64,
    direction: Direction,
    date: &str,
    description: &str,
) -> NewLedgerEntry {
    NewLedgerEntry::new(
        counterparty,
        amount,
        direction,
        parse_date(date).expect("valid test date"),
        description,
    )
}

/// Delegates to `inner` but fails reads and/or mutations while the matching
/// switch is on.
pub struct FlakyStore<S> {
    inner: Arc<S>,
    fail_reads: AtomicBool,
    fail_mutations: AtomicBool,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    fn check_mutation(&self) -> Result<(), StoreError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(StoreError::Server("injected mutation failure".to_string()));
        }
        Ok(())
    }
}

impl<S: LedgerStore> LedgerStore for FlakyStore<S> {
    async fn select_owned<R: Record>(&self, owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Server("injected read failure".to_string()));
        }
        self.inner.select_owned(owner).await
    }

    async fn insert<R: Record>(&self, owner: &OwnerId, new: &R::New) -> Result<R, StoreError> {
        self.check_mutation()?;
        self.inner.insert::<R>(owner, new).await
    }

    async fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> Result<R, StoreError> {
        self.check_mutation()?;
        self.inner.update::<R>(owner, id, patch).await
    }

    async fn delete<R: Record>(&self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        self.check_mutation()?;
        self.inner.delete::<R>(owner, id).await
    }
}

/// Delegates to `inner` and overwrites `updated_at` on every row returned by
/// an update, the way a server-side trigger would.
pub struct StampingStore<S> {
    inner: Arc<S>,
}

impl<S> StampingStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }
}

fn stamp<R: Record>(row: R) -> Result<R, StoreError> {
    let mut value = serde_json::to_value(&row)?;
    value["updated_at"] =
        serde_json::Value::String(SERVER_STAMP.format(&Rfc3339).expect("format stamp"));
    Ok(serde_json::from_value(value)?)
}

impl<S: LedgerStore> LedgerStore for StampingStore<S> {
    async fn select_owned<R: Record>(&self, owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        self.inner.select_owned(owner).await
    }

    async fn insert<R: Record>(&self, owner: &OwnerId, new: &R::New) -> Result<R, StoreError> {
        self.inner.insert::<R>(owner, new).await
    }

    async fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> Result<R, StoreError> {
        stamp(self.inner.update::<R>(owner, id, patch).await?)
    }

    async fn delete<R: Record>(&self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        self.inner.delete::<R>(owner, id).await
    }
}

/// Never answers.
pub struct StallingStore;

impl LedgerStore for StallingStore {
    async fn select_owned<R: Record>(&self, _owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        std::future::pending().await
    }

    async fn insert<R: Record>(&self, _owner: &OwnerId, _new: &R::New) -> Result<R, StoreError> {
        std::future::pending().await
    }

    async fn update<R: Record>(
        &self,
        _owner: &OwnerId,
        _id: &str,
        _patch: &R::Patch,
    ) -> Result<R, StoreError> {
        std::future::pending().await
    }

    async fn delete<R: Record>(&self, _owner: &OwnerId, _id: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }
}

/// Holds every call made for `gated_owner` until [`GatedStore::open`] is
/// called; other owners pass straight through.
pub struct GatedStore<S> {
    inner: Arc<S>,
    gated_owner: OwnerId,
    gate: Notify,
    waiting: AtomicUsize,
}

impl<S> GatedStore<S> {
    pub fn new(inner: Arc<S>, gated_owner: OwnerId) -> Self {
        Self {
            inner,
            gated_owner,
            gate: Notify::new(),
            waiting: AtomicUsize::new(0),
        }
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }

    /// Number of calls currently held at the gate.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    async fn pass(&self, owner: &OwnerId) {
        if *owner == self.gated_owner {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl<S: LedgerStore> LedgerStore for GatedStore<S> {
    async fn select_owned<R: Record>(&self, owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        self.pass(owner).await;
        self.inner.select_owned(owner).await
    }

    async fn insert<R: Record>(&self, owner: &OwnerId, new: &R::New) -> Result<R, StoreError> {
        self.pass(owner).await;
        self.inner.insert::<R>(owner, new).await
    }

    async fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> Result<R, StoreError> {
        self.pass(owner).await;
        self.inner.update::<R>(owner, id, patch).await
    }

    async fn delete<R: Record>(&self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        self.pass(owner).await;
        self.inner.delete::<R>(owner, id).await
    }
}

/// Poll `condition` until it holds, failing the test after a second.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(1);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}

/// Answers every select for `owner` with `extra`'s rows mixed in, like a
/// store with a broken ownership filter.
pub struct LeakyStore<S> {
    inner: Arc<S>,
    extra: OwnerId,
}

impl<S> LeakyStore<S> {
    pub fn new(inner: Arc<S>, extra: OwnerId) -> Self {
        Self { inner, extra }
    }
}

impl<S: LedgerStore> LedgerStore for LeakyStore<S> {
    async fn select_owned<R: Record>(&self, owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        let mut rows: Vec<R> = self.inner.select_owned(owner).await?;
        rows.extend(self.inner.select_owned::<R>(&self.extra).await?);
        Ok(rows)
    }

    async fn insert<R: Record>(&self, owner: &OwnerId, new: &R::New) -> Result<R, StoreError> {
        self.inner.insert::<R>(owner, new).await
    }

    async fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> Result<R, StoreError> {
        self.inner.update::<R>(owner, id, patch).await
    }

    async fn delete<R: Record>(&self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        self.inner.delete::<R>(owner, id).await
    }
}
