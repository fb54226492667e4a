//! The remote ledger store contract.
//!
//! A store owns one table per [`Record`] type and is the ordering and
//! ownership authority. Every call is scoped to an owner: no implementation
//! may return or mutate a row whose owner differs from the one passed in,
//! whatever the client filters on its own side.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::models::OwnerId;

/// A row shape stored in one remote table.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Remote table name.
    const TABLE: &'static str;
    /// Insert payload. Excludes id, owner and timestamps.
    type New: Serialize + Send + Sync;
    /// Partial update payload. Excludes id, owner and timestamps.
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &str;
    fn owner(&self) -> &OwnerId;
}

pub trait LedgerStore: Send + Sync + 'static {
    /// All rows owned by `owner`, most recent `date` first. Rows sharing a
    /// date keep the order the store returns them in.
    fn select_owned<R: Record>(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send;

    /// Insert a row tagged with `owner` and return it as stored, including
    /// the assigned id and timestamps.
    fn insert<R: Record>(
        &self,
        owner: &OwnerId,
        new: &R::New,
    ) -> impl Future<Output = Result<R, StoreError>> + Send;

    /// Apply `patch` to the row matching both `id` and `owner`, returning the
    /// full row as stored afterwards.
    fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> impl Future<Output = Result<R, StoreError>> + Send;

    /// Delete the row matching both `id` and `owner`.
    fn delete<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
