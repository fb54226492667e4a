pub mod aggregation;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod expenses;
pub mod lend_borrow;
pub mod logging;
pub mod models;
pub mod repository;
pub mod rest_store;
pub mod sql_store;
pub mod store;
pub mod utils;

// Re-export types at crate root for convenient importing
pub use crate::database::Db;
pub use crate::error::{LedgerError, StoreError, ValidationError};
pub use crate::expenses::ExpenseLedger;
pub use crate::lend_borrow::LendBorrowLedger;
pub use crate::repository::Repository;
pub use crate::rest_store::RestStore;
pub use crate::sql_store::LibsqlStore;
pub use crate::store::{LedgerStore, Record};
