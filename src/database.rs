use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

use crate::constants::DATABASE_FILE_NAME;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id          TEXT    PRIMARY KEY,
    user_id     TEXT    NOT NULL,
    category    TEXT    NOT NULL,
    amount      REAL    NOT NULL CHECK (amount >= 0),
    date        TEXT    NOT NULL,
    description TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
"#;

const CREATE_LEND_BORROW_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS lend_borrow_records (
    id          TEXT    PRIMARY KEY,
    user_id     TEXT    NOT NULL,
    person      TEXT    NOT NULL,
    amount      REAL    NOT NULL CHECK (amount >= 0),
    type        TEXT    NOT NULL CHECK (type IN ('lent', 'borrowed')),
    date        TEXT    NOT NULL,
    due_date    TEXT,
    description TEXT    NOT NULL,
    status      TEXT    NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'completed')),
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
"#;

const CREATE_EXPENSES_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_expenses_owner_date ON expenses(user_id, date);
"#;

const CREATE_LEND_BORROW_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_lend_borrow_owner_date ON lend_borrow_records(user_id, date);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// Shared ledger DB (ledger.db). Rows of every owner live side by side and
/// are separated by `user_id`.
pub async fn init_ledger_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE_NAME);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_LEND_BORROW_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_INDEX, ()).await?;
    conn.execute(CREATE_LEND_BORROW_INDEX, ()).await?;

    Ok(Arc::new(RwLock::new(conn)))
}
