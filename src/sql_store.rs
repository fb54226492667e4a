//! libsql implementation of the ledger store.
//!
//! Rows are mapped through serde: payloads serialise to JSON objects whose keys
//! are column names, and selected rows are rebuilt as JSON objects before being
//! deserialised into the entity. Column names therefore always come from the
//! entity types, never from caller input.

use libsql::{Connection, Value, params::Params};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::constants::*;
use crate::database::{Db, init_ledger_db};
use crate::error::StoreError;
use crate::models::OwnerId;
use crate::store::{LedgerStore, Record};

#[derive(Clone)]
pub struct LibsqlStore {
    db: Db,
}

impl LibsqlStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Open (or create) `ledger.db` under `data_dir`.
    pub async fn open(data_dir: &str) -> anyhow::Result<Self> {
        let db = init_ledger_db(data_dir).await?;
        Ok(Self::new(db))
    }
}

fn now_timestamp() -> Result<String, StoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| StoreError::Server(format!("failed to format timestamp: {}", e)))
}

fn quote(column: &str) -> String {
    format!("\"{}\"", column)
}

fn to_columns<T: Serialize>(payload: &T) -> Result<Map<String, JsonValue>, StoreError> {
    match serde_json::to_value(payload)? {
        JsonValue::Object(columns) => Ok(columns),
        other => Err(StoreError::Rejected(format!(
            "payload must be an object, got {}",
            other
        ))),
    }
}

fn reject_store_managed(columns: &Map<String, JsonValue>) -> Result<(), StoreError> {
    match columns
        .keys()
        .find(|key| STORE_MANAGED_COLUMNS.contains(&key.as_str()))
    {
        Some(key) => Err(StoreError::Rejected(format!("{} is not client-settable", key))),
        None => Ok(()),
    }
}

fn to_sql_value(column: &str, value: JsonValue) -> Result<Value, StoreError> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(flag) => Ok(Value::Integer(i64::from(flag))),
        JsonValue::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(Value::Integer(integer))
            } else if let Some(real) = number.as_f64() {
                Ok(Value::Real(real))
            } else {
                Err(StoreError::Rejected(format!(
                    "{} is out of range for column {}",
                    number, column
                )))
            }
        }
        JsonValue::String(text) => Ok(Value::Text(text)),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(StoreError::Rejected(format!(
            "column {} cannot hold nested values",
            column
        ))),
    }
}

fn split_columns(
    columns: Map<String, JsonValue>,
) -> Result<(Vec<String>, Vec<Value>), StoreError> {
    let mut names = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());
    for (name, value) in columns {
        values.push(to_sql_value(&name, value)?);
        names.push(name);
    }
    Ok((names, values))
}

pub fn extract_record_from_row<R: Record>(row: &libsql::Row) -> Result<R, StoreError> {
    let mut object = Map::new();
    for idx in 0..row.column_count() {
        let name = row
            .column_name(idx)
            .ok_or_else(|| StoreError::Decode(format!("column {} has no name", idx)))?
            .to_string();
        let value = match row.get_value(idx)? {
            Value::Null => JsonValue::Null,
            Value::Integer(integer) => JsonValue::from(integer),
            Value::Real(real) => serde_json::Number::from_f64(real)
                .map(JsonValue::Number)
                .ok_or_else(|| StoreError::Decode(format!("non-finite value in {}", name)))?,
            Value::Text(text) => JsonValue::String(text),
            Value::Blob(_) => {
                return Err(StoreError::Decode(format!("unexpected blob in {}", name)));
            }
        };
        object.insert(name, value);
    }
    Ok(serde_json::from_value(JsonValue::Object(object))?)
}

async fn fetch_owned<R: Record>(
    conn: &Connection,
    owner: &OwnerId,
    id: &str,
) -> Result<R, StoreError> {
    let sql = format!("SELECT * FROM {} WHERE id = ? AND user_id = ?", R::TABLE);
    let mut rows = conn.query(&sql, (id, owner.as_str())).await?;
    match rows.next().await? {
        Some(row) => extract_record_from_row(&row),
        None => Err(StoreError::NotFound),
    }
}

impl LedgerStore for LibsqlStore {
    async fn select_owned<R: Record>(&self, owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        let conn = self.db.read().await;
        let sql = format!(
            "SELECT * FROM {} WHERE user_id = ? ORDER BY date DESC, rowid ASC",
            R::TABLE
        );
        let mut rows = conn.query(&sql, [owner.as_str()]).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(extract_record_from_row(&row)?);
        }
        Ok(records)
    }

    async fn insert<R: Record>(&self, owner: &OwnerId, new: &R::New) -> Result<R, StoreError> {
        let mut columns = to_columns(new)?;
        reject_store_managed(&columns)?;

        let id = Uuid::new_v4().to_string();
        let now = now_timestamp()?;
        columns.insert(COLUMN_ID.to_string(), JsonValue::String(id.clone()));
        columns.insert(
            COLUMN_OWNER.to_string(),
            JsonValue::String(owner.as_str().to_string()),
        );
        columns.insert(COLUMN_CREATED_AT.to_string(), JsonValue::String(now.clone()));
        columns.insert(COLUMN_UPDATED_AT.to_string(), JsonValue::String(now));

        let (names, values) = split_columns(columns)?;
        let placeholders = vec!["?"; names.len()].join(", ");
        let names = names.iter().map(|name| quote(name)).collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            names.join(", "),
            placeholders
        );

        let conn = self.db.write().await;
        conn.execute(&sql, Params::Positional(values)).await?;
        fetch_owned(&conn, owner, &id).await
    }

    async fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> Result<R, StoreError> {
        let columns = to_columns(patch)?;
        if columns.is_empty() {
            return Err(StoreError::Rejected(ERR_EMPTY_PATCH.to_string()));
        }
        reject_store_managed(&columns)?;

        let (names, mut values) = split_columns(columns)?;
        let mut assignments = names
            .iter()
            .map(|name| format!("{} = ?", quote(name)))
            .collect::<Vec<_>>();
        assignments.push(format!("{} = ?", quote(COLUMN_UPDATED_AT)));
        values.push(Value::Text(now_timestamp()?));
        values.push(Value::Text(id.to_string()));
        values.push(Value::Text(owner.as_str().to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? AND user_id = ?",
            R::TABLE,
            assignments.join(", ")
        );

        let conn = self.db.write().await;
        let affected_rows = conn.execute(&sql, Params::Positional(values)).await?;
        if affected_rows == 0 {
            return Err(StoreError::NotFound);
        }
        fetch_owned(&conn, owner, id).await
    }

    async fn delete<R: Record>(&self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ? AND user_id = ?", R::TABLE);
        let conn = self.db.write().await;
        let affected_rows = conn.execute(&sql, (id, owner.as_str())).await?;
        if affected_rows == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
