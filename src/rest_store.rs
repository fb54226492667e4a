//! PostgREST implementation of the ledger store, for the hosted
//! auth-and-database service.

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::constants::*;
use crate::error::StoreError;
use crate::models::OwnerId;
use crate::store::{LedgerStore, Record};

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestStore {
    base_url: Url,
    api_key: String,
    access_token: String,
    http: reqwest::Client,
}

impl RestStore {
    /// `access_token` is the bearer token of the signed-in principal; the
    /// service enforces row ownership with it.
    pub fn new(base_url: &str, api_key: &str, access_token: &str) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| StoreError::Server(format!("invalid base_url: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            access_token: access_token.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(REST_PATH_PREFIX)
            .and_then(|url| url.join(table))
            .map_err(|err| StoreError::Server(format!("invalid table url: {err}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let res = self.authorize(request).send().await?;
        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|err| err.message.or(err.error))
            .unwrap_or_else(|| "unknown error".to_string());

        let err = match status {
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized(body),
            StatusCode::FORBIDDEN => StoreError::Forbidden(body),
            StatusCode::NOT_FOUND => StoreError::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Rejected(body)
            }
            _ => StoreError::Server(format!("{}: {}", status, body)),
        };
        Err(err)
    }

    async fn single_row<R: Record>(res: Response) -> Result<R, StoreError> {
        let mut rows = res.json::<Vec<R>>().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl LedgerStore for RestStore {
    async fn select_owned<R: Record>(&self, owner: &OwnerId) -> Result<Vec<R>, StoreError> {
        let endpoint = self.table_url(R::TABLE)?;
        let request = self.http.get(endpoint).query(&[
            ("select", "*".to_string()),
            (COLUMN_OWNER, eq(owner.as_str())),
            ("order", "date.desc".to_string()),
        ]);
        let res = self.send(request).await?;
        Ok(res.json::<Vec<R>>().await?)
    }

    async fn insert<R: Record>(&self, owner: &OwnerId, new: &R::New) -> Result<R, StoreError> {
        let mut row = serde_json::to_value(new)?;
        let Some(columns) = row.as_object_mut() else {
            return Err(StoreError::Rejected("payload must be an object".to_string()));
        };
        columns.insert(
            COLUMN_OWNER.to_string(),
            JsonValue::String(owner.as_str().to_string()),
        );

        let endpoint = self.table_url(R::TABLE)?;
        let request = self
            .http
            .post(endpoint)
            .header("Prefer", "return=representation")
            .json(&[row]);
        let res = self.send(request).await?;
        Self::single_row(res).await.map_err(|err| match err {
            StoreError::NotFound => StoreError::Server(ERR_EMPTY_INSERT_RESPONSE.to_string()),
            other => other,
        })
    }

    async fn update<R: Record>(
        &self,
        owner: &OwnerId,
        id: &str,
        patch: &R::Patch,
    ) -> Result<R, StoreError> {
        let endpoint = self.table_url(R::TABLE)?;
        let request = self
            .http
            .patch(endpoint)
            .query(&[(COLUMN_ID, eq(id)), (COLUMN_OWNER, eq(owner.as_str()))])
            .header("Prefer", "return=representation")
            .json(patch);
        let res = self.send(request).await?;
        Self::single_row(res).await
    }

    async fn delete<R: Record>(&self, owner: &OwnerId, id: &str) -> Result<(), StoreError> {
        let endpoint = self.table_url(R::TABLE)?;
        let request = self
            .http
            .delete(endpoint)
            .query(&[(COLUMN_ID, eq(id)), (COLUMN_OWNER, eq(owner.as_str()))]);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_keeps_base_path() {
        let store = RestStore::new("https://example.test/project", "key", "token").unwrap();
        let url = store.table_url(EXPENSES_TABLE).unwrap();
        assert_eq!(url.as_str(), "https://example.test/project/rest/v1/expenses");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(RestStore::new("not a url", "key", "token").is_err());
    }
}
