//! REST adapter
//!
//! Speaks the store's content API: `POST /admin/login`, `POST /api/<collection>`
//! and `POST /api/<collection>/<id>/actions/publish`.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{base_url_with_slash, ContentStore, Credentials, Session, SessionCredential, StoreError};
use crate::domain::{EntityKind, Record, RecordId};

pub struct RestStore {
    client: Client,
    base_url: Url,
    session: Option<Session>,
}

#[derive(Debug, Deserialize)] struct Envelope<T> { data: T }
#[derive(Debug, Deserialize)] struct LoginData { token: String }
#[derive(Debug, Deserialize)] struct CreatedEntry { id: RecordId }

impl RestStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url_with_slash(base_url)?, session: None })
    }

    pub fn base_url(&self) -> &Url { &self.base_url }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url.join(path).map_err(|e| StoreError::InvalidUrl(e.to_string()))
    }

    fn token(&self) -> Result<&str, StoreError> {
        self.session.as_ref().and_then(Session::bearer_token).ok_or(StoreError::NotAuthenticated)
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected { status: status.as_u16(), body })
}

#[async_trait]
impl ContentStore for RestStore {
    fn name(&self) -> &'static str { "rest" }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), StoreError> {
        let url = self.endpoint("admin/login")?;
        let response = self.client
            .post(url)
            .json(&json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;
        let response = ensure_success(response).await.map_err(|e| match e {
            StoreError::Rejected { status, body } => StoreError::Authentication(format!("status {status}: {body}")),
            other => other,
        })?;
        let login: Envelope<LoginData> = response
            .json()
            .await
            .map_err(|e| StoreError::UnexpectedResponse(format!("login payload: {e}")))?;
        self.session = Some(Session::new(SessionCredential::Bearer(login.data.token)));
        Ok(())
    }

    fn session(&self) -> Option<&Session> { self.session.as_ref() }

    async fn create_record(&mut self, record: &Record) -> Result<RecordId, StoreError> {
        let url = self.endpoint(&format!("api/{}", record.kind().collection()))?;
        debug!(%url, label = record.label(), "submitting record");
        let response = self.client
            .post(url)
            .bearer_auth(self.token()?)
            .json(&json!({ "data": record }))
            .send()
            .await?;
        let created: Envelope<CreatedEntry> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::UnexpectedResponse(format!("created entry: {e}")))?;
        Ok(created.data.id)
    }

    async fn publish_record(&mut self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("api/{}/{}/actions/publish", kind.collection(), id))?;
        let response = self.client
            .post(url)
            .bearer_auth(self.token()?)
            .json(&json!({}))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_keep_base_path() {
        let store = RestStore::new("http://localhost:1337/cms", Duration::from_secs(5)).unwrap();
        assert_eq!(store.endpoint("api/categories").unwrap().as_str(), "http://localhost:1337/cms/api/categories");
        let root = RestStore::new("http://localhost:1337", Duration::from_secs(5)).unwrap();
        assert_eq!(root.endpoint("admin/login").unwrap().as_str(), "http://localhost:1337/admin/login");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(RestStore::new("not a url", Duration::from_secs(5)), Err(StoreError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let mut store = RestStore::new("http://localhost:1337", Duration::from_secs(5)).unwrap();
        let category = crate::domain::CategoryRecord::new("Food", crate::domain::Slug::new("food").unwrap(), 1);
        let err = store.create_record(&Record::Category(category)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAuthenticated));
    }
}
