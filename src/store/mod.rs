//! Content store adapters
//!
//! The seeder talks to the store through [`ContentStore`]. Each adapter owns
//! its authenticated [`Session`]; nothing about the session is global.

pub mod browser;
pub mod memory;
pub mod rest;

pub use browser::{BrowserOptions, BrowserStore};
pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use std::fmt;
use thiserror::Error;

use crate::domain::{EntityKind, Record, RecordId};
use crate::webdriver::WebDriverError;

/// Admin credentials for the identity endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum SessionCredential {
    /// Token sent as `Authorization: Bearer`.
    Bearer(String),
    /// Cookies and storage live inside a WebDriver session.
    Browser { session_id: String },
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::Browser { session_id } => f.debug_struct("Browser").field("session_id", session_id).finish(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub credential: SessionCredential,
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(credential: SessionCredential) -> Self {
        Self { credential, established_at: Utc::now() }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match &self.credential { SessionCredential::Bearer(token) => Some(token), SessionCredential::Browser { .. } => None }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("no authenticated session")]
    NotAuthenticated,

    #[error("store rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser automation failed: {0}")]
    WebDriver(#[from] WebDriverError),
}

/// Create-then-publish capability of a content store.
#[async_trait]
pub trait ContentStore: Send {
    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// Exchange credentials for a session held by this adapter.
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), StoreError>;

    fn session(&self) -> Option<&Session>;

    /// Submit a draft record and return the identifier the store assigned.
    async fn create_record(&mut self, record: &Record) -> Result<RecordId, StoreError>;

    /// Move a draft record to the published state.
    async fn publish_record(&mut self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError>;

    /// Fields left for a human since the last call, as `label: attribute`.
    fn take_manual_steps(&mut self) -> Vec<String> {
        Vec::new()
    }

    /// Release whatever the adapter holds open.
    async fn shutdown(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
pub(crate) fn base_url_with_slash(raw: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(raw).map_err(|e| StoreError::InvalidUrl(format!("{raw}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
