//! In-process content store
//!
//! Backs `--dry-run` and the seeder tests. Numbers entries per store the way
//! the REST API does and keeps a document id next to each.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::{ContentStore, Credentials, Session, SessionCredential, StoreError};
use crate::domain::{EntityKind, Record, RecordId};

#[derive(Clone, Debug)]
pub struct StoredEntry {
    pub id: RecordId,
    pub document_id: Uuid,
    pub record: Record,
    pub published_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    pub fn is_published(&self) -> bool { self.published_at.is_some() }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    accepted: Option<Credentials>,
    session: Option<Session>,
    entries: Vec<StoredEntry>,
    next_id: u64,
    create_attempts: usize,
    reject_create: Vec<String>,
    reject_publish: Vec<String>,
}

impl MemoryStore {
    /// A store that accepts any credentials.
    pub fn new() -> Self { Self::default() }

    /// A store that only accepts `credentials`.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self { accepted: Some(credentials), ..Self::default() }
    }

    pub fn entries(&self) -> &[StoredEntry] { &self.entries }

    pub fn entries_of(&self, kind: EntityKind) -> impl Iterator<Item = &StoredEntry> {
        self.entries.iter().filter(move |e| e.record.kind() == kind)
    }

    pub fn find(&self, label: &str) -> Option<&StoredEntry> {
        self.entries.iter().find(|e| e.record.label() == label)
    }

    pub fn published_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_published()).count()
    }

    pub fn create_attempts(&self) -> usize { self.create_attempts }

    #[cfg(test)]
    pub(crate) fn rejecting_create_of(mut self, label: &str) -> Self {
        self.reject_create.push(label.to_string());
        self
    }

    #[cfg(test)]
    pub(crate) fn rejecting_publish_of(mut self, label: &str) -> Self {
        self.reject_publish.push(label.to_string());
        self
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &'static str { "memory" }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), StoreError> {
        if let Some(accepted) = &self.accepted {
            if accepted != credentials {
                return Err(StoreError::Authentication("invalid credentials".into()));
            }
        }
        self.session = Some(Session::new(SessionCredential::Bearer(Uuid::now_v7().simple().to_string())));
        Ok(())
    }

    fn session(&self) -> Option<&Session> { self.session.as_ref() }

    async fn create_record(&mut self, record: &Record) -> Result<RecordId, StoreError> {
        if self.session.is_none() {
            return Err(StoreError::NotAuthenticated);
        }
        self.create_attempts += 1;
        if self.reject_create.iter().any(|label| label == record.label()) {
            return Err(StoreError::Rejected { status: 400, body: format!("{} rejected", record.label()) });
        }
        self.next_id += 1;
        let id = RecordId::Numeric(self.next_id);
        debug!(%id, kind = %record.kind(), "stored draft");
        self.entries.push(StoredEntry { id: id.clone(), document_id: Uuid::now_v7(), record: record.clone(), published_at: None });
        Ok(id)
    }

    async fn publish_record(&mut self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError> {
        if self.session.is_none() {
            return Err(StoreError::NotAuthenticated);
        }
        let entry = self.entries
            .iter_mut()
            .find(|e| &e.id == id && e.record.kind() == kind)
            .ok_or_else(|| StoreError::Rejected { status: 404, body: format!("{kind} {id} not found") })?;
        if self.reject_publish.iter().any(|label| label == entry.record.label()) {
            return Err(StoreError::Rejected { status: 500, body: "publish failed".into() });
        }
        entry.published_at = Some(Utc::now());
        Ok(())
    }
}
