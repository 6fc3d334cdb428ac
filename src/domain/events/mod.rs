//! Seed events
use chrono::{DateTime, Utc};
use crate::domain::records::EntityKind;
use crate::domain::value_objects::RecordId;

#[derive(Clone, Debug, PartialEq)]
pub enum SeedEvent {
    Created { kind: EntityKind, label: String, id: RecordId },
    Published { kind: EntityKind, id: RecordId, at: DateTime<Utc> },
    PublishFailed { kind: EntityKind, id: RecordId, reason: String },
    CreateFailed { kind: EntityKind, label: String, reason: String },
    ReferenceDropped { kind: EntityKind, label: String, reference: String },
}

impl SeedEvent {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Created { kind, .. }
            | Self::Published { kind, .. }
            | Self::PublishFailed { kind, .. }
            | Self::CreateFailed { kind, .. }
            | Self::ReferenceDropped { kind, .. } => *kind,
        }
    }
}
