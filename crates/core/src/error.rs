use mano_types::{DocumentId, EntityId};

use crate::entity::EntityTypeTag;

/// Failure reported by one of the external capabilities (entity update, refresh).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to persist documents of {kind} {id}: {source}")]
    Persistence {
        kind: EntityTypeTag,
        id: EntityId,
        #[source]
        source: BackendError,
    },
    #[error("failed to refresh shared state: {0}")]
    Refresh(#[source] BackendError),
    #[error("document {0} still carries a linkedItem at the persistence boundary")]
    LinkedItemLeak(DocumentId),
    #[error("no document owner registered for {kind} {id}")]
    UnknownLinkedItem { kind: EntityTypeTag, id: EntityId },
}

pub type DocumentsResult<T> = std::result::Result<T, DocumentsError>;
