//! Document records and the transient `linkedItem` annotation.
//!
//! A [`Document`] is what the backend stores inside an entity's `documents` array. A
//! [`LinkedDocument`] is the same record while it is held by the presentation surface: it
//! additionally names its owning entity. The annotation is derived at render time and must be
//! removed again before anything is handed to an entity update.

use chrono::{DateTime, Utc};
use mano_types::{DocumentId, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::LINKED_ITEM_KEY;
use crate::entity::{DocumentOwner, EntityTypeTag};
use crate::error::{DocumentsError, DocumentsResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Document,
    Folder,
}

/// Upload metadata as produced by the backend's file endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub originalname: String,
    pub filename: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

/// An uploaded document (or folder) owned by exactly one entity.
///
/// Unknown fields are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileInfo>,
    /// Shared with the person's family group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            name: None,
            kind: DocumentKind::Document,
            created_at: None,
            created_by: None,
            download_path: None,
            file: None,
            group: None,
            parent_id: None,
            position: None,
            extra: Map::new(),
        }
    }

    pub fn folder(id: DocumentId, name: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Folder,
            name: Some(name.into()),
            ..Self::new(id)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// True when a `linkedItem` key slipped into the opaque fields.
    pub fn carries_linked_item(&self) -> bool {
        self.extra.contains_key(LINKED_ITEM_KEY)
    }
}

/// Identity of the entity a document is displayed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedItem {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityTypeTag,
}

impl LinkedItem {
    pub fn new(id: EntityId, kind: EntityTypeTag) -> Self {
        Self { id, kind }
    }

    pub fn of<E: DocumentOwner>(entity: &E) -> Self {
        Self::new(entity.id().clone(), E::KIND)
    }
}

/// A document annotated with its owning entity, as handed to the presentation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedDocument {
    #[serde(flatten)]
    pub document: Document,
    #[serde(rename = "linkedItem")]
    pub linked_item: LinkedItem,
}

impl LinkedDocument {
    pub fn id(&self) -> &DocumentId {
        &self.document.id
    }

    /// Drops the annotation, returning the persistable record.
    pub fn strip(self) -> Document {
        strip(self)
    }
}

/// Shallow copy of `document` annotated with `linked_item`.
pub fn tag(document: &Document, linked_item: &LinkedItem) -> LinkedDocument {
    let mut document = document.clone();
    document.extra.remove(LINKED_ITEM_KEY);
    LinkedDocument {
        document,
        linked_item: linked_item.clone(),
    }
}

/// Removes every trace of the annotation, including a stray `linkedItem` key in `extra`.
pub fn strip(linked: LinkedDocument) -> Document {
    let mut document = linked.document;
    document.extra.remove(LINKED_ITEM_KEY);
    document
}

/// Persistence boundary check: no element handed to an entity update may carry `linkedItem`.
pub fn ensure_untagged(documents: &[Document]) -> DocumentsResult<()> {
    match documents.iter().find(|doc| doc.carries_linked_item()) {
        Some(doc) => Err(DocumentsError::LinkedItemLeak(doc.id.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn linked_item() -> LinkedItem {
        LinkedItem::new(EntityId::parse("action-1").unwrap(), EntityTypeTag::Action)
    }

    #[test]
    fn test_document_json_uses_backend_field_names() {
        let doc: Document = serde_json::from_value(json!({
            "_id": "f1a2",
            "name": "carte-vitale.jpg",
            "type": "document",
            "createdAt": "2024-03-01T10:00:00Z",
            "createdBy": "user-1",
            "downloadPath": "/person/p1/document/f1a2",
            "encryptedEntityKey": "abc==",
            "file": {
                "originalname": "carte-vitale.jpg",
                "filename": "f1a2",
                "size": 2048,
                "encoding": "7bit",
                "mimetype": "image/jpeg"
            }
        }))
        .unwrap();

        assert_eq!(doc.id.as_str(), "f1a2");
        assert_eq!(doc.kind, DocumentKind::Document);
        assert_eq!(doc.file.as_ref().map(|f| f.size), Some(2048));
        assert_eq!(doc.extra.get("encryptedEntityKey"), Some(&json!("abc==")));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["downloadPath"], json!("/person/p1/document/f1a2"));
        assert_eq!(back["encryptedEntityKey"], json!("abc=="));
    }

    #[test]
    fn test_linked_document_serializes_flat() {
        let doc = Document::new(DocumentId::parse("d1").unwrap()).with_name("ordonnance");
        let linked = tag(&doc, &linked_item());
        let value = serde_json::to_value(&linked).unwrap();

        assert_eq!(value["_id"], json!("d1"));
        assert_eq!(value["name"], json!("ordonnance"));
        assert_eq!(
            value["linkedItem"],
            json!({ "_id": "action-1", "type": "action" })
        );
    }

    #[test]
    fn test_linked_document_deserializes_without_leaking_into_extra() {
        let linked: LinkedDocument = serde_json::from_value(json!({
            "_id": "d1",
            "name": "ordonnance",
            "linkedItem": { "_id": "action-1", "type": "action" }
        }))
        .unwrap();

        assert_eq!(linked.linked_item, linked_item());
        assert!(!linked.document.carries_linked_item());
    }

    #[test]
    fn test_strip_removes_stray_linked_item_key() {
        let mut doc = Document::new(DocumentId::parse("d1").unwrap());
        doc.extra
            .insert(LINKED_ITEM_KEY.into(), json!({ "_id": "x", "type": "action" }));
        let linked = LinkedDocument {
            document: doc,
            linked_item: linked_item(),
        };

        let stripped = linked.strip();
        assert!(!stripped.carries_linked_item());
        assert!(ensure_untagged(&[stripped]).is_ok());
    }

    #[test]
    fn test_tag_then_strip_is_identity() {
        let doc = Document::new(DocumentId::parse("d1").unwrap())
            .with_name("bilan.pdf")
            .with_created_at("2024-01-02T03:04:05Z".parse().unwrap());
        assert_eq!(tag(&doc, &linked_item()).strip(), doc);
    }

    #[test]
    fn test_ensure_untagged_reports_offending_document() {
        let clean = Document::new(DocumentId::parse("ok").unwrap());
        let mut leaked = Document::new(DocumentId::parse("leak").unwrap());
        leaked.extra.insert(LINKED_ITEM_KEY.into(), json!({}));

        match ensure_untagged(&[clean, leaked]) {
            Err(DocumentsError::LinkedItemLeak(id)) => assert_eq!(id.as_str(), "leak"),
            other => panic!("expected LinkedItemLeak, got {other:?}"),
        }
    }

    #[test]
    fn test_folder_constructor() {
        let folder = Document::folder(DocumentId::parse("f").unwrap(), "Administratif");
        assert_eq!(folder.kind, DocumentKind::Folder);
        assert_eq!(
            serde_json::to_value(&folder).unwrap()["type"],
            json!("folder")
        );
    }
}
