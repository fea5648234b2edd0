//! Pure document-array reconciliation.
//!
//! Point operations are expressed as a full-array recomputation from the entity's current
//! documents. Identity is `_id` equality only. A point operation whose `_id` matches nothing
//! returns the array unchanged with `matched == false`; adding a document always goes through
//! a full replace.

use mano_types::DocumentId;

use crate::document::{strip, tag, Document, LinkedDocument, LinkedItem};

/// Outcome of a point reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub documents: Vec<Document>,
    pub matched: bool,
}

/// Annotates every document with `linked_item`, preserving order and length.
pub fn tag_all(documents: &[Document], linked_item: &LinkedItem) -> Vec<LinkedDocument> {
    documents.iter().map(|doc| tag(doc, linked_item)).collect()
}

pub fn strip_all(documents: Vec<LinkedDocument>) -> Vec<Document> {
    documents.into_iter().map(strip).collect()
}

/// `current` with every element whose `_id` equals `document.id` replaced by `document`.
pub fn replace_by_id(current: &[Document], document: &Document) -> Reconciled {
    let mut matched = false;
    let documents = current
        .iter()
        .map(|existing| {
            if existing.id == document.id {
                matched = true;
                document.clone()
            } else {
                existing.clone()
            }
        })
        .collect();
    Reconciled { documents, matched }
}

/// `current` without the elements whose `_id` equals `id`.
pub fn remove_by_id(current: &[Document], id: &DocumentId) -> Reconciled {
    let documents: Vec<Document> = current
        .iter()
        .filter(|existing| &existing.id != id)
        .cloned()
        .collect();
    let matched = documents.len() != current.len();
    Reconciled { documents, matched }
}

/// `current` without the folder `id`; its direct children move to the root.
pub fn detach_folder(current: &[Document], id: &DocumentId) -> Reconciled {
    let Reconciled { documents, matched } = remove_by_id(current, id);
    let documents = documents
        .into_iter()
        .map(|mut item| {
            if item.parent_id.as_ref() == Some(id) {
                item.parent_id = None;
            }
            item
        })
        .collect();
    Reconciled { documents, matched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityTypeTag;
    use mano_types::EntityId;

    fn doc(id: &str, name: &str) -> Document {
        Document::new(DocumentId::parse(id).unwrap()).with_name(name)
    }

    fn docs() -> Vec<Document> {
        vec![doc("1", "a"), doc("2", "b"), doc("3", "c")]
    }

    fn linked_item() -> LinkedItem {
        LinkedItem::new(
            EntityId::parse("consultation-1").unwrap(),
            EntityTypeTag::Consultation,
        )
    }

    #[test]
    fn test_tag_all_preserves_order_and_length() {
        let tagged = tag_all(&docs(), &linked_item());
        let ids: Vec<&str> = tagged.iter().map(|d| d.id().as_str()).collect();

        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(tagged.iter().all(|d| d.linked_item == linked_item()));
    }

    #[test]
    fn test_strip_all_inverts_tag_all() {
        let original = docs();
        assert_eq!(strip_all(tag_all(&original, &linked_item())), original);
    }

    #[test]
    fn test_tag_all_empty() {
        assert!(tag_all(&[], &linked_item()).is_empty());
    }

    #[test]
    fn test_replace_by_id_replaces_in_place() {
        let current = docs();
        let result = replace_by_id(&current, &doc("2", "renamed"));

        assert!(result.matched);
        assert_eq!(result.documents.len(), current.len());
        assert_eq!(result.documents[0], current[0]);
        assert_eq!(result.documents[1], doc("2", "renamed"));
        assert_eq!(result.documents[2], current[2]);
    }

    #[test]
    fn test_replace_by_id_without_match_is_unchanged() {
        let current = docs();
        let result = replace_by_id(&current, &doc("9", "new"));

        assert!(!result.matched);
        assert_eq!(result.documents, current);
    }

    #[test]
    fn test_remove_by_id_keeps_others_in_order() {
        let current = docs();
        let result = remove_by_id(&current, &DocumentId::parse("2").unwrap());

        assert!(result.matched);
        assert_eq!(result.documents, vec![doc("1", "a"), doc("3", "c")]);
    }

    #[test]
    fn test_remove_by_id_without_match_is_unchanged() {
        let current = docs();
        let result = remove_by_id(&current, &DocumentId::parse("9").unwrap());

        assert!(!result.matched);
        assert_eq!(result.documents, current);
    }

    #[test]
    fn test_remove_last_document_yields_empty() {
        let result = remove_by_id(&[doc("1", "a")], &DocumentId::parse("1").unwrap());
        assert!(result.documents.is_empty());
    }

    #[test]
    fn test_detach_folder_moves_children_to_root() {
        let folder = Document::folder(DocumentId::parse("f1").unwrap(), "Logement");
        let mut child = doc("1", "bail.pdf");
        child.parent_id = Some(folder.id.clone());
        let mut nested = doc("2", "quittance.pdf");
        nested.parent_id = Some(DocumentId::parse("f2").unwrap());

        let result = detach_folder(&[folder.clone(), child, nested.clone()], &folder.id);

        assert!(result.matched);
        assert_eq!(result.documents.len(), 2);
        assert_eq!(result.documents[0].id.as_str(), "1");
        assert_eq!(result.documents[0].parent_id, None);
        assert_eq!(result.documents[1], nested);
    }
}
