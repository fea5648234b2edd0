//! Person-level aggregation of linked documents.
//!
//! A person's documents view lists the person's own documents alongside those attached to the
//! person's actions, consultations and treatments, and the documents other members of the
//! person's family group shared. Each row keeps the `linkedItem` of the entity that owns it,
//! and the router uses it to send point mutations back to the owning adapter.
//!
//! Saving from this view (reordering, moving into folders, adding uploads) only ever writes the
//! person: rows owned by other entities are displayed but left untouched.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mano_types::DocumentId;

use crate::capabilities::ErrorNotifier;
use crate::config::CoreConfig;
use crate::constants::{
    ACTIONS_FOLDER_ID, ACTIONS_FOLDER_NAME, FOLDER_DELETE_ERROR_MESSAGE,
    GROUP_DOCUMENT_DELETE_MESSAGE, ROOT_FOLDER_ID,
};
use crate::document::{Document, LinkedDocument, LinkedItem};
use crate::entity::EntityTypeTag;
use crate::error::{DocumentsError, DocumentsResult};
use crate::presentation::{DocumentHandlers, KindProfile, SurfaceConfig};

pub struct LinkedDocumentsRouter {
    person: LinkedItem,
    owners: Vec<Arc<dyn DocumentHandlers>>,
    group_documents: Vec<LinkedDocument>,
    in_group: bool,
    notifier: Arc<dyn ErrorNotifier>,
    delete_error_message: String,
}

impl LinkedDocumentsRouter {
    pub fn new(person: LinkedItem, notifier: Arc<dyn ErrorNotifier>, config: &CoreConfig) -> Self {
        Self {
            person,
            owners: Vec::new(),
            group_documents: Vec::new(),
            in_group: false,
            notifier,
            delete_error_message: config.delete_error_message().to_owned(),
        }
    }

    /// Adds an owner. An owner already registered under the same `linkedItem` is replaced.
    pub fn register(&mut self, owner: Arc<dyn DocumentHandlers>) -> &mut Self {
        let linked_item = owner.linked_item();
        match self
            .owners
            .iter()
            .position(|existing| existing.linked_item() == linked_item)
        {
            Some(index) => self.owners[index] = owner,
            None => self.owners.push(owner),
        }
        self
    }

    /// Marks the person as a family group member and lists the documents the other members
    /// shared. Those rows are read-only here: they can only be deleted from their own person.
    pub fn join_group(&mut self, shared: Vec<LinkedDocument>) -> &mut Self {
        self.in_group = true;
        self.group_documents = shared
            .into_iter()
            .filter(|document| document.linked_item != self.person)
            .collect();
        self
    }

    fn owner(&self, linked_item: &LinkedItem) -> Option<&Arc<dyn DocumentHandlers>> {
        self.owners
            .iter()
            .find(|owner| &owner.linked_item() == linked_item)
    }

    fn is_group_member(&self, linked_item: &LinkedItem) -> bool {
        self.group_documents
            .iter()
            .any(|document| &document.linked_item == linked_item)
    }

    /// Every registered owner's projection plus shared group documents, newest first.
    /// Undated documents sort last.
    pub fn merged(&self) -> Vec<LinkedDocument> {
        let mut documents: Vec<LinkedDocument> = self
            .owners
            .iter()
            .flat_map(|owner| owner.documents().iter().cloned().collect::<Vec<_>>())
            .chain(self.group_documents.iter().cloned())
            .collect();
        documents.sort_by(|a, b| match (a.document.created_at, b.document.created_at) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        documents
    }

    /// The "Actions" folder, present when action documents are listed and the person has no
    /// folder of that id already.
    pub fn read_only_folders(&self) -> Vec<Document> {
        let documents = self.merged();
        let lists_actions = documents
            .iter()
            .any(|document| document.linked_item.kind == EntityTypeTag::Action);
        let has_folder = documents
            .iter()
            .any(|document| document.id().as_str() == ACTIONS_FOLDER_ID);
        if !lists_actions || has_folder {
            return Vec::new();
        }
        actions_folder().into_iter().collect()
    }

    /// Surface configuration for the person-level view.
    pub fn surface_config(
        self: &Arc<Self>,
        profile: &KindProfile,
    ) -> DocumentsResult<SurfaceConfig> {
        profile
            .clone()
            .group_check(self.in_group)
            .with_read_only_folders(self.read_only_folders())
            .surface_config(
                self.merged().into(),
                self.person.clone(),
                Some(self.person.id.clone()),
                Arc::clone(self) as Arc<dyn DocumentHandlers>,
            )
    }

    fn is_read_only(&self, document: &LinkedDocument) -> bool {
        document.id().as_str() == ACTIONS_FOLDER_ID
            && self
                .read_only_folders()
                .iter()
                .any(|folder| &folder.id == document.id())
    }

    fn unknown(linked_item: &LinkedItem) -> DocumentsError {
        DocumentsError::UnknownLinkedItem {
            kind: linked_item.kind,
            id: linked_item.id.clone(),
        }
    }
}

fn actions_folder() -> Option<Document> {
    let id = DocumentId::parse(ACTIONS_FOLDER_ID).ok()?;
    let mut folder = Document::folder(id, ACTIONS_FOLDER_NAME);
    folder.parent_id = DocumentId::parse(ROOT_FOLDER_ID).ok();
    Some(folder)
}

#[async_trait]
impl DocumentHandlers for LinkedDocumentsRouter {
    fn linked_item(&self) -> LinkedItem {
        self.person.clone()
    }

    fn documents(&self) -> Arc<[LinkedDocument]> {
        self.merged().into()
    }

    /// Full replace of the person's own documents.
    ///
    /// Rows owned by other entities and the read-only folder are skipped, and documents the
    /// person shares with the group stay in place when the list omits them. Nothing is written
    /// if a row names an owner this view does not know.
    async fn save_documents(&self, documents: Vec<LinkedDocument>) -> DocumentsResult<()> {
        let person = self
            .owner(&self.person)
            .ok_or_else(|| Self::unknown(&self.person))?;

        let mut own = Vec::with_capacity(documents.len());
        let mut skipped = 0usize;
        for document in documents {
            if self.is_read_only(&document) {
                skipped += 1;
            } else if document.linked_item == self.person {
                own.push(document);
            } else if self.owner(&document.linked_item).is_some()
                || self.is_group_member(&document.linked_item)
            {
                skipped += 1;
            } else {
                return Err(Self::unknown(&document.linked_item));
            }
        }

        let listed: HashSet<DocumentId> = own.iter().map(|doc| doc.id().clone()).collect();
        let shared: Vec<LinkedDocument> = person
            .documents()
            .iter()
            .filter(|doc| doc.document.group == Some(true) && !listed.contains(doc.id()))
            .cloned()
            .collect();
        if skipped > 0 || !shared.is_empty() {
            tracing::debug!(
                person = %self.person.id,
                skipped,
                kept_shared = shared.len(),
                "saving person documents only"
            );
        }
        own.extend(shared);
        person.save_documents(own).await
    }

    async fn update_document(&self, document: LinkedDocument) -> DocumentsResult<()> {
        match self.owner(&document.linked_item) {
            Some(owner) => owner.update_document(document).await,
            None => Err(Self::unknown(&document.linked_item)),
        }
    }

    async fn delete_document(&self, document: LinkedDocument) -> bool {
        if document.linked_item.kind == EntityTypeTag::Person && document.linked_item != self.person
        {
            tracing::warn!(
                person = %self.person.id,
                owner = %document.linked_item.id,
                document = %document.id(),
                "refusing to delete a document shared by another group member"
            );
            self.notifier.notify_error(GROUP_DOCUMENT_DELETE_MESSAGE);
            return false;
        }
        match self.owner(&document.linked_item) {
            Some(owner) => owner.delete_document(document).await,
            None => {
                tracing::error!(
                    kind = %document.linked_item.kind,
                    entity = %document.linked_item.id,
                    document = %document.id(),
                    "no owner registered for document"
                );
                self.notifier.notify_error(&self.delete_error_message);
                false
            }
        }
    }

    async fn update_folder(&self, folder: LinkedDocument) -> DocumentsResult<()> {
        if self.is_read_only(&folder) {
            return Err(DocumentsError::InvalidInput(format!(
                "folder {} is read-only",
                folder.id()
            )));
        }
        match self.owner(&folder.linked_item) {
            Some(owner) => owner.update_folder(folder).await,
            None => Err(Self::unknown(&folder.linked_item)),
        }
    }

    async fn delete_folder(&self, folder: LinkedDocument) -> bool {
        let owner = if self.is_read_only(&folder) {
            None
        } else {
            self.owner(&folder.linked_item)
        };
        match owner {
            Some(owner) => owner.delete_folder(folder).await,
            None => {
                tracing::error!(
                    kind = %folder.linked_item.kind,
                    entity = %folder.linked_item.id,
                    folder = %folder.id(),
                    "folder cannot be deleted from this view"
                );
                self.notifier.notify_error(FOLDER_DELETE_ERROR_MESSAGE);
                false
            }
        }
    }
}
