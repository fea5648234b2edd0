//! Generic linked-document adapter.
//!
//! One [`LinkedDocumentsAdapter`] bridges one entity to the presentation surface. It projects
//! the entity's documents into [`LinkedDocument`]s and maps surface events back onto full-entity
//! writes through the entity's [`EntityUpdater`](crate::capabilities::EntityUpdater):
//!
//! | operation      | array sent to the update          | refresh      | failure            |
//! |----------------|-----------------------------------|--------------|--------------------|
//! | `save_all`     | the given list, stripped          | no           | propagated         |
//! | `update_one`   | current list, `_id` match replaced| always       | propagated         |
//! | `delete_one`   | current list, `_id` match removed | on success   | notified, `false`  |
//! | `update_folder`| same as `update_one`              | always       | propagated         |
//! | `delete_folder`| folder removed, children to root  | on success   | notified, `false`  |
//!
//! Point operations recompute from the adapter's current entity snapshot, never from the
//! surface's rendered copy. Every write the backend accepts becomes the new snapshot, so a
//! mutation awaited before the next one is always seen by it. Under
//! [`MutationPolicy::Concurrent`] two overlapping point writes against one entity may still
//! lose an update. [`MutationPolicy::Serialized`] queues them instead.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use mano_types::DocumentId;
use tokio::sync::{Mutex, MutexGuard};

use crate::capabilities::Capabilities;
use crate::config::{CoreConfig, MutationPolicy};
use crate::constants::FOLDER_DELETE_ERROR_MESSAGE;
use crate::document::{ensure_untagged, Document, LinkedDocument, LinkedItem};
use crate::entity::DocumentOwner;
use crate::error::{DocumentsError, DocumentsResult};
use crate::presentation::{DocumentHandlers, KindProfile, SurfaceConfig};
use crate::reconcile::{self, Reconciled};

/// Entity together with its memoized projection.
struct Snapshot<E> {
    entity: Arc<E>,
    projected: Arc<[LinkedDocument]>,
}

impl<E: DocumentOwner> Snapshot<E> {
    fn new(entity: Arc<E>) -> Self {
        let linked_item = LinkedItem::of(entity.as_ref());
        let projected: Arc<[LinkedDocument]> =
            reconcile::tag_all(entity.documents(), &linked_item).into();
        tracing::debug!(
            kind = %E::KIND,
            entity = %linked_item.id,
            documents = projected.len(),
            "projected linked documents"
        );
        Self { entity, projected }
    }
}

pub struct LinkedDocumentsAdapter<E: DocumentOwner> {
    snapshot: RwLock<Snapshot<E>>,
    profile: KindProfile,
    capabilities: Capabilities<E>,
    policy: MutationPolicy,
    delete_error_message: String,
    gate: Mutex<()>,
}

impl<E: DocumentOwner> LinkedDocumentsAdapter<E> {
    pub fn new(entity: impl Into<Arc<E>>, capabilities: Capabilities<E>, config: &CoreConfig) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::new(entity.into())),
            profile: KindProfile::for_kind(E::KIND, config),
            capabilities,
            policy: config.mutation_policy(),
            delete_error_message: config.delete_error_message().to_owned(),
            gate: Mutex::new(()),
        }
    }

    pub fn entity(&self) -> Arc<E> {
        Arc::clone(&self.read().entity)
    }

    pub fn linked_item(&self) -> LinkedItem {
        LinkedItem::of(self.read().entity.as_ref())
    }

    /// The entity's documents tagged with its `linkedItem`.
    ///
    /// The returned slice is shared: repeated calls return the same allocation until the entity
    /// snapshot changes.
    pub fn project(&self) -> Arc<[LinkedDocument]> {
        Arc::clone(&self.read().projected)
    }

    /// Installs a new entity snapshot, typically after a refresh.
    ///
    /// Passing the `Arc` already held is a no-op and keeps the current projection. Returns
    /// whether the projection was recomputed.
    pub fn set_entity(&self, entity: Arc<E>) -> bool {
        let mut snapshot = self.write();
        if Arc::ptr_eq(&snapshot.entity, &entity) {
            return false;
        }
        *snapshot = Snapshot::new(entity);
        true
    }

    /// Full replace of the entity's documents with `documents`, stripped of their annotation.
    ///
    /// Any document missing from `documents` is dropped from the entity. Failures propagate.
    pub async fn save_all(&self, documents: Vec<LinkedDocument>) -> DocumentsResult<()> {
        let _guard = self.acquire().await;
        let current = self.entity();
        let documents = reconcile::strip_all(documents);
        let count = documents.len();
        self.persist(&current, documents).await?;
        tracing::info!(
            kind = %E::KIND,
            entity = %current.id(),
            documents = count,
            "saved documents"
        );
        Ok(())
    }

    /// Removes the document with the same `_id` and refreshes shared state.
    ///
    /// Never fails: any error from the update or the refresh is reported through the notifier
    /// and yields `false`. A document that is no longer present persists the unchanged list and
    /// counts as success.
    pub async fn delete_one(&self, document: LinkedDocument) -> bool {
        match self.try_remove(document, reconcile::remove_by_id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(kind = %E::KIND, error = %err, "document deletion failed");
                self.capabilities
                    .notifier
                    .notify_error(&self.delete_error_message);
                false
            }
        }
    }

    /// Removes a folder. Documents and folders directly inside it move to the root.
    ///
    /// Failures are notified and yield `false`, as for [`delete_one`](Self::delete_one).
    pub async fn delete_folder(&self, folder: LinkedDocument) -> bool {
        match self.try_remove(folder, reconcile::detach_folder).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(kind = %E::KIND, error = %err, "folder deletion failed");
                self.capabilities
                    .notifier
                    .notify_error(FOLDER_DELETE_ERROR_MESSAGE);
                false
            }
        }
    }

    /// Replaces the document with the same `_id`, keeping order, then refreshes shared state.
    ///
    /// A document that is not present persists the unchanged list; adding goes through
    /// [`save_all`](Self::save_all). Failures propagate.
    pub async fn update_one(&self, document: LinkedDocument) -> DocumentsResult<()> {
        self.replace(document).await
    }

    pub async fn update_folder(&self, folder: LinkedDocument) -> DocumentsResult<()> {
        self.replace(folder).await
    }

    /// Surface configuration wired to this adapter's handlers.
    pub fn surface_config(self: &Arc<Self>) -> DocumentsResult<SurfaceConfig> {
        let entity = self.entity();
        self.profile.surface_config(
            self.project(),
            LinkedItem::of(entity.as_ref()),
            entity.person_id().cloned(),
            Arc::clone(self) as Arc<dyn DocumentHandlers>,
        )
    }

    async fn replace(&self, document: LinkedDocument) -> DocumentsResult<()> {
        let _guard = self.acquire().await;
        let current = self.entity();
        let document = document.strip();
        let reconciled = reconcile::replace_by_id(current.documents(), &document);
        if !reconciled.matched {
            tracing::warn!(
                kind = %E::KIND,
                entity = %current.id(),
                document = %document.id,
                "update target not found, persisting unchanged documents"
            );
        }
        self.persist(&current, reconciled.documents).await?;
        self.refresh().await?;
        tracing::info!(kind = %E::KIND, entity = %current.id(), document = %document.id, "updated document");
        Ok(())
    }

    async fn try_remove(
        &self,
        document: LinkedDocument,
        remove: fn(&[Document], &DocumentId) -> Reconciled,
    ) -> DocumentsResult<()> {
        let _guard = self.acquire().await;
        let current = self.entity();
        let id = document.strip().id;
        let reconciled = remove(current.documents(), &id);
        if !reconciled.matched {
            tracing::warn!(
                kind = %E::KIND,
                entity = %current.id(),
                document = %id,
                "delete target not found, persisting unchanged documents"
            );
        }
        self.persist(&current, reconciled.documents).await?;
        self.refresh().await?;
        tracing::info!(kind = %E::KIND, entity = %current.id(), document = %id, "deleted document");
        Ok(())
    }

    async fn persist(&self, current: &E, documents: Vec<Document>) -> DocumentsResult<()> {
        ensure_untagged(&documents)?;
        let next = current.with_documents(documents);
        self.capabilities
            .updater
            .update(next.clone())
            .await
            .map_err(|source| DocumentsError::Persistence {
                kind: E::KIND,
                id: current.id().clone(),
                source,
            })?;

        // Accepted by the backend: later operations start from it.
        self.set_entity(Arc::new(next));
        Ok(())
    }

    async fn refresh(&self) -> DocumentsResult<()> {
        self.capabilities
            .refresher
            .refresh()
            .await
            .map_err(DocumentsError::Refresh)
    }

    async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match self.policy {
            MutationPolicy::Serialized => Some(self.gate.lock().await),
            MutationPolicy::Concurrent => None,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot<E>> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Snapshot<E>> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<E: DocumentOwner> DocumentHandlers for LinkedDocumentsAdapter<E> {
    fn linked_item(&self) -> LinkedItem {
        LinkedDocumentsAdapter::linked_item(self)
    }

    fn documents(&self) -> Arc<[LinkedDocument]> {
        self.project()
    }

    async fn save_documents(&self, documents: Vec<LinkedDocument>) -> DocumentsResult<()> {
        self.save_all(documents).await
    }

    async fn update_document(&self, document: LinkedDocument) -> DocumentsResult<()> {
        self.update_one(document).await
    }

    async fn delete_document(&self, document: LinkedDocument) -> bool {
        self.delete_one(document).await
    }

    async fn update_folder(&self, folder: LinkedDocument) -> DocumentsResult<()> {
        LinkedDocumentsAdapter::update_folder(self, folder).await
    }

    async fn delete_folder(&self, folder: LinkedDocument) -> bool {
        LinkedDocumentsAdapter::delete_folder(self, folder).await
    }
}
