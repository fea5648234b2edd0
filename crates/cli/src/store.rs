//! JSON snapshot file standing in for the REST backend.
//!
//! The file holds one array per entity kind:
//!
//! ```json
//! { "actions": [], "consultations": [], "treatments": [], "persons": [] }
//! ```
//!
//! Writes are read-modify-write against the file itself, so the file stays the authority and
//! the in-memory copy only changes on [`Refresher::refresh`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mano_core::{
    Action, BackendError, Consultation, DocumentOwner, EntityId, EntityUpdater, Person, Refresher,
    Treatment,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub consultations: Vec<Consultation>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
    #[serde(default)]
    pub persons: Vec<Person>,
}

/// Maps an entity kind to its array in the snapshot.
pub trait Collection: DocumentOwner + Serialize + DeserializeOwned {
    fn collection(snapshot: &StoreSnapshot) -> &Vec<Self>;
    fn collection_mut(snapshot: &mut StoreSnapshot) -> &mut Vec<Self>;
}

impl Collection for Action {
    fn collection(snapshot: &StoreSnapshot) -> &Vec<Self> {
        &snapshot.actions
    }
    fn collection_mut(snapshot: &mut StoreSnapshot) -> &mut Vec<Self> {
        &mut snapshot.actions
    }
}

impl Collection for Consultation {
    fn collection(snapshot: &StoreSnapshot) -> &Vec<Self> {
        &snapshot.consultations
    }
    fn collection_mut(snapshot: &mut StoreSnapshot) -> &mut Vec<Self> {
        &mut snapshot.consultations
    }
}

impl Collection for Treatment {
    fn collection(snapshot: &StoreSnapshot) -> &Vec<Self> {
        &snapshot.treatments
    }
    fn collection_mut(snapshot: &mut StoreSnapshot) -> &mut Vec<Self> {
        &mut snapshot.treatments
    }
}

impl Collection for Person {
    fn collection(snapshot: &StoreSnapshot) -> &Vec<Self> {
        &snapshot.persons
    }
    fn collection_mut(snapshot: &mut StoreSnapshot) -> &mut Vec<Self> {
        &mut snapshot.persons
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<Arc<StoreSnapshot>>,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let path = path.into();
        let snapshot = read_file(&path).await?;
        Ok(Self {
            path,
            state: RwLock::new(Arc::new(snapshot)),
            write_lock: Mutex::new(()),
        })
    }

    pub async fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&*self.state.read().await)
    }

    pub async fn find<E: Collection>(&self, id: &EntityId) -> Option<E> {
        let snapshot = self.snapshot().await;
        E::collection(&snapshot)
            .iter()
            .find(|entity| entity.id() == id)
            .cloned()
    }

    /// Every entity of kind `E` belonging to `person`.
    pub async fn for_person<E: Collection>(&self, person: &EntityId) -> Vec<E> {
        let snapshot = self.snapshot().await;
        E::collection(&snapshot)
            .iter()
            .filter(|entity| entity.person_id() == Some(person))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<E: Collection> EntityUpdater<E> for JsonFileStore {
    async fn update(&self, next: E) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = read_file(&self.path).await?;
        let slot = E::collection_mut(&mut snapshot)
            .iter_mut()
            .find(|entity| entity.id() == next.id())
            .ok_or_else(|| BackendError::Rejected {
                status: 404,
                message: format!("{} {} not found", E::KIND, next.id()),
            })?;
        *slot = next;
        write_file(&self.path, &snapshot).await
    }
}

#[async_trait]
impl Refresher for JsonFileStore {
    async fn refresh(&self) -> Result<(), BackendError> {
        let snapshot = read_file(&self.path).await?;
        *self.state.write().await = Arc::new(snapshot);
        tracing::debug!(path = %self.path.display(), "store refreshed");
        Ok(())
    }
}

async fn read_file(path: &Path) -> Result<StoreSnapshot, BackendError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BackendError::Store(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| BackendError::Store(format!("failed to parse {}: {e}", path.display())))
}

async fn write_file(path: &Path, snapshot: &StoreSnapshot) -> Result<(), BackendError> {
    let contents = serde_json::to_string_pretty(snapshot)
        .map_err(|e| BackendError::Store(format!("failed to serialize store: {e}")))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| BackendError::Store(format!("failed to write {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| BackendError::Store(format!("failed to replace {}: {e}", path.display())))
}
