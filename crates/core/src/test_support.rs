//! Recording fakes for the external capabilities.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mano_types::{DocumentId, EntityId};

use crate::adapter::LinkedDocumentsAdapter;
use crate::capabilities::{Capabilities, EntityUpdater, ErrorNotifier, Refresher};
use crate::config::{CoreConfig, MutationPolicy};
use crate::document::{tag, Document, LinkedDocument, LinkedItem};
use crate::entity::{Action, DocumentOwner};
use crate::error::BackendError;

pub(crate) struct RecordingUpdater<E> {
    calls: Mutex<Vec<E>>,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl<E: Clone> RecordingUpdater<E> {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            delay: None,
        }
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub(crate) fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every entity passed to `update`, failed attempts included, in completion order.
    pub(crate) fn calls(&self) -> Vec<E> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Option<E> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> EntityUpdater<E> for RecordingUpdater<E> {
    async fn update(&self, next: E) -> Result<(), BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(next);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection reset".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct CountingRefresher {
    count: AtomicUsize,
    fail: AtomicBool,
}

impl CountingRefresher {
    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Refresher for CountingRefresher {
    async fn refresh(&self) -> Result<(), BackendError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected {
                status: 503,
                message: "maintenance".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ErrorNotifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }
}

pub(crate) fn doc(id: &str, name: &str) -> Document {
    Document::new(DocumentId::parse(id).unwrap()).with_name(name)
}

pub(crate) fn bare_doc(id: &str) -> Document {
    Document::new(DocumentId::parse(id).unwrap())
}

pub(crate) fn action(id: &str, documents: Option<Vec<Document>>) -> Action {
    Action {
        id: EntityId::parse(id).unwrap(),
        person: EntityId::parse("person-1").unwrap(),
        name: Some("Rendez-vous CAF".into()),
        documents,
        extra: Default::default(),
    }
}

pub(crate) fn linked<E: DocumentOwner>(entity: &E, document: Document) -> LinkedDocument {
    tag(&document, &LinkedItem::of(entity))
}

pub(crate) struct Harness<E: DocumentOwner> {
    pub(crate) adapter: Arc<LinkedDocumentsAdapter<E>>,
    pub(crate) updater: Arc<RecordingUpdater<E>>,
    pub(crate) refresher: Arc<CountingRefresher>,
    pub(crate) notifier: Arc<RecordingNotifier>,
}

pub(crate) fn harness<E: DocumentOwner>(entity: E, policy: MutationPolicy) -> Harness<E> {
    harness_with_updater(entity, policy, RecordingUpdater::new())
}

pub(crate) fn harness_with_updater<E: DocumentOwner>(
    entity: E,
    policy: MutationPolicy,
    updater: RecordingUpdater<E>,
) -> Harness<E> {
    let updater = Arc::new(updater);
    let refresher = Arc::new(CountingRefresher::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let config = CoreConfig::new(policy, crate::constants::DELETE_ERROR_MESSAGE.into(), Vec::new())
        .unwrap();
    let capabilities = Capabilities::new(
        updater.clone() as Arc<dyn EntityUpdater<E>>,
        refresher.clone() as Arc<dyn Refresher>,
        notifier.clone() as Arc<dyn ErrorNotifier>,
    );
    let adapter = Arc::new(LinkedDocumentsAdapter::new(entity, capabilities, &config));
    Harness {
        adapter,
        updater,
        refresher,
        notifier,
    }
}
