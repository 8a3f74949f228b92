#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for campus-orgs integration tests

use std::sync::Arc;

use async_trait::async_trait;
use campus_orgs::domain::ports::{DocumentStore, Notifier};
use campus_orgs::domain::store::{Document, FieldOp, Filter, StoredDocument, WriteBatch};
use campus_orgs::infra::store::InMemoryDocumentStore;
use campus_orgs::{ActorContext, CampusOrgs, CampusOrgsClientV1, CampusOrgsConfig};
use campus_orgs_sdk::Notification;
use parking_lot::Mutex;
use serde_json::Value;

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

pub fn officer() -> ActorContext {
    ActorContext::new("president@campus.edu")
}

/// Notifier that keeps every notification it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("notification channel closed");
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

/// Store whose reads work but whose writes always fail.
pub struct ReadOnlyStore {
    pub inner: Arc<InMemoryDocumentStore>,
}

#[async_trait]
impl DocumentStore for ReadOnlyStore {
    async fn find(&self, collection: &str, filter: &Filter) -> anyhow::Result<Vec<StoredDocument>> {
        self.inner.find(collection, filter).await
    }

    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn set(&self, _collection: &str, _id: &str, _fields: Document) -> anyhow::Result<()> {
        anyhow::bail!("write quota exceeded")
    }

    async fn update(&self, _collection: &str, _id: &str, _ops: Vec<FieldOp>) -> anyhow::Result<()> {
        anyhow::bail!("write quota exceeded")
    }

    async fn commit(&self, _batch: WriteBatch) -> anyhow::Result<()> {
        anyhow::bail!("write quota exceeded")
    }
}

/// An in-memory store, a recording notifier and a client over both.
pub struct Harness {
    pub store: Arc<InMemoryDocumentStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub client: Arc<dyn CampusOrgsClientV1>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let notifier = Arc::new(notifier);
        let module =
            CampusOrgs::with_notifier(&CampusOrgsConfig::default(), store.clone(), notifier.clone())
                .unwrap();
        Self {
            store,
            notifier,
            client: module.client(),
        }
    }

    pub fn seed(&self, collection: &str, id: &str, value: Value) -> &Self {
        self.store.insert(collection, id, doc(value));
        self
    }

    pub async fn raw(&self, collection: &str, id: &str) -> Value {
        let doc = self
            .store
            .get(collection, id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("{collection}/{id} missing"));
        Value::Object(doc)
    }
}
