use async_trait::async_trait;
use campus_orgs_sdk::Notification;

use super::store::{Document, FieldOp, Filter, StoredDocument, WriteBatch};

/// Document database the domain reads from and writes to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in the collection matching the filter.
    ///
    /// # Errors
    /// Fails when the backend cannot be read.
    async fn find(&self, collection: &str, filter: &Filter)
    -> anyhow::Result<Vec<StoredDocument>>;

    /// A single document by id.
    ///
    /// # Errors
    /// Fails when the backend cannot be read. A missing document is `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;

    /// Merge fields into a document, creating it when missing.
    ///
    /// # Errors
    /// Fails when the backend rejects the write.
    async fn set(&self, collection: &str, id: &str, fields: Document) -> anyhow::Result<()>;

    /// Apply field operations to an existing document as one update.
    ///
    /// # Errors
    /// Fails when the document does not exist or the backend rejects the write.
    async fn update(&self, collection: &str, id: &str, ops: Vec<FieldOp>) -> anyhow::Result<()>;

    /// Apply every write in the batch, or none of them.
    ///
    /// # Errors
    /// Fails when any write in the batch is rejected; nothing is applied then.
    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()>;
}

/// Outbound user notifications. Delivery is best-effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    /// Fails when delivery fails. Callers log and continue.
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}
