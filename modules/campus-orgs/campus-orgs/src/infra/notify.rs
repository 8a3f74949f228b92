use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use campus_orgs_sdk::Notification;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::domain::ports::{DocumentStore, Notifier};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationDoc<'a> {
    user_id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
    read: bool,
    created_at: String,
}

/// Delivers notifications by writing them to a collection the client app
/// watches, one document per notification.
pub struct StoreNotifier {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl StoreNotifier {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Notifier for StoreNotifier {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        let doc = NotificationDoc {
            user_id: &notification.user_id,
            kind: notification.kind.as_str(),
            content: &notification.content,
            read: false,
            created_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
        };
        let Value::Object(fields) = serde_json::to_value(&doc)? else {
            anyhow::bail!("notification did not serialize to an object");
        };

        let id = Uuid::new_v4().to_string();
        self.store
            .set(&self.collection, &id, fields)
            .await
            .with_context(|| format!("storing notification for {}", notification.user_id))?;

        tracing::debug!(user = %notification.user_id, id = %id, "Notification stored");
        Ok(())
    }
}
