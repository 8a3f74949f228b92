use std::sync::Arc;

use campus_orgs_sdk::CampusOrgsClientV1;
use tracing::info;

use crate::config::CampusOrgsConfig;
use crate::domain::ports::{DocumentStore, Notifier};
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::notify::StoreNotifier;
use crate::local_client::CampusOrgsLocalClient;

/// Wires the domain service to a document store.
pub struct CampusOrgs {
    service: Arc<Service>,
}

impl CampusOrgs {
    /// Build the module with notifications written to the configured
    /// notifications collection of the same store.
    ///
    /// # Errors
    /// Fails when the configuration does not validate.
    pub fn init(config: &CampusOrgsConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        let notifier = Arc::new(StoreNotifier::new(
            store.clone(),
            config.collections.notifications.clone(),
        ));
        Self::with_notifier(config, store, notifier)
    }

    /// Build the module with a caller-supplied notifier.
    ///
    /// # Errors
    /// Fails when the configuration does not validate.
    pub fn with_notifier(
        config: &CampusOrgsConfig,
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        info!("Initializing campus-orgs module");

        let service_config = ServiceConfig::try_from(config)?;
        let service = Arc::new(Service::new(store, notifier, service_config));

        info!(
            day_cutoff = %config.schedule.day_cutoff,
            max_suggestions = config.schedule.max_suggestions,
            "campus-orgs module initialized"
        );
        Ok(Self { service })
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// The public client for this module.
    #[must_use]
    pub fn client(&self) -> Arc<dyn CampusOrgsClientV1> {
        Arc::new(CampusOrgsLocalClient::new(self.service.clone()))
    }
}
