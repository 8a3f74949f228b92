//! Domain service for the campus-orgs module.
//!
//! The service reads documents through [`DocumentStore`], runs the pure
//! schedule and membership rules, commits the resulting field operations in
//! one batch and then notifies the affected user. Operations are split by
//! area: `events`, `membership` and `renewal`.

mod events;
mod membership;
mod renewal;

use std::sync::Arc;

use campus_orgs_sdk::{
    ActorContext, ConflictReport, Event, MembershipAction, MembershipTransition, Notification,
    Organization, ScheduleCandidate, TransitionOutcome, UserProfile,
};

use super::error::DomainError;
use super::membership::MembershipPlan;
use super::ports::{DocumentStore, Notifier};
use super::records::{decode_organization_record, decode_user, OrganizationRecord};
use super::schedule::ConflictChecker;
use super::store::WriteBatch;
use crate::config::CollectionsConfig;

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub checker: ConflictChecker,
    pub collections: CollectionsConfig,
}

pub struct Service {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Pure conflict check against events the caller already holds.
    ///
    /// # Errors
    /// Returns `DomainError::Validation` when the candidate does not end after it starts.
    pub fn check_conflict(
        &self,
        candidate: &ScheduleCandidate,
        existing: &[Event],
    ) -> Result<ConflictReport, DomainError> {
        self.config.checker.check(candidate, existing)
    }

    async fn load_organization(&self, name: &str) -> Result<Organization, DomainError> {
        self.load_organization_record(name)
            .await
            .map(|record| record.organization)
    }

    async fn load_organization_record(&self, name: &str) -> Result<OrganizationRecord, DomainError> {
        let collection = &self.config.collections.organizations;
        match self.store.get(collection, name).await? {
            Some(doc) => decode_organization_record(collection, name, doc),
            None => Err(DomainError::not_found(collection.as_str(), name)),
        }
    }

    async fn load_user(&self, email: &str) -> Result<UserProfile, DomainError> {
        let collection = &self.config.collections.users;
        match self.store.get(collection, email).await? {
            Some(doc) => decode_user(collection, email, doc),
            None => Err(DomainError::not_found(collection.as_str(), email)),
        }
    }

    /// Commit the plan's organization and user changes together, then notify.
    async fn run_transition(
        &self,
        transition: MembershipTransition,
        plan: MembershipPlan,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut batch = WriteBatch::new();
        batch.update(
            &self.config.collections.organizations,
            &transition.organization,
            plan.org_ops,
        );
        batch.update(
            &self.config.collections.users,
            &transition.target,
            plan.user_ops,
        );
        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }

        tracing::info!(
            organization = %transition.organization,
            target = %transition.target,
            actor = %transition.actor,
            action = transition.action.name(),
            "Membership transition committed"
        );

        let notified = self.notify(&transition).await;

        Ok(TransitionOutcome {
            organization: transition.organization,
            state: plan.state,
            counts: plan.organization.counts(),
            notified,
        })
    }

    /// Best-effort: a failed send is logged and reported as `false`.
    async fn notify(&self, transition: &MembershipTransition) -> bool {
        let Some(content) = transition.notification_text() else {
            return false;
        };
        let notification = Notification {
            user_id: transition.target.clone(),
            kind: transition.notification_kind(),
            content,
        };

        if let Err(e) = self.notifier.send(&notification).await {
            tracing::warn!(
                error = %e,
                user = %transition.target,
                organization = %transition.organization,
                action = transition.action.name(),
                "Failed to send notification"
            );
            return false;
        }
        true
    }
}

/// Trimmed email. Empty input is rejected.
///
/// Case is kept: user documents are keyed by the email as stored, and set
/// entries are matched through `stored_spelling` once the organization is
/// loaded.
fn normalize_email(raw: &str) -> Result<String, DomainError> {
    required("email", raw)
}

/// Trimmed text that must not be empty.
fn required(field: &str, raw: &str) -> Result<String, DomainError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(value.to_owned())
}

fn actor_of(ctx: &ActorContext) -> String {
    ctx.email.trim().to_owned()
}

fn transition(
    ctx: &ActorContext,
    action: MembershipAction,
    target: String,
    organization: String,
    reason: Option<String>,
) -> MembershipTransition {
    MembershipTransition {
        action,
        actor: actor_of(ctx),
        target,
        organization,
        reason,
    }
}
