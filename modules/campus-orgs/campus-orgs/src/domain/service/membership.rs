use campus_orgs_sdk::{
    ActorContext, BulkRemovalOutcome, MembershipAction, MembershipState, TransitionOutcome,
};
use tracing::instrument;

use super::{actor_of, normalize_email, required, transition, Service};
use crate::domain::error::DomainError;
use crate::domain::membership::{
    membership_state, plan_apply, plan_approve, plan_assign_officer, plan_bulk_remove,
    plan_cancel, plan_deny, plan_remove_from_officer, plan_remove_member, stored_spelling,
    MembershipPlan,
};
use crate::domain::records::Fields;
use crate::domain::store::{FieldOp, WriteBatch};

impl Service {
    /// # Errors
    /// `NotFound` when the organization does not exist.
    pub async fn membership_state(
        &self,
        org_name: &str,
        email: &str,
    ) -> Result<MembershipState, DomainError> {
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;
        let org = self.load_organization(&org_name).await?;
        Ok(membership_state(&org, &stored_spelling(&org, &email)))
    }

    /// # Errors
    /// `Guard` when the user is already in the organization or their course
    /// is not allowed to join.
    #[instrument(skip(self, ctx), fields(actor = %actor_of(ctx)))]
    pub async fn apply(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let user = self.load_user(&email).await?;
        let plan = plan_apply(&org, &user)?;

        let transition = transition(ctx, MembershipAction::Apply, email, org_name, None);
        self.run_transition(transition, plan).await
    }

    /// # Errors
    /// `Guard` when there is no pending application.
    #[instrument(skip(self, ctx), fields(actor = %actor_of(ctx)))]
    pub async fn cancel_application(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let plan = plan_cancel(&org, &email)?;

        let transition = transition(
            ctx,
            MembershipAction::CancelApplication,
            email,
            org_name,
            None,
        );
        self.run_transition(transition, plan).await
    }

    /// # Errors
    /// `Guard` when the user is not an applicant or already holds a seat.
    #[instrument(skip(self, ctx), fields(actor = %actor_of(ctx)))]
    pub async fn approve(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let plan = plan_approve(&org, &email)?;
        self.ensure_user(&email, &plan).await?;

        let transition = transition(ctx, MembershipAction::Approve, email, org_name, None);
        self.run_transition(transition, plan).await
    }

    /// # Errors
    /// `Validation` for an empty reason, `Guard` when the user is not an applicant.
    #[instrument(skip(self, ctx, reason), fields(actor = %actor_of(ctx)))]
    pub async fn deny(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let reason = required("reason", reason)?;
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let plan = plan_deny(&org, &email)?;

        let transition = transition(ctx, MembershipAction::Deny, email, org_name, Some(reason));
        self.run_transition(transition, plan).await
    }

    /// # Errors
    /// `Validation` for an empty position, `Guard` when the user is not a
    /// plain member.
    #[instrument(skip(self, ctx), fields(actor = %actor_of(ctx)))]
    pub async fn assign_officer(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        position: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let position = required("position", position)?;
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let plan = plan_assign_officer(&org, &email, &position)?;

        let transition = transition(
            ctx,
            MembershipAction::AssignOfficer { position },
            email,
            org_name,
            None,
        );
        self.run_transition(transition, plan).await
    }

    /// # Errors
    /// `Validation` for an empty reason, `Guard` when the user is not a plain member.
    #[instrument(skip(self, ctx, reason), fields(actor = %actor_of(ctx)))]
    pub async fn remove_member(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let reason = required("reason", reason)?;
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let plan = plan_remove_member(&org, &email)?;
        self.ensure_user(&email, &plan).await?;

        let transition = transition(
            ctx,
            MembershipAction::RemoveMember,
            email,
            org_name,
            Some(reason),
        );
        self.run_transition(transition, plan).await
    }

    /// # Errors
    /// `Validation` for an empty reason, `Guard` when the user is not an officer.
    #[instrument(skip(self, ctx, reason), fields(actor = %actor_of(ctx)))]
    pub async fn remove_from_officer(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let reason = required("reason", reason)?;
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let record = self.load_organization_record(&org_name).await?;
        let email = stored_spelling(&record.organization, &email);
        let plan = plan_remove_from_officer(&record.organization, &record.officer_entries, &email)?;

        let transition = transition(
            ctx,
            MembershipAction::RemoveFromOfficer,
            email,
            org_name,
            Some(reason),
        );
        self.run_transition(transition, plan).await
    }

    /// Remove every plain member, dropping the organization from each
    /// member's `orgs` and sending them `message`.
    ///
    /// Members without a user document are still removed from the
    /// organization.
    ///
    /// # Errors
    /// `Validation` for an empty message, `Store` when the commit fails.
    #[instrument(skip(self, ctx, message), fields(actor = %actor_of(ctx)))]
    pub async fn bulk_remove_all_members(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        message: &str,
    ) -> Result<BulkRemovalOutcome, DomainError> {
        let message = required("message", message)?;
        let org_name = required("organization", org_name)?;

        let org = self.load_organization(&org_name).await?;
        let plan = plan_bulk_remove(&org);
        let users = &self.config.collections.users;

        let mut batch = WriteBatch::new();
        batch.update(
            &self.config.collections.organizations,
            &org_name,
            plan.org_ops,
        );
        for email in &plan.removed {
            if self.store.get(users, email).await?.is_some() {
                batch.update(
                    users,
                    email,
                    vec![FieldOp::remove(Fields::ORGS, org_name.as_str())],
                );
            } else {
                tracing::warn!(
                    user = %email,
                    organization = %org_name,
                    "User document missing, removing from organization only"
                );
            }
        }
        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }

        tracing::info!(
            organization = %org_name,
            removed = plan.removed.len(),
            "Removed all members"
        );

        let mut notified = 0;
        for email in &plan.removed {
            let transition = transition(
                ctx,
                MembershipAction::BulkRemove,
                email.clone(),
                org_name.clone(),
                Some(message.clone()),
            );
            if self.notify(&transition).await {
                notified += 1;
            }
        }

        Ok(BulkRemovalOutcome {
            counts: plan.organization.counts(),
            organization: org_name,
            removed: plan.removed,
            notified,
        })
    }

    /// A user document must exist before a plan touching it is committed.
    async fn ensure_user(&self, email: &str, plan: &MembershipPlan) -> Result<(), DomainError> {
        if plan.user_ops.is_empty() {
            return Ok(());
        }
        self.load_user(email).await.map(|_| ())
    }
}
