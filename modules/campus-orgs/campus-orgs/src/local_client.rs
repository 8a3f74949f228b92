use std::sync::Arc;

use async_trait::async_trait;
use campus_orgs_sdk::{
    ActorContext, BulkRemovalOutcome, CampusOrgsClientV1, CampusOrgsError, ConflictReport, Event,
    EventCreation, MembershipState, NewEvent, ScheduleCandidate, TransitionOutcome, UserProfile,
};

use crate::domain::service::Service;

/// In-process implementation of [`CampusOrgsClientV1`] over the domain service.
pub struct CampusOrgsLocalClient {
    service: Arc<Service>,
}

impl CampusOrgsLocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CampusOrgsClientV1 for CampusOrgsLocalClient {
    fn check_conflict(
        &self,
        candidate: &ScheduleCandidate,
        existing: &[Event],
    ) -> Result<ConflictReport, CampusOrgsError> {
        self.service
            .check_conflict(candidate, existing)
            .map_err(Into::into)
    }

    async fn check_schedule(
        &self,
        candidate: &ScheduleCandidate,
    ) -> Result<ConflictReport, CampusOrgsError> {
        self.service
            .check_schedule(candidate)
            .await
            .map_err(Into::into)
    }

    async fn create_event(
        &self,
        ctx: &ActorContext,
        new_event: NewEvent,
    ) -> Result<EventCreation, CampusOrgsError> {
        self.service
            .create_event(ctx, new_event)
            .await
            .map_err(Into::into)
    }

    async fn membership_state(
        &self,
        org_name: &str,
        email: &str,
    ) -> Result<MembershipState, CampusOrgsError> {
        self.service
            .membership_state(org_name, email)
            .await
            .map_err(Into::into)
    }

    async fn apply(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .apply(ctx, org_name, email)
            .await
            .map_err(Into::into)
    }

    async fn cancel_application(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .cancel_application(ctx, org_name, email)
            .await
            .map_err(Into::into)
    }

    async fn approve(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .approve(ctx, org_name, email)
            .await
            .map_err(Into::into)
    }

    async fn deny(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .deny(ctx, org_name, email, reason)
            .await
            .map_err(Into::into)
    }

    async fn assign_officer(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        position: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .assign_officer(ctx, org_name, email, position)
            .await
            .map_err(Into::into)
    }

    async fn remove_member(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .remove_member(ctx, org_name, email, reason)
            .await
            .map_err(Into::into)
    }

    async fn remove_from_officer(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .remove_from_officer(ctx, org_name, email, reason)
            .await
            .map_err(Into::into)
    }

    async fn request_renewal(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        message: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .request_renewal(ctx, org_name, email, message)
            .await
            .map_err(Into::into)
    }

    async fn decide_renewal(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        approve: bool,
    ) -> Result<TransitionOutcome, CampusOrgsError> {
        self.service
            .decide_renewal(ctx, org_name, email, approve)
            .await
            .map_err(Into::into)
    }

    async fn pending_renewals(&self, org_name: &str) -> Result<Vec<UserProfile>, CampusOrgsError> {
        self.service
            .pending_renewals(org_name)
            .await
            .map_err(Into::into)
    }

    async fn bulk_remove_all_members(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        message: &str,
    ) -> Result<BulkRemovalOutcome, CampusOrgsError> {
        self.service
            .bulk_remove_all_members(ctx, org_name, message)
            .await
            .map_err(Into::into)
    }
}
