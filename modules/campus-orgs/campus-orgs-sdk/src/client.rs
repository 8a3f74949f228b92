//! `CampusOrgsClientV1` trait definition.
//!
//! This trait defines the public API for the `campus-orgs` module. Every
//! membership mutation takes an `ActorContext` naming the user who
//! performs it.

use async_trait::async_trait;

use crate::errors::CampusOrgsError;
use crate::models::{
    ActorContext, BulkRemovalOutcome, ConflictReport, Event, EventCreation, MembershipState,
    NewEvent, ScheduleCandidate, TransitionOutcome, UserProfile,
};

/// Public API trait for the `campus-orgs` module.
///
/// ```ignore
/// let client: Arc<dyn CampusOrgsClientV1> = ...;
/// let outcome = client.approve(&ctx, "Chess Club", "student@campus.edu").await?;
/// ```
#[async_trait]
pub trait CampusOrgsClientV1: Send + Sync {
    // ==================== Scheduling ====================

    /// Check a candidate against events the caller already fetched.
    ///
    /// # Errors
    ///
    /// - `Validation` if the interval is shorter than a minute or ends before it starts
    fn check_conflict(
        &self,
        candidate: &ScheduleCandidate,
        existing: &[Event],
    ) -> Result<ConflictReport, CampusOrgsError>;

    /// Check a candidate against the events stored for its date and venue.
    ///
    /// # Errors
    ///
    /// - `Validation` if the interval is shorter than a minute
    /// - `Parse` if a stored event on that date cannot be read
    /// - `Store` if the lookup fails
    async fn check_schedule(
        &self,
        candidate: &ScheduleCandidate,
    ) -> Result<ConflictReport, CampusOrgsError>;

    /// Store a new event unless its slot is already taken.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty title, a zero cap or an invalid interval
    /// - `Store` if the lookup or the write fails
    async fn create_event(
        &self,
        ctx: &ActorContext,
        new_event: NewEvent,
    ) -> Result<EventCreation, CampusOrgsError>;

    // ==================== Membership ====================

    /// Current state of a user in an organization.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the organization does not exist
    async fn membership_state(
        &self,
        org_name: &str,
        email: &str,
    ) -> Result<MembershipState, CampusOrgsError>;

    /// Apply for membership.
    ///
    /// # Errors
    ///
    /// - `Guard` if the user already belongs to the organization or their course is not eligible
    /// - `NotFound` if the organization or the user does not exist
    async fn apply(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Withdraw a pending application.
    ///
    /// # Errors
    ///
    /// - `Guard` if the user is not an applicant
    async fn cancel_application(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Accept an applicant as a member.
    ///
    /// # Errors
    ///
    /// - `Guard` if the user is not an applicant
    /// - `NotFound` if the organization or the user does not exist
    async fn approve(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Reject an applicant with a reason.
    ///
    /// # Errors
    ///
    /// - `Validation` if the reason is blank
    /// - `Guard` if the user is not an applicant
    async fn deny(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Promote a member to an officer position.
    ///
    /// # Errors
    ///
    /// - `Validation` if the position is blank
    /// - `Guard` if the user is not a plain member
    async fn assign_officer(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        position: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Remove a plain member from the organization.
    ///
    /// # Errors
    ///
    /// - `Validation` if the reason is blank
    /// - `Guard` if the user is not a plain member
    async fn remove_member(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Demote an officer back to a plain member.
    ///
    /// # Errors
    ///
    /// - `Validation` if the reason is blank
    /// - `Guard` if the user holds no officer position
    async fn remove_from_officer(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        reason: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Record a pending renewal request for a member.
    ///
    /// # Errors
    ///
    /// - `Guard` if the user is not a member or already has a pending request
    async fn request_renewal(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        message: &str,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Approve or deny a pending renewal request.
    ///
    /// # Errors
    ///
    /// - `Guard` if no pending request exists
    async fn decide_renewal(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        approve: bool,
    ) -> Result<TransitionOutcome, CampusOrgsError>;

    /// Users with a pending renewal request for the organization.
    ///
    /// # Errors
    ///
    /// - `Store` if the lookup fails
    async fn pending_renewals(&self, org_name: &str)
    -> Result<Vec<UserProfile>, CampusOrgsError>;

    /// Remove every plain member, notifying each with `message`. Officers are kept.
    ///
    /// # Errors
    ///
    /// - `Validation` if the message is blank
    /// - `NotFound` if the organization does not exist
    async fn bulk_remove_all_members(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        message: &str,
    ) -> Result<BulkRemovalOutcome, CampusOrgsError>;
}
