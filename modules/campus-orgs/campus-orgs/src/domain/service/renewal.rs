use campus_orgs_sdk::{
    ActorContext, MembershipAction, RenewalStatus, TransitionOutcome, UserProfile,
};
use time::OffsetDateTime;
use tracing::instrument;

use super::{actor_of, normalize_email, required, transition, Service};
use crate::domain::error::DomainError;
use crate::domain::membership::{plan_decide_renewal, plan_request_renewal, stored_spelling};
use crate::domain::records::{decode_user, renewal_status_str, Fields};
use crate::domain::store::{FieldPath, Filter};

impl Service {
    /// Record a pending renewal request from a current member.
    ///
    /// # Errors
    /// `Validation` for an empty message, `Guard` when the user is not in the
    /// organization or already has a pending request.
    #[instrument(skip(self, ctx, message), fields(actor = %actor_of(ctx)))]
    pub async fn request_renewal(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        message: &str,
    ) -> Result<TransitionOutcome, DomainError> {
        let message = required("message", message)?;
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let user = self.load_user(&email).await?;
        let plan = plan_request_renewal(&org, &user, &message, OffsetDateTime::now_utc())?;

        let transition = transition(
            ctx,
            MembershipAction::RequestRenewal,
            email,
            org_name,
            Some(message),
        );
        self.run_transition(transition, plan).await
    }

    /// Approve or deny a pending renewal request.
    ///
    /// # Errors
    /// `Guard` when there is no pending request.
    #[instrument(skip(self, ctx), fields(actor = %actor_of(ctx)))]
    pub async fn decide_renewal(
        &self,
        ctx: &ActorContext,
        org_name: &str,
        email: &str,
        approve: bool,
    ) -> Result<TransitionOutcome, DomainError> {
        let org_name = required("organization", org_name)?;
        let email = normalize_email(email)?;

        let org = self.load_organization(&org_name).await?;
        let email = stored_spelling(&org, &email);
        let user = self.load_user(&email).await?;
        let plan = plan_decide_renewal(&org, &user, approve)?;

        let transition = transition(
            ctx,
            MembershipAction::DecideRenewal { approved: approve },
            email,
            org_name,
            None,
        );
        self.run_transition(transition, plan).await
    }

    /// Users with a pending renewal request for the organization.
    ///
    /// # Errors
    /// `Store` when the lookup fails or a matching user record is malformed.
    pub async fn pending_renewals(&self, org_name: &str) -> Result<Vec<UserProfile>, DomainError> {
        let org_name = required("organization", org_name)?;
        let collection = &self.config.collections.users;
        let filter = Filter::new().where_eq(
            FieldPath::new([Fields::RENEWAL_REQUESTS, org_name.as_str(), Fields::STATUS]),
            renewal_status_str(RenewalStatus::Pending),
        );

        let found = self.store.find(collection, &filter).await?;
        tracing::debug!(organization = %org_name, pending = found.len(), "Loaded pending renewals");

        found
            .into_iter()
            .map(|doc| decode_user(collection, &doc.id, doc.data))
            .collect()
    }
}
