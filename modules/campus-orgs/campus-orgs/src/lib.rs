//! Campus Orgs Module Implementation
//!
//! Venue conflict checks for campus events and the organization membership
//! lifecycle. The public API is defined in `campus-orgs-sdk` and re-exported
//! here.

pub use campus_orgs_sdk::{
    ActorContext, BulkRemovalOutcome, CampusOrgsClientV1, CampusOrgsError, ConflictReport, Event,
    EventCreation, MembershipState, NewEvent, ScheduleCandidate, TransitionOutcome, Venue,
};

pub mod module;
pub use module::CampusOrgs;

pub mod local_client;
pub use local_client::CampusOrgsLocalClient;

pub mod config;
pub use config::CampusOrgsConfig;

#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
