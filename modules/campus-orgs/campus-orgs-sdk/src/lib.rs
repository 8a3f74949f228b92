//! Campus Orgs SDK
//!
//! This crate provides the public API for the `campus-orgs` module:
//! - `CampusOrgsClientV1` trait
//! - Model types for events, organizations, users and membership transitions
//! - Error type (`CampusOrgsError`)
//!
//! ## Usage
//!
//! ```ignore
//! use campus_orgs_sdk::{ActorContext, CampusOrgsClientV1};
//!
//! let ctx = ActorContext::new("president@campus.edu");
//! let outcome = client.approve(&ctx, "Chess Club", "student@campus.edu").await?;
//! println!("{} members", outcome.counts.members);
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

// Re-export main types at crate root for convenience
pub use client::CampusOrgsClientV1;
pub use errors::{CampusOrgsError, ParseVenueError};
pub use models::{
    ActorContext, BulkRemovalOutcome, ConflictReport, Event, EventCreation, EventStatus,
    MembershipAction, MembershipCounts, MembershipState, MembershipTransition, NewEvent,
    Notification, NotificationKind, Officer, Organization, RenewalRequest, RenewalStatus,
    ScheduleCandidate, TimeRange, TransitionOutcome, UserProfile, Venue,
};
