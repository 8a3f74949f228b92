//! Public models for the `campus-orgs` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `campus-orgs` module and its consumers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use time::{Date, OffsetDateTime, Time};

use crate::errors::ParseVenueError;

// ==================== Scheduling ====================

/// A bookable campus venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Venue {
    Gymnasium,
    Auditorium,
    AudioVisualRoom,
    Library,
    Quadrangle,
    /// A numbered or lettered classroom, e.g. `Room A` or `Room 204`.
    Room(String),
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gymnasium => f.write_str("Gymnasium"),
            Self::Auditorium => f.write_str("Auditorium"),
            Self::AudioVisualRoom => f.write_str("Audio Visual Room"),
            Self::Library => f.write_str("Library"),
            Self::Quadrangle => f.write_str("Quadrangle"),
            Self::Room(name) => write!(f, "Room {name}"),
        }
    }
}

impl FromStr for Venue {
    type Err = ParseVenueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "gymnasium" | "gym" => return Ok(Self::Gymnasium),
            "auditorium" => return Ok(Self::Auditorium),
            "audio visual room" | "audio-visual room" | "avr" => return Ok(Self::AudioVisualRoom),
            "library" => return Ok(Self::Library),
            "quadrangle" | "quad" => return Ok(Self::Quadrangle),
            _ => {}
        }

        if lower.starts_with("room ") {
            let name = trimmed[5..].trim();
            if !name.is_empty() {
                return Ok(Self::Room(name.to_owned()));
            }
        }

        Err(ParseVenueError::new(trimmed))
    }
}

/// Review state of a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    /// Whether an event in this state holds its venue slot.
    #[must_use]
    pub fn occupies_venue(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// A scheduled campus event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub location: Venue,
    pub title: String,
    pub participants_cap: u32,
    pub status: EventStatus,
}

/// Data for creating a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub location: Venue,
    pub title: String,
    pub participants_cap: u32,
}

impl NewEvent {
    /// The slot this event wants to book.
    #[must_use]
    pub fn candidate(&self) -> ScheduleCandidate {
        ScheduleCandidate {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location.clone(),
        }
    }
}

/// A requested date, time range and venue to be checked for conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCandidate {
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub location: Venue,
}

impl From<&Event> for ScheduleCandidate {
    fn from(event: &Event) -> Self {
        Self {
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
        }
    }
}

/// A same-day time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Time,
    pub end: Time,
}

/// Result of checking a candidate against existing events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicts: Vec<Event>,
    pub suggestions: Vec<TimeRange>,
}

/// Outcome of an event creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventCreation {
    Created(Event),
    Conflicted(ConflictReport),
}

// ==================== Membership ====================

/// An officer entry of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officer {
    pub email: String,
    pub position: String,
}

/// An organization with its three disjoint membership sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Organization {
    pub name: String,
    pub applicants: Vec<String>,
    pub members: Vec<String>,
    pub officers: Vec<Officer>,
    /// Allow-list of eligible course codes. Empty means anyone may apply.
    pub can_join: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn counts(&self) -> MembershipCounts {
        MembershipCounts {
            applicants: self.applicants.len(),
            members: self.members.len(),
            officers: self.officers.len(),
        }
    }

    #[must_use]
    pub fn officer(&self, email: &str) -> Option<&Officer> {
        self.officers.iter().find(|o| o.email == email)
    }
}

/// Status of a membership renewal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalStatus {
    Pending,
    Approved,
    Denied,
}

/// A member-initiated renewal request for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalRequest {
    pub status: RenewalStatus,
    pub message: String,
    pub requested_at: OffsetDateTime,
}

/// The parts of a user record the membership lifecycle reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub email: String,
    pub course: Option<String>,
    pub orgs: Vec<String>,
    pub renewal_approvals: BTreeMap<String, bool>,
    pub renewal_requests: BTreeMap<String, RenewalRequest>,
}

impl UserProfile {
    #[must_use]
    pub fn has_pending_renewal(&self, org_name: &str) -> bool {
        self.renewal_requests
            .get(org_name)
            .is_some_and(|r| r.status == RenewalStatus::Pending)
    }
}

/// Membership state of a (user, organization) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipState {
    None,
    Applicant,
    Member,
    Officer { position: String },
}

/// Sizes of the three membership sets after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MembershipCounts {
    pub applicants: usize,
    pub members: usize,
    pub officers: usize,
}

/// A membership lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipAction {
    Apply,
    CancelApplication,
    Approve,
    Deny,
    AssignOfficer { position: String },
    RemoveMember,
    RemoveFromOfficer,
    RequestRenewal,
    DecideRenewal { approved: bool },
    BulkRemove,
}

impl MembershipAction {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::CancelApplication => "cancel_application",
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::AssignOfficer { .. } => "assign_officer",
            Self::RemoveMember => "remove_member",
            Self::RemoveFromOfficer => "remove_from_officer",
            Self::RequestRenewal => "request_renewal",
            Self::DecideRenewal { .. } => "decide_renewal",
            Self::BulkRemove => "bulk_remove",
        }
    }
}

/// A single state change request: who did what to whom, in which organization.
///
/// Transitions are never persisted. Their effect is the mutation of the
/// organization and user records plus, for most actions, a notification
/// to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipTransition {
    pub action: MembershipAction,
    pub actor: String,
    pub target: String,
    pub organization: String,
    pub reason: Option<String>,
}

impl MembershipTransition {
    /// Text sent to the target, or `None` when the action is silent.
    #[must_use]
    pub fn notification_text(&self) -> Option<String> {
        let org = &self.organization;
        let reason = self.reason.as_deref().unwrap_or_default();
        match &self.action {
            MembershipAction::Apply
            | MembershipAction::CancelApplication
            | MembershipAction::RequestRenewal => None,
            MembershipAction::Approve => {
                Some(format!("Your application to {org} has been approved."))
            }
            MembershipAction::Deny => {
                Some(format!("Your application to {org} was denied: {reason}"))
            }
            MembershipAction::AssignOfficer { position } => {
                Some(format!("You have been assigned as {position} of {org}."))
            }
            MembershipAction::RemoveMember => {
                Some(format!("You have been removed from {org}: {reason}"))
            }
            MembershipAction::RemoveFromOfficer => Some(format!(
                "You have been removed from your officer position in {org}: {reason}"
            )),
            MembershipAction::DecideRenewal { approved: true } => {
                Some(format!("Your membership renewal for {org} has been approved."))
            }
            MembershipAction::DecideRenewal { approved: false } => {
                Some(format!("Your membership renewal for {org} has been denied."))
            }
            MembershipAction::BulkRemove => Some(reason.to_owned()),
        }
    }

    #[must_use]
    pub fn notification_kind(&self) -> NotificationKind {
        match self.action {
            MembershipAction::DecideRenewal { .. } => NotificationKind::Renewal,
            _ => NotificationKind::Event,
        }
    }
}

/// Result of a single-user membership transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub organization: String,
    pub state: MembershipState,
    pub counts: MembershipCounts,
    /// `false` when the notification could not be delivered.
    pub notified: bool,
}

/// Result of removing every plain member of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRemovalOutcome {
    pub organization: String,
    pub removed: Vec<String>,
    pub notified: usize,
    pub counts: MembershipCounts,
}

// ==================== Notifications ====================

/// Category shown by the client for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Event,
    Renewal,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Renewal => "renewal",
        }
    }
}

/// A message addressed to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub content: String,
}

// ==================== Context ====================

/// The user performing a membership action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub email: String,
}

impl ActorContext {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}
