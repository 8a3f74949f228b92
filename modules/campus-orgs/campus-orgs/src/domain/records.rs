//! Typed views of store documents.
//!
//! Documents are decoded here, at the store boundary. Missing set-valued
//! fields default to empty; anything that does not decode is reported as a
//! malformed record instead of being passed along half-read.

use std::collections::BTreeMap;

use campus_orgs_sdk::{
    Event, EventStatus, Officer, Organization, RenewalRequest, RenewalStatus, UserProfile, Venue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::error::DomainError;
use super::schedule::{format_date, format_time, parse_date, parse_time};
use super::store::Document;

/// Field names shared by the domain and the store documents.
pub struct Fields;

impl Fields {
    pub const APPLICANTS: &'static str = "applicants";
    pub const MEMBERS: &'static str = "members";
    pub const OFFICERS: &'static str = "officers";
    pub const ORGS: &'static str = "orgs";
    pub const RENEWAL_APPROVALS: &'static str = "renewalApprovals";
    pub const RENEWAL_REQUESTS: &'static str = "renewalRequests";
    pub const STATUS: &'static str = "status";
    pub const DATE: &'static str = "date";
    pub const EMAIL: &'static str = "email";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationDoc {
    #[serde(default)]
    applicants: Vec<String>,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    officers: Vec<Value>,
    #[serde(default)]
    can_join: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OfficerDoc {
    email: String,
    position: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDoc {
    #[serde(rename = "Course", default)]
    course: Option<String>,
    #[serde(default)]
    orgs: Vec<String>,
    #[serde(default)]
    renewal_approvals: BTreeMap<String, bool>,
    #[serde(default)]
    renewal_requests: BTreeMap<String, RenewalRequestDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalRequestDoc {
    status: String,
    #[serde(default)]
    message: String,
    requested_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDoc {
    date: String,
    start_time: String,
    end_time: String,
    location: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    participants_cap: u32,
    #[serde(default)]
    status: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(
    collection: &str,
    id: &str,
    doc: Document,
) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| DomainError::malformed(collection, id, e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Store(e.into()))
}

/// An organization along with its officer entries exactly as stored.
///
/// Array removal matches whole elements, and a stored entry may carry
/// fields beyond `email` and `position`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrganizationRecord {
    pub organization: Organization,
    pub officer_entries: Vec<Value>,
}

pub(crate) fn decode_organization_record(
    collection: &str,
    name: &str,
    doc: Document,
) -> Result<OrganizationRecord, DomainError> {
    let raw: OrganizationDoc = decode(collection, name, doc)?;
    let officers = raw
        .officers
        .iter()
        .map(|entry| {
            serde_json::from_value::<OfficerDoc>(entry.clone())
                .map(|o| Officer {
                    email: o.email,
                    position: o.position,
                })
                .map_err(|e| DomainError::malformed(collection, name, format!("officer entry: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrganizationRecord {
        organization: Organization {
            name: name.to_owned(),
            applicants: raw.applicants,
            members: raw.members,
            officers,
            can_join: raw.can_join,
        },
        officer_entries: raw.officers,
    })
}


/// Stored form of an officer entry, as used by array union/remove.
pub(crate) fn officer_value(officer: &Officer) -> Result<Value, DomainError> {
    encode(&OfficerDoc {
        email: officer.email.clone(),
        position: officer.position.clone(),
    })
}

pub(crate) fn decode_user(
    collection: &str,
    email: &str,
    doc: Document,
) -> Result<UserProfile, DomainError> {
    let raw: UserDoc = decode(collection, email, doc)?;

    let mut renewal_requests = BTreeMap::new();
    for (org, request) in raw.renewal_requests {
        let status = renewal_status_from_str(&request.status).ok_or_else(|| {
            DomainError::malformed(
                collection,
                email,
                format!("unknown renewal status '{}' for {org}", request.status),
            )
        })?;
        let requested_at = OffsetDateTime::parse(&request.requested_at, &Rfc3339).map_err(|e| {
            DomainError::malformed(collection, email, format!("requestedAt for {org}: {e}"))
        })?;
        renewal_requests.insert(
            org,
            RenewalRequest {
                status,
                message: request.message,
                requested_at,
            },
        );
    }

    Ok(UserProfile {
        email: email.to_owned(),
        course: raw.course.filter(|c| !c.trim().is_empty()),
        orgs: raw.orgs,
        renewal_approvals: raw.renewal_approvals,
        renewal_requests,
    })
}

pub(crate) fn renewal_status_str(status: RenewalStatus) -> &'static str {
    match status {
        RenewalStatus::Pending => "pending",
        RenewalStatus::Approved => "approved",
        RenewalStatus::Denied => "denied",
    }
}

fn renewal_status_from_str(s: &str) -> Option<RenewalStatus> {
    match s {
        "pending" => Some(RenewalStatus::Pending),
        "approved" => Some(RenewalStatus::Approved),
        "denied" => Some(RenewalStatus::Denied),
        _ => None,
    }
}

/// Stored form of a renewal request.
pub(crate) fn renewal_request_value(request: &RenewalRequest) -> Result<Value, DomainError> {
    let requested_at = request
        .requested_at
        .format(&Rfc3339)
        .map_err(|e| DomainError::Store(e.into()))?;
    encode(&RenewalRequestDoc {
        status: renewal_status_str(request.status).to_owned(),
        message: request.message.clone(),
        requested_at,
    })
}

pub(crate) fn event_status_str(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Pending => "pending",
        EventStatus::Approved => "approved",
        EventStatus::Rejected => "rejected",
    }
}

fn event_status_from_str(s: &str) -> Option<EventStatus> {
    match s.to_ascii_lowercase().as_str() {
        "pending" => Some(EventStatus::Pending),
        "approved" => Some(EventStatus::Approved),
        "rejected" | "denied" => Some(EventStatus::Rejected),
        _ => None,
    }
}

pub(crate) fn decode_event(collection: &str, id: &str, doc: Document) -> Result<Event, DomainError> {
    let raw: EventDoc = decode(collection, id, doc)?;

    let location: Venue = raw
        .location
        .parse()
        .map_err(|_| DomainError::parse(&raw.location, "venue"))?;
    let status = match raw.status.as_deref() {
        None => EventStatus::Pending,
        Some(s) => event_status_from_str(s).ok_or_else(|| {
            DomainError::malformed(collection, id, format!("unknown event status '{s}'"))
        })?,
    };

    Ok(Event {
        id: id.to_owned(),
        date: parse_date(&raw.date)?,
        start_time: parse_time(&raw.start_time)?,
        end_time: parse_time(&raw.end_time)?,
        location,
        title: raw.title,
        participants_cap: raw.participants_cap,
        status,
    })
}

pub(crate) fn encode_event(event: &Event) -> Result<Document, DomainError> {
    let value = encode(&EventDoc {
        date: format_date(event.date),
        start_time: format_time(event.start_time),
        end_time: format_time(event.end_time),
        location: event.location.to_string(),
        title: event.title.clone(),
        participants_cap: event.participants_cap,
        status: Some(event_status_str(event.status).to_owned()),
    })?;
    match value {
        Value::Object(doc) => Ok(doc),
        _ => Err(DomainError::malformed("events", &event.id, "not an object")),
    }
}
