use campus_orgs_sdk::{
    ActorContext, ConflictReport, Event, EventCreation, EventStatus, NewEvent, ScheduleCandidate,
};
use tracing::instrument;
use uuid::Uuid;

use super::{actor_of, required, Service};
use crate::domain::error::DomainError;
use crate::domain::records::{decode_event, encode_event, Fields};
use crate::domain::schedule::{format_date, validate_interval};
use crate::domain::store::{FieldPath, Filter};

impl Service {
    /// Check a candidate against the stored events for its date and venue.
    ///
    /// Rejected events do not occupy the venue and are ignored.
    ///
    /// # Errors
    /// `Validation` for an interval shorter than a minute, `Parse` for a
    /// stored event on that date with a malformed time or venue, `Store` when
    /// the lookup fails.
    #[instrument(
        skip(self, candidate),
        fields(date = %format_date(candidate.date), location = %candidate.location)
    )]
    pub async fn check_schedule(
        &self,
        candidate: &ScheduleCandidate,
    ) -> Result<ConflictReport, DomainError> {
        validate_interval(candidate.start_time, candidate.end_time)?;

        let existing = self.events_at(candidate).await?;
        tracing::debug!(existing = existing.len(), "Checking schedule");
        self.config.checker.check(candidate, &existing)
    }

    /// Store a new pending event unless its slot conflicts.
    ///
    /// The check is advisory: two callers racing for the same slot can both
    /// succeed.
    ///
    /// # Errors
    /// `Validation` for an empty title, a zero cap, times with sub-second
    /// precision or an interval shorter than a minute.
    #[instrument(
        skip(self, ctx, new_event),
        fields(actor = %actor_of(ctx), title = %new_event.title)
    )]
    pub async fn create_event(
        &self,
        ctx: &ActorContext,
        new_event: NewEvent,
    ) -> Result<EventCreation, DomainError> {
        let title = required("title", &new_event.title)?;
        if new_event.participants_cap == 0 {
            return Err(DomainError::validation(
                "participants_cap",
                "must be greater than zero",
            ));
        }
        for (field, time) in [
            ("start_time", new_event.start_time),
            ("end_time", new_event.end_time),
        ] {
            if time.nanosecond() != 0 {
                return Err(DomainError::validation(
                    field,
                    "must be given in whole seconds",
                ));
            }
        }

        let report = self.check_schedule(&new_event.candidate()).await?;
        if report.has_conflict {
            tracing::info!(
                conflicts = report.conflicts.len(),
                suggestions = report.suggestions.len(),
                "Event not created: slot is taken"
            );
            return Ok(EventCreation::Conflicted(report));
        }

        let event = Event {
            id: Uuid::new_v4().to_string(),
            date: new_event.date,
            start_time: new_event.start_time,
            end_time: new_event.end_time,
            location: new_event.location,
            title,
            participants_cap: new_event.participants_cap,
            status: EventStatus::Pending,
        };
        self.store
            .set(&self.config.collections.events, &event.id, encode_event(&event)?)
            .await?;

        tracing::info!(event_id = %event.id, "Event created");
        Ok(EventCreation::Created(event))
    }

    /// Events holding the candidate's venue on its date.
    ///
    /// Stored locations may use any accepted venue spelling, so the store is
    /// queried by date and the venue is compared after decoding.
    async fn events_at(&self, candidate: &ScheduleCandidate) -> Result<Vec<Event>, DomainError> {
        let collection = &self.config.collections.events;
        let filter =
            Filter::new().where_eq(FieldPath::field(Fields::DATE), format_date(candidate.date));

        let mut events = Vec::new();
        for stored in self.store.find(collection, &filter).await? {
            let event = decode_event(collection, &stored.id, stored.data)?;
            if event.location == candidate.location && event.status.occupies_venue() {
                events.push(event);
            }
        }
        Ok(events)
    }
}
