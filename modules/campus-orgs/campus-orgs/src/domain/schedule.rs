//! Venue conflict detection and alternative slot search.
//!
//! All intervals are half-open `[start, end)` on a single day, so an event
//! ending at 10:00 and one starting at 10:00 do not conflict.

use campus_orgs_sdk::{ConflictReport, Event, ScheduleCandidate, TimeRange};
use time::{format_description, Date, Duration, Time};

use super::error::DomainError;

const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_DAY: u64 = 1_440 * NANOS_PER_MINUTE;

const TIME_FORMATS: [&str; 3] = [
    "[hour padding:none]:[minute]",
    "[hour padding:none]:[minute]:[second]",
    "[hour repr:12 padding:none]:[minute] [period case_sensitive:false]",
];

/// Parse a calendar day written as `YYYY-MM-DD`.
///
/// # Errors
/// Returns `DomainError::Parse` when the input is not a valid date.
pub fn parse_date(input: &str) -> Result<Date, DomainError> {
    let format = format_description::parse("[year]-[month]-[day]")
        .map_err(|e| DomainError::parse(input, format!("date ({e})")))?;
    Date::parse(input.trim(), &format).map_err(|_| DomainError::parse(input, "date (YYYY-MM-DD)"))
}

/// Parse a time of day in 24-hour (`9:30`, `09:30`, `21:00:00`) or
/// 12-hour (`9:30 AM`) notation.
///
/// # Errors
/// Returns `DomainError::Parse` when no accepted notation matches.
pub fn parse_time(input: &str) -> Result<Time, DomainError> {
    let trimmed = input.trim();
    for description in TIME_FORMATS {
        let format = format_description::parse(description)
            .map_err(|e| DomainError::parse(input, format!("time ({e})")))?;
        if let Ok(parsed) = Time::parse(trimmed, &format) {
            return Ok(parsed);
        }
    }
    Err(DomainError::parse(input, "time (HH:MM or h:MM AM/PM)"))
}

/// Canonical `YYYY-MM-DD` form used in stored documents and filters.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Canonical 24-hour form used in stored documents: `HH:MM`, or `HH:MM:SS`
/// when the seconds are not zero.
#[must_use]
pub fn format_time(time: Time) -> String {
    let (hour, minute, second) = time.as_hms();
    if second == 0 {
        format!("{hour:02}:{minute:02}")
    } else {
        format!("{hour:02}:{minute:02}:{second:02}")
    }
}

/// Reject intervals that do not end at least a minute after they start.
///
/// # Errors
/// Returns `DomainError::Validation` for an empty, reversed or sub-minute interval.
pub fn validate_interval(start: Time, end: Time) -> Result<(), DomainError> {
    if end <= start {
        return Err(DomainError::validation(
            "end_time",
            "must be later than start_time",
        ));
    }
    if nanos_of_day(end) - nanos_of_day(start) < NANOS_PER_MINUTE {
        return Err(DomainError::validation(
            "end_time",
            "must be at least one minute after start_time",
        ));
    }
    Ok(())
}

/// Half-open interval overlap test.
#[must_use]
pub fn overlaps(start_a: Time, end_a: Time, start_b: Time, end_b: Time) -> bool {
    start_a < end_b && start_b < end_a
}

fn nanos_of_day(time: Time) -> u64 {
    let (hour, minute, second, nano) = time.as_hms_nano();
    (u64::from(hour) * 3600 + u64::from(minute) * 60 + u64::from(second)) * NANOS_PER_SECOND
        + u64::from(nano)
}

/// The time `nanos` after midnight, or `None` once the day is over.
fn time_at(nanos: u64) -> Option<Time> {
    if nanos >= NANOS_PER_DAY {
        return None;
    }
    Some(Time::MIDNIGHT + Duration::nanoseconds(i64::try_from(nanos).ok()?))
}

/// Checks a candidate slot against existing events and proposes alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictChecker {
    day_cutoff: Time,
    max_suggestions: usize,
}

impl Default for ConflictChecker {
    fn default() -> Self {
        Self {
            day_cutoff: Time::MIDNIGHT + Duration::hours(22),
            max_suggestions: 4,
        }
    }
}

impl ConflictChecker {
    #[must_use]
    pub fn new(day_cutoff: Time, max_suggestions: usize) -> Self {
        Self {
            day_cutoff,
            max_suggestions,
        }
    }

    #[must_use]
    pub fn day_cutoff(&self) -> Time {
        self.day_cutoff
    }

    #[must_use]
    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    /// Report every existing event at the same venue and day that overlaps
    /// the candidate, plus up to `max_suggestions` free slots of the same
    /// length after the conflicts.
    ///
    /// # Errors
    /// Returns `DomainError::Validation` when the candidate does not end at
    /// least a minute after it starts.
    pub fn check(
        &self,
        candidate: &ScheduleCandidate,
        existing: &[Event],
    ) -> Result<ConflictReport, DomainError> {
        validate_interval(candidate.start_time, candidate.end_time)?;

        let same_slot: Vec<&Event> = existing
            .iter()
            .filter(|e| e.date == candidate.date && e.location == candidate.location)
            .collect();

        let conflicts: Vec<Event> = same_slot
            .iter()
            .filter(|e| {
                overlaps(
                    candidate.start_time,
                    candidate.end_time,
                    e.start_time,
                    e.end_time,
                )
            })
            .map(|e| (*e).clone())
            .collect();

        let Some(latest_end) = conflicts.iter().map(|e| e.end_time).max() else {
            return Ok(ConflictReport::default());
        };

        let duration = nanos_of_day(candidate.end_time) - nanos_of_day(candidate.start_time);
        let suggestions = self.suggest(nanos_of_day(latest_end), duration, &same_slot);

        tracing::debug!(
            conflicts = conflicts.len(),
            suggestions = suggestions.len(),
            "Schedule conflict detected"
        );

        Ok(ConflictReport {
            has_conflict: true,
            conflicts,
            suggestions,
        })
    }

    /// Walk forward from `from` in `duration` steps, keeping slots that
    /// overlap none of `occupied`.
    fn suggest(&self, from: u64, duration: u64, occupied: &[&Event]) -> Vec<TimeRange> {
        let cutoff = nanos_of_day(self.day_cutoff);
        let mut suggestions = Vec::new();
        let mut cursor = from;

        while suggestions.len() < self.max_suggestions && cursor < cutoff {
            let (Some(start), Some(end)) = (time_at(cursor), time_at(cursor + duration)) else {
                break;
            };

            let free = !occupied
                .iter()
                .any(|e| overlaps(start, end, e.start_time, e.end_time));
            if free {
                suggestions.push(TimeRange { start, end });
            }

            cursor += duration;
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_orgs_sdk::{EventStatus, Venue};

    fn t(s: &str) -> Time {
        parse_time(s).unwrap()
    }

    fn day() -> Date {
        parse_date("2025-04-25").unwrap()
    }

    fn room_a() -> Venue {
        Venue::Room("A".to_owned())
    }

    fn event(id: &str, start: &str, end: &str) -> Event {
        Event {
            id: id.to_owned(),
            date: day(),
            start_time: t(start),
            end_time: t(end),
            location: room_a(),
            title: format!("Event {id}"),
            participants_cap: 30,
            status: EventStatus::Approved,
        }
    }

    fn candidate(start: &str, end: &str) -> ScheduleCandidate {
        ScheduleCandidate {
            date: day(),
            start_time: t(start),
            end_time: t(end),
            location: room_a(),
        }
    }

    #[test]
    fn parses_24_and_12_hour_times() {
        assert_eq!(t("9:30"), Time::from_hms(9, 30, 0).unwrap());
        assert_eq!(t("09:30"), Time::from_hms(9, 30, 0).unwrap());
        assert_eq!(t("21:15:30"), Time::from_hms(21, 15, 30).unwrap());
        assert_eq!(t("9:30 PM"), Time::from_hms(21, 30, 0).unwrap());
        assert_eq!(t("12:05 am"), Time::from_hms(0, 5, 0).unwrap());
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        for bad in ["", "25:00", "9", "nine thirty", "10:61"] {
            assert!(
                matches!(parse_time(bad), Err(DomainError::Parse { .. })),
                "{bad} should not parse"
            );
        }
        assert!(matches!(
            parse_date("25/04/2025"),
            Err(DomainError::Parse { .. })
        ));
    }

    #[test]
    fn canonical_formats_round_trip() {
        assert_eq!(format_date(day()), "2025-04-25");
        assert_eq!(format_time(t("9:05 AM")), "09:05");
        assert_eq!(format_time(t("21:15:30")), "21:15:30");
        assert_eq!(t(&format_time(t("11:45 PM"))), t("23:45"));
    }

    #[test]
    fn touching_boundaries_do_not_conflict() {
        let checker = ConflictChecker::default();
        let existing = [event("a", "09:00", "10:00")];

        let after = checker.check(&candidate("10:00", "11:00"), &existing).unwrap();
        let before = checker.check(&candidate("08:00", "09:00"), &existing).unwrap();

        assert!(!after.has_conflict);
        assert!(!before.has_conflict);
        assert!(after.suggestions.is_empty());
    }

    #[test]
    fn overlap_is_symmetric() {
        let checker = ConflictChecker::default();
        let times: Vec<String> = (8..=12)
            .flat_map(|h| [format!("{h:02}:00"), format!("{h:02}:30")])
            .collect();

        for (i, s1) in times.iter().enumerate() {
            for e1 in &times[i + 1..] {
                for (j, s2) in times.iter().enumerate() {
                    for e2 in &times[j + 1..] {
                        let a = event("a", s1, e1);
                        let b = event("b", s2, e2);
                        let ab = checker
                            .check(&ScheduleCandidate::from(&a), std::slice::from_ref(&b))
                            .unwrap();
                        let ba = checker
                            .check(&ScheduleCandidate::from(&b), std::slice::from_ref(&a))
                            .unwrap();
                        assert_eq!(ab.has_conflict, ba.has_conflict, "{s1}-{e1} vs {s2}-{e2}");
                    }
                }
            }
        }
    }

    #[test]
    fn other_days_and_venues_are_ignored() {
        let checker = ConflictChecker::default();
        let mut elsewhere = event("a", "09:00", "10:00");
        elsewhere.location = Venue::Library;
        let mut other_day = event("b", "09:00", "10:00");
        other_day.date = parse_date("2025-04-26").unwrap();

        let report = checker
            .check(&candidate("09:00", "10:00"), &[elsewhere, other_day])
            .unwrap();

        assert_eq!(report, ConflictReport::default());
    }

    #[test]
    fn reports_every_overlapping_event() {
        let checker = ConflictChecker::default();
        let existing = [
            event("a", "09:00", "10:00"),
            event("b", "10:30", "11:00"),
            event("c", "13:00", "14:00"),
        ];

        let report = checker.check(&candidate("09:30", "12:00"), &existing).unwrap();

        let ids: Vec<&str> = report.conflicts.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn first_suggestion_follows_the_conflict() {
        let checker = ConflictChecker::default();
        let existing = [event("a", "09:00", "10:00")];

        let report = checker.check(&candidate("09:30", "10:30"), &existing).unwrap();

        assert!(report.has_conflict);
        assert_eq!(
            report.suggestions.first(),
            Some(&TimeRange {
                start: t("10:00"),
                end: t("11:00"),
            })
        );
        assert_eq!(report.suggestions.len(), 4);

        let half_hour = checker.check(&candidate("09:30", "10:00"), &existing).unwrap();
        assert_eq!(
            half_hour.suggestions.first(),
            Some(&TimeRange {
                start: t("10:00"),
                end: t("10:30"),
            })
        );
    }

    #[test]
    fn suggestions_skip_occupied_slots() {
        let checker = ConflictChecker::default();
        let existing = [event("a", "09:00", "10:00"), event("b", "10:00", "11:00")];

        let report = checker.check(&candidate("09:00", "10:00"), &existing).unwrap();

        // Walk starts at 10:00 (end of the only conflict); 10:00-11:00 is taken.
        assert_eq!(report.suggestions[0].start, t("11:00"));
        for slot in &report.suggestions {
            let again = checker
                .check(
                    &ScheduleCandidate {
                        start_time: slot.start,
                        end_time: slot.end,
                        ..candidate("09:00", "10:00")
                    },
                    &existing,
                )
                .unwrap();
            assert!(!again.has_conflict);
        }
    }

    #[test]
    fn suggestions_stop_at_day_cutoff() {
        let checker = ConflictChecker::default();
        let existing = [event("a", "19:00", "20:30")];

        let report = checker.check(&candidate("20:00", "21:00"), &existing).unwrap();

        let starts: Vec<Time> = report.suggestions.iter().map(|s| s.start).collect();
        assert_eq!(starts, [t("20:30"), t("21:30")]);
        assert!(report.suggestions.iter().all(|s| s.start < t("22:00")));
    }

    #[test]
    fn suggestions_never_wrap_past_midnight() {
        let checker = ConflictChecker::new(t("23:59"), 4);
        let existing = [event("a", "21:00", "23:00")];

        let report = checker.check(&candidate("22:00", "23:30"), &existing).unwrap();

        assert!(report.has_conflict);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn suggestion_cap_is_configurable() {
        let checker = ConflictChecker::new(t("22:00"), 2);
        let existing = [event("a", "08:00", "09:00")];

        let report = checker.check(&candidate("08:00", "08:15"), &existing).unwrap();

        assert_eq!(report.suggestions.len(), 2);
    }

    #[test]
    fn zero_or_negative_duration_is_rejected() {
        let checker = ConflictChecker::default();
        let existing = [event("a", "09:00", "10:00")];

        for (start, end) in [("09:30", "09:30"), ("10:00", "09:00")] {
            assert!(matches!(
                checker.check(&candidate(start, end), &existing),
                Err(DomainError::Validation { .. })
            ));
        }
    }

    #[test]
    fn sub_minute_candidate_is_rejected() {
        let checker = ConflictChecker::default();
        let existing = [
            event("a", "09:00", "10:00"),
            event("b", "09:30", "10:30"),
            event("c", "10:00", "11:00"),
        ];
        let slot = ScheduleCandidate {
            start_time: Time::from_hms_milli(9, 59, 59, 100).unwrap(),
            end_time: Time::from_hms_milli(9, 59, 59, 900).unwrap(),
            ..candidate("09:00", "10:00")
        };

        assert!(matches!(
            checker.check(&slot, &existing),
            Err(DomainError::Validation { .. })
        ));
        assert!(validate_interval(t("09:00"), t("09:00:59")).is_err());
        assert!(validate_interval(t("09:00"), t("09:01")).is_ok());
    }

    #[test]
    fn suggestions_keep_second_precision() {
        let checker = ConflictChecker::default();
        let existing = [event("a", "09:00", "10:00")];
        let slot = ScheduleCandidate {
            start_time: t("09:59:00"),
            end_time: t("10:00:30"),
            ..candidate("09:00", "10:00")
        };

        let report = checker.check(&slot, &existing).unwrap();

        assert_eq!(
            report.suggestions.first(),
            Some(&TimeRange {
                start: t("10:00"),
                end: t("10:01:30"),
            })
        );
        assert_eq!(report.suggestions.len(), 4);
    }
}
