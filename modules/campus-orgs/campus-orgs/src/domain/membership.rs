//! Membership lifecycle state machine.
//!
//! Every function here is pure: it reads the current organization (and,
//! where needed, the user), checks the guard for one transition and returns
//! a plan holding the field operations to commit plus the projected
//! organization after they are applied. A user identifier is in at most one
//! of `applicants`, `members` and `officers`; plans never break that.

use campus_orgs_sdk::{
    MembershipState, Officer, Organization, RenewalRequest, RenewalStatus, UserProfile,
};
use serde_json::Value;
use time::OffsetDateTime;

use super::error::{DomainError, GuardViolation};
use super::records::{officer_value, renewal_request_value, renewal_status_str, Fields};
use super::store::{FieldOp, FieldPath};

/// Field operations for one transition and the state they lead to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MembershipPlan {
    pub org_ops: Vec<FieldOp>,
    pub user_ops: Vec<FieldOp>,
    pub organization: Organization,
    pub state: MembershipState,
}

impl MembershipPlan {
    fn new(organization: Organization, state: MembershipState) -> Self {
        Self {
            org_ops: Vec::new(),
            user_ops: Vec::new(),
            organization,
            state,
        }
    }
}

/// Plan for removing every plain member at once.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BulkRemovalPlan {
    pub removed: Vec<String>,
    pub org_ops: Vec<FieldOp>,
    pub organization: Organization,
}

/// Current state of `email` in `org`.
///
/// Officer wins over member and member over applicant, so a record that
/// somehow lists a user twice is treated as the higher state.
#[must_use]
pub fn membership_state(org: &Organization, email: &str) -> MembershipState {
    if let Some(officer) = org.officer(email) {
        MembershipState::Officer {
            position: officer.position.clone(),
        }
    } else if org.members.iter().any(|m| m == email) {
        MembershipState::Member
    } else if org.applicants.iter().any(|a| a == email) {
        MembershipState::Applicant
    } else {
        MembershipState::None
    }
}

/// The spelling under which `email` is stored in `org`, compared without
/// regard to ASCII case. Officers are checked first, then members, then
/// applicants. An email found in no set is returned as given.
#[must_use]
pub fn stored_spelling(org: &Organization, email: &str) -> String {
    org.officers
        .iter()
        .map(|o| o.email.as_str())
        .chain(org.members.iter().map(String::as_str))
        .chain(org.applicants.iter().map(String::as_str))
        .find(|stored| stored.eq_ignore_ascii_case(email))
        .unwrap_or(email)
        .to_owned()
}

/// Whether `email` appears in at most one of the three sets.
#[must_use]
pub fn is_exclusive(org: &Organization, email: &str) -> bool {
    let applicant = org.applicants.iter().filter(|a| *a == email).count();
    let member = org.members.iter().filter(|m| *m == email).count();
    let officer = org.officers.iter().filter(|o| o.email == email).count();
    applicant + member + officer <= 1
}

fn already_in(org: &Organization, email: &str, state: &MembershipState) -> GuardViolation {
    let email = email.to_owned();
    let organization = org.name.clone();
    match state {
        MembershipState::Officer { .. } => GuardViolation::AlreadyOfficer {
            email,
            organization,
        },
        MembershipState::Member => GuardViolation::AlreadyMember {
            email,
            organization,
        },
        MembershipState::Applicant | MembershipState::None => GuardViolation::AlreadyApplicant {
            email,
            organization,
        },
    }
}

fn not_applicant(org: &Organization, email: &str) -> DomainError {
    GuardViolation::NotApplicant {
        email: email.to_owned(),
        organization: org.name.clone(),
    }
    .into()
}

fn not_member(org: &Organization, email: &str) -> DomainError {
    GuardViolation::NotMember {
        email: email.to_owned(),
        organization: org.name.clone(),
    }
    .into()
}

/// Reject a transition into MEMBER or OFFICER when the target already sits in
/// one of the other sets.
fn ensure_applicant(org: &Organization, email: &str) -> Result<(), DomainError> {
    match membership_state(org, email) {
        MembershipState::Applicant => Ok(()),
        MembershipState::None => Err(not_applicant(org, email)),
        state => Err(already_in(org, email, &state).into()),
    }
}

fn is_eligible(org: &Organization, user: &UserProfile) -> bool {
    if org.can_join.is_empty() {
        return true;
    }
    user.course.as_deref().is_some_and(|course| {
        org.can_join
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(course.trim()))
    })
}

fn without(list: &[String], email: &str) -> Vec<String> {
    list.iter().filter(|e| *e != email).cloned().collect()
}

fn with(list: &[String], email: &str) -> Vec<String> {
    let mut next = without(list, email);
    next.push(email.to_owned());
    next
}

/// NONE -> APPLICANT.
pub(crate) fn plan_apply(
    org: &Organization,
    user: &UserProfile,
) -> Result<MembershipPlan, DomainError> {
    let email = user.email.as_str();
    let state = membership_state(org, email);
    if state != MembershipState::None {
        return Err(already_in(org, email, &state).into());
    }
    if !is_eligible(org, user) {
        return Err(GuardViolation::IneligibleCourse {
            course: user.course.clone().unwrap_or_else(|| "(none)".to_owned()),
            organization: org.name.clone(),
        }
        .into());
    }

    let mut next = org.clone();
    next.applicants = with(&org.applicants, email);

    let mut plan = MembershipPlan::new(next, MembershipState::Applicant);
    plan.org_ops.push(FieldOp::union(Fields::APPLICANTS, email));
    Ok(plan)
}

/// APPLICANT -> NONE, initiated by the applicant.
pub(crate) fn plan_cancel(org: &Organization, email: &str) -> Result<MembershipPlan, DomainError> {
    if membership_state(org, email) != MembershipState::Applicant {
        return Err(not_applicant(org, email));
    }

    let mut next = org.clone();
    next.applicants = without(&org.applicants, email);

    let mut plan = MembershipPlan::new(next, MembershipState::None);
    plan.org_ops.push(FieldOp::remove(Fields::APPLICANTS, email));
    Ok(plan)
}

/// APPLICANT -> MEMBER. Adds the organization to the user's `orgs`.
pub(crate) fn plan_approve(org: &Organization, email: &str) -> Result<MembershipPlan, DomainError> {
    ensure_applicant(org, email)?;

    let mut next = org.clone();
    next.applicants = without(&org.applicants, email);
    next.members = with(&org.members, email);

    let mut plan = MembershipPlan::new(next, MembershipState::Member);
    plan.org_ops.push(FieldOp::remove(Fields::APPLICANTS, email));
    plan.org_ops.push(FieldOp::union(Fields::MEMBERS, email));
    plan.user_ops.push(FieldOp::union(Fields::ORGS, org.name.as_str()));
    Ok(plan)
}

/// APPLICANT -> NONE, decided by an officer.
pub(crate) fn plan_deny(org: &Organization, email: &str) -> Result<MembershipPlan, DomainError> {
    plan_cancel(org, email)
}

/// MEMBER -> OFFICER(position).
pub(crate) fn plan_assign_officer(
    org: &Organization,
    email: &str,
    position: &str,
) -> Result<MembershipPlan, DomainError> {
    match membership_state(org, email) {
        MembershipState::Member => {}
        state @ MembershipState::Officer { .. } => {
            return Err(already_in(org, email, &state).into());
        }
        MembershipState::Applicant | MembershipState::None => {
            return Err(not_member(org, email));
        }
    }

    let officer = Officer {
        email: email.to_owned(),
        position: position.to_owned(),
    };

    let mut plan_org = org.clone();
    plan_org.members = without(&org.members, email);
    plan_org.officers.push(officer.clone());

    let mut plan = MembershipPlan::new(
        plan_org,
        MembershipState::Officer {
            position: position.to_owned(),
        },
    );
    plan.org_ops.push(FieldOp::remove(Fields::MEMBERS, email));
    plan.org_ops.push(FieldOp::ArrayUnion(
        FieldPath::field(Fields::OFFICERS),
        vec![officer_value(&officer)?],
    ));
    Ok(plan)
}

/// MEMBER -> NONE. Drops the organization from the user's `orgs`.
pub(crate) fn plan_remove_member(
    org: &Organization,
    email: &str,
) -> Result<MembershipPlan, DomainError> {
    match membership_state(org, email) {
        MembershipState::Member => {}
        MembershipState::Officer { .. } => {
            return Err(GuardViolation::HoldsOfficerPosition {
                email: email.to_owned(),
                organization: org.name.clone(),
            }
            .into());
        }
        MembershipState::Applicant | MembershipState::None => {
            return Err(not_member(org, email));
        }
    }

    let mut next = org.clone();
    next.members = without(&org.members, email);

    let mut plan = MembershipPlan::new(next, MembershipState::None);
    plan.org_ops.push(FieldOp::remove(Fields::MEMBERS, email));
    plan.user_ops.push(FieldOp::remove(Fields::ORGS, org.name.as_str()));
    Ok(plan)
}

/// OFFICER -> MEMBER.
///
/// `officer_entries` are the organization's officer elements as stored.
/// Every one whose `email` matches is removed as is, whatever other fields
/// it carries.
pub(crate) fn plan_remove_from_officer(
    org: &Organization,
    officer_entries: &[Value],
    email: &str,
) -> Result<MembershipPlan, DomainError> {
    if org.officer(email).is_none() {
        return Err(GuardViolation::NotOfficer {
            email: email.to_owned(),
            organization: org.name.clone(),
        }
        .into());
    }

    let stored: Vec<Value> = officer_entries
        .iter()
        .filter(|entry| entry.get(Fields::EMAIL).and_then(Value::as_str) == Some(email))
        .cloned()
        .collect();

    let mut next = org.clone();
    next.officers.retain(|o| o.email != email);
    next.members = with(&org.members, email);

    let mut plan = MembershipPlan::new(next, MembershipState::Member);
    plan.org_ops
        .push(FieldOp::ArrayRemove(FieldPath::field(Fields::OFFICERS), stored));
    plan.org_ops.push(FieldOp::union(Fields::MEMBERS, email));
    Ok(plan)
}

fn ensure_belongs(org: &Organization, email: &str) -> Result<MembershipState, DomainError> {
    match membership_state(org, email) {
        state @ (MembershipState::Member | MembershipState::Officer { .. }) => Ok(state),
        MembershipState::Applicant | MembershipState::None => Err(not_member(org, email)),
    }
}

/// Record a pending renewal request. Membership state is unchanged.
pub(crate) fn plan_request_renewal(
    org: &Organization,
    user: &UserProfile,
    message: &str,
    now: OffsetDateTime,
) -> Result<MembershipPlan, DomainError> {
    let state = ensure_belongs(org, &user.email)?;
    if user.has_pending_renewal(&org.name) {
        return Err(GuardViolation::RenewalAlreadyPending {
            email: user.email.clone(),
            organization: org.name.clone(),
        }
        .into());
    }

    let request = RenewalRequest {
        status: RenewalStatus::Pending,
        message: message.to_owned(),
        requested_at: now,
    };

    let mut plan = MembershipPlan::new(org.clone(), state);
    plan.user_ops.push(FieldOp::Set(
        FieldPath::new([Fields::RENEWAL_REQUESTS, org.name.as_str()]),
        renewal_request_value(&request)?,
    ));
    Ok(plan)
}

/// Close a pending renewal request as approved or denied.
pub(crate) fn plan_decide_renewal(
    org: &Organization,
    user: &UserProfile,
    approve: bool,
) -> Result<MembershipPlan, DomainError> {
    if !user.has_pending_renewal(&org.name) {
        return Err(GuardViolation::NoPendingRenewal {
            email: user.email.clone(),
            organization: org.name.clone(),
        }
        .into());
    }
    let state = ensure_belongs(org, &user.email)?;

    let status = if approve {
        RenewalStatus::Approved
    } else {
        RenewalStatus::Denied
    };

    let mut plan = MembershipPlan::new(org.clone(), state);
    plan.user_ops.push(FieldOp::set(
        FieldPath::new([Fields::RENEWAL_REQUESTS, org.name.as_str(), Fields::STATUS]),
        renewal_status_str(status),
    ));
    plan.user_ops.push(FieldOp::set(
        FieldPath::new([Fields::RENEWAL_APPROVALS, org.name.as_str()]),
        approve,
    ));
    Ok(plan)
}

/// Every plain member -> NONE. Officers and applicants are untouched.
pub(crate) fn plan_bulk_remove(org: &Organization) -> BulkRemovalPlan {
    let mut removed: Vec<String> = Vec::new();
    for member in &org.members {
        if !removed.contains(member) {
            removed.push(member.clone());
        }
    }

    let mut next = org.clone();
    next.members.clear();

    let org_ops = if removed.is_empty() {
        Vec::new()
    } else {
        vec![FieldOp::ArrayRemove(
            FieldPath::field(Fields::MEMBERS),
            removed.iter().map(|m| Value::from(m.as_str())).collect(),
        )]
    };

    BulkRemovalPlan {
        removed,
        org_ops,
        organization: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORG: &str = "Chess Club";

    fn org() -> Organization {
        Organization {
            name: ORG.to_owned(),
            ..Organization::default()
        }
    }

    fn user(email: &str, course: Option<&str>) -> UserProfile {
        UserProfile {
            email: email.to_owned(),
            course: course.map(str::to_owned),
            ..UserProfile::default()
        }
    }

    fn stored_officers(org: &Organization) -> Vec<Value> {
        org.officers.iter().map(|o| officer_value(o).unwrap()).collect()
    }

    fn guard(result: Result<MembershipPlan, DomainError>) -> GuardViolation {
        match result {
            Err(DomainError::Guard(v)) => v,
            other => panic!("expected guard violation, got {other:?}"),
        }
    }

    #[test]
    fn apply_adds_applicant() {
        let plan = plan_apply(&org(), &user("u@campus.edu", None)).unwrap();

        assert_eq!(plan.organization.applicants, ["u@campus.edu"]);
        assert_eq!(plan.state, MembershipState::Applicant);
        assert_eq!(
            plan.org_ops,
            [FieldOp::ArrayUnion(
                FieldPath::field("applicants"),
                vec![json!("u@campus.edu")]
            )]
        );
        assert!(plan.user_ops.is_empty());
    }

    #[test]
    fn apply_checks_course_allow_list() {
        let mut o = org();
        o.can_join = vec!["BSCS".to_owned()];

        assert!(matches!(
            guard(plan_apply(&o, &user("u@campus.edu", Some("BSIT")))),
            GuardViolation::IneligibleCourse { .. }
        ));
        assert!(matches!(
            guard(plan_apply(&o, &user("u@campus.edu", None))),
            GuardViolation::IneligibleCourse { .. }
        ));
        assert!(plan_apply(&o, &user("u@campus.edu", Some(" bscs "))).is_ok());
    }

    #[test]
    fn apply_twice_is_rejected() {
        let mut o = org();
        o.applicants.push("u@campus.edu".to_owned());
        assert!(matches!(
            guard(plan_apply(&o, &user("u@campus.edu", None))),
            GuardViolation::AlreadyApplicant { .. }
        ));
    }

    #[test]
    fn approve_moves_applicant_to_members_and_user_orgs() {
        let mut o = org();
        o.applicants.push("u@campus.edu".to_owned());

        let plan = plan_approve(&o, "u@campus.edu").unwrap();

        assert!(plan.organization.applicants.is_empty());
        assert_eq!(plan.organization.members, ["u@campus.edu"]);
        assert_eq!(
            plan.user_ops,
            [FieldOp::ArrayUnion(FieldPath::field("orgs"), vec![json!(ORG)])]
        );
    }

    #[test]
    fn approve_reports_duplicate_membership() {
        let mut o = org();
        // Inconsistent record: listed as applicant and member at once.
        o.applicants.push("u@campus.edu".to_owned());
        o.members.push("u@campus.edu".to_owned());

        assert!(matches!(
            guard(plan_approve(&o, "u@campus.edu")),
            GuardViolation::AlreadyMember { .. }
        ));
        assert!(matches!(
            guard(plan_approve(&org(), "u@campus.edu")),
            GuardViolation::NotApplicant { .. }
        ));
    }

    #[test]
    fn assign_and_demote_officer() {
        let mut o = org();
        o.members.push("m@campus.edu".to_owned());

        let promoted = plan_assign_officer(&o, "m@campus.edu", "President").unwrap();
        assert!(promoted.organization.members.is_empty());
        assert_eq!(
            promoted.organization.officer("m@campus.edu").map(|x| x.position.as_str()),
            Some("President")
        );

        let demoted = plan_remove_from_officer(
            &promoted.organization,
            &stored_officers(&promoted.organization),
            "m@campus.edu",
        )
        .unwrap();
        assert!(demoted.organization.officers.is_empty());
        assert_eq!(demoted.organization.members, ["m@campus.edu"]);
        assert_eq!(
            demoted.org_ops[0],
            FieldOp::ArrayRemove(
                FieldPath::field("officers"),
                vec![json!({"email": "m@campus.edu", "position": "President"})]
            )
        );
    }

    #[test]
    fn demotion_removes_stored_entry_with_extra_fields() {
        let mut o = org();
        o.officers.push(Officer {
            email: "m@campus.edu".to_owned(),
            position: "President".to_owned(),
        });
        o.applicants.push("a@campus.edu".to_owned());
        let stored = json!({"email": "m@campus.edu", "position": "President", "name": "M"});
        let other = json!({"email": "t@campus.edu", "position": "Treasurer"});

        let plan =
            plan_remove_from_officer(&o, &[stored.clone(), other], "m@campus.edu").unwrap();

        assert_eq!(
            plan.org_ops[0],
            FieldOp::ArrayRemove(FieldPath::field("officers"), vec![stored])
        );
        assert!(plan.organization.officers.is_empty());
        assert_eq!(plan.organization.counts().members, 1);
        assert_eq!(plan.org_ops.len(), 2);
        assert_eq!(plan.organization.applicants, o.applicants);
    }

    #[test]
    fn stored_spelling_matches_case_insensitively() {
        let mut o = org();
        o.applicants.push("Alice@Campus.edu".to_owned());
        o.officers.push(Officer {
            email: "Bob@Campus.edu".to_owned(),
            position: "President".to_owned(),
        });

        assert_eq!(stored_spelling(&o, "alice@campus.edu"), "Alice@Campus.edu");
        assert_eq!(stored_spelling(&o, "BOB@CAMPUS.EDU"), "Bob@Campus.edu");
        assert_eq!(stored_spelling(&o, "Carol@campus.edu"), "Carol@campus.edu");
    }

    #[test]
    fn officer_cannot_be_assigned_twice_or_removed_as_member() {
        let mut o = org();
        o.officers.push(Officer {
            email: "m@campus.edu".to_owned(),
            position: "Treasurer".to_owned(),
        });

        assert!(matches!(
            guard(plan_assign_officer(&o, "m@campus.edu", "President")),
            GuardViolation::AlreadyOfficer { .. }
        ));
        assert!(matches!(
            guard(plan_remove_member(&o, "m@campus.edu")),
            GuardViolation::HoldsOfficerPosition { .. }
        ));
    }

    #[test]
    fn renewal_requires_membership_and_no_pending_request() {
        let mut o = org();
        o.members.push("m@campus.edu".to_owned());
        let now = OffsetDateTime::UNIX_EPOCH;

        let plan = plan_request_renewal(&o, &user("m@campus.edu", None), "still here", now).unwrap();
        assert_eq!(plan.state, MembershipState::Member);
        assert_eq!(
            plan.user_ops[0].path(),
            &FieldPath::new(["renewalRequests", ORG])
        );

        let mut pending = user("m@campus.edu", None);
        pending.renewal_requests.insert(
            ORG.to_owned(),
            RenewalRequest {
                status: RenewalStatus::Pending,
                message: "still here".to_owned(),
                requested_at: now,
            },
        );
        assert!(matches!(
            guard(plan_request_renewal(&o, &pending, "again", now)),
            GuardViolation::RenewalAlreadyPending { .. }
        ));
        assert!(matches!(
            guard(plan_request_renewal(&org(), &user("x@campus.edu", None), "hi", now)),
            GuardViolation::NotMember { .. }
        ));

        let decided = plan_decide_renewal(&o, &pending, true).unwrap();
        assert_eq!(decided.user_ops.len(), 2);
        assert!(matches!(
            guard(plan_decide_renewal(&o, &user("m@campus.edu", None), true)),
            GuardViolation::NoPendingRenewal { .. }
        ));
    }

    #[test]
    fn bulk_remove_keeps_officers_and_applicants() {
        let mut o = org();
        o.members = vec!["a@campus.edu".to_owned(), "b@campus.edu".to_owned()];
        o.applicants = vec!["c@campus.edu".to_owned()];
        o.officers = vec![Officer {
            email: "d@campus.edu".to_owned(),
            position: "President".to_owned(),
        }];

        let plan = plan_bulk_remove(&o);

        assert_eq!(plan.removed, ["a@campus.edu", "b@campus.edu"]);
        assert!(plan.organization.members.is_empty());
        assert_eq!(plan.organization.applicants, o.applicants);
        assert_eq!(plan.organization.officers, o.officers);
        assert!(plan_bulk_remove(&org()).org_ops.is_empty());
    }

    #[derive(Clone, Copy, Debug)]
    enum Step {
        Apply,
        Cancel,
        Approve,
        Assign,
        Remove,
        Demote,
        Bulk,
    }

    const STEPS: [Step; 7] = [
        Step::Apply,
        Step::Cancel,
        Step::Approve,
        Step::Assign,
        Step::Remove,
        Step::Demote,
        Step::Bulk,
    ];

    fn run(org: &Organization, step: Step, email: &str) -> Organization {
        let planned = match step {
            Step::Apply => plan_apply(org, &user(email, None)),
            Step::Cancel => plan_cancel(org, email),
            Step::Approve => plan_approve(org, email),
            Step::Assign => plan_assign_officer(org, email, "Secretary"),
            Step::Remove => plan_remove_member(org, email),
            Step::Demote => plan_remove_from_officer(org, &stored_officers(org), email),
            Step::Bulk => return plan_bulk_remove(org).organization,
        };
        planned.map_or_else(|_| org.clone(), |p| p.organization)
    }

    #[test]
    fn every_action_sequence_keeps_sets_disjoint() {
        let users = ["a@campus.edu", "b@campus.edu"];
        let choices: Vec<(Step, &str)> = STEPS
            .iter()
            .flat_map(|s| users.iter().map(move |u| (*s, *u)))
            .collect();

        let mut frontier = vec![org()];
        for _ in 0..4 {
            let mut next_frontier = Vec::with_capacity(frontier.len() * choices.len());
            for state in &frontier {
                for (step, email) in &choices {
                    let next = run(state, *step, email);
                    for u in users {
                        assert!(is_exclusive(&next, u), "{step:?} {email} broke {next:?}");
                    }
                    next_frontier.push(next);
                }
            }
            next_frontier.dedup();
            frontier = next_frontier;
        }
    }
}
