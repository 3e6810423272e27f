use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use super::capacity::CapacityTracker;
use super::domain::{Event, EventId, RequiredSkillAssociation, SkillId, VolunteerId};
use super::repository::{EventReader, SignupStore, StoreError, VolunteerSkillReader};

/// Read-side eligibility decisions: skill matching, schedule conflicts, and
/// the aggregate "may this volunteer register?" report.
pub struct EligibilityEvaluator<E, V, S> {
    events: Arc<E>,
    volunteers: Arc<V>,
    signups: Arc<S>,
    capacity: CapacityTracker<E, S>,
}

impl<E, V, S> EligibilityEvaluator<E, V, S>
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    pub fn new(events: Arc<E>, volunteers: Arc<V>, signups: Arc<S>) -> Self {
        let capacity = CapacityTracker::new(Arc::clone(&events), Arc::clone(&signups));
        Self {
            events,
            volunteers,
            signups,
            capacity,
        }
    }

    pub fn capacity(&self) -> &CapacityTracker<E, S> {
        &self.capacity
    }

    pub fn volunteer_skills(
        &self,
        volunteer: &VolunteerId,
    ) -> Result<BTreeSet<SkillId>, StoreError> {
        self.volunteers.skills(volunteer)
    }

    /// Associations that gate registration: required ones only, in listing
    /// order. Empty for unknown events and for events carrying nothing but
    /// optional tags.
    pub fn required_skills(
        &self,
        event: &EventId,
    ) -> Result<Vec<RequiredSkillAssociation>, StoreError> {
        Ok(self
            .events
            .required_skills(event)?
            .into_iter()
            .filter(|association| association.is_required)
            .collect())
    }

    /// Any-match qualification: `qualifies` is true when the event has no
    /// required skills or the volunteer holds at least one of them.
    pub fn skill_match(
        &self,
        volunteer: &VolunteerId,
        event: &EventId,
    ) -> Result<SkillMatch, StoreError> {
        let required = self.required_skills(event)?;
        if required.is_empty() {
            return Ok(SkillMatch {
                qualifies: true,
                matching: BTreeSet::new(),
            });
        }

        let owned = self.volunteers.skills(volunteer)?;
        let matching: BTreeSet<SkillId> = required
            .iter()
            .filter(|association| owned.contains(&association.skill_id))
            .map(|association| association.skill_id.clone())
            .collect();

        Ok(SkillMatch {
            qualifies: !matching.is_empty(),
            matching,
        })
    }

    /// First already-registered event on the same date whose time window
    /// overlaps the candidate's. Untimed events on either side never
    /// conflict, and the volunteer's own signup for the candidate is
    /// ignored.
    pub fn time_conflict(
        &self,
        volunteer: &VolunteerId,
        candidate: &EventId,
    ) -> Result<Option<Event>, StoreError> {
        let candidate = match self.events.fetch(candidate)? {
            Some(event) => event,
            None => return Ok(None),
        };
        let window = match candidate.window {
            Some(window) => window,
            None => return Ok(None),
        };

        for signup in self.signups.for_volunteer(volunteer)? {
            if signup.event_id == candidate.id {
                continue;
            }
            let other = match self.events.fetch(&signup.event_id)? {
                Some(event) => event,
                None => continue,
            };
            if other.date != candidate.date {
                continue;
            }
            let other_window = match other.window {
                Some(window) => window,
                None => continue,
            };
            if window.overlaps(&other_window) {
                return Ok(Some(other));
            }
        }

        Ok(None)
    }

    /// Aggregate report for read endpoints: every violated condition is
    /// collected, not just the first.
    pub fn assess(
        &self,
        volunteer: &VolunteerId,
        event: &Event,
    ) -> Result<EligibilityReport, StoreError> {
        let mut reasons = Vec::new();

        if self.signups.exists(volunteer, &event.id)? {
            reasons.push(EligibilityReason::new(
                RejectionKind::AlreadyRegistered,
                "already registered for this event",
            ));
        }

        if self.capacity.is_event_full(&event.id)? {
            reasons.push(EligibilityReason::new(
                RejectionKind::EventFull,
                "event is already at full capacity",
            ));
        }

        let matched = self.skill_match(volunteer, &event.id)?;
        if !matched.qualifies {
            reasons.push(EligibilityReason::new(
                RejectionKind::SkillNotPossessed,
                "none of the required skill roles match this volunteer's skills",
            ));
        } else if !matched.matching.is_empty() {
            let mut open_slot = false;
            for skill in &matched.matching {
                if !self.capacity.is_skill_slot_full(&event.id, skill)? {
                    open_slot = true;
                    break;
                }
            }
            if !open_slot {
                reasons.push(EligibilityReason::new(
                    RejectionKind::SkillSlotFull,
                    "every matching skill role is already filled",
                ));
            }
        }

        if let Some(conflicting) = self.time_conflict(volunteer, &event.id)? {
            reasons.push(EligibilityReason::new(
                RejectionKind::TimeConflict,
                format!("overlaps '{}' on {}", conflicting.name, conflicting.date),
            ));
        }

        Ok(EligibilityReport {
            can_register: reasons.is_empty(),
            reasons,
        })
    }
}

/// Outcome of the any-match skill comparison for one volunteer and event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMatch {
    pub qualifies: bool,
    /// Required skills the volunteer actually holds.
    pub matching: BTreeSet<SkillId>,
}

/// Machine-readable rejection vocabulary shared by gate errors and the
/// read-side eligibility report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    AlreadyRegistered,
    EventFull,
    SkillRoleNotSelected,
    SkillNotPossessed,
    SkillSlotFull,
    TimeConflict,
    SignupNotFound,
    EventNotFound,
}

impl RejectionKind {
    /// Wire name of the kind, as rejection payloads and log fields spell it.
    pub const fn label(self) -> &'static str {
        match self {
            RejectionKind::AlreadyRegistered => "already_registered",
            RejectionKind::EventFull => "event_full",
            RejectionKind::SkillRoleNotSelected => "skill_role_not_selected",
            RejectionKind::SkillNotPossessed => "skill_not_possessed",
            RejectionKind::SkillSlotFull => "skill_slot_full",
            RejectionKind::TimeConflict => "time_conflict",
            RejectionKind::SignupNotFound => "signup_not_found",
            RejectionKind::EventNotFound => "event_not_found",
        }
    }
}

/// One violated condition inside an eligibility report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReason {
    pub kind: RejectionKind,
    pub message: String,
}

impl EligibilityReason {
    fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Composite answer to whether a volunteer may register for an event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub can_register: bool,
    pub reasons: Vec<EligibilityReason>,
}
