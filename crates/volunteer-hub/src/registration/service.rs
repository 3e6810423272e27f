use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::capacity::{SkillSlotAvailability, SpotsRemaining};
use super::domain::{
    Event, EventId, EventStatus, NewSignup, Signup, SignupId, SkillId, VolunteerId,
};
use super::eligibility::{EligibilityEvaluator, EligibilityReport, RejectionKind};
use super::repository::{
    CapacityBounds, EventReader, SignupStore, StoreError, VolunteerSkillReader,
};

/// Signup lifecycle manager: owns the registration gate sequence, the
/// unregistration path, and the volunteer-facing read views.
pub struct RegistrationService<E, V, S> {
    events: Arc<E>,
    signups: Arc<S>,
    evaluator: EligibilityEvaluator<E, V, S>,
}

impl<E, V, S> RegistrationService<E, V, S>
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    pub fn new(events: Arc<E>, volunteers: Arc<V>, signups: Arc<S>) -> Self {
        let evaluator =
            EligibilityEvaluator::new(Arc::clone(&events), volunteers, Arc::clone(&signups));
        Self {
            events,
            signups,
            evaluator,
        }
    }

    /// Register a volunteer for an event, running each admission gate in
    /// order and stopping at the first violation.
    pub fn create_signup(
        &self,
        volunteer_id: &VolunteerId,
        event_id: &EventId,
        chosen_skill: Option<SkillId>,
    ) -> Result<Signup, RegistrationError> {
        let outcome = self.run_signup_gates(volunteer_id, event_id, chosen_skill);
        match &outcome {
            Ok(signup) => info!(
                volunteer = %signup.volunteer_id,
                event = %signup.event_id,
                signup = %signup.id,
                "volunteer registered"
            ),
            Err(error) => match error.kind() {
                Some(kind) => debug!(
                    volunteer = %volunteer_id,
                    event = %event_id,
                    kind = kind.label(),
                    %error,
                    "registration rejected"
                ),
                None => warn!(
                    volunteer = %volunteer_id,
                    event = %event_id,
                    %error,
                    "registration failed"
                ),
            },
        }
        outcome
    }

    fn run_signup_gates(
        &self,
        volunteer_id: &VolunteerId,
        event_id: &EventId,
        chosen_skill: Option<SkillId>,
    ) -> Result<Signup, RegistrationError> {
        let event = self
            .events
            .fetch(event_id)?
            .ok_or(RegistrationError::EventNotFound)?;

        if self.signups.exists(volunteer_id, event_id)? {
            return Err(RegistrationError::AlreadyRegistered);
        }

        if self.evaluator.capacity().is_event_full(event_id)? {
            return Err(RegistrationError::EventFull);
        }

        let required = self.evaluator.required_skills(event_id)?;
        let chosen = if required.is_empty() {
            // Skill-free events and optional tags take no role choice; any
            // client-supplied skill is dropped.
            None
        } else {
            let chosen = chosen_skill.ok_or(RegistrationError::SkillRoleNotSelected)?;
            if !required
                .iter()
                .any(|association| association.skill_id == chosen)
            {
                return Err(RegistrationError::SkillRoleNotSelected);
            }
            let matched = self.evaluator.skill_match(volunteer_id, event_id)?;
            if !matched.matching.contains(&chosen) {
                return Err(RegistrationError::SkillNotPossessed);
            }
            if self.evaluator.capacity().is_skill_slot_full(event_id, &chosen)? {
                return Err(RegistrationError::SkillSlotFull(chosen));
            }
            Some(chosen)
        };

        if let Some(conflicting) = self.evaluator.time_conflict(volunteer_id, event_id)? {
            return Err(RegistrationError::TimeConflict {
                event_id: conflicting.id,
                event_name: conflicting.name,
                date: conflicting.date,
            });
        }

        let bounds = CapacityBounds {
            event: event.max_capacity,
            skill: chosen.as_ref().and_then(|skill| {
                event
                    .association(skill)
                    .and_then(|association| association.needed_count)
            }),
        };
        let chosen_for_races = chosen.clone();
        let new = NewSignup {
            volunteer_id: volunteer_id.clone(),
            event_id: event_id.clone(),
            chosen_skill: chosen,
        };

        // The store re-checks the bounds inside its mutation scope; a racing
        // signup that landed after the gates surfaces here.
        self.signups.insert(new, bounds).map_err(|error| match error {
            StoreError::DuplicateSignup => RegistrationError::AlreadyRegistered,
            StoreError::EventCapacity => RegistrationError::EventFull,
            StoreError::SkillCapacity => match chosen_for_races {
                Some(skill) => RegistrationError::SkillSlotFull(skill),
                None => RegistrationError::Store(StoreError::SkillCapacity),
            },
            other => RegistrationError::Store(other),
        })
    }

    /// Remove a signup owned by the volunteer. Ownership failures are
    /// reported exactly like missing rows.
    pub fn delete_signup(
        &self,
        signup_id: &SignupId,
        volunteer_id: &VolunteerId,
    ) -> Result<UnregisterReceipt, RegistrationError> {
        let signup = self
            .signups
            .fetch(signup_id)?
            .ok_or(RegistrationError::SignupNotFound)?;
        if &signup.volunteer_id != volunteer_id {
            return Err(RegistrationError::SignupNotFound);
        }

        // The event name is display data for the receipt, resolved before
        // the delete; a failed catalog read must not fail the removal.
        let event_name = match self.events.fetch(&signup.event_id) {
            Ok(Some(event)) => Some(event.name),
            Ok(None) | Err(_) => None,
        };

        match self.signups.delete(signup_id) {
            Ok(()) => {}
            Err(StoreError::NotFound) => return Err(RegistrationError::SignupNotFound),
            Err(other) => return Err(RegistrationError::Store(other)),
        }

        info!(volunteer = %volunteer_id, signup = %signup_id, "signup removed");

        let message = match event_name {
            Some(name) => format!("Unregistered from '{}'", name),
            None => "Signup removed".to_string(),
        };
        Ok(UnregisterReceipt {
            success: true,
            message,
        })
    }

    /// Upcoming events the volunteer could register for right now.
    pub fn available_events(
        &self,
        volunteer_id: &VolunteerId,
        today: NaiveDate,
    ) -> Result<Vec<Event>, RegistrationError> {
        let mut available = Vec::new();
        for event in self.events.upcoming(today)? {
            if self.evaluator.assess(volunteer_id, &event)?.can_register {
                available.push(event);
            }
        }
        Ok(available)
    }

    /// Upcoming skill-gated events the volunteer does not qualify for, so a
    /// client can show what additional skills would unlock.
    pub fn other_events(
        &self,
        volunteer_id: &VolunteerId,
        today: NaiveDate,
    ) -> Result<Vec<Event>, RegistrationError> {
        let mut others = Vec::new();
        for event in self.events.upcoming(today)? {
            if event.required_associations().next().is_none() {
                continue;
            }
            if self.signups.exists(volunteer_id, &event.id)? {
                continue;
            }
            if !self.evaluator.skill_match(volunteer_id, &event.id)?.qualifies {
                others.push(event);
            }
        }
        Ok(others)
    }

    /// The volunteer's signups joined with event display data. Signups whose
    /// event has vanished from the catalog are dropped from the view.
    pub fn volunteer_signups(
        &self,
        volunteer_id: &VolunteerId,
    ) -> Result<Vec<VolunteerSignupView>, RegistrationError> {
        let mut views = Vec::new();
        for signup in self.signups.for_volunteer(volunteer_id)? {
            let event = match self.events.fetch(&signup.event_id)? {
                Some(event) => event,
                None => continue,
            };
            let skill_name = signup.chosen_skill.as_ref().and_then(|skill| {
                event
                    .association(skill)
                    .map(|association| association.skill_name.clone())
            });
            views.push(VolunteerSignupView {
                signup_id: signup.id,
                event_id: event.id,
                event_name: event.name,
                event_date: event.date,
                starts_at: event.window.map(|window| window.start),
                ends_at: event.window.map(|window| window.end),
                event_status: event.status,
                skill_id: signup.chosen_skill,
                skill_name,
            });
        }
        Ok(views)
    }

    /// Event record plus occupancy, with a per-volunteer eligibility report
    /// when a volunteer was named.
    pub fn event_detail(
        &self,
        event_id: &EventId,
        volunteer_id: Option<&VolunteerId>,
    ) -> Result<EventDetail, RegistrationError> {
        let event = self
            .events
            .fetch(event_id)?
            .ok_or(RegistrationError::EventNotFound)?;

        let signup_count = self.evaluator.capacity().signup_count(event_id)?;
        let spots_remaining = match event.max_capacity {
            Some(ceiling) => SpotsRemaining::Exactly(ceiling.saturating_sub(signup_count)),
            None => SpotsRemaining::Unlimited,
        };
        let eligibility = match volunteer_id {
            Some(volunteer) => Some(self.evaluator.assess(volunteer, &event)?),
            None => None,
        };

        Ok(EventDetail {
            event,
            signup_count,
            spots_remaining,
            eligibility,
        })
    }

    /// Per-slot occupancy for the event's required skill roles, annotated
    /// with skill possession when a volunteer was named.
    pub fn slot_availability(
        &self,
        event_id: &EventId,
        volunteer_id: Option<&VolunteerId>,
    ) -> Result<Vec<SkillSlotAvailability>, RegistrationError> {
        let event = self
            .events
            .fetch(event_id)?
            .ok_or(RegistrationError::EventNotFound)?;

        let mut slots = self.evaluator.capacity().slot_availability(&event)?;
        if let Some(volunteer) = volunteer_id {
            let owned = self.evaluator.volunteer_skills(volunteer)?;
            for slot in &mut slots {
                slot.volunteer_has_skill = Some(owned.contains(&slot.skill_id));
            }
        }
        Ok(slots)
    }
}

/// Acknowledgment returned by a successful unregistration.
#[derive(Debug, Clone, Serialize)]
pub struct UnregisterReceipt {
    pub success: bool,
    pub message: String,
}

/// A signup joined with display data from the event side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerSignupView {
    pub signup_id: SignupId,
    pub event_id: EventId,
    pub event_name: String,
    pub event_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<NaiveTime>,
    pub event_status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<SkillId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
}

/// Event record plus occupancy and optional per-volunteer eligibility.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub event: Event,
    pub signup_count: u32,
    pub spots_remaining: SpotsRemaining,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<EligibilityReport>,
}

/// Error raised by the registration service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("volunteer is already registered for this event")]
    AlreadyRegistered,
    #[error("event is already at full capacity")]
    EventFull,
    #[error("this event has required skill roles; select which skill role to register for")]
    SkillRoleNotSelected,
    #[error("volunteer does not have the required skills for this event")]
    SkillNotPossessed,
    #[error("every spot for skill role '{0}' is already filled")]
    SkillSlotFull(SkillId),
    #[error("conflicts with '{event_name}' on {date}")]
    TimeConflict {
        event_id: EventId,
        event_name: String,
        date: NaiveDate,
    },
    #[error("signup not found")]
    SignupNotFound,
    #[error("event not found")]
    EventNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrationError {
    /// Business rejection kind; `None` for storage failures.
    pub const fn kind(&self) -> Option<RejectionKind> {
        match self {
            RegistrationError::AlreadyRegistered => Some(RejectionKind::AlreadyRegistered),
            RegistrationError::EventFull => Some(RejectionKind::EventFull),
            RegistrationError::SkillRoleNotSelected => Some(RejectionKind::SkillRoleNotSelected),
            RegistrationError::SkillNotPossessed => Some(RejectionKind::SkillNotPossessed),
            RegistrationError::SkillSlotFull(_) => Some(RejectionKind::SkillSlotFull),
            RegistrationError::TimeConflict { .. } => Some(RejectionKind::TimeConflict),
            RegistrationError::SignupNotFound => Some(RejectionKind::SignupNotFound),
            RegistrationError::EventNotFound => Some(RejectionKind::EventNotFound),
            RegistrationError::Store(_) => None,
        }
    }
}
