use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::domain::{Event, EventId, RequiredSkillAssociation, SkillId};
use super::repository::{EventReader, SignupStore, StoreError};

/// Live occupancy queries over the signup store.
///
/// Counts come from the authoritative store on every call; nothing is
/// cached, so each answer reflects the latest committed signup state.
pub struct CapacityTracker<E, S> {
    events: Arc<E>,
    signups: Arc<S>,
}

impl<E, S> CapacityTracker<E, S>
where
    E: EventReader + 'static,
    S: SignupStore + 'static,
{
    pub fn new(events: Arc<E>, signups: Arc<S>) -> Self {
        Self { events, signups }
    }

    /// Number of active signups for the event; zero when none exist.
    pub fn signup_count(&self, event: &EventId) -> Result<u32, StoreError> {
        self.signups.count_for_event(event)
    }

    /// `false` for unknown events and for events without a capacity ceiling.
    pub fn is_event_full(&self, event: &EventId) -> Result<bool, StoreError> {
        let ceiling = self
            .events
            .fetch(event)?
            .and_then(|event| event.max_capacity);
        match ceiling {
            Some(ceiling) => Ok(self.signups.count_for_event(event)? >= ceiling),
            None => Ok(false),
        }
    }

    /// Number of signups that chose the given skill role for the event.
    pub fn skill_signup_count(
        &self,
        event: &EventId,
        skill: &SkillId,
    ) -> Result<u32, StoreError> {
        self.signups.count_for_skill(event, skill)
    }

    /// `false` when the skill is not associated with the event or its
    /// association carries no `needed_count`.
    pub fn is_skill_slot_full(
        &self,
        event: &EventId,
        skill: &SkillId,
    ) -> Result<bool, StoreError> {
        let needed = self
            .events
            .required_skills(event)?
            .into_iter()
            .find(|association| &association.skill_id == skill)
            .and_then(|association| association.needed_count);
        match needed {
            Some(needed) => Ok(self.signups.count_for_skill(event, skill)? >= needed),
            None => Ok(false),
        }
    }

    /// One availability row per required skill association, in the event's
    /// listing order. Optional tags are omitted.
    pub fn slot_availability(
        &self,
        event: &Event,
    ) -> Result<Vec<SkillSlotAvailability>, StoreError> {
        let mut slots = Vec::new();
        for association in event.required_associations() {
            let current = self
                .signups
                .count_for_skill(&event.id, &association.skill_id)?;
            slots.push(SkillSlotAvailability::from_counts(association, current));
        }
        Ok(slots)
    }
}

/// Remaining spots for an event or slot: a number, or unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotsRemaining {
    Exactly(u32),
    Unlimited,
}

impl Serialize for SpotsRemaining {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SpotsRemaining::Exactly(spots) => serializer.serialize_u32(*spots),
            SpotsRemaining::Unlimited => serializer.serialize_str("Unlimited"),
        }
    }
}

/// Occupancy snapshot for one required skill slot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSlotAvailability {
    pub skill_id: SkillId,
    pub skill_name: String,
    pub needed_count: Option<u32>,
    pub current_signups: u32,
    pub spots_remaining: SpotsRemaining,
    pub is_full: bool,
    /// Present only when the request named a volunteer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_has_skill: Option<bool>,
}

impl SkillSlotAvailability {
    fn from_counts(association: &RequiredSkillAssociation, current: u32) -> Self {
        let (spots_remaining, is_full) = match association.needed_count {
            Some(needed) => (
                SpotsRemaining::Exactly(needed.saturating_sub(current)),
                current >= needed,
            ),
            None => (SpotsRemaining::Unlimited, false),
        };
        Self {
            skill_id: association.skill_id.clone(),
            skill_name: association.skill_name.clone(),
            needed_count: association.needed_count,
            current_signups: current,
            spots_remaining,
            is_full,
            volunteer_has_skill: None,
        }
    }
}
