use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use chrono::NaiveDate;

use super::domain::{
    Event, EventId, EventStatus, NewSignup, RequiredSkillAssociation, Signup, SignupId,
    SignupStatus, SkillId, VolunteerId,
};
use super::repository::{
    CapacityBounds, EventReader, SignupStore, StoreError, VolunteerSkillReader,
};

/// In-memory storage arena backing the mock-data mode and the test suites.
///
/// Every record lives behind one mutex so each mutation, including the
/// bound-checked signup insert, happens at a single serialization point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Arena>,
}

#[derive(Debug, Default)]
struct Arena {
    events: BTreeMap<EventId, Event>,
    volunteer_skills: BTreeMap<VolunteerId, BTreeSet<SkillId>>,
    signups: BTreeMap<SignupId, Signup>,
    signup_sequence: u64,
}

impl Arena {
    fn next_signup_id(&mut self) -> SignupId {
        self.signup_sequence += 1;
        SignupId(format!("sg-{:06}", self.signup_sequence))
    }

    fn event_count(&self, event: &EventId) -> u32 {
        self.signups
            .values()
            .filter(|signup| &signup.event_id == event)
            .count() as u32
    }

    fn skill_count(&self, event: &EventId, skill: &SkillId) -> u32 {
        self.signups
            .values()
            .filter(|signup| {
                &signup.event_id == event && signup.chosen_skill.as_ref() == Some(skill)
            })
            .count() as u32
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace an event record.
    pub fn put_event(&self, event: Event) {
        let mut arena = self.inner.lock().expect("store mutex poisoned");
        arena.events.insert(event.id.clone(), event);
    }

    /// Seed the full skill set for a volunteer, replacing any previous one.
    pub fn put_volunteer_skills(
        &self,
        volunteer: VolunteerId,
        skills: impl IntoIterator<Item = SkillId>,
    ) {
        let mut arena = self.inner.lock().expect("store mutex poisoned");
        arena
            .volunteer_skills
            .insert(volunteer, skills.into_iter().collect());
    }
}

impl EventReader for MemoryStore {
    fn fetch(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena.events.get(id).cloned())
    }

    fn upcoming(&self, today: NaiveDate) -> Result<Vec<Event>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        let mut events: Vec<Event> = arena
            .events
            .values()
            .filter(|event| event.date >= today && event.status.is_open())
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            (a.date, a.window.map(|window| window.start))
                .cmp(&(b.date, b.window.map(|window| window.start)))
        });
        Ok(events)
    }

    fn by_status(&self, status: EventStatus) -> Result<Vec<Event>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena
            .events
            .values()
            .filter(|event| event.status == status)
            .cloned()
            .collect())
    }

    fn required_skills(
        &self,
        id: &EventId,
    ) -> Result<Vec<RequiredSkillAssociation>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena
            .events
            .get(id)
            .map(|event| event.required_skills.clone())
            .unwrap_or_default())
    }
}

impl VolunteerSkillReader for MemoryStore {
    fn skills(&self, volunteer: &VolunteerId) -> Result<BTreeSet<SkillId>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena
            .volunteer_skills
            .get(volunteer)
            .cloned()
            .unwrap_or_default())
    }
}

impl SignupStore for MemoryStore {
    fn insert(&self, new: NewSignup, bounds: CapacityBounds) -> Result<Signup, StoreError> {
        let mut arena = self.inner.lock().expect("store mutex poisoned");

        let duplicate = arena.signups.values().any(|signup| {
            signup.volunteer_id == new.volunteer_id && signup.event_id == new.event_id
        });
        if duplicate {
            return Err(StoreError::DuplicateSignup);
        }

        if let Some(ceiling) = bounds.event {
            if arena.event_count(&new.event_id) >= ceiling {
                return Err(StoreError::EventCapacity);
            }
        }

        if let (Some(ceiling), Some(skill)) = (bounds.skill, new.chosen_skill.as_ref()) {
            if arena.skill_count(&new.event_id, skill) >= ceiling {
                return Err(StoreError::SkillCapacity);
            }
        }

        let id = arena.next_signup_id();
        let signup = Signup {
            id: id.clone(),
            volunteer_id: new.volunteer_id,
            event_id: new.event_id,
            chosen_skill: new.chosen_skill,
            status: SignupStatus::Registered,
        };
        arena.signups.insert(id, signup.clone());
        Ok(signup)
    }

    fn delete(&self, id: &SignupId) -> Result<(), StoreError> {
        let mut arena = self.inner.lock().expect("store mutex poisoned");
        arena
            .signups
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &SignupId) -> Result<Option<Signup>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena.signups.get(id).cloned())
    }

    fn count_for_event(&self, event: &EventId) -> Result<u32, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena.event_count(event))
    }

    fn count_for_skill(&self, event: &EventId, skill: &SkillId) -> Result<u32, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena.skill_count(event, skill))
    }

    fn exists(&self, volunteer: &VolunteerId, event: &EventId) -> Result<bool, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena.signups.values().any(|signup| {
            &signup.volunteer_id == volunteer && &signup.event_id == event
        }))
    }

    fn for_volunteer(&self, volunteer: &VolunteerId) -> Result<Vec<Signup>, StoreError> {
        let arena = self.inner.lock().expect("store mutex poisoned");
        Ok(arena
            .signups
            .values()
            .filter(|signup| &signup.volunteer_id == volunteer)
            .cloned()
            .collect())
    }
}
