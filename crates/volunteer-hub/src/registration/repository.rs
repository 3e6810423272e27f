use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::domain::{
    Event, EventId, EventStatus, NewSignup, RequiredSkillAssociation, Signup, SignupId, SkillId,
    VolunteerId,
};

/// Capacity ceilings re-validated by [`SignupStore::insert`] inside its
/// mutation scope. `None` disables the corresponding bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityBounds {
    pub event: Option<u32>,
    pub skill: Option<u32>,
}

/// Read access to the externally owned event catalog.
///
/// Readers are lookup-tolerant: an unknown id yields `Ok(None)` or an empty
/// collection rather than an error.
pub trait EventReader: Send + Sync {
    fn fetch(&self, id: &EventId) -> Result<Option<Event>, StoreError>;

    /// Events dated on or after `today` that are still open for listing,
    /// soonest first.
    fn upcoming(&self, today: NaiveDate) -> Result<Vec<Event>, StoreError>;

    /// Every event currently in the given lifecycle status.
    fn by_status(&self, status: EventStatus) -> Result<Vec<Event>, StoreError>;

    /// Every skill association for the event, required and optional alike,
    /// in the event's listing order.
    fn required_skills(&self, id: &EventId)
        -> Result<Vec<RequiredSkillAssociation>, StoreError>;
}

/// Read access to the skills a volunteer possesses.
pub trait VolunteerSkillReader: Send + Sync {
    fn skills(&self, volunteer: &VolunteerId) -> Result<BTreeSet<SkillId>, StoreError>;
}

/// Mutable signup storage.
///
/// `insert` must enforce, inside a single mutation scope and in this order:
/// no existing signup for the volunteer and event, the `bounds.event`
/// ceiling over the event's signup count, and the `bounds.skill` ceiling
/// over the chosen skill's signup count. A relational implementation runs
/// the same checks inside a transaction holding a row lock, backed by a
/// unique index on the volunteer and event pair.
pub trait SignupStore: Send + Sync {
    fn insert(&self, new: NewSignup, bounds: CapacityBounds) -> Result<Signup, StoreError>;
    fn delete(&self, id: &SignupId) -> Result<(), StoreError>;
    fn fetch(&self, id: &SignupId) -> Result<Option<Signup>, StoreError>;
    fn count_for_event(&self, event: &EventId) -> Result<u32, StoreError>;
    fn count_for_skill(&self, event: &EventId, skill: &SkillId) -> Result<u32, StoreError>;
    fn exists(&self, volunteer: &VolunteerId, event: &EventId) -> Result<bool, StoreError>;
    fn for_volunteer(&self, volunteer: &VolunteerId) -> Result<Vec<Signup>, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("signup already exists for this volunteer and event")]
    DuplicateSignup,
    #[error("event signup ceiling reached")]
    EventCapacity,
    #[error("skill slot ceiling reached")]
    SkillCapacity,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
