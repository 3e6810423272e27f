use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for volunteers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VolunteerId(pub String);

/// Identifier wrapper for events, which are owned by an external catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Identifier wrapper for skills.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SkillId(pub String);

/// Identifier wrapper for signup records, assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignupId(pub String);

impl fmt::Display for VolunteerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SignupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states assigned to events by their upstream catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Whether the event still appears in volunteer-facing listings.
    pub const fn is_open(self) -> bool {
        matches!(self, EventStatus::Planned | EventStatus::Active)
    }
}

/// Start and end times of a timed event on its calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Open-interval overlap: windows that merely touch at an endpoint do
    /// not collide.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One event-side declaration that volunteers holding a skill are wanted.
/// At most one association exists per event and skill pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredSkillAssociation {
    pub skill_id: SkillId,
    pub skill_name: String,
    /// Required associations gate registration; optional ones are
    /// informational tags and never restrict who may sign up.
    pub is_required: bool,
    /// Number of volunteers wanted for this skill role; `None` means
    /// unlimited.
    pub needed_count: Option<u32>,
}

/// Event snapshot as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: NaiveDate,
    /// Absent for untimed, all-day events.
    pub window: Option<TimeWindow>,
    /// Event-wide signup ceiling; `None` means unlimited.
    pub max_capacity: Option<u32>,
    pub status: EventStatus,
    /// Skill associations in the event's listing order.
    pub required_skills: Vec<RequiredSkillAssociation>,
}

impl Event {
    pub fn association(&self, skill: &SkillId) -> Option<&RequiredSkillAssociation> {
        self.required_skills
            .iter()
            .find(|association| &association.skill_id == skill)
    }

    pub fn required_associations(&self) -> impl Iterator<Item = &RequiredSkillAssociation> {
        self.required_skills
            .iter()
            .filter(|association| association.is_required)
    }
}

/// Status tracked on stored signups. Removal deletes the row outright, so
/// only the registered state is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    Registered,
}

/// A volunteer's registration for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    pub id: SignupId,
    pub volunteer_id: VolunteerId,
    pub event_id: EventId,
    /// The required skill role being filled; absent when the event has no
    /// required skills.
    pub chosen_skill: Option<SkillId>,
    pub status: SignupStatus,
}

/// Insert payload for a signup; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignup {
    pub volunteer_id: VolunteerId,
    pub event_id: EventId,
    pub chosen_skill: Option<SkillId>,
}
