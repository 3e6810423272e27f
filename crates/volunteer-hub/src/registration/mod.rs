//! Event registration and eligibility engine: live capacity tracking, skill
//! matching, time-conflict detection, and the signup lifecycle, exposed over
//! storage traits so the whole pipeline can run against any backing store.

pub mod capacity;
pub mod domain;
pub mod eligibility;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use capacity::{CapacityTracker, SkillSlotAvailability, SpotsRemaining};
pub use domain::{
    Event, EventId, EventStatus, NewSignup, RequiredSkillAssociation, Signup, SignupId,
    SignupStatus, SkillId, TimeWindow, VolunteerId,
};
pub use eligibility::{
    EligibilityEvaluator, EligibilityReason, EligibilityReport, RejectionKind, SkillMatch,
};
pub use memory::MemoryStore;
pub use repository::{
    CapacityBounds, EventReader, SignupStore, StoreError, VolunteerSkillReader,
};
pub use router::{registration_router, RegisterRequest, SkillSelector};
pub use service::{
    EventDetail, RegistrationError, RegistrationService, UnregisterReceipt, VolunteerSignupView,
};
