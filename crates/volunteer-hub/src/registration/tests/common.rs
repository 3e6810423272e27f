use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::registration::domain::{
    Event, EventId, EventStatus, NewSignup, RequiredSkillAssociation, Signup, SignupId, SkillId,
    TimeWindow, VolunteerId,
};
use crate::registration::memory::MemoryStore;
use crate::registration::repository::{
    CapacityBounds, EventReader, SignupStore, StoreError, VolunteerSkillReader,
};
use crate::registration::{registration_router, RegistrationService};

pub(super) type MemoryService = RegistrationService<MemoryStore, MemoryStore, MemoryStore>;

pub(super) fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date")
}

pub(super) fn day(offset: i64) -> NaiveDate {
    anchor() + chrono::Duration::days(offset)
}

pub(super) fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow {
        start: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("valid time"),
        end: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("valid time"),
    }
}

pub(super) fn volunteer(id: &str) -> VolunteerId {
    VolunteerId(id.to_string())
}

pub(super) fn event_id(id: &str) -> EventId {
    EventId(id.to_string())
}

pub(super) fn skill(id: &str) -> SkillId {
    SkillId(id.to_string())
}

pub(super) fn signup_id(id: &str) -> SignupId {
    SignupId(id.to_string())
}

pub(super) fn required(id: &str, name: &str, needed: Option<u32>) -> RequiredSkillAssociation {
    RequiredSkillAssociation {
        skill_id: skill(id),
        skill_name: name.to_string(),
        is_required: true,
        needed_count: needed,
    }
}

pub(super) fn optional_tag(id: &str, name: &str) -> RequiredSkillAssociation {
    RequiredSkillAssociation {
        skill_id: skill(id),
        skill_name: name.to_string(),
        is_required: false,
        needed_count: None,
    }
}

pub(super) fn event(
    id: &str,
    name: &str,
    date: NaiveDate,
    window: Option<TimeWindow>,
    max_capacity: Option<u32>,
    required_skills: Vec<RequiredSkillAssociation>,
) -> Event {
    Event {
        id: event_id(id),
        name: name.to_string(),
        date,
        window,
        max_capacity,
        status: EventStatus::Planned,
        required_skills,
    }
}

/// Roster exercised across the suites: a capacity-two cleanup, an
/// overlapping run, a back-to-back lunch, untimed fair, skill-gated food
/// drive, and a gala with an unlimited required role plus an optional tag.
pub(super) fn seeded_store_anchored(today: NaiveDate) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let offset = |days: i64| today + chrono::Duration::days(days);

    store.put_event(event(
        "evt-cleanup",
        "River Cleanup",
        offset(0),
        Some(window((10, 0), (12, 0))),
        Some(2),
        Vec::new(),
    ));
    store.put_event(event(
        "evt-run",
        "Charity Run",
        offset(0),
        Some(window((11, 0), (13, 0))),
        None,
        Vec::new(),
    ));
    store.put_event(event(
        "evt-lunch",
        "Community Lunch",
        offset(0),
        Some(window((12, 0), (14, 0))),
        None,
        Vec::new(),
    ));
    store.put_event(event(
        "evt-fair",
        "Community Fair",
        offset(1),
        None,
        None,
        Vec::new(),
    ));
    store.put_event(event(
        "evt-workshop",
        "Repair Workshop",
        offset(1),
        Some(window((9, 0), (11, 0))),
        None,
        Vec::new(),
    ));
    store.put_event(event(
        "evt-food-drive",
        "Food Drive",
        offset(2),
        Some(window((9, 0), (17, 0))),
        None,
        vec![
            required("skill-first-aid", "First Aid", Some(1)),
            required("skill-cooking", "Cooking", Some(1)),
        ],
    ));
    store.put_event(event(
        "evt-gala",
        "Winter Gala",
        offset(4),
        Some(window((18, 0), (22, 0))),
        Some(10),
        vec![
            required("skill-logistics", "Logistics", None),
            optional_tag("skill-photography", "Photography"),
        ],
    ));
    store.put_event(event(
        "evt-archive",
        "Archived Drive",
        offset(-20),
        None,
        None,
        Vec::new(),
    ));
    let mut cancelled = event(
        "evt-cancelled",
        "Cancelled Social",
        offset(3),
        None,
        None,
        Vec::new(),
    );
    cancelled.status = EventStatus::Cancelled;
    store.put_event(cancelled);

    store.put_volunteer_skills(
        volunteer("vol-ana"),
        [skill("skill-first-aid"), skill("skill-cooking")],
    );
    store.put_volunteer_skills(volunteer("vol-ben"), [skill("skill-first-aid")]);
    store.put_volunteer_skills(volunteer("vol-cora"), [skill("skill-cooking")]);
    store.put_volunteer_skills(volunteer("vol-dee"), Vec::new());
    store.put_volunteer_skills(volunteer("vol-evy"), [skill("skill-photography")]);

    store
}

pub(super) fn seeded_store() -> Arc<MemoryStore> {
    seeded_store_anchored(anchor())
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<MemoryStore>) {
    build_service_anchored(anchor())
}

pub(super) fn build_service_anchored(today: NaiveDate) -> (Arc<MemoryService>, Arc<MemoryStore>) {
    let store = seeded_store_anchored(today);
    let service = Arc::new(RegistrationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    (service, store)
}

pub(super) fn registration_router_with_service(service: Arc<MemoryService>) -> axum::Router {
    registration_router(service)
}

/// `MemoryStore` implements two traits with a `fetch` method, so concrete
/// call sites in tests go through these qualified helpers.
pub(super) fn fetch_event(store: &MemoryStore, id: &str) -> Event {
    EventReader::fetch(store, &event_id(id))
        .expect("event fetch succeeds")
        .expect("event present")
}

pub(super) fn fetch_signup(store: &MemoryStore, id: &SignupId) -> Option<Signup> {
    SignupStore::fetch(store, id).expect("signup fetch succeeds")
}

/// Insert directly through the store, bypassing the service gates, so
/// occupancy states can be crafted exactly.
pub(super) fn raw_signup(
    store: &MemoryStore,
    volunteer_id: &str,
    event: &str,
    chosen: Option<&str>,
) -> Signup {
    store
        .insert(
            NewSignup {
                volunteer_id: volunteer(volunteer_id),
                event_id: event_id(event),
                chosen_skill: chosen.map(|id| skill(id)),
            },
            CapacityBounds::default(),
        )
        .expect("raw insert succeeds")
}

/// Store whose every operation reports lost connectivity.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl EventReader for UnavailableStore {
    fn fetch(&self, _id: &EventId) -> Result<Option<Event>, StoreError> {
        offline()
    }

    fn upcoming(&self, _today: NaiveDate) -> Result<Vec<Event>, StoreError> {
        offline()
    }

    fn by_status(&self, _status: EventStatus) -> Result<Vec<Event>, StoreError> {
        offline()
    }

    fn required_skills(
        &self,
        _id: &EventId,
    ) -> Result<Vec<RequiredSkillAssociation>, StoreError> {
        offline()
    }
}

impl VolunteerSkillReader for UnavailableStore {
    fn skills(&self, _volunteer: &VolunteerId) -> Result<BTreeSet<SkillId>, StoreError> {
        offline()
    }
}

impl SignupStore for UnavailableStore {
    fn insert(&self, _new: NewSignup, _bounds: CapacityBounds) -> Result<Signup, StoreError> {
        offline()
    }

    fn delete(&self, _id: &SignupId) -> Result<(), StoreError> {
        offline()
    }

    fn fetch(&self, _id: &SignupId) -> Result<Option<Signup>, StoreError> {
        offline()
    }

    fn count_for_event(&self, _event: &EventId) -> Result<u32, StoreError> {
        offline()
    }

    fn count_for_skill(&self, _event: &EventId, _skill: &SkillId) -> Result<u32, StoreError> {
        offline()
    }

    fn exists(&self, _volunteer: &VolunteerId, _event: &EventId) -> Result<bool, StoreError> {
        offline()
    }

    fn for_volunteer(&self, _volunteer: &VolunteerId) -> Result<Vec<Signup>, StoreError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
