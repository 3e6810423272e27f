use chrono::{NaiveDate, NaiveTime};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use volunteer_hub::registration::domain::{
    Event, EventId, EventStatus, RequiredSkillAssociation, SkillId, TimeWindow, VolunteerId,
};
use volunteer_hub::registration::MemoryStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn timed(
    id: &str,
    name: &str,
    date: NaiveDate,
    start: (u32, u32),
    end: (u32, u32),
    cap: Option<u32>,
) -> Event {
    Event {
        id: EventId(id.to_string()),
        name: name.to_string(),
        date,
        window: Some(TimeWindow {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("valid time"),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("valid time"),
        }),
        max_capacity: cap,
        status: EventStatus::Active,
        required_skills: Vec::new(),
    }
}

fn role(id: &str, name: &str, needed: Option<u32>) -> RequiredSkillAssociation {
    RequiredSkillAssociation {
        skill_id: SkillId(id.to_string()),
        skill_name: name.to_string(),
        is_required: true,
        needed_count: needed,
    }
}

/// Deterministic sample data anchored to `today`: a tiny orientation, two
/// overlapping outdoor shifts, a skill-gated pantry, and a gallery night
/// with an open-ended photography role.
pub(crate) fn seed_demo_roster(store: &MemoryStore, today: NaiveDate) {
    let offset = |days: i64| today + chrono::Duration::days(days);

    store.put_event(timed(
        "evt-orientation",
        "New Volunteer Orientation",
        offset(1),
        (18, 0),
        (20, 0),
        Some(1),
    ));
    store.put_event(timed(
        "evt-trail",
        "Trail Restoration",
        offset(2),
        (9, 0),
        (13, 0),
        Some(12),
    ));
    store.put_event(timed(
        "evt-nursery",
        "Native Plant Nursery",
        offset(2),
        (11, 0),
        (15, 0),
        None,
    ));
    store.put_event(Event {
        id: EventId("evt-pantry".to_string()),
        name: "Food Pantry Shift".to_string(),
        date: offset(3),
        window: None,
        max_capacity: None,
        status: EventStatus::Planned,
        required_skills: vec![
            role("skill-food-handling", "Food Handling", Some(1)),
            role("skill-logistics", "Logistics", Some(2)),
        ],
    });
    store.put_event(Event {
        id: EventId("evt-gallery".to_string()),
        name: "Gallery Night".to_string(),
        date: offset(5),
        window: Some(TimeWindow {
            start: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
            end: NaiveTime::from_hms_opt(21, 0, 0).expect("valid time"),
        }),
        max_capacity: None,
        status: EventStatus::Planned,
        required_skills: vec![role("skill-photography", "Event Photography", None)],
    });

    store.put_volunteer_skills(
        VolunteerId("vol-amara".to_string()),
        [
            SkillId("skill-food-handling".to_string()),
            SkillId("skill-logistics".to_string()),
        ],
    );
    store.put_volunteer_skills(
        VolunteerId("vol-bashir".to_string()),
        [SkillId("skill-logistics".to_string())],
    );
    store.put_volunteer_skills(
        VolunteerId("vol-chen".to_string()),
        [SkillId("skill-photography".to_string())],
    );
    store.put_volunteer_skills(
        VolunteerId("vol-elif".to_string()),
        [SkillId("skill-food-handling".to_string())],
    );
    store.put_volunteer_skills(VolunteerId("vol-drew".to_string()), Vec::new());
}
