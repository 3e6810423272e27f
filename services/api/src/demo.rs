use crate::infra::{parse_date, seed_demo_roster};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use volunteer_hub::error::AppError;
use volunteer_hub::registration::domain::{EventId, EventStatus, SkillId, VolunteerId};
use volunteer_hub::registration::{
    EventReader, MemoryStore, RegistrationService, Signup, SpotsRemaining,
};

type DemoService = RegistrationService<MemoryStore, MemoryStore, MemoryStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Anchor date for the seeded roster (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(MemoryStore::new());
    seed_demo_roster(&store, today);
    let service = Arc::new(RegistrationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    println!("Volunteer Hub demo (roster anchored {today})");

    println!("\nUpcoming events");
    match store.upcoming(today) {
        Ok(events) => {
            for event in events {
                let when = match &event.window {
                    Some(window) => format!(
                        "{} {}-{}",
                        event.date,
                        window.start.format("%H:%M"),
                        window.end.format("%H:%M")
                    ),
                    None => format!("{} (all day)", event.date),
                };
                let capacity = match event.max_capacity {
                    Some(cap) => format!("{cap} spots"),
                    None => "unlimited".to_string(),
                };
                println!("- {} | {} | {when} | {capacity}", event.id, event.name);
                for role in event.required_associations() {
                    let needed = match role.needed_count {
                        Some(count) => format!("{count} needed"),
                        None => "open-ended".to_string(),
                    };
                    println!("    requires {} ({needed})", role.skill_name);
                }
            }
        }
        Err(err) => {
            println!("  event catalog unavailable: {err}");
            return Ok(());
        }
    }

    match store.by_status(EventStatus::Planned) {
        Ok(planned) if !planned.is_empty() => {
            println!("\nStill in planning");
            for event in planned {
                println!("- {} | {}", event.id, event.name);
            }
        }
        Ok(_) => {}
        Err(err) => println!("  status listing unavailable: {err}"),
    }

    println!("\nRegistrations");
    let orientation = attempt(&service, "vol-amara", "evt-orientation", None);
    attempt(&service, "vol-drew", "evt-orientation", None);
    attempt(&service, "vol-amara", "evt-orientation", None);
    attempt(&service, "vol-amara", "evt-trail", None);
    attempt(&service, "vol-amara", "evt-nursery", None);
    attempt(&service, "vol-drew", "evt-pantry", None);
    attempt(&service, "vol-drew", "evt-pantry", Some("skill-food-handling"));
    attempt(&service, "vol-amara", "evt-pantry", Some("skill-food-handling"));
    attempt(&service, "vol-elif", "evt-pantry", Some("skill-food-handling"));
    attempt(&service, "vol-bashir", "evt-pantry", Some("skill-logistics"));
    attempt(&service, "vol-chen", "evt-gallery", Some("skill-photography"));
    attempt(&service, "vol-drew", "evt-carnival", None);

    println!("\nUnregistration");
    if let Some(signup) = orientation {
        let owner = VolunteerId("vol-amara".to_string());
        match service.delete_signup(&signup.id, &owner) {
            Ok(receipt) => println!("- {}", receipt.message),
            Err(err) => println!("- unregistration failed: {err}"),
        }
        match service.delete_signup(&signup.id, &owner) {
            Ok(receipt) => println!("- {}", receipt.message),
            Err(err) => println!("- repeat removal rejected ({err})"),
        }
    }
    attempt(&service, "vol-drew", "evt-orientation", None);

    println!("\nAmara's schedule");
    match service.volunteer_signups(&VolunteerId("vol-amara".to_string())) {
        Ok(views) => {
            for view in views {
                let role = match &view.skill_name {
                    Some(name) => format!(" as {name}"),
                    None => String::new(),
                };
                println!(
                    "- {} | {} on {}{role}",
                    view.signup_id, view.event_name, view.event_date
                );
            }
        }
        Err(err) => println!("- schedule unavailable: {err}"),
    }

    println!("\nPantry slots");
    match service.slot_availability(&EventId("evt-pantry".to_string()), None) {
        Ok(slots) => {
            for slot in slots {
                let open = match slot.spots_remaining {
                    SpotsRemaining::Exactly(spots) => format!("{spots} open"),
                    SpotsRemaining::Unlimited => "unlimited".to_string(),
                };
                let full_note = if slot.is_full { " (full)" } else { "" };
                println!(
                    "- {}: {} registered, {open}{full_note}",
                    slot.skill_name, slot.current_signups
                );
            }
        }
        Err(err) => println!("- slots unavailable: {err}"),
    }

    println!("\nOpenings for vol-drew");
    match service.available_events(&VolunteerId("vol-drew".to_string()), today) {
        Ok(events) => {
            for event in events {
                println!("- {} on {}", event.name, event.date);
            }
        }
        Err(err) => println!("- listing unavailable: {err}"),
    }
    match service.other_events(&VolunteerId("vol-drew".to_string()), today) {
        Ok(events) => {
            if !events.is_empty() {
                println!("Out of reach until new skills are added:");
                for event in events {
                    println!("- {} on {}", event.name, event.date);
                }
            }
        }
        Err(err) => println!("- listing unavailable: {err}"),
    }

    println!("\nWhy the pantry is out of reach for vol-drew");
    match service.event_detail(
        &EventId("evt-pantry".to_string()),
        Some(&VolunteerId("vol-drew".to_string())),
    ) {
        Ok(detail) => match detail.eligibility {
            Some(report) if !report.can_register => {
                for reason in report.reasons {
                    println!("- {}", reason.message);
                }
            }
            _ => println!("- no obstacle reported"),
        },
        Err(err) => println!("- detail unavailable: {err}"),
    }

    Ok(())
}

fn attempt(
    service: &DemoService,
    volunteer: &str,
    event: &str,
    skill: Option<&str>,
) -> Option<Signup> {
    let role_note = match skill {
        Some(id) => format!(" as {id}"),
        None => String::new(),
    };
    let chosen = skill.map(|id| SkillId(id.to_string()));

    match service.create_signup(
        &VolunteerId(volunteer.to_string()),
        &EventId(event.to_string()),
        chosen,
    ) {
        Ok(signup) => {
            println!("- {volunteer} -> {event}{role_note}: registered ({})", signup.id);
            Some(signup)
        }
        Err(err) => {
            println!("- {volunteer} -> {event}{role_note}: rejected ({err})");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_walkthrough_runs_cleanly() {
        let args = DemoArgs {
            today: Some(NaiveDate::from_ymd_opt(2026, 4, 6).expect("valid date")),
        };

        run_demo(args).expect("demo completes");
    }
}
