use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::domain::{EventId, SignupId, SkillId, VolunteerId};
use super::eligibility::RejectionKind;
use super::repository::{EventReader, SignupStore, VolunteerSkillReader};
use super::service::{RegistrationError, RegistrationService};

/// Router builder exposing the registration endpoints.
pub fn registration_router<E, V, S>(service: Arc<RegistrationService<E, V, S>>) -> Router
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/volunteers/:volunteer_id/events/available",
            get(available_events_handler::<E, V, S>),
        )
        .route(
            "/api/v1/volunteers/:volunteer_id/events/other",
            get(other_events_handler::<E, V, S>),
        )
        .route(
            "/api/v1/volunteers/:volunteer_id/signups",
            get(volunteer_signups_handler::<E, V, S>),
        )
        .route("/api/v1/events/:event_id", get(event_detail_handler::<E, V, S>))
        .route(
            "/api/v1/events/:event_id/slots",
            get(slot_availability_handler::<E, V, S>),
        )
        .route("/api/v1/signups", post(register_handler::<E, V, S>))
        .route(
            "/api/v1/signups/:signup_id",
            delete(unregister_handler::<E, V, S>),
        )
        .with_state(service)
}

/// Registration request body. `registered_skill_id` accepts either a bare
/// skill id or the expanded association object some clients send; both
/// normalize to the skill id alone.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub volunteer_id: String,
    pub event_id: String,
    #[serde(default)]
    pub registered_skill_id: Option<SkillSelector>,
}

/// Wire shapes accepted for the chosen skill role.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillSelector {
    Id(String),
    Association {
        #[serde(rename = "skillId")]
        skill_id: String,
        #[serde(default, rename = "isRequired")]
        is_required: Option<bool>,
        #[serde(default, rename = "neededCount")]
        needed_count: Option<u32>,
    },
}

impl SkillSelector {
    /// Whatever shape arrived, only the skill id reaches the core.
    /// Client-supplied capacity fields are never trusted.
    pub fn into_skill_id(self) -> SkillId {
        match self {
            SkillSelector::Id(id) => SkillId(id),
            SkillSelector::Association {
                skill_id,
                is_required,
                needed_count,
            } => {
                if is_required.is_some() || needed_count.is_some() {
                    debug!(skill = %skill_id, "discarding client-supplied association fields");
                }
                SkillId(skill_id)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VolunteerQuery {
    volunteer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerQuery {
    volunteer_id: String,
}

pub(crate) async fn register_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    let RegisterRequest {
        volunteer_id,
        event_id,
        registered_skill_id,
    } = request;
    let chosen = registered_skill_id.map(SkillSelector::into_skill_id);

    match service.create_signup(&VolunteerId(volunteer_id), &EventId(event_id), chosen) {
        Ok(signup) => (StatusCode::CREATED, axum::Json(signup)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) async fn unregister_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    Path(signup_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    match service.delete_signup(&SignupId(signup_id), &VolunteerId(query.volunteer_id)) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) async fn available_events_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    Path(volunteer_id): Path<String>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    let today = Local::now().date_naive();
    match service.available_events(&VolunteerId(volunteer_id), today) {
        Ok(events) => (StatusCode::OK, axum::Json(events)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) async fn other_events_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    Path(volunteer_id): Path<String>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    let today = Local::now().date_naive();
    match service.other_events(&VolunteerId(volunteer_id), today) {
        Ok(events) => (StatusCode::OK, axum::Json(events)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) async fn volunteer_signups_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    Path(volunteer_id): Path<String>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    match service.volunteer_signups(&VolunteerId(volunteer_id)) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) async fn event_detail_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    Path(event_id): Path<String>,
    Query(query): Query<VolunteerQuery>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    let volunteer = query.volunteer_id.map(VolunteerId);
    match service.event_detail(&EventId(event_id), volunteer.as_ref()) {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) async fn slot_availability_handler<E, V, S>(
    State(service): State<Arc<RegistrationService<E, V, S>>>,
    Path(event_id): Path<String>,
    Query(query): Query<VolunteerQuery>,
) -> Response
where
    E: EventReader + 'static,
    V: VolunteerSkillReader + 'static,
    S: SignupStore + 'static,
{
    let volunteer = query.volunteer_id.map(VolunteerId);
    match service.slot_availability(&EventId(event_id), volunteer.as_ref()) {
        Ok(slots) => (StatusCode::OK, axum::Json(slots)).into_response(),
        Err(error) => rejection_response(error),
    }
}

pub(crate) fn rejection_response(error: RegistrationError) -> Response {
    let kind = match error.kind() {
        Some(kind) => kind,
        None => {
            let payload = json!({
                "error": error.to_string(),
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
        }
    };

    let status = match kind {
        RejectionKind::SkillRoleNotSelected => StatusCode::BAD_REQUEST,
        RejectionKind::SkillNotPossessed => StatusCode::FORBIDDEN,
        RejectionKind::SignupNotFound | RejectionKind::EventNotFound => StatusCode::NOT_FOUND,
        RejectionKind::AlreadyRegistered
        | RejectionKind::EventFull
        | RejectionKind::SkillSlotFull
        | RejectionKind::TimeConflict => StatusCode::CONFLICT,
    };

    let mut payload = json!({
        "kind": kind.label(),
        "error": error.to_string(),
    });
    if let RegistrationError::TimeConflict {
        event_id,
        event_name,
        ..
    } = &error
    {
        payload["conflictingEventId"] = json!(event_id);
        payload["conflictingEventName"] = json!(event_name);
    }

    (status, axum::Json(payload)).into_response()
}
