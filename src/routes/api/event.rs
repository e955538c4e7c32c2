use crate::error::{ApiError, ValidationError};
use crate::hang::{Event, EventID};
use crate::middleware::RequestContext;
use crate::state::SharedState;
use crate::validate::EventDraft;
use crate::window::{EventWindow, WindowPolicy};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct EventWithWindow {
    #[serde(flatten)]
    event: Event,
    window: Option<EventWindow>,
}

impl EventWithWindow {
    fn new(event: Event, policy: &WindowPolicy) -> Self {
        let now = chrono::Utc::now();
        let window = match policy.classify_raw(&event.start_time, &event.end_time, now) {
            Ok(window) => Some(window),
            Err(err) => {
                tracing::warn!("Event {} has an unreadable time window: {err}", event.id);
                None
            }
        };

        EventWithWindow { event, window }
    }
}

pub(super) async fn get(
    State(state): SharedState,
    Extension(ctx): Extension<RequestContext>,
    Path(event_id): Path<EventID>,
) -> Result<Json<EventWithWindow>, ApiError> {
    if !crate::validate::is_uuid(&event_id) {
        return Err(ValidationError::new("id", "must be an event id").into());
    }

    let filter = format!("eq.{event_id}");
    let Some(event) = ctx
        .client
        .select_one::<Event>("events", &[("select", "*"), ("id", filter.as_str())])
        .await?
    else {
        return Err(ApiError::NotFound);
    };

    Ok(Json(EventWithWindow::new(event, &state.window)))
}

#[derive(Debug, Serialize)]
struct NewEvent<'a> {
    creator_id: &'a str,
    #[serde(flatten)]
    draft: &'a EventDraft,
}

pub(super) async fn post(
    State(state): SharedState,
    Extension(ctx): Extension<RequestContext>,
    Json(mut draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<EventWithWindow>), ApiError> {
    let creator = ctx.require_user()?;
    draft.validate()?;
    draft.title = draft.title.trim().to_owned();

    let event: Event = ctx
        .client
        .insert(
            "events",
            &NewEvent {
                creator_id: &creator.id,
                draft: &draft,
            },
        )
        .await?;
    tracing::info!("User {} created event {}", creator.id, event.id);

    Ok((
        StatusCode::CREATED,
        Json(EventWithWindow::new(event, &state.window)),
    ))
}
