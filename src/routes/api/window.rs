use crate::error::ApiError;
use crate::state::SharedState;
use crate::window::EventWindow;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct WindowQuery {
    start: String,
    end: String,
}

pub(super) async fn get(
    State(state): SharedState,
    Query(query): Query<WindowQuery>,
) -> Result<Json<EventWindow>, ApiError> {
    Ok(Json(state.window.classify_raw(
        &query.start,
        &query.end,
        chrono::Utc::now(),
    )?))
}
