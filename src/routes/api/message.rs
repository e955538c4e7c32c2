use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::validate::MessageDraft;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    sender_id: &'a str,
    recipient_id: &'a str,
    body: &'a str,
}

pub(super) async fn post(
    Extension(ctx): Extension<RequestContext>,
    Json(draft): Json<MessageDraft>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let sender = ctx.require_user()?;
    draft.validate()?;

    let row = NewMessage {
        sender_id: &sender.id,
        recipient_id: &draft.recipient_id,
        body: draft.body.trim(),
    };
    let created = ctx.client.insert("messages", &row).await?;

    Ok((StatusCode::CREATED, Json(created)))
}
