use crate::error::ApiError;
use crate::hang::User;
use crate::middleware::RequestContext;
use axum::{Extension, Json};

pub(super) async fn get(
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(ctx.require_user()?.clone()))
}
