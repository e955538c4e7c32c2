use crate::data::Relayed;
use crate::error::ApiError;
use crate::middleware::RequestContext;
use axum::Extension;

// pagination metadata comes back in the relayed content-range header
pub(super) async fn list(
    Extension(ctx): Extension<RequestContext>,
) -> Result<Relayed, ApiError> {
    Ok(ctx
        .client
        .select("categories", &[("select", "*"), ("order", "name.asc")])
        .await?)
}
