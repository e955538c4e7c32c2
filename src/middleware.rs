//! Per-request session resolution.
//!
//! Runs before every route: resolves the session from cookies, stores a
//! [`RequestContext`] in the request extensions, and writes back whatever
//! cookies the identity provider asked for.

use crate::auth::cookies::append_set_cookies;
use crate::auth::{AuthState, CookieAdapter, Session};
use crate::data::DataClient;
use crate::error::ApiError;
use crate::hang::User;
use crate::state::SharedState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

/// Owned by a single request; handlers take it with `Extension<RequestContext>`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client: DataClient,
    pub auth: AuthState,
}

impl RequestContext {
    pub fn session(&self) -> Option<&Session> {
        self.auth.session()
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user().ok_or(ApiError::Unauthorized)
    }
}

pub async fn resolve_session(
    State(state): SharedState,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut cookies = CookieAdapter::from_jar(&jar);
    let auth = state.resolve_auth(&mut cookies).await?;

    match auth.user() {
        Some(user) => tracing::debug!("Request authenticated as {}", user.id),
        None => tracing::trace!("Anonymous request"),
    }

    request.extensions_mut().insert(RequestContext {
        client: state.data_client(auth.session()),
        auth,
    });

    let mut response = next.run(request).await;
    append_set_cookies(response.headers_mut(), cookies.outbound());
    Ok(response)
}
