use crate::state::State;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

pub fn app(state: Arc<State>) -> axum::Router {
    let cors = match state.config.allowed_origin.parse::<axum::http::HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(tower_http::cors::AllowOrigin::exact(origin))
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(err) => {
            tracing::warn!(
                "Allowed origin {:?} is not a valid header value, cross-origin requests disabled: {err}",
                state.config.allowed_origin
            );
            CorsLayer::new()
        }
    };

    axum::Router::new()
        .nest("/api", api::route())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::resolve_session,
        ))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
