use crate::state::NestedRouter;
use axum::routing::get;

mod category;
mod event;
mod message;
mod session;
mod window;

pub fn route() -> NestedRouter {
    let compression_layer = tower_http::compression::CompressionLayer::new().br(true);

    axum::Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/session", get(session::get))
        .route("/categories", get(category::list).layer(compression_layer))
        .route("/events", axum::routing::post(event::post))
        .route("/events/:id", get(event::get))
        .route("/messages", axum::routing::post(message::post))
        .route("/window", get(window::get))
}
