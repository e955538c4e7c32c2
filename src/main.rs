use axum::ServiceExt;
use clap::Parser;
use letshang::{config, routes, state};
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("letshang=info,tower_http=info")),
        )
        .init();

    let config = config::Config::parse();
    let bind = config.bind;
    let state = std::sync::Arc::new(state::State::new(config).expect("http client should build"));
    tracing::info!(
        "Resolving sessions against {} (join-late threshold {} min)",
        state.config.supabase_url,
        state.window.join_late_threshold_minutes
    );

    let app = NormalizePathLayer::trim_trailing_slash().layer(routes::app(state));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .expect("should bind listen address");
    tracing::info!("Listening on {bind}");

    axum::serve(
        listener,
        ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Error serving app")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Error listening for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
