use crate::auth::DynIdentityProvider;
use crate::config::Config;
use crate::window::WindowPolicy;
use std::sync::Arc;

pub mod session;

pub type SharedState = axum::extract::State<Arc<State>>;
pub type NestedRouter = axum::Router<Arc<State>>;

/// Read-only after startup; everything request-scoped lives in `RequestContext`.
pub struct State {
    pub config: Config,
    pub http: reqwest::Client,
    pub identity: Box<dyn DynIdentityProvider>,
    pub window: WindowPolicy,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("config", &self.config)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl State {
    pub fn new(config: Config) -> reqwest::Result<State> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.upstream_timeout_secs))
            .build()?;
        let identity = crate::auth::supabase::SupabaseAuth::new(
            http.clone(),
            &config.supabase_url,
            config.supabase_anon_key.clone(),
        );

        Ok(State::with_identity(config, http, Box::new(identity)))
    }

    pub fn with_identity(
        config: Config,
        http: reqwest::Client,
        identity: Box<dyn DynIdentityProvider>,
    ) -> State {
        State {
            window: config.window_policy(),
            config,
            http,
            identity,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(supabase_url: &str) -> Config {
    use clap::Parser;

    Config::parse_from([
        "letshang",
        "--supabase-url",
        supabase_url,
        "--supabase-anon-key",
        "anon-key",
        "--allowed-origin",
        "http://localhost:5173",
    ])
}
