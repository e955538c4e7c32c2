use std::net::SocketAddr;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "letshang", about = "LetsHang API server")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LETSHANG_BIND", default_value = "0.0.0.0:8010")]
    pub bind: SocketAddr,

    /// Base URL of the hosted Supabase project
    #[arg(long, env = "PUBLIC_SUPABASE_URL")]
    pub supabase_url: reqwest::Url,

    /// Public anon key, sent as `apikey` on every upstream call
    #[arg(long, env = "PUBLIC_SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_anon_key: String,

    /// Origin allowed to make credentialed cross-origin requests
    #[arg(long, env = "LETSHANG_ALLOWED_ORIGIN", default_value = "https://letshang.app")]
    pub allowed_origin: String,

    /// Minutes that must remain before an event ends for a late join
    #[arg(
        long,
        env = "LETSHANG_JOIN_LATE_THRESHOLD_MINUTES",
        default_value_t = crate::hang::JOIN_LATE_THRESHOLD_MINUTES
    )]
    pub join_late_threshold_minutes: i64,

    /// Timeout for calls to the identity provider and data api
    #[arg(long, env = "LETSHANG_UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn window_policy(&self) -> crate::window::WindowPolicy {
        crate::window::WindowPolicy {
            join_late_threshold_minutes: self.join_late_threshold_minutes,
            ..Default::default()
        }
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url.as_str().trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "letshang",
            "--supabase-url",
            "https://abcdefgh.supabase.co/",
            "--supabase-anon-key",
            "anon",
            "--join-late-threshold-minutes",
            "20",
        ])
        .unwrap();

        assert_eq!(config.rest_url(), "https://abcdefgh.supabase.co/rest/v1");
        assert_eq!(config.window_policy().join_late_threshold_minutes, 20);
        assert_eq!(config.window_policy().starting_soon_window_minutes, 120);
        assert_eq!(config.upstream_timeout_secs, 10);
    }
}
