//! Session resolution against a hosted Supabase project.
//!
//! The session lives in the `sb-<project-ref>-auth-token` cookie, possibly
//! split into numbered chunks and possibly `base64-` encoded. A stored
//! session is trusted without contacting the provider unless it is about to
//! expire, in which case it is refreshed and written back.

use super::cookies::{chunk_value, removal};
use super::{CookieAdapter, IdentityProvider, Session};
use crate::error::ProviderError;
use crate::hang::{
    AUTH_COOKIE_BASE64_PREFIX, AUTH_COOKIE_CHUNK_SIZE, AUTH_COOKIE_MAX_AGE, AUTH_COOKIE_SUFFIX,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;

#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    token_url: String,
    anon_key: String,
    cookie_name: String,
}

/// Cookie name for a project, derived from the first label of the URL host.
pub fn auth_cookie_name(supabase_url: &reqwest::Url) -> String {
    let project_ref = supabase_url
        .host_str()
        .and_then(|host| host.split('.').next())
        .unwrap_or_default();
    format!("sb-{project_ref}-{AUTH_COOKIE_SUFFIX}")
}

pub fn decode_session(raw: &str) -> Option<Session> {
    let json = match raw.strip_prefix(AUTH_COOKIE_BASE64_PREFIX) {
        Some(encoded) => base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|err| tracing::debug!("Auth cookie is not valid base64: {err}"))
            .ok()?,
        None => raw.as_bytes().to_vec(),
    };

    serde_json::from_slice(&json)
        .map_err(|err| tracing::debug!("Auth cookie does not hold a session: {err}"))
        .ok()
}

pub fn encode_session(session: &Session) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(session)?;
    Ok(format!(
        "{AUTH_COOKIE_BASE64_PREFIX}{}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    ))
}

impl SupabaseAuth {
    pub fn new(http: reqwest::Client, supabase_url: &reqwest::Url, anon_key: String) -> Self {
        SupabaseAuth {
            http,
            token_url: format!(
                "{}/auth/v1/token?grant_type=refresh_token",
                supabase_url.as_str().trim_end_matches('/')
            ),
            anon_key,
            cookie_name: auth_cookie_name(supabase_url),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// `Ok(Some)` with the new session, `Ok(None)` if the refresh token was
    /// rejected, `Err` if the provider could not answer.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<Session>, ProviderError> {
        let response = self
            .http
            .post(&self.token_url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            tracing::debug!("Refresh token rejected with {status}");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let mut session: Session = serde_json::from_slice(&response.bytes().await?)?;
        if session.expires_at.is_none() {
            session.expires_at = session
                .expires_in
                .map(|expires_in| chrono::Utc::now().timestamp() + expires_in);
        }

        Ok(Some(session))
    }

    fn write_session(
        &self,
        cookies: &mut CookieAdapter,
        session: &Session,
    ) -> Result<(), ProviderError> {
        let encoded = encode_session(session)?;
        let chunks = chunk_value(&self.cookie_name, &encoded, AUTH_COOKIE_CHUNK_SIZE);
        let max_age = time::Duration::seconds(AUTH_COOKIE_MAX_AGE.as_secs() as i64);

        let stale = cookies
            .chunk_names(&self.cookie_name)
            .into_iter()
            .filter(|name| !chunks.iter().any(|(chunk_name, _)| chunk_name == name))
            .map(removal)
            .collect::<Vec<_>>();

        let fresh = chunks.into_iter().map(|(name, value)| {
            Cookie::build((name, value))
                .same_site(SameSite::Lax)
                .http_only(false)
                .max_age(max_age)
                .build()
        });

        cookies.set_all(fresh.chain(stale));
        Ok(())
    }

    fn clear_session(&self, cookies: &mut CookieAdapter) {
        let removals = cookies
            .chunk_names(&self.cookie_name)
            .into_iter()
            .map(removal)
            .collect::<Vec<_>>();
        cookies.set_all(removals);
    }
}

impl IdentityProvider for SupabaseAuth {
    async fn get_session(
        &self,
        cookies: &mut CookieAdapter,
    ) -> Result<Option<Session>, ProviderError> {
        let Some(raw) = cookies.get_chunked(&self.cookie_name) else {
            return Ok(None);
        };
        let Some(stored) = decode_session(&raw) else {
            return Ok(None);
        };

        if !stored.needs_refresh(chrono::Utc::now()) {
            return Ok(Some(stored));
        }

        tracing::debug!("Refreshing session for user {}", stored.user.id);
        match self.refresh(&stored.refresh_token).await? {
            Some(refreshed) => {
                self.write_session(cookies, &refreshed)?;
                Ok(Some(refreshed))
            }
            None => {
                self.clear_session(cookies);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session_for;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Json;

    fn url(raw: &str) -> reqwest::Url {
        reqwest::Url::parse(raw).unwrap()
    }

    fn provider(base: &str) -> SupabaseAuth {
        SupabaseAuth::new(reqwest::Client::new(), &url(base), String::from("anon"))
    }

    fn adapter_with(name: &str, value: String) -> CookieAdapter {
        CookieAdapter::new(vec![Cookie::new(name.to_owned(), value)])
    }

    async fn fake_token_endpoint(status: StatusCode, body: serde_json::Value) -> String {
        let app = axum::Router::new().route(
            "/auth/v1/token",
            post(move |Json(request): Json<serde_json::Value>| async move {
                assert_eq!(request["refresh_token"], "refresh-ada");
                (status, Json(body))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{address}")
    }

    #[test]
    fn cookie_name_uses_project_ref() {
        assert_eq!(
            auth_cookie_name(&url("https://abcdefgh.supabase.co")),
            "sb-abcdefgh-auth-token"
        );
        assert_eq!(auth_cookie_name(&url("http://localhost:54321")), "sb-localhost-auth-token");
    }

    #[test]
    fn sessions_decode_from_base64_and_plain_json() {
        let session = session_for("ada", None);
        let encoded = encode_session(&session).unwrap();
        assert!(encoded.starts_with("base64-"));
        assert_eq!(decode_session(&encoded), Some(session.clone()));

        let plain = serde_json::to_string(&session).unwrap();
        assert_eq!(decode_session(&plain), Some(session));

        assert_eq!(decode_session("base64-!!!"), None);
        assert_eq!(decode_session("{\"nope\":1}"), None);
    }

    #[tokio::test]
    async fn missing_cookie_is_anonymous() {
        let auth = provider("https://abcdefgh.supabase.co");
        let mut cookies = CookieAdapter::default();
        assert_eq!(auth.get_session(&mut cookies).await.unwrap(), None);
        assert!(cookies.outbound().is_empty());
    }

    #[tokio::test]
    async fn fresh_session_is_trusted_without_network() {
        // unroutable host: any request would fail the test
        let auth = provider("http://192.0.2.1:9");
        let expires_at = chrono::Utc::now().timestamp() + 3600;
        let session = session_for("ada", Some(expires_at));
        let mut cookies = adapter_with(auth.cookie_name(), encode_session(&session).unwrap());

        assert_eq!(auth.get_session(&mut cookies).await.unwrap(), Some(session));
        assert!(cookies.outbound().is_empty());
    }

    #[tokio::test]
    async fn chunked_session_cookie_is_reassembled() {
        let auth = provider("https://abcdefgh.supabase.co");
        let session = session_for("ada", Some(chrono::Utc::now().timestamp() + 3600));
        let encoded = encode_session(&session).unwrap();
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let mut cookies = CookieAdapter::new(vec![
            Cookie::new(format!("{}.0", auth.cookie_name()), head.to_owned()),
            Cookie::new(format!("{}.1", auth.cookie_name()), tail.to_owned()),
        ]);

        assert_eq!(auth.get_session(&mut cookies).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn expired_session_is_refreshed_and_written_back() {
        let refreshed = session_for("ada", None);
        let mut body = serde_json::to_value(&refreshed).unwrap();
        body["access_token"] = "rotated".into();
        let base = fake_token_endpoint(StatusCode::OK, body).await;
        let auth = provider(&base);

        let stale = session_for("ada", Some(chrono::Utc::now().timestamp() - 10));
        let mut cookies = adapter_with(auth.cookie_name(), encode_session(&stale).unwrap());

        let session = auth.get_session(&mut cookies).await.unwrap().unwrap();
        assert_eq!(session.access_token, "rotated");
        // expires_in was turned into an absolute expiry
        assert!(session.expires_at.is_some());

        let written = cookies.outbound();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].name(), auth.cookie_name());
        assert_eq!(written[0].path(), Some("/"));
        assert_eq!(decode_session(written[0].value()), Some(session));
    }

    #[tokio::test]
    async fn rejected_refresh_clears_cookies() {
        let base = fake_token_endpoint(
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": "invalid_grant" }),
        )
        .await;
        let auth = provider(&base);
        let stale = session_for("ada", Some(0));
        let encoded = encode_session(&stale).unwrap();
        let (head, tail) = encoded.split_at(10);
        let mut cookies = CookieAdapter::new(vec![
            Cookie::new(format!("{}.0", auth.cookie_name()), head.to_owned()),
            Cookie::new(format!("{}.1", auth.cookie_name()), tail.to_owned()),
        ]);

        assert_eq!(auth.get_session(&mut cookies).await.unwrap(), None);
        let cleared: Vec<_> = cookies.outbound().iter().map(|c| c.value()).collect();
        assert_eq!(cleared, ["", ""]);
    }

    #[tokio::test]
    async fn session_without_any_expiry_must_survive_a_refresh() {
        let base = fake_token_endpoint(
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": "invalid_grant" }),
        )
        .await;
        let auth = provider(&base);
        let forged = serde_json::json!({
            "access_token": "x",
            "refresh_token": "refresh-ada",
            "user": { "id": "admin" }
        });
        let mut cookies = adapter_with(auth.cookie_name(), forged.to_string());

        assert_eq!(auth.get_session(&mut cookies).await.unwrap(), None);
        let cleared: Vec<_> = cookies.outbound().iter().map(|c| c.value()).collect();
        assert_eq!(cleared, [""]);
    }

    #[tokio::test]
    async fn provider_outage_is_an_error_not_anonymous() {
        let base = fake_token_endpoint(
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({ "error": "down" }),
        )
        .await;
        let auth = provider(&base);
        let stale = session_for("ada", Some(0));
        let mut cookies = adapter_with(auth.cookie_name(), encode_session(&stale).unwrap());

        let err = auth.get_session(&mut cookies).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { status: 503, .. }));
        assert!(cookies.outbound().is_empty());
    }
}
