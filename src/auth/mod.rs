use crate::error::ProviderError;
use crate::hang::User;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub mod cookies;
pub mod supabase;

pub use cookies::CookieAdapter;

/// Provider-issued token pair plus the user it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    String::from("bearer")
}

impl Session {
    /// Unix seconds; falls back to the `exp` claim of the access token.
    pub fn expiry(&self) -> Option<i64> {
        self.expires_at.or_else(|| access_token_expiry(&self.access_token))
    }

    /// A session whose expiry cannot be determined always needs a refresh.
    pub fn needs_refresh(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        let Some(expires_at) = self.expiry() else {
            return true;
        };
        let margin = crate::hang::SESSION_EXPIRY_MARGIN.as_secs() as i64;
        expires_at.saturating_sub(now.timestamp()) < margin
    }
}

#[derive(Deserialize)]
struct AccessTokenClaims {
    exp: i64,
}

// claims are read unverified, only to schedule the refresh
fn access_token_expiry(access_token: &str) -> Option<i64> {
    let payload = access_token.split('.').nth(1)?;
    let json = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<AccessTokenClaims>(&json)
        .ok()
        .map(|claims| claims.exp)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Authenticated { session: Session, user: User },
    Anonymous,
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated { session, .. } => Some(session),
            AuthState::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated { user, .. } => Some(user),
            AuthState::Anonymous => None,
        }
    }
}

impl From<Option<Session>> for AuthState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(session) => AuthState::Authenticated {
                user: session.user.clone(),
                session,
            },
            None => AuthState::Anonymous,
        }
    }
}

/// Resolves the current session from request cookies.
///
/// `Ok(None)` means the request is anonymous. Implementations may write
/// cookies back through the adapter (after a refresh, or to clear a dead
/// session).
pub trait IdentityProvider: Send + Sync {
    fn get_session(
        &self,
        cookies: &mut CookieAdapter,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send;
}

type BoxedSessionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Session>, ProviderError>> + Send + 'a>>;

/// Object-safe form of [`IdentityProvider`] so the shared state can hold any provider.
pub trait DynIdentityProvider: Send + Sync {
    fn get_session_dyn<'a>(&'a self, cookies: &'a mut CookieAdapter) -> BoxedSessionFuture<'a>;
}

impl<T: IdentityProvider> DynIdentityProvider for T {
    fn get_session_dyn<'a>(&'a self, cookies: &'a mut CookieAdapter) -> BoxedSessionFuture<'a> {
        Box::pin(self.get_session(cookies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn session_for(user_id: &str, expires_at: Option<i64>) -> Session {
        Session {
            access_token: format!("access-{user_id}"),
            refresh_token: format!("refresh-{user_id}"),
            token_type: default_token_type(),
            expires_in: Some(3600),
            expires_at,
            user: User {
                id: user_id.to_owned(),
                email: Some(format!("{user_id}@example.com")),
                role: Some(String::from("authenticated")),
                user_metadata: serde_json::Value::Null,
            },
        }
    }

    #[test]
    fn user_follows_session() {
        let state = AuthState::from(Some(session_for("ada", None)));
        assert_eq!(state.user(), state.session().map(|session| &session.user));
        assert_eq!(state.user().map(|user| user.id.as_str()), Some("ada"));

        let anonymous = AuthState::from(None);
        assert!(anonymous.session().is_none());
        assert!(anonymous.user().is_none());
    }

    #[test]
    fn refresh_happens_inside_the_margin() {
        let now = chrono::DateTime::from_timestamp(1_000_000, 0).unwrap();
        assert!(!session_for("a", Some(1_000_000 + 3600)).needs_refresh(now));
        assert!(session_for("a", Some(1_000_000 + 30)).needs_refresh(now));
        assert!(session_for("a", Some(999_000)).needs_refresh(now));
    }

    #[test]
    fn extreme_expiry_does_not_overflow() {
        let now = chrono::DateTime::from_timestamp(1_000_000, 0).unwrap();
        assert!(session_for("a", Some(i64::MIN)).needs_refresh(now));
        assert!(!session_for("a", Some(i64::MAX)).needs_refresh(now));
    }

    #[test]
    fn missing_expiry_comes_from_the_access_token() {
        let now = chrono::DateTime::from_timestamp(1_000_000, 0).unwrap();
        let jwt = |claims: serde_json::Value| {
            let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .encode(claims.to_string());
            format!("e30.{payload}.signature")
        };

        let mut session = session_for("a", None);
        session.access_token = jwt(serde_json::json!({ "exp": 1_000_000 + 3600 }));
        assert_eq!(session.expiry(), Some(1_003_600));
        assert!(!session.needs_refresh(now));

        session.access_token = jwt(serde_json::json!({ "exp": 1_000_000 + 30 }));
        assert!(session.needs_refresh(now));

        session.access_token = jwt(serde_json::json!({ "sub": "a" }));
        assert!(session.needs_refresh(now));
    }

    #[test]
    fn hand_written_session_without_expiry_is_not_trusted() {
        let now = chrono::DateTime::from_timestamp(1_000_000, 0).unwrap();
        let forged: Session = serde_json::from_value(serde_json::json!({
            "access_token": "x",
            "refresh_token": "y",
            "user": { "id": "admin" }
        }))
        .unwrap();
        assert_eq!(forged.expiry(), None);
        assert!(forged.needs_refresh(now));
    }

    #[test]
    fn session_json_tolerates_missing_optional_fields() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "access_token": "a",
            "refresh_token": "r",
            "user": { "id": "u1" }
        }))
        .unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.expires_at, None);
        assert_eq!(session.user.email, None);
    }
}

#[cfg(test)]
pub(crate) use tests::session_for;
