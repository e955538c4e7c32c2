use crate::auth::{AuthState, CookieAdapter, Session};
use crate::data::DataClient;
use crate::error::ProviderError;

impl super::State {
    pub async fn resolve_auth(
        &self,
        cookies: &mut CookieAdapter,
    ) -> Result<AuthState, ProviderError> {
        let session = self.identity.get_session_dyn(cookies).await?;
        Ok(AuthState::from(session))
    }

    /// Data client acting as the session's user, or as anon without one.
    pub fn data_client(&self, session: Option<&Session>) -> DataClient {
        let bearer = session
            .map(|session| session.access_token.clone())
            .unwrap_or_else(|| self.config.supabase_anon_key.clone());

        DataClient::new(
            self.http.clone(),
            self.config.rest_url(),
            self.config.supabase_anon_key.clone(),
            bearer,
        )
    }
}
