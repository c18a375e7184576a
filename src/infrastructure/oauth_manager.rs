use crate::domain::models::OAuthToken;
use crate::infrastructure::credential_store::CredentialStore;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::oauth_client::{OAuthHttpClient, OAuthRefreshRequest, OAuthTokenResponse};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

const TOKEN_LEEWAY_SECONDS: i64 = 60;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureTokenResult {
    Existing(OAuthToken),
    Refreshed(OAuthToken),
    ReauthenticationRequired,
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Owns the v1 bearer token: hands it out, and refreshes it when it expires or is rejected.
pub struct OAuthManager<S, C>
where
    S: CredentialStore,
    C: OAuthHttpClient,
{
    config: OAuthConfig,
    credential_store: Arc<S>,
    oauth_client: Arc<C>,
    now_provider: NowProvider,
}

impl<S, C> OAuthManager<S, C>
where
    S: CredentialStore,
    C: OAuthHttpClient,
{
    pub fn new(config: OAuthConfig, credential_store: Arc<S>, oauth_client: Arc<C>) -> Self {
        Self {
            config,
            credential_store,
            oauth_client,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn is_token_valid(&self, token: &OAuthToken) -> bool {
        token.is_valid_at((self.now_provider)(), TOKEN_LEEWAY_SECONDS)
    }

    /// Returns the stored token, refreshing it first when its known expiry has passed.
    pub async fn ensure_access_token(&self) -> Result<EnsureTokenResult, InfraError> {
        let Some(stored_token) = self.credential_store.load_token()? else {
            return Ok(EnsureTokenResult::ReauthenticationRequired);
        };

        if self.is_token_valid(&stored_token) {
            return Ok(EnsureTokenResult::Existing(stored_token));
        }

        self.refresh(stored_token).await
    }

    /// Refreshes after the API rejected the current token with 401.
    pub async fn refresh_after_rejection(&self) -> Result<EnsureTokenResult, InfraError> {
        let Some(stored_token) = self.credential_store.load_token()? else {
            return Ok(EnsureTokenResult::ReauthenticationRequired);
        };
        self.refresh(stored_token).await
    }

    async fn refresh(&self, stored_token: OAuthToken) -> Result<EnsureTokenResult, InfraError> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            stored_token.refresh_token.clone(),
            self.config.client_id.clone(),
            self.config.client_secret.clone(),
        ) else {
            tracing::debug!("token refresh unavailable: missing refresh token or client credentials");
            return Ok(EnsureTokenResult::ReauthenticationRequired);
        };

        let refreshed = self
            .oauth_client
            .refresh_access_token(OAuthRefreshRequest {
                token_endpoint: self.config.token_endpoint.clone(),
                client_id,
                client_secret,
                refresh_token,
            })
            .await;

        match refreshed {
            Ok(response) => {
                let token = self.token_from_response(response, stored_token.refresh_token);
                self.credential_store.save_token(&token)?;
                tracing::info!("access token refreshed");
                Ok(EnsureTokenResult::Refreshed(token))
            }
            Err(InfraError::OAuth(message)) => {
                tracing::warn!(error = %message, "access token refresh failed");
                Ok(EnsureTokenResult::ReauthenticationRequired)
            }
            Err(error) => Err(error),
        }
    }

    fn token_from_response(
        &self,
        response: OAuthTokenResponse,
        fallback_refresh_token: Option<String>,
    ) -> OAuthToken {
        let expires_at = response
            .expires_in
            .map(|seconds| (self.now_provider)() + Duration::seconds(seconds));
        OAuthToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(fallback_refresh_token),
            expires_at,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: response.scope,
        }
    }
}
