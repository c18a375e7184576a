use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OAuthRefreshRequest {
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

#[async_trait]
pub trait OAuthHttpClient: Send + Sync {
    async fn refresh_access_token(
        &self,
        request: OAuthRefreshRequest,
    ) -> Result<OAuthTokenResponse, InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestOAuthClient {
    client: Client,
}

#[derive(Debug, serde::Deserialize)]
struct TickTickTokenResponsePayload {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    token_type: Option<String>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ReqwestOAuthClient {
    pub fn new(timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| InfraError::OAuth(format!("failed to build http client: {error}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OAuthHttpClient for ReqwestOAuthClient {
    async fn refresh_access_token(
        &self,
        request: OAuthRefreshRequest,
    ) -> Result<OAuthTokenResponse, InfraError> {
        // TickTick expects client credentials as HTTP Basic auth, not form fields.
        let response = self
            .client
            .post(&request.token_endpoint)
            .basic_auth(&request.client_id, Some(&request.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", request.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|error| InfraError::OAuth(format!("request failed: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::OAuth(format!("failed reading token response: {error}")))?;

        let parsed = serde_json::from_str::<TickTickTokenResponsePayload>(&body).map_err(|error| {
            InfraError::OAuth(format!(
                "invalid token response payload (http {}): {error}; body={body}",
                status.as_u16()
            ))
        })?;

        if !status.is_success() || parsed.error.is_some() {
            let code = parsed
                .error
                .unwrap_or_else(|| format!("http_{}", status.as_u16()));
            let detail = parsed.error_description.unwrap_or_else(|| body.clone());
            return Err(InfraError::OAuth(format!("token endpoint error: {code}; {detail}")));
        }

        let access_token = parsed
            .access_token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| InfraError::OAuth("token response did not include access_token".to_string()))?;

        Ok(OAuthTokenResponse {
            access_token,
            refresh_token: parsed.refresh_token.filter(|value| !value.trim().is_empty()),
            expires_in: parsed.expires_in.map(|seconds| seconds.max(0)),
            token_type: parsed.token_type,
            scope: parsed.scope,
        })
    }
}
