use crate::domain::models::OAuthToken;
use crate::infrastructure::config::{ApiEndpoints, ClientConfig};
use crate::infrastructure::credential_store::{CredentialStore, InMemoryCredentialStore};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::http_transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::infrastructure::oauth_client::{OAuthHttpClient, ReqwestOAuthClient};
use crate::infrastructure::oauth_manager::{EnsureTokenResult, OAuthConfig, OAuthManager};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

const DEVICE_ID_PREFIX: &str = "6490";
const DEVICE_ID_NIBBLES: usize = 20;
const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

/// Everything the operation layer needs from the TickTick backend.
///
/// v1 calls authenticate with the OAuth bearer token and are retried once after
/// a refresh when rejected. v2 and focus calls ride on the browser session cookie.
#[async_trait]
pub trait TickTickApi: Send + Sync {
    async fn v1_get(&self, endpoint: &str) -> Result<Value, InfraError>;
    async fn v1_post(&self, endpoint: &str, body: Value) -> Result<Value, InfraError>;
    async fn v1_post_empty(&self, endpoint: &str) -> Result<(), InfraError>;
    async fn v1_delete(&self, endpoint: &str) -> Result<(), InfraError>;

    async fn v2_get(&self, endpoint: &str) -> Result<Value, InfraError>;
    async fn v2_post(&self, endpoint: &str, body: Value) -> Result<Value, InfraError>;
    async fn v2_put(&self, endpoint: &str, body: Value) -> Result<Value, InfraError>;
    async fn v2_delete(&self, endpoint: &str) -> Result<(), InfraError>;

    /// Full account state: projects, folders, filters, tags.
    async fn batch_check(&self) -> Result<Value, InfraError> {
        self.v2_get("/batch/check/0").await
    }

    async fn focus_op(&self, ops: Vec<Value>) -> Result<Value, InfraError>;

    fn cached_inbox_id(&self) -> Option<String>;
    fn remember_inbox_id(&self, inbox_id: String);
}

#[derive(Debug, Serialize)]
struct DeviceHeader<'a> {
    platform: &'a str,
    os: &'a str,
    device: &'a str,
    name: &'a str,
    version: u32,
    id: &'a str,
    channel: &'a str,
    campaign: &'a str,
    websocket: &'a str,
}

impl<'a> DeviceHeader<'a> {
    fn web(device_id: &'a str) -> Self {
        Self {
            platform: "web",
            os: "macOS 10.15.7",
            device: "Chrome 130.0.0.0",
            name: "",
            version: 6490,
            id: device_id,
            channel: "website",
            campaign: "",
            websocket: "",
        }
    }
}

pub type DefaultTickTickClient =
    TickTickClient<ReqwestTransport, ReqwestOAuthClient, InMemoryCredentialStore>;

pub struct TickTickClient<T, C, S>
where
    T: HttpTransport,
    C: OAuthHttpClient,
    S: CredentialStore,
{
    transport: Arc<T>,
    oauth: OAuthManager<S, C>,
    endpoints: ApiEndpoints,
    configured_access_token: String,
    session_token: Option<String>,
    device_id: String,
    inbox_id: Mutex<Option<String>>,
}

impl DefaultTickTickClient {
    pub fn from_config(config: &ClientConfig) -> Result<Self, InfraError> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        let oauth_client = Arc::new(ReqwestOAuthClient::new(config.request_timeout)?);
        let store = Arc::new(InMemoryCredentialStore::with_token(OAuthToken::bearer(
            config.access_token.clone(),
            config.refresh_token.clone(),
        )));
        Ok(Self::new(config, transport, oauth_client, store))
    }
}

impl<T, C, S> TickTickClient<T, C, S>
where
    T: HttpTransport,
    C: OAuthHttpClient,
    S: CredentialStore,
{
    pub fn new(config: &ClientConfig, transport: Arc<T>, oauth_client: Arc<C>, store: Arc<S>) -> Self {
        let oauth = OAuthManager::new(
            OAuthConfig {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                token_endpoint: config.endpoints.token_endpoint.clone(),
            },
            store,
            oauth_client,
        );
        let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;

        Self {
            transport,
            oauth,
            endpoints: config.endpoints.clone(),
            configured_access_token: config.access_token.clone(),
            session_token: config.session_token.clone(),
            device_id: generate_device_id(seed),
            inbox_id: Mutex::new(None),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    async fn current_access_token(&self) -> Result<String, InfraError> {
        match self.oauth.ensure_access_token().await? {
            EnsureTokenResult::Existing(token) | EnsureTokenResult::Refreshed(token) => {
                Ok(token.access_token)
            }
            EnsureTokenResult::ReauthenticationRequired => Ok(self.configured_access_token.clone()),
        }
    }

    fn v1_request(method: Method, url: &str, access_token: &str, body: Option<Value>) -> HttpRequest {
        HttpRequest {
            method,
            url: url.to_string(),
            headers: vec![("Authorization".to_string(), format!("Bearer {access_token}"))],
            body,
        }
    }

    async fn send_v1(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<String, InfraError> {
        let url = format!("{}{endpoint}", self.endpoints.v1_base);
        tracing::debug!(method = %method, family = "v1", endpoint, "sending request");

        let access_token = self.current_access_token().await?;
        let mut response = self
            .transport
            .send(Self::v1_request(method.clone(), &url, &access_token, body.clone()))
            .await?;

        if response.status == 401 {
            if let EnsureTokenResult::Refreshed(token) = self.oauth.refresh_after_rejection().await? {
                tracing::info!(endpoint, "retrying request with refreshed access token");
                response = self
                    .transport
                    .send(Self::v1_request(method, &url, &token.access_token, body))
                    .await?;
            }
        }

        checked_body(response, endpoint)
    }

    fn session_headers(&self) -> Result<Vec<(String, String)>, InfraError> {
        let session = self
            .session_token
            .as_deref()
            .ok_or(InfraError::SessionRequired)?;
        let device = serde_json::to_string(&DeviceHeader::web(&self.device_id))?;

        Ok(vec![
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("x-device".to_string(), device),
            ("Cookie".to_string(), format!("t={session}")),
        ])
    }

    async fn send_session(
        &self,
        method: Method,
        family: &'static str,
        url: String,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<String, InfraError> {
        let headers = self.session_headers()?;
        tracing::debug!(method = %method, family, endpoint, "sending request");

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        checked_body(response, endpoint)
    }

    async fn send_v2(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<String, InfraError> {
        let url = format!("{}{endpoint}", self.endpoints.v2_base);
        self.send_session(method, "v2", url, endpoint, body).await
    }
}

#[async_trait]
impl<T, C, S> TickTickApi for TickTickClient<T, C, S>
where
    T: HttpTransport,
    C: OAuthHttpClient,
    S: CredentialStore,
{
    async fn v1_get(&self, endpoint: &str) -> Result<Value, InfraError> {
        decode_json(&self.send_v1(Method::GET, endpoint, None).await?)
    }

    async fn v1_post(&self, endpoint: &str, body: Value) -> Result<Value, InfraError> {
        decode_json(&self.send_v1(Method::POST, endpoint, Some(body)).await?)
    }

    async fn v1_post_empty(&self, endpoint: &str) -> Result<(), InfraError> {
        self.send_v1(Method::POST, endpoint, None).await.map(|_| ())
    }

    async fn v1_delete(&self, endpoint: &str) -> Result<(), InfraError> {
        self.send_v1(Method::DELETE, endpoint, None).await.map(|_| ())
    }

    async fn v2_get(&self, endpoint: &str) -> Result<Value, InfraError> {
        decode_json(&self.send_v2(Method::GET, endpoint, None).await?)
    }

    async fn v2_post(&self, endpoint: &str, body: Value) -> Result<Value, InfraError> {
        decode_json(&self.send_v2(Method::POST, endpoint, Some(body)).await?)
    }

    async fn v2_put(&self, endpoint: &str, body: Value) -> Result<Value, InfraError> {
        decode_json(&self.send_v2(Method::PUT, endpoint, Some(body)).await?)
    }

    async fn v2_delete(&self, endpoint: &str) -> Result<(), InfraError> {
        self.send_v2(Method::DELETE, endpoint, None).await.map(|_| ())
    }

    async fn focus_op(&self, ops: Vec<Value>) -> Result<Value, InfraError> {
        let endpoint = "/focus/batch/focusOp";
        let url = format!("{}{endpoint}", self.endpoints.ms_base);
        let body = json!({
            "lastPoint": Utc::now().timestamp_millis(),
            "opList": ops,
        });
        decode_json(&self.send_session(Method::POST, "ms", url, endpoint, Some(body)).await?)
    }

    fn cached_inbox_id(&self) -> Option<String> {
        self.inbox_id.lock().ok().and_then(|cached| cached.clone())
    }

    fn remember_inbox_id(&self, inbox_id: String) {
        if let Ok(mut cached) = self.inbox_id.lock() {
            *cached = Some(inbox_id);
        }
    }
}

fn checked_body(response: HttpResponse, endpoint: &str) -> Result<String, InfraError> {
    if response.is_success() {
        return Ok(response.body);
    }
    tracing::warn!(endpoint, status = response.status, "ticktick request failed");
    Err(InfraError::Http {
        status: response.status,
        body: response.body,
    })
}

fn decode_json(body: &str) -> Result<Value, InfraError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// "6490" followed by 20 hex nibbles drawn from a 64-bit LCG, matching the web client's ids.
pub fn generate_device_id(seed: u64) -> String {
    let mut state = seed;
    let mut id = String::with_capacity(DEVICE_ID_PREFIX.len() + DEVICE_ID_NIBBLES);
    id.push_str(DEVICE_ID_PREFIX);
    for _ in 0..DEVICE_ID_NIBBLES {
        state = state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
        let _ = write!(id, "{:x}", (state >> 33) & 0xF);
    }
    id
}
