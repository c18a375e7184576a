use crate::infrastructure::error::InfraError;
use std::time::Duration;

const V1_BASE: &str = "https://api.ticktick.com/open/v1";
const V2_BASE: &str = "https://api.ticktick.com/api/v2";
const MS_BASE: &str = "https://ms.ticktick.com";
const TOKEN_ENDPOINT: &str = "https://ticktick.com/oauth/token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ACCESS_TOKEN_KEYS: &[&str] = &["TICKTICK_ACCESS_TOKEN"];
const REFRESH_TOKEN_KEYS: &[&str] = &["TICKTICK_REFRESH_TOKEN"];
const CLIENT_ID_KEYS: &[&str] = &["TICKTICK_CLIENT_ID"];
const CLIENT_SECRET_KEYS: &[&str] = &["TICKTICK_CLIENT_SECRET"];
const SESSION_TOKEN_KEYS: &[&str] = &["TICKTICK_V2_SESSION_TOKEN"];
const TIMEOUT_KEYS: &[&str] = &["TICKTICK_HTTP_TIMEOUT_SECS"];

/// Base URLs for every TickTick API family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub v1_base: String,
    pub v2_base: String,
    pub ms_base: String,
    pub token_endpoint: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            v1_base: V1_BASE.to_string(),
            v2_base: V2_BASE.to_string(),
            ms_base: MS_BASE.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub session_token: Option<String>,
    pub request_timeout: Duration,
    pub endpoints: ApiEndpoints,
}

impl ClientConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            client_id: None,
            client_secret: None,
            session_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoints: ApiEndpoints::default(),
        }
    }

    pub fn from_env() -> Result<Self, InfraError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, InfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = required_lookup_value(&lookup, ACCESS_TOKEN_KEYS, "ticktick access token")?;

        let request_timeout = match optional_lookup_value(&lookup, TIMEOUT_KEYS) {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            access_token,
            refresh_token: optional_lookup_value(&lookup, REFRESH_TOKEN_KEYS),
            client_id: optional_lookup_value(&lookup, CLIENT_ID_KEYS),
            client_secret: optional_lookup_value(&lookup, CLIENT_SECRET_KEYS),
            session_token: optional_lookup_value(&lookup, SESSION_TOKEN_KEYS),
            request_timeout,
            endpoints: ApiEndpoints::default(),
        })
    }

    /// Refresh needs a refresh token plus both halves of the client credentials.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, InfraError> {
    match raw.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(InfraError::InvalidConfig(format!(
            "{} must be a positive integer, got '{raw}'",
            TIMEOUT_KEYS[0]
        ))),
    }
}

fn required_lookup_value<F>(lookup: &F, keys: &[&str], field_name: &str) -> Result<String, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    optional_lookup_value(lookup, keys).ok_or_else(|| {
        InfraError::InvalidConfig(format!(
            "missing {} (set one of: {})",
            field_name,
            keys.join(", ")
        ))
    })
}

fn optional_lookup_value<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn missing_access_token_is_reported() {
        let result = ClientConfig::from_lookup(lookup_from(&[("TICKTICK_CLIENT_ID", "id")]));
        match result {
            Err(InfraError::InvalidConfig(message)) => {
                assert!(message.contains("ticktick access token"));
                assert!(message.contains("TICKTICK_ACCESS_TOKEN"));
            }
            other => panic!("expected invalid config error, got {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_absent() {
        let result = ClientConfig::from_lookup(lookup_from(&[("TICKTICK_ACCESS_TOKEN", "   ")]));
        assert!(matches!(result, Err(InfraError::InvalidConfig(_))));
    }

    #[test]
    fn full_environment_is_loaded_and_trimmed() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("TICKTICK_ACCESS_TOKEN", " access "),
            ("TICKTICK_REFRESH_TOKEN", "refresh"),
            ("TICKTICK_CLIENT_ID", "client"),
            ("TICKTICK_CLIENT_SECRET", "secret"),
            ("TICKTICK_V2_SESSION_TOKEN", "cookie"),
            ("TICKTICK_HTTP_TIMEOUT_SECS", "12"),
        ]))
        .expect("config");

        assert_eq!(config.access_token, "access");
        assert_eq!(config.session_token.as_deref(), Some("cookie"));
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert!(config.can_refresh());
        assert_eq!(config.endpoints, ApiEndpoints::default());
        assert_eq!(config.endpoints.v1_base, "https://api.ticktick.com/open/v1");
    }

    #[test]
    fn refresh_requires_every_credential() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("TICKTICK_ACCESS_TOKEN", "access"),
            ("TICKTICK_REFRESH_TOKEN", "refresh"),
            ("TICKTICK_CLIENT_ID", "client"),
        ]))
        .expect("config");
        assert!(!config.can_refresh());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn endpoints_point_at_ticktick_hosts() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("TICKTICK_ACCESS_TOKEN", "access"),
            ("TICKTICK_DOMAIN", "dida365.com"),
        ]))
        .expect("config");

        assert_eq!(config.endpoints.v1_base, "https://api.ticktick.com/open/v1");
        assert_eq!(config.endpoints.v2_base, "https://api.ticktick.com/api/v2");
        assert_eq!(config.endpoints.ms_base, "https://ms.ticktick.com");
        assert_eq!(config.endpoints.token_endpoint, "https://ticktick.com/oauth/token");
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        for raw in ["0", "-5", "soon"] {
            let timeout = ClientConfig::from_lookup(lookup_from(&[
                ("TICKTICK_ACCESS_TOKEN", "access"),
                ("TICKTICK_HTTP_TIMEOUT_SECS", raw),
            ]));
            assert!(matches!(timeout, Err(InfraError::InvalidConfig(_))), "{raw}");
        }
    }
}
