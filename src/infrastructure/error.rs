use crate::domain::resolve::ResolveError;
use crate::domain::temporal::TemporalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("OAuth error: {0}")]
    OAuth(String),
    #[error("Credential store error: {0}")]
    Credential(String),
    #[error("TickTick API error: http {status}{}", format_body(.body))]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error(
        "v2 session token not set. Set TICKTICK_V2_SESSION_TOKEN from the 't' cookie in your browser."
    )]
    SessionRequired,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Temporal(#[from] TemporalError),
}

fn format_body(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!("; body={body}")
    }
}

impl InfraError {
    /// Stable machine-readable code for tool error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            InfraError::Resolve(ResolveError::AmbiguousMatch { .. }) => "ambiguous_match",
            InfraError::Resolve(ResolveError::NotFound { .. }) => "not_found",
            InfraError::Temporal(_) => "invalid_format",
            InfraError::InvalidInput(_) => "invalid_input",
            InfraError::Http { .. } => "http_error",
            InfraError::SessionRequired => "session_required",
            InfraError::OAuth(_) | InfraError::Credential(_) => "auth_error",
            InfraError::InvalidConfig(_) => "config_error",
            InfraError::Transport(_) => "transport_error",
            InfraError::Json(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_includes_body_when_present() {
        let error = InfraError::Http {
            status: 404,
            body: "{\"errorCode\":\"task_not_found\"}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "TickTick API error: http 404; body={\"errorCode\":\"task_not_found\"}"
        );

        let empty = InfraError::Http {
            status: 500,
            body: "  ".to_string(),
        };
        assert_eq!(empty.to_string(), "TickTick API error: http 500");
    }

    #[test]
    fn resolver_errors_keep_their_message_and_code() {
        let error = InfraError::from(ResolveError::NotFound {
            entity_type: "habit".to_string(),
            query: "Run".to_string(),
            suggestion: Some("Rum".to_string()),
        });
        assert_eq!(error.code(), "not_found");
        assert_eq!(error.to_string(), "No habit found matching 'Run'. Did you mean 'Rum'?");
    }

    #[test]
    fn temporal_errors_map_to_invalid_format() {
        let error = InfraError::from(TemporalError::InvalidFormat(
            "Invalid duration: empty string".to_string(),
        ));
        assert_eq!(error.code(), "invalid_format");
        assert_eq!(error.to_string(), "Invalid duration: empty string");
    }
}
