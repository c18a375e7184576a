use crate::domain::models::OAuthToken;
use crate::infrastructure::error::InfraError;
use std::sync::{Mutex, MutexGuard};

pub trait CredentialStore: Send + Sync {
    fn save_token(&self, token: &OAuthToken) -> Result<(), InfraError>;
    fn load_token(&self) -> Result<Option<OAuthToken>, InfraError>;
}

/// Process-lifetime token holder, seeded from configuration at startup.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    token: Mutex<Option<OAuthToken>>,
}

impl InMemoryCredentialStore {
    pub fn with_token(token: OAuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, Option<OAuthToken>>, InfraError> {
        self.token
            .lock()
            .map_err(|error| InfraError::Credential(format!("in-memory lock poisoned: {error}")))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn save_token(&self, token: &OAuthToken) -> Result<(), InfraError> {
        *self.guard()? = Some(token.clone());
        Ok(())
    }

    fn load_token(&self) -> Result<Option<OAuthToken>, InfraError> {
        Ok(self.guard()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn token_pattern() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._\\-]{1,64}".prop_map(|value| value.to_string())
    }

    fn arb_oauth_token() -> impl Strategy<Value = OAuthToken> {
        (
            token_pattern(),
            prop::option::of(token_pattern()),
            prop::option::of(120i64..604800i64),
            prop::option::of(token_pattern()),
        )
            .prop_map(|(access_token, refresh_token, expires_in_seconds, scope)| OAuthToken {
                access_token,
                refresh_token,
                expires_at: expires_in_seconds.map(|seconds| Utc::now() + Duration::seconds(seconds)),
                token_type: "Bearer".to_string(),
                scope,
            })
    }

    // Property: a saved token loads back unchanged
    proptest! {
        #[test]
        fn oauth_token_roundtrip(token in arb_oauth_token()) {
            let store = InMemoryCredentialStore::default();
            store.save_token(&token).expect("save token");
            let loaded = store.load_token().expect("load token").expect("token exists");
            prop_assert_eq!(loaded, token);
        }
    }

    #[test]
    fn seeded_token_is_replaced_on_save() {
        let store = InMemoryCredentialStore::with_token(OAuthToken::bearer("old", None));
        store
            .save_token(&OAuthToken::bearer("new", Some("refresh".to_string())))
            .expect("save");

        let loaded = store.load_token().expect("load").expect("token exists");
        assert_eq!(loaded.access_token, "new");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
    }
}
