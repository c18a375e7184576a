use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One call observed by [`FakeApi`], keyed as `"<family> <METHOD> <endpoint>"`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub key: String,
    pub body: Option<Value>,
}

/// Scripted stand-in for the TickTick backend.
///
/// Unscripted calls answer `null`. Keys registered with [`FakeApi::failing`] answer http 500.
#[derive(Debug, Default)]
pub struct FakeApi {
    responses: HashMap<String, Value>,
    failures: HashSet<String>,
    calls: Mutex<Vec<RecordedCall>>,
    inbox_id: Mutex<Option<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, key: &str, response: Value) -> Self {
        self.responses.insert(key.to_string(), response);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failures.insert(key.to_string());
        self
    }

    pub fn with_inbox(self, inbox_id: &str) -> Self {
        self.remember_inbox_id(inbox_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.key).collect()
    }

    /// Body of the last call made under `key`.
    pub fn body_of(&self, key: &str) -> Value {
        self.calls()
            .into_iter()
            .rev()
            .find(|call| call.key == key)
            .and_then(|call| call.body)
            .unwrap_or_else(|| panic!("no call with a body recorded for {key}"))
    }

    fn answer(&self, key: String, body: Option<Value>) -> Result<Value, InfraError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(RecordedCall {
                key: key.clone(),
                body,
            });
        if self.failures.contains(&key) {
            return Err(InfraError::Http {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self.responses.get(&key).cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl TickTickApi for FakeApi {
    async fn v1_get(&self, endpoint: &str) -> Result<Value, InfraError> {
        self.answer(format!("v1 GET {endpoint}"), None)
    }

    async fn v1_post(&self, endpoint: &str, body: Value) -> Result<Value, InfraError> {
        self.answer(format!("v1 POST {endpoint}"), Some(body))
    }

    async fn v1_post_empty(&self, endpoint: &str) -> Result<(), InfraError> {
        self.answer(format!("v1 POST {endpoint}"), None).map(|_| ())
    }

    async fn v1_delete(&self, endpoint: &str) -> Result<(), InfraError> {
        self.answer(format!("v1 DELETE {endpoint}"), None).map(|_| ())
    }

    async fn v2_get(&self, endpoint: &str) -> Result<Value, InfraError> {
        self.answer(format!("v2 GET {endpoint}"), None)
    }

    async fn v2_post(&self, endpoint: &str, body: Value) -> Result<Value, InfraError> {
        self.answer(format!("v2 POST {endpoint}"), Some(body))
    }

    async fn v2_put(&self, endpoint: &str, body: Value) -> Result<Value, InfraError> {
        self.answer(format!("v2 PUT {endpoint}"), Some(body))
    }

    async fn v2_delete(&self, endpoint: &str) -> Result<(), InfraError> {
        self.answer(format!("v2 DELETE {endpoint}"), None).map(|_| ())
    }

    async fn focus_op(&self, ops: Vec<Value>) -> Result<Value, InfraError> {
        self.answer(
            "ms POST /focus/batch/focusOp".to_string(),
            Some(Value::Array(ops)),
        )
    }

    fn cached_inbox_id(&self) -> Option<String> {
        self.inbox_id.lock().expect("inbox mutex poisoned").clone()
    }

    fn remember_inbox_id(&self, inbox_id: String) {
        *self.inbox_id.lock().expect("inbox mutex poisoned") = Some(inbox_id);
    }
}
