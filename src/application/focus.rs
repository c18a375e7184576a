use crate::application::lookup::non_empty;
use crate::application::params::{FocusAction, FocusControlParams, FocusLogParams, FocusStartParams};
use crate::domain::temporal::{date_to_epoch_ms, end_of_day_epoch_ms};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

const FOCUS_ID_MASK: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Millisecond clock in hex followed by 8 scrambled hex digits, as the web client builds them.
pub fn focus_id(now_ms: i64) -> String {
    let millis = now_ms as u64;
    format!("{millis:x}{:08x}", (millis ^ FOCUS_ID_MASK) & 0xFFFF_FFFF)
}

/// `YYYY-MM-DDTHH:MM:SS.mmm+0000`.
pub fn utc_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3f+0000").to_string()
}

pub async fn focus_status<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_get("/timer").await
}

pub async fn focus_stats<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_get("/pomodoros/statistics/generalForDesktop").await
}

pub async fn focus_timeline<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_get("/pomodoros/timeline").await
}

pub async fn focus_log<A>(api: &A, params: FocusLogParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let from_ms = date_to_epoch_ms(&params.from_date)?;
    let to_ms = end_of_day_epoch_ms(date_to_epoch_ms(&params.to_date)?);
    api.v2_get(&format!("/pomodoros?from={from_ms}&to={to_ms}"))
        .await
}

pub async fn focus_start<A>(api: &A, params: FocusStartParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    if params.duration_minutes <= 0 {
        return Err(InfraError::InvalidInput(format!(
            "Invalid duration_minutes {}: must be greater than zero",
            params.duration_minutes
        )));
    }

    let estimated_ms = params
        .duration_minutes
        .checked_mul(60 * 1000)
        .ok_or_else(|| {
            InfraError::InvalidInput(format!(
                "Invalid duration_minutes {}: too large",
                params.duration_minutes
            ))
        })?;

    let now = Utc::now();
    let mut op = Map::new();
    op.insert("op".into(), json!("start"));
    op.insert("id".into(), json!(focus_id(now.timestamp_millis())));
    op.insert("startTime".into(), json!(utc_timestamp(now)));
    op.insert("estimatedPomo".into(), json!(estimated_ms));
    op.insert("opTime".into(), json!(now.timestamp_millis()));
    if let Some(task_id) = non_empty(params.task_id.as_deref()) {
        op.insert("taskId".into(), json!(task_id));
    }
    if let Some(project_id) = non_empty(params.project_id.as_deref()) {
        op.insert("projectId".into(), json!(project_id));
    }

    api.focus_op(vec![Value::Object(op)]).await
}

pub async fn focus_control<A>(api: &A, params: FocusControlParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let session_id = match non_empty(params.session_id.as_deref()) {
        Some(session_id) => session_id.to_string(),
        None => current_session_id(api).await?,
    };

    let now = Utc::now();
    let mut op = Map::new();
    op.insert("op".into(), json!(params.action.as_op()));
    op.insert("id".into(), json!(session_id));
    op.insert("opTime".into(), json!(now.timestamp_millis()));
    if params.action == FocusAction::Stop {
        op.insert("endTime".into(), json!(utc_timestamp(now)));
    }

    api.focus_op(vec![Value::Object(op)]).await
}

async fn current_session_id<A>(api: &A) -> Result<String, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let timer = api.v2_get("/timer").await?;
    ["id", "focusId"]
        .into_iter()
        .find_map(|key| timer.get(key).and_then(Value::as_str).filter(|id| !id.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| InfraError::InvalidInput("No active focus session found".to_string()))
}
