use crate::application::params::ListEventsParams;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Value, json};

pub async fn list_calendars<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_get("/calendar/third/accounts").await
}

pub async fn list_events<A>(api: &A, params: ListEventsParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_post(
        "/calendar/bind/events/all",
        json!({"begin": params.begin, "end": params.end}),
    )
    .await
}

/// Full account state: projects, tasks, tags, filters, folders and settings.
pub async fn sync_account<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.batch_check().await
}
